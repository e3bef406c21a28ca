use crate::math::{Point, Real, PI};
use crate::shape::Ball;
use crate::transformation::utils;

impl Ball {
    /// Discretize the boundary of this ball as a triangle-mesh.
    ///
    /// `ntheta_subdiv` subdivides the longitudes and `nphi_subdiv` the latitudes.
    pub fn to_trimesh(&self, ntheta_subdiv: u32, nphi_subdiv: u32) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        let nphi_subdiv = nphi_subdiv.max(2);
        let dphi = PI / nphi_subdiv as Real;
        let mut profile = vec![(0.0, -self.radius)];

        for k in 1..nphi_subdiv {
            let phi = dphi * k as Real;
            profile.push((self.radius * phi.sin(), -self.radius * phi.cos()));
        }

        profile.push((0.0, self.radius));

        let (mut vtx, idx) = utils::revolution(&profile, ntheta_subdiv);
        vtx.iter_mut().for_each(|p| *p += self.center.coords);
        (vtx, idx)
    }
}
