use crate::math::{Point, Real, Vector, DEFAULT_EPSILON, PI};
use crate::shape::Capsule;
use crate::transformation::utils;

impl Capsule {
    /// Discretize the boundary of this capsule as a triangle-mesh.
    pub fn to_trimesh(&self, ntheta_subdiv: u32, nphi_subdiv: u32) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        let half_height = self.half_height();
        let nhalf = (nphi_subdiv / 2).max(1);
        let dphi = PI / 2.0 / nhalf as Real;
        let mut profile = vec![(0.0, -half_height - self.radius)];

        for k in 1..=nhalf {
            let phi = dphi * k as Real;
            profile.push((self.radius * phi.sin(), -half_height - self.radius * phi.cos()));
        }

        let first_upper = if half_height > DEFAULT_EPSILON { 0 } else { 1 };
        for k in first_upper..nhalf {
            let phi = PI / 2.0 - dphi * k as Real;
            profile.push((self.radius * phi.sin(), half_height + self.radius * phi.cos()));
        }

        profile.push((0.0, half_height + self.radius));

        let axis = (self.b - self.a)
            .try_normalize(DEFAULT_EPSILON)
            .unwrap_or_else(Vector::y);
        let (mut vtx, idx) = utils::revolution(&profile, ntheta_subdiv);
        utils::align_y_axis(&mut vtx, &self.center(), &axis);
        (vtx, idx)
    }
}
