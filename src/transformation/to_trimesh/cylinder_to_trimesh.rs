use crate::math::{Point, Real};
use crate::shape::Cylinder;
use crate::transformation::utils;

impl Cylinder {
    /// Discretize the boundary of this cylinder as a triangle-mesh.
    pub fn to_trimesh(&self, nsubdiv: u32) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        let h = self.half_height;
        let r = self.radius;
        let profile = [(0.0, -h), (r, -h), (r, h), (0.0, h)];
        let (mut vtx, idx) = utils::revolution(&profile, nsubdiv);
        utils::align_y_axis(&mut vtx, &self.center, &self.axis);
        (vtx, idx)
    }
}
