use crate::math::{Point, Pose, Real, Vector};
use crate::shape::Cuboid;
use crate::transformation::utils;

impl Cuboid {
    /// Discretize the boundary of this cuboid as a triangle-mesh.
    pub fn to_trimesh(&self) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        let (mut vtx, idx) = cuboid_mesh(self.half_extents);
        let pose = Pose::new(self.rotation, self.center.coords, 1.0);
        utils::transform(&mut vtx, &pose);
        let idx = idx
            .iter()
            .map(|t| [t[0] as u32, t[1] as u32, t[2] as u32])
            .collect();
        (vtx, idx)
    }
}

/// The 8 vertices and 12 outward-facing triangles of a box centered at the origin.
pub fn cuboid_mesh(half_extents: Vector<Real>) -> (Vec<Point<Real>>, Vec<[u16; 3]>) {
    let (hx, hy, hz) = (half_extents.x, half_extents.y, half_extents.z);
    let coords = vec![
        Point::new(-hx, -hy, hz),
        Point::new(-hx, -hy, -hz),
        Point::new(hx, -hy, -hz),
        Point::new(hx, -hy, hz),
        Point::new(-hx, hy, hz),
        Point::new(-hx, hy, -hz),
        Point::new(hx, hy, -hz),
        Point::new(hx, hy, hz),
    ];

    let faces = vec![
        [4, 5, 0],
        [5, 1, 0],
        [5, 6, 1],
        [6, 2, 1],
        [6, 7, 3],
        [2, 6, 3],
        [7, 4, 0],
        [3, 7, 0],
        [0, 1, 2],
        [3, 0, 2],
        [7, 6, 5],
        [4, 7, 5],
    ];

    (coords, faces)
}
