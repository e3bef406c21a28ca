//! Triangle mesh generation from geometric shapes.
//!
//! Each primitive implements a `to_trimesh` method discretizing its boundary into a pair
//! `(Vec<Point<Real>>, Vec<[u32; 3]>)` of vertices and outward-facing triangles.

pub use self::cuboid_to_trimesh::cuboid_mesh;

use crate::math::{Point, Real};
use crate::shape::Geometry;

mod ball_to_trimesh;
mod capsule_to_trimesh;
mod cuboid_to_trimesh;
mod cylinder_to_trimesh;
mod heightfield_to_trimesh;
mod voxels_to_trimesh;

/// Default number of subdivisions used when a curved primitive is tessellated.
pub const DEFAULT_SUBDIVISIONS: u32 = 16;

impl Geometry {
    /// Discretize the boundary of this geometry as a triangle-mesh.
    ///
    /// Curved primitives use [`DEFAULT_SUBDIVISIONS`]. Returns `None` for rays, which
    /// have no surface.
    pub fn to_trimesh(&self) -> Option<(Vec<Point<Real>>, Vec<[u32; 3]>)> {
        let n = DEFAULT_SUBDIVISIONS;
        match self {
            Geometry::TriMesh(m) => Some((
                m.vertices().to_vec(),
                m.indices()
                    .iter()
                    .map(|t| [t[0] as u32, t[1] as u32, t[2] as u32])
                    .collect(),
            )),
            Geometry::HeightField(s) => Some(s.to_trimesh()),
            Geometry::Cylinder(s) => Some(s.to_trimesh(n)),
            Geometry::Capsule(s) => Some(s.to_trimesh(n, n)),
            Geometry::Ball(s) => Some(s.to_trimesh(n, n)),
            Geometry::Cuboid(s) => Some(s.to_trimesh()),
            Geometry::Voxels(s) => Some(s.to_trimesh()),
            Geometry::Ray(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use crate::math::{Matrix, Point, Real, Vector};
    use crate::shape::{Ball, Capsule, Cuboid, Cylinder, TriMesh, Voxels};
    use crate::transformation::utils::narrow_indices;

    fn closed_volume(vtx: Vec<Point<Real>>, idx: Vec<[u32; 3]>) -> Real {
        let idx = narrow_indices(&idx).unwrap();
        let mesh = TriMesh::new(vtx, idx).unwrap();
        assert!(mesh.topology().unwrap().is_closed());
        mesh.signed_volume()
    }

    #[test]
    fn tessellated_primitives_are_closed() {
        let (vtx, idx) = Cuboid::new(
            Point::new(1.0, 2.0, 3.0),
            Matrix::identity(),
            Vector::new(1.0, 2.0, 3.0),
        )
        .to_trimesh();
        assert_relative_eq!(closed_volume(vtx, idx), 48.0, epsilon = 1.0e-3);

        let (vtx, idx) = Ball::new(Point::origin(), 1.0).to_trimesh(32, 32);
        let vol = closed_volume(vtx, idx);
        assert!(vol > 3.9 && vol < 4.19);

        let (vtx, idx) = Cylinder::new(Point::origin(), Vector::x(), 1.0, 1.0).to_trimesh(32);
        let vol = closed_volume(vtx, idx);
        assert!(vol > 6.0 && vol < 6.29);

        let capsule = Capsule::new(Point::new(0.0, 0.0, -1.0), Point::new(0.0, 0.0, 1.0), 0.5);
        let (vtx, idx) = capsule.to_trimesh(32, 32);
        let vol = closed_volume(vtx, idx);
        assert!(vol > 0.9 * capsule.volume() && vol <= capsule.volume());
    }

    #[test]
    fn voxel_boundary_skips_shared_faces() {
        let voxels =
            Voxels::from_cells(Point::origin(), 1.0, [2, 1, 1], &[[0, 0, 0], [1, 0, 0]]).unwrap();
        let (vtx, idx) = voxels.to_trimesh();
        assert_eq!(idx.len(), 20);
        assert_relative_eq!(closed_volume(vtx, idx), 2.0, epsilon = 1.0e-4);
    }
}
