use crate::math::{Point, Real, PI};
use crate::shape::{TriMesh, Triangle};

/// The generalized winding number of `mesh` around `pt`.
///
/// It is `1` inside of a closed mesh with outward normals, `0` outside of it, and varies
/// smoothly around holes of open meshes.
pub fn winding_number(mesh: &TriMesh, pt: &Point<Real>) -> Real {
    triangles_winding_number(mesh.triangles(), pt)
}

/// The generalized winding number of a triangle soup around `pt`.
pub fn triangles_winding_number(
    triangles: impl IntoIterator<Item = Triangle>,
    pt: &Point<Real>,
) -> Real {
    let mut total = 0.0;

    for tri in triangles {
        let a = tri.a - pt;
        let b = tri.b - pt;
        let c = tri.c - pt;
        let (la, lb, lc) = (a.norm(), b.norm(), c.norm());

        // Solid angle of the triangle, from Van Oosterom and Strackee.
        let numer = a.dot(&b.cross(&c));
        let denom = la * lb * lc + a.dot(&b) * lc + b.dot(&c) * la + c.dot(&a) * lb;
        total += 2.0 * numer.atan2(denom);
    }

    total / (4.0 * PI)
}

/// Is `pt` inside of the closed triangle mesh `mesh`?
///
/// Points whose winding number exceeds one half are inside.
pub fn contains_point(mesh: &TriMesh, pt: &Point<Real>) -> bool {
    mesh.local_aabb().contains_local_point(pt) && winding_number(mesh, pt) > 0.5
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Vector;
    use crate::transformation::to_trimesh::cuboid_mesh;

    #[test]
    fn cube_winding_numbers() {
        let (vtx, idx) = cuboid_mesh(Vector::repeat(1.0));
        let mesh = TriMesh::new(vtx, idx).unwrap();

        assert_relative_eq!(winding_number(&mesh, &Point::origin()), 1.0, epsilon = 1.0e-4);
        assert_relative_eq!(
            winding_number(&mesh, &Point::new(3.0, 0.2, 0.1)),
            0.0,
            epsilon = 1.0e-4
        );
        assert!(contains_point(&mesh, &Point::new(0.9, -0.9, 0.5)));
        assert!(!contains_point(&mesh, &Point::new(1.1, 0.0, 0.0)));
    }
}
