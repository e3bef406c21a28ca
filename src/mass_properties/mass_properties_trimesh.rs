use crate::mass_properties::MassProperties;
use crate::math::{Matrix, Point, Real, VertexIndex};
use crate::shape::TriMesh;
use num::Zero;

impl MassProperties {
    /// Computes the mass properties of a closed triangle mesh.
    ///
    /// Each triangle forms a tetrahedron with a common reference point, and the signed
    /// contributions of all these tetrahedra are integrated. Meshes with inward-facing
    /// triangles yield the same result as their outward-facing counterparts.
    pub fn from_trimesh(
        density: Real,
        vertices: &[Point<Real>],
        indices: &[[VertexIndex; 3]],
    ) -> MassProperties {
        let (volume, com) = trimesh_signed_volume_and_center_of_mass(vertices, indices);

        if volume.is_zero() {
            return MassProperties::zero();
        }

        let mut itot = Matrix::zeros();

        for t in indices {
            let p2 = &vertices[t[0] as usize];
            let p3 = &vertices[t[1] as usize];
            let p4 = &vertices[t[2] as usize];

            let vol = tetrahedron_signed_volume(&com, p2, p3, p4);
            let ipart = tetrahedron_unit_inertia_tensor_wrt_point(&com, &com, p2, p3, p4);

            itot += ipart * vol;
        }

        let sign = volume.signum();
        Self::with_inertia_matrix(com, volume * density * sign, itot * density * sign)
    }

    /// Computes the mass properties of a [`TriMesh`].
    pub fn from_mesh(density: Real, mesh: &TriMesh) -> MassProperties {
        Self::from_trimesh(density, mesh.vertices(), mesh.indices())
    }
}

fn tetrahedron_signed_volume(
    p1: &Point<Real>,
    p2: &Point<Real>,
    p3: &Point<Real>,
    p4: &Point<Real>,
) -> Real {
    (p2 - p1).cross(&(p3 - p1)).dot(&(p4 - p1)) / 6.0
}

/// Computes the unit inertia tensor of a tetrahedron, with regard to the given `point`.
pub fn tetrahedron_unit_inertia_tensor_wrt_point(
    point: &Point<Real>,
    p1: &Point<Real>,
    p2: &Point<Real>,
    p3: &Point<Real>,
    p4: &Point<Real>,
) -> Matrix<Real> {
    let p = [p1 - point, p2 - point, p3 - point, p4 - point];

    // Sum over all the vertex pairs `i <= j` of `u_i * v_j + u_j * v_i`.
    let product_sum = |u: usize, v: usize| {
        let mut sum = 0.0;
        for i in 0..4 {
            for j in i..4 {
                sum += p[i][u] * p[j][v] + p[j][u] * p[i][v];
            }
        }
        sum
    };

    let diag_x = product_sum(0, 0) * 0.5;
    let diag_y = product_sum(1, 1) * 0.5;
    let diag_z = product_sum(2, 2) * 0.5;

    let a0 = (diag_y + diag_z) * 0.1;
    let b0 = (diag_z + diag_x) * 0.1;
    let c0 = (diag_x + diag_y) * 0.1;

    let a1 = product_sum(1, 2) * 0.05;
    let b1 = product_sum(0, 2) * 0.05;
    let c1 = product_sum(0, 1) * 0.05;

    Matrix::new(a0, -c1, -b1, -c1, b0, -a1, -b1, -a1, c0)
}

/// Computes the volume and center-of-mass of a mesh.
pub fn trimesh_signed_volume_and_center_of_mass(
    vertices: &[Point<Real>],
    indices: &[[VertexIndex; 3]],
) -> (Real, Point<Real>) {
    if vertices.is_empty() {
        return (0.0, Point::origin());
    }

    let reference = crate::utils::center(vertices);
    let mut res = Point::origin();
    let mut vol = 0.0;

    for t in indices {
        let p2 = vertices[t[0] as usize];
        let p3 = vertices[t[1] as usize];
        let p4 = vertices[t[2] as usize];

        let volume = tetrahedron_signed_volume(&reference, &p2, &p3, &p4);
        let center = Point::from((reference.coords + p2.coords + p3.coords + p4.coords) / 4.0);

        res += center.coords * volume;
        vol += volume;
    }

    if vol.is_zero() {
        (vol, reference)
    } else {
        (vol, res / vol)
    }
}

#[cfg(test)]
mod test {
    use crate::mass_properties::MassProperties;
    use crate::math::{Point, Vector};
    use crate::shape::{Capsule, Cuboid, Geometry};
    use crate::transformation::to_trimesh::cuboid_mesh;
    use crate::transformation::utils::narrow_indices;

    #[test]
    fn cuboid_as_trimesh_mprops() {
        let half = Vector::new(1.0, 2.0, 3.0);
        let (mut vertices, indices) = cuboid_mesh(half);

        let mprops = MassProperties::from_trimesh(1.0, &vertices, &indices);
        let expected = MassProperties::from_cuboid(1.0, &Cuboid::axis_aligned(half));
        assert_relative_eq!(mprops.mass(), 48.0, epsilon = 1.0e-4);
        assert_relative_eq!(mprops, expected, epsilon = 1.0e-3);
        assert_relative_eq!(
            mprops.reconstruct_inertia_matrix().diagonal(),
            Vector::new(208.0, 160.0, 80.0),
            epsilon = 1.0e-3
        );

        // Check after shifting the trimesh off the origin.
        let shift = Vector::new(30.0, 20.0, 10.0);
        vertices.iter_mut().for_each(|pt| *pt += shift);
        let mprops = MassProperties::from_trimesh(1.0, &vertices, &indices);
        assert_relative_eq!(mprops.mass(), 48.0, epsilon = 1.0e-3);
        assert_relative_eq!(mprops.local_com, Point::from(shift), epsilon = 1.0e-3);
        assert_relative_eq!(
            mprops.reconstruct_inertia_matrix().diagonal(),
            Vector::new(208.0, 160.0, 80.0),
            epsilon = 1.0e-2
        );
    }

    #[test]
    fn inverted_mesh_has_the_same_mass() {
        let (vertices, indices) = cuboid_mesh(Vector::repeat(0.5));
        let flipped: Vec<_> = indices.iter().map(|t| [t[0], t[2], t[1]]).collect();
        let mprops = MassProperties::from_trimesh(2.0, &vertices, &flipped);
        assert_relative_eq!(mprops.mass(), 2.0, epsilon = 1.0e-5);
    }

    #[test]
    fn tessellated_capsule_is_close_to_the_analytic_one() {
        let capsule = Capsule::new(Point::new(-1.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0), 0.5);
        let (vtx, idx) = Geometry::Capsule(capsule).to_trimesh().unwrap();
        let idx = narrow_indices(&idx).unwrap();

        let analytic = MassProperties::from_capsule(1.0, &capsule);
        let tessellated = MassProperties::from_trimesh(1.0, &vtx, &idx);

        // The tessellation is inscribed in the capsule.
        assert!(tessellated.mass() < analytic.mass());
        assert_relative_eq!(tessellated.mass(), analytic.mass(), max_relative = 0.05);
        assert_relative_eq!(tessellated.local_com, analytic.local_com, epsilon = 1.0e-4);
        assert_relative_eq!(
            tessellated.reconstruct_inertia_matrix(),
            analytic.reconstruct_inertia_matrix(),
            max_relative = 0.1,
            epsilon = 1.0e-3
        );
    }
}
