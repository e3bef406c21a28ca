//! Mass properties (mass, inertia, center-of-mass) of shapes.

pub use self::mass_properties::MassProperties;

use crate::math::Real;
use crate::shape::Geometry;
use num::Zero;

mod mass_properties;
mod mass_properties_ball;
mod mass_properties_capsule;
mod mass_properties_cuboid;
mod mass_properties_cylinder;
mod mass_properties_trimesh;
mod mass_properties_voxels;

/// Free functions for some special-cases of mass-properties computation.
pub mod details {
    pub use super::mass_properties_trimesh::{
        tetrahedron_unit_inertia_tensor_wrt_point, trimesh_signed_volume_and_center_of_mass,
    };
}

impl MassProperties {
    /// Computes the mass properties of any geometry with the given uniform density.
    ///
    /// Heightfields and rays have no volume, so their mass properties are zero. Meshes are
    /// assumed to be closed.
    pub fn from_geometry(geometry: &Geometry, density: Real) -> Self {
        match geometry {
            Geometry::TriMesh(m) => Self::from_mesh(density, m),
            Geometry::HeightField(_) | Geometry::Ray(_) => Self::zero(),
            Geometry::Cylinder(s) => Self::from_cylinder(density, s),
            Geometry::Capsule(s) => Self::from_capsule(density, s),
            Geometry::Ball(s) => Self::from_ball(density, s),
            Geometry::Cuboid(s) => Self::from_cuboid(density, s),
            Geometry::Voxels(s) => Self::from_voxels(density, s),
        }
    }
}

impl Geometry {
    /// Computes the mass properties of this geometry with the given uniform density.
    pub fn mass_properties(&self, density: Real) -> MassProperties {
        MassProperties::from_geometry(self, density)
    }
}

#[cfg(test)]
mod test {
    use super::MassProperties;
    use crate::math::{Matrix, Point, Vector, PI};
    use crate::shape::{Ball, Cuboid, Cylinder, Geometry, Ray, Voxels};
    use num::Zero;

    #[test]
    fn ball_mprops() {
        let ball = Geometry::Ball(Ball::new(Point::new(1.0, 2.0, 3.0), 2.0));
        let mprops = ball.mass_properties(3.0);
        let mass = PI * 8.0 * 4.0 / 3.0 * 3.0;
        assert_relative_eq!(mprops.mass(), mass, max_relative = 1.0e-5);
        assert_eq!(mprops.local_com, Point::new(1.0, 2.0, 3.0));
        assert_relative_eq!(
            mprops.principal_inertia(),
            Vector::repeat(mass * 4.0 * 2.0 / 5.0),
            max_relative = 1.0e-5
        );
    }

    #[test]
    fn cylinder_spins_around_its_axis() {
        let cylinder = Cylinder::new(Point::origin(), Vector::x(), 1.0, 0.5);
        let mprops = MassProperties::from_cylinder(1.0, &cylinder);
        let mass = PI * 0.25 * 2.0;
        let inertia = mprops.reconstruct_inertia_matrix();

        assert_relative_eq!(mprops.mass(), mass, max_relative = 1.0e-5);
        assert_relative_eq!(inertia[(0, 0)], mass * 0.25 / 2.0, max_relative = 1.0e-4);
        let tip = mass * (0.25 * 3.0 + 4.0) / 12.0;
        assert_relative_eq!(inertia[(1, 1)], tip, max_relative = 1.0e-4);
        assert_relative_eq!(inertia[(2, 2)], tip, max_relative = 1.0e-4);
    }

    #[test]
    fn voxels_match_the_equivalent_box() {
        let cells = [[0, 0, 0], [1, 0, 0], [0, 1, 0], [1, 1, 0]];
        let voxels = Voxels::from_cells(Point::origin(), 0.5, [2, 2, 1], &cells).unwrap();
        let mprops = MassProperties::from_voxels(2.0, &voxels);

        let cuboid = Cuboid::new(
            Point::new(0.5, 0.5, 0.25),
            Matrix::identity(),
            Vector::new(0.5, 0.5, 0.25),
        );
        let expected = MassProperties::from_cuboid(2.0, &cuboid);
        assert_relative_eq!(mprops, expected, epsilon = 1.0e-5);
    }

    #[test]
    fn surfaces_have_no_mass() {
        let ray = Geometry::Ray(Ray::new(Point::origin(), Vector::x()));
        assert!(ray.mass_properties(1.0).is_zero());

        let voxels = Voxels::from_cells(Point::origin(), 1.0, [2, 2, 2], &[]).unwrap();
        assert!(MassProperties::from_voxels(1.0, &voxels).is_zero());
    }
}
