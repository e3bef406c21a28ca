use crate::mass_properties::MassProperties;
use crate::math::{Matrix, Point, PrincipalAngularInertia, Real, Rotation, Vector};
use crate::shape::Cuboid;

impl MassProperties {
    pub(crate) fn cuboid_volume_unit_inertia(
        half_extents: Vector<Real>,
    ) -> (Real, PrincipalAngularInertia<Real>) {
        let volume = half_extents.x * half_extents.y * half_extents.z * 8.0;
        let ix = (half_extents.x * half_extents.x) / 3.0;
        let iy = (half_extents.y * half_extents.y) / 3.0;
        let iz = (half_extents.z * half_extents.z) / 3.0;

        (volume, Vector::new(iy + iz, ix + iz, ix + iy))
    }

    /// Computes the mass properties of a box given by its center, axes and half-extents.
    ///
    /// The columns of `axes` must be orthonormal and right-handed. They become the principal
    /// inertia frame.
    pub fn from_cuboid_parts(
        density: Real,
        center: Point<Real>,
        axes: Matrix<Real>,
        half_extents: Vector<Real>,
    ) -> Self {
        let (vol, unit_i) = Self::cuboid_volume_unit_inertia(half_extents);
        let mass = vol * density;
        let frame = Rotation::from_rotation_matrix(&na::Rotation3::from_matrix_unchecked(axes));
        Self::with_principal_inertia_frame(center, mass, unit_i * mass, frame)
    }

    /// Computes the mass properties of a cuboid.
    pub fn from_cuboid(density: Real, cuboid: &Cuboid) -> Self {
        Self::from_cuboid_parts(density, cuboid.center, cuboid.rotation, cuboid.half_extents)
    }
}
