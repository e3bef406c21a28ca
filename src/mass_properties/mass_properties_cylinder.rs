use crate::mass_properties::mass_properties::y_aligned_frame;
use crate::mass_properties::MassProperties;
use crate::math::{PrincipalAngularInertia, Real, Vector, PI};
use crate::shape::Cylinder;

impl MassProperties {
    pub(crate) fn cylinder_y_volume_unit_inertia(
        half_height: Real,
        radius: Real,
    ) -> (Real, PrincipalAngularInertia<Real>) {
        let volume = half_height * radius * radius * PI * 2.0;
        let sq_radius = radius * radius;
        let sq_height = half_height * half_height * 4.0;
        let off_principal = (sq_radius * 3.0 + sq_height) / 12.0;

        let inertia = Vector::new(off_principal, sq_radius / 2.0, off_principal);
        (volume, inertia)
    }

    /// Computes the mass properties of a cylinder.
    ///
    /// The spin axis of the principal inertia frame is the cylinder axis:
    /// `I = mass * radius² / 2` around it and `mass * (3 * radius² + height²) / 12` around
    /// the two others.
    pub fn from_cylinder(density: Real, cylinder: &Cylinder) -> Self {
        let (cyl_vol, cyl_unit_i) =
            Self::cylinder_y_volume_unit_inertia(cylinder.half_height, cylinder.radius);
        let cyl_mass = cyl_vol * density;

        Self::with_principal_inertia_frame(
            cylinder.center,
            cyl_mass,
            cyl_unit_i * cyl_mass,
            y_aligned_frame(&cylinder.axis),
        )
    }
}
