use crate::mass_properties::mass_properties::y_aligned_frame;
use crate::mass_properties::MassProperties;
use crate::math::{Real, Vector, DEFAULT_EPSILON};
use crate::shape::Capsule;

impl MassProperties {
    /// Computes the mass properties of a capsule.
    ///
    /// The two hemispherical caps are accounted for as one ball, shifted away from the center
    /// along the capsule axis.
    pub fn from_capsule(density: Real, capsule: &Capsule) -> Self {
        let radius = capsule.radius;
        let half_height = capsule.half_height();
        let (cyl_vol, cyl_unit_i) = Self::cylinder_y_volume_unit_inertia(half_height, radius);
        let (ball_vol, ball_unit_i) = Self::ball_volume_unit_angular_inertia(radius);
        let cap_vol = cyl_vol + ball_vol;
        let cap_mass = cap_vol * density;
        let mut cap_i = (cyl_unit_i * cyl_vol + ball_unit_i * ball_vol) * density;

        let h = half_height * 2.0;
        let extra = (h * h * 0.25 + h * radius * 3.0 / 8.0) * ball_vol * density;
        cap_i.x += extra;
        cap_i.z += extra;

        let axis = (capsule.b - capsule.a)
            .try_normalize(DEFAULT_EPSILON)
            .unwrap_or_else(Vector::y);
        Self::with_principal_inertia_frame(capsule.center(), cap_mass, cap_i, y_aligned_frame(&axis))
    }
}
