use crate::mass_properties::MassProperties;
use crate::math::{Point, PrincipalAngularInertia, Real, Vector, PI};
use crate::shape::Ball;

impl MassProperties {
    pub(crate) fn ball_volume_unit_angular_inertia(
        radius: Real,
    ) -> (Real, PrincipalAngularInertia<Real>) {
        let volume = PI * radius * radius * radius * 4.0 / 3.0;
        let i = radius * radius * 2.0 / 5.0;

        (volume, Vector::repeat(i))
    }

    /// Computes the mass properties of a ball.
    ///
    /// The center of mass is the center of the ball and the angular inertia is the same along
    /// every axis: `2/5 * mass * radius²`.
    pub fn from_ball(density: Real, ball: &Ball) -> Self {
        let (vol, unit_i) = Self::ball_volume_unit_angular_inertia(ball.radius);
        let mass = vol * density;
        Self::new(ball.center, mass, unit_i * mass)
    }

    /// Computes the mass properties of a ball centered at the origin.
    pub fn from_radius(density: Real, radius: Real) -> Self {
        Self::from_ball(density, &Ball::new(Point::origin(), radius))
    }
}
