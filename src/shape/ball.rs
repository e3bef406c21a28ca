use crate::bounding_volume::Aabb;
use crate::math::{Point, Pose, Real, Vector, PI};

/// A Ball shape.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Ball {
    /// The center of the ball in the shape's local frame.
    pub center: Point<Real>,
    /// The radius of the ball.
    pub radius: Real,
}

impl Ball {
    /// Creates a new ball with the given center and radius.
    #[inline]
    pub fn new(center: Point<Real>, radius: Real) -> Ball {
        Ball { center, radius }
    }

    /// Is the radius of this ball strictly positive and finite?
    pub fn is_valid(&self) -> bool {
        self.radius > 0.0 && self.radius.is_finite()
    }

    /// This ball after being transformed by `pose`.
    #[inline]
    pub fn transformed(&self, pose: &Pose) -> Self {
        Self::new(pose.transform_point(&self.center), self.radius * pose.scale.abs())
    }

    /// The local-space bounding box of this ball.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::from_half_extents(self.center, Vector::repeat(self.radius))
    }

    /// The interval covered by this ball projected on `dir`.
    #[inline]
    pub fn project(&self, dir: &Vector<Real>) -> (Real, Real) {
        let c = self.center.coords.dot(dir);
        let r = self.radius * dir.norm();
        (c - r, c + r)
    }

    /// Is `pt` inside of this ball?
    #[inline]
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        na::distance_squared(&self.center, pt) <= self.radius * self.radius
    }

    /// The volume of this ball.
    pub fn volume(&self) -> Real {
        PI * self.radius * self.radius * self.radius * 4.0 / 3.0
    }
}
