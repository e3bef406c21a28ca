use crate::bounding_volume::Aabb;
use crate::math::{Point, Pose, Real, Vector, PI};

/// A capsule shape, i.e., the set of points at distance `radius` or less of a segment.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Capsule {
    /// The first endpoint of the capsule's principal segment.
    pub a: Point<Real>,
    /// The second endpoint of the capsule's principal segment.
    pub b: Point<Real>,
    /// The radius of the capsule.
    pub radius: Real,
}

impl Capsule {
    /// Creates a new capsule defined as the segment between `a` and `b` and with the given `radius`.
    pub fn new(a: Point<Real>, b: Point<Real>, radius: Real) -> Self {
        Self { a, b, radius }
    }

    /// Is the radius of this capsule strictly positive and finite?
    pub fn is_valid(&self) -> bool {
        self.radius > 0.0 && self.radius.is_finite() && (self.b - self.a).norm().is_finite()
    }

    /// The half-height of this capsule's principal segment.
    pub fn half_height(&self) -> Real {
        (self.b - self.a).norm() / 2.0
    }

    /// The center of this capsule.
    pub fn center(&self) -> Point<Real> {
        na::center(&self.a, &self.b)
    }

    /// This capsule after being transformed by `pose`.
    pub fn transformed(&self, pose: &Pose) -> Self {
        Self::new(
            pose.transform_point(&self.a),
            pose.transform_point(&self.b),
            self.radius * pose.scale.abs(),
        )
    }

    /// The local-space bounding box of this capsule.
    pub fn aabb(&self) -> Aabb {
        let mut aabb = Aabb::new(self.a.inf(&self.b), self.a.sup(&self.b));
        aabb.mins -= Vector::repeat(self.radius);
        aabb.maxs += Vector::repeat(self.radius);
        aabb
    }

    /// The interval covered by this capsule projected on `dir`.
    pub fn project(&self, dir: &Vector<Real>) -> (Real, Real) {
        let pa = self.a.coords.dot(dir);
        let pb = self.b.coords.dot(dir);
        let r = self.radius * dir.norm();
        (pa.min(pb) - r, pa.max(pb) + r)
    }

    /// Is `pt` inside of this capsule?
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        let closest = crate::utils::closest_point_on_segment(&self.a, &self.b, pt);
        na::distance_squared(&closest, pt) <= self.radius * self.radius
    }

    /// The volume of this capsule.
    pub fn volume(&self) -> Real {
        let r2 = self.radius * self.radius;
        PI * r2 * (self.half_height() * 2.0 + self.radius * 4.0 / 3.0)
    }
}
