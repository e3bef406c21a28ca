use crate::bounding_volume::Aabb;
use crate::math::{Point, Pose, Real, Vector};

/// A ray shape: the segment starting at `origin` and ending at `origin + dir`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Ray {
    /// Starting point of the ray.
    pub origin: Point<Real>,
    /// Direction of the ray. Its length is the length of the ray.
    pub dir: Vector<Real>,
}

impl Ray {
    /// Creates a new ray starting from `origin` and with the direction `dir`.
    pub fn new(origin: Point<Real>, dir: Vector<Real>) -> Ray {
        Ray { origin, dir }
    }

    /// Is the direction of this ray non-zero and finite?
    pub fn is_valid(&self) -> bool {
        let len = self.dir.norm_squared();
        len > 0.0 && len.is_finite()
    }

    /// Computes the point at the given parameter on this ray.
    ///
    /// This is computed as `self.origin + self.dir * t`.
    #[inline]
    pub fn point_at(&self, t: Real) -> Point<Real> {
        self.origin + self.dir * t
    }

    /// The end point of this ray.
    #[inline]
    pub fn end(&self) -> Point<Real> {
        self.origin + self.dir
    }

    /// This ray after being transformed by `pose`.
    pub fn transformed(&self, pose: &Pose) -> Self {
        Self::new(
            pose.transform_point(&self.origin),
            pose.transform_vector(&self.dir),
        )
    }

    /// The local-space bounding box of this ray.
    pub fn aabb(&self) -> Aabb {
        let end = self.end();
        Aabb::new(self.origin.inf(&end), self.origin.sup(&end))
    }

    /// The interval covered by this ray projected on `dir`.
    pub fn project(&self, dir: &Vector<Real>) -> (Real, Real) {
        let a = self.origin.coords.dot(dir);
        let b = self.end().coords.dot(dir);
        (a.min(b), a.max(b))
    }
}
