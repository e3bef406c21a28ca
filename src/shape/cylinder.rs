//! Support mapping based Cylinder shape.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Pose, Real, Vector, PI};

/// Cylinder shape with its principal axis stored in the shape's local frame.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Cylinder {
    /// The center of the cylinder.
    pub center: Point<Real>,
    /// The unit direction of the cylinder's principal axis.
    pub axis: Vector<Real>,
    /// The half height of the cylinder.
    pub half_height: Real,
    /// The radius of the cylinder.
    pub radius: Real,
}

impl Cylinder {
    /// Creates a new cylinder. The `axis` is normalized.
    pub fn new(center: Point<Real>, axis: Vector<Real>, half_height: Real, radius: Real) -> Self {
        Self {
            center,
            axis: axis.try_normalize(0.0).unwrap_or_else(Vector::zeros),
            half_height,
            radius,
        }
    }

    /// Are the dimensions of this cylinder strictly positive, and is its axis non-zero?
    pub fn is_valid(&self) -> bool {
        self.half_height > 0.0
            && self.radius > 0.0
            && self.half_height.is_finite()
            && self.radius.is_finite()
            && self.axis.norm_squared() > 0.0
    }

    /// The two centers of the cylinder caps.
    pub fn caps(&self) -> [Point<Real>; 2] {
        [
            self.center - self.axis * self.half_height,
            self.center + self.axis * self.half_height,
        ]
    }

    /// This cylinder after being transformed by `pose`.
    pub fn transformed(&self, pose: &Pose) -> Self {
        Self {
            center: pose.transform_point(&self.center),
            axis: pose.rotate_vector(&self.axis),
            half_height: self.half_height * pose.scale.abs(),
            radius: self.radius * pose.scale.abs(),
        }
    }

    /// The local-space bounding box of this cylinder.
    pub fn aabb(&self) -> Aabb {
        let mut half = self.axis.abs() * self.half_height;
        for i in 0..3 {
            half[i] += self.radius * (1.0 - self.axis[i] * self.axis[i]).max(0.0).sqrt();
        }
        Aabb::from_half_extents(self.center, half)
    }

    /// The interval covered by this cylinder projected on `dir`.
    pub fn project(&self, dir: &Vector<Real>) -> (Real, Real) {
        let c = self.center.coords.dot(dir);
        let along = self.axis.dot(dir);
        let ortho = (dir.norm_squared() - along * along).max(0.0).sqrt();
        let r = along.abs() * self.half_height + ortho * self.radius;
        (c - r, c + r)
    }

    /// Is `pt` inside of this cylinder?
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        let dpt = pt - self.center;
        let h = dpt.dot(&self.axis);
        let radial = dpt - self.axis * h;
        h.abs() <= self.half_height && radial.norm_squared() <= self.radius * self.radius
    }

    /// The volume of this cylinder.
    pub fn volume(&self) -> Real {
        PI * self.radius * self.radius * self.half_height * 2.0
    }
}
