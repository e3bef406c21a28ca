use crate::math::{Matrix, Point, Real, Vector};
use core::ops::Mul;

/// A rigid transformation followed by a uniform scale.
///
/// Points are mapped as `rotation * (scale * p) + translation`. The rotation matrix is assumed
/// to be orthonormal.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Pose {
    /// The rotational part of this pose.
    pub rotation: Matrix<Real>,
    /// The translational part of this pose.
    pub translation: Vector<Real>,
    /// The uniform scale applied before the rotation.
    pub scale: Real,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// The identity pose.
    pub fn identity() -> Self {
        Self {
            rotation: Matrix::identity(),
            translation: Vector::zeros(),
            scale: 1.0,
        }
    }

    /// A pure translation.
    pub fn translation(translation: Vector<Real>) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Builds a pose from its components.
    pub fn new(rotation: Matrix<Real>, translation: Vector<Real>, scale: Real) -> Self {
        Self {
            rotation,
            translation,
            scale,
        }
    }

    /// Transforms a point.
    #[inline]
    pub fn transform_point(&self, pt: &Point<Real>) -> Point<Real> {
        Point::from(self.rotation * (pt.coords * self.scale) + self.translation)
    }

    /// Transforms a vector (scale and rotation, no translation).
    #[inline]
    pub fn transform_vector(&self, v: &Vector<Real>) -> Vector<Real> {
        self.rotation * (v * self.scale)
    }

    /// Rotates a vector, ignoring the scale. Used for directions and normals.
    #[inline]
    pub fn rotate_vector(&self, v: &Vector<Real>) -> Vector<Real> {
        self.rotation * v
    }

    /// Applies the inverse of this pose to a point.
    #[inline]
    pub fn inverse_transform_point(&self, pt: &Point<Real>) -> Point<Real> {
        Point::from(self.rotation.tr_mul(&(pt.coords - self.translation)) / self.scale)
    }

    /// Applies the inverse rotation of this pose to a direction.
    #[inline]
    pub fn inverse_rotate_vector(&self, v: &Vector<Real>) -> Vector<Real> {
        self.rotation.tr_mul(v)
    }

    /// The inverse of this pose.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        let inv_scale = crate::utils::inv(self.scale);
        Self {
            rotation,
            translation: -(rotation * self.translation) * inv_scale,
            scale: inv_scale,
        }
    }

    /// Computes `self.inverse() * rhs` without explicitly inverting `self`.
    pub fn inv_mul(&self, rhs: &Pose) -> Pose {
        self.inverse() * *rhs
    }
}

impl Mul<Pose> for Pose {
    type Output = Pose;

    fn mul(self, rhs: Pose) -> Pose {
        Pose {
            rotation: self.rotation * rhs.rotation,
            translation: self.translation + self.rotation * (rhs.translation * self.scale),
            scale: self.scale * rhs.scale,
        }
    }
}
