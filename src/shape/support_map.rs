//! Traits for support mapping based shapes.

use crate::math::{Point, Pose, Real, Vector, DEFAULT_EPSILON};
use crate::shape::{Ball, Capsule, Cuboid, Cylinder, Ray, Triangle};

/// Traits of convex shapes representable by a support mapping function.
pub trait SupportMap {
    /// Evaluates the support function of this shape.
    ///
    /// A support function is a function associating a vector to the shape point which maximizes
    /// their dot product.
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real>;

    /// Evaluates the support function of this shape transformed by `pose`.
    ///
    /// The scale of `pose` must be positive.
    fn support_point(&self, pose: &Pose, dir: &Vector<Real>) -> Point<Real> {
        let local_dir = pose.inverse_rotate_vector(dir);
        pose.transform_point(&self.local_support_point(&local_dir))
    }
}

impl SupportMap for Triangle {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        let d1 = self.a.coords.dot(dir);
        let d2 = self.b.coords.dot(dir);
        let d3 = self.c.coords.dot(dir);

        if d1 > d2 {
            if d1 > d3 {
                self.a
            } else {
                self.c
            }
        } else if d2 > d3 {
            self.b
        } else {
            self.c
        }
    }
}

impl SupportMap for Cuboid {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        let local_dir = self.rotation.tr_mul(dir);
        let local = local_dir.zip_map(&self.half_extents, |d, h| h.copysign(d));
        self.center + self.rotation * local
    }
}

impl SupportMap for Ball {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        match dir.try_normalize(DEFAULT_EPSILON) {
            Some(dir) => self.center + dir * self.radius,
            None => self.center,
        }
    }
}

impl SupportMap for Ray {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        if self.dir.dot(dir) > 0.0 {
            self.end()
        } else {
            self.origin
        }
    }
}

impl SupportMap for Capsule {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        let base = if (self.b - self.a).dot(dir) > 0.0 {
            self.b
        } else {
            self.a
        };

        match dir.try_normalize(DEFAULT_EPSILON) {
            Some(dir) => base + dir * self.radius,
            None => base,
        }
    }
}

impl SupportMap for Cylinder {
    #[inline]
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        let along = self.axis * self.half_height.copysign(self.axis.dot(dir));
        let radial = dir - self.axis * self.axis.dot(dir);
        let radial = match radial.try_normalize(DEFAULT_EPSILON) {
            Some(radial) => radial * self.radius,
            None => Vector::zeros(),
        };

        self.center + along + radial
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Matrix;

    #[test]
    fn cuboid_support_is_a_vertex() {
        let cuboid = Cuboid::new(
            Point::new(1.0, 0.0, 0.0),
            Matrix::identity(),
            Vector::new(1.0, 2.0, 3.0),
        );
        let pt = cuboid.local_support_point(&Vector::new(1.0, -1.0, 0.5));
        assert_relative_eq!(pt, Point::new(2.0, -2.0, 3.0));
    }

    #[test]
    fn cylinder_support_lies_on_rim() {
        let cylinder = Cylinder::new(Point::origin(), Vector::y(), 1.0, 2.0);
        let pt = cylinder.local_support_point(&Vector::new(1.0, 1.0, 0.0));
        assert_relative_eq!(pt, Point::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn transformed_support() {
        let ball = Ball::new(Point::origin(), 1.0);
        let pose = Pose::new(Matrix::identity(), Vector::new(0.0, 3.0, 0.0), 2.0);
        let pt = ball.support_point(&pose, &Vector::y());
        assert_relative_eq!(pt, Point::new(0.0, 5.0, 0.0));
    }
}
