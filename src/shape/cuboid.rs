//! Oriented box shape.

use crate::bounding_volume::{Aabb, Obb};
use crate::math::{Matrix, Point, Pose, Real, Vector, DIM};

/// Shape of a box, with its own center and orientation in the shape's local frame.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Cuboid {
    /// The center of the box.
    pub center: Point<Real>,
    /// The rotation of the box. Its columns are the box axes.
    pub rotation: Matrix<Real>,
    /// The half-extents of the box along each of its axes.
    pub half_extents: Vector<Real>,
}

impl Cuboid {
    /// Creates a new box from its center, orientation and half-extents.
    #[inline]
    pub fn new(center: Point<Real>, rotation: Matrix<Real>, half_extents: Vector<Real>) -> Cuboid {
        Cuboid {
            center,
            rotation,
            half_extents,
        }
    }

    /// Creates a new axis-aligned box centered at the origin.
    #[inline]
    pub fn axis_aligned(half_extents: Vector<Real>) -> Cuboid {
        Self::new(Point::origin(), Matrix::identity(), half_extents)
    }

    /// Are all the half-extents of this box strictly positive and finite?
    pub fn is_valid(&self) -> bool {
        self.half_extents.iter().all(|e| *e > 0.0 && e.is_finite())
    }

    /// This box seen as an oriented bounding box.
    #[inline]
    pub fn obb(&self) -> Obb {
        Obb::new(self.center, self.rotation, self.half_extents)
    }

    /// This box after being transformed by `pose`.
    #[inline]
    pub fn transformed(&self, pose: &Pose) -> Self {
        let obb = self.obb().transformed(pose);
        Self::new(obb.center, obb.axes, obb.half_extents)
    }

    /// The local-space bounding box of this box.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        self.obb().aabb()
    }

    /// The interval covered by this box projected on `dir`.
    #[inline]
    pub fn project(&self, dir: &Vector<Real>) -> (Real, Real) {
        self.obb().project(dir)
    }

    /// Is `pt` inside of this box?
    #[inline]
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        self.obb().contains_point(pt)
    }

    /// The eight corners of this box.
    pub fn vertices(&self) -> [Point<Real>; 8] {
        self.obb().vertices()
    }

    /// The point of this box closest to `pt`, expressed in the same frame as `pt`.
    pub fn project_point(&self, pt: &Point<Real>) -> Point<Real> {
        let mut local = self.rotation.tr_mul(&(pt - self.center));
        for i in 0..DIM {
            local[i] = local[i].clamp(-self.half_extents[i], self.half_extents[i]);
        }
        self.center + self.rotation * local
    }

    /// The volume of this box.
    pub fn volume(&self) -> Real {
        self.half_extents.product() * 8.0
    }
}
