use num_derive::FromPrimitive;

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real};
use crate::shape::{Ball, Capsule, Cuboid, Cylinder, HeightField, Ray, TriMesh, Voxels};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
/// Enum representing the type of a shape.
pub enum ShapeType {
    /// A triangle mesh shape.
    TriMesh = 0,
    /// A heightfield shape.
    HeightField,
    /// A cylindrical shape.
    Cylinder,
    /// A capsule shape.
    Capsule,
    /// A ray (finite segment) shape.
    Ray,
    /// A ball shape.
    Ball,
    /// A box shape.
    Cuboid,
    /// A dense voxel grid.
    Voxels,
}

impl ShapeType {
    /// The shape type with the given raw discriminant.
    pub fn from_raw(raw: u32) -> Option<Self> {
        num::FromPrimitive::from_u32(raw)
    }
}

/// Error raised when a primitive shape has invalid dimensions.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// The primitive has a negative or non-finite dimension, or a degenerate axis.
    #[error("invalid {0:?} dimensions")]
    InvalidPrimitive(ShapeType),
}

/// The geometric payload of a shape.
#[derive(Clone, Debug)]
pub enum Geometry {
    /// A triangle mesh.
    TriMesh(TriMesh),
    /// A heightfield.
    HeightField(HeightField),
    /// A cylinder.
    Cylinder(Cylinder),
    /// A capsule.
    Capsule(Capsule),
    /// A ray.
    Ray(Ray),
    /// A ball.
    Ball(Ball),
    /// A box.
    Cuboid(Cuboid),
    /// A voxel grid.
    Voxels(Voxels),
}

impl Geometry {
    /// The type of this geometry.
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Geometry::TriMesh(_) => ShapeType::TriMesh,
            Geometry::HeightField(_) => ShapeType::HeightField,
            Geometry::Cylinder(_) => ShapeType::Cylinder,
            Geometry::Capsule(_) => ShapeType::Capsule,
            Geometry::Ray(_) => ShapeType::Ray,
            Geometry::Ball(_) => ShapeType::Ball,
            Geometry::Cuboid(_) => ShapeType::Cuboid,
            Geometry::Voxels(_) => ShapeType::Voxels,
        }
    }

    /// Checks the dimensions of primitive payloads.
    ///
    /// Meshes, heightfields and voxel grids are validated when they are built.
    pub fn validate(&self) -> Result<(), ShapeError> {
        let valid = match self {
            Geometry::TriMesh(_) | Geometry::HeightField(_) | Geometry::Voxels(_) => true,
            Geometry::Cylinder(s) => s.is_valid(),
            Geometry::Capsule(s) => s.is_valid(),
            Geometry::Ray(s) => s.is_valid(),
            Geometry::Ball(s) => s.is_valid(),
            Geometry::Cuboid(s) => s.is_valid(),
        };

        if valid {
            Ok(())
        } else {
            Err(ShapeError::InvalidPrimitive(self.shape_type()))
        }
    }

    /// The local-space bounding box of this geometry.
    pub fn local_aabb(&self) -> Aabb {
        match self {
            Geometry::TriMesh(s) => s.local_aabb(),
            Geometry::HeightField(s) => *s.aabb(),
            Geometry::Cylinder(s) => s.aabb(),
            Geometry::Capsule(s) => s.aabb(),
            Geometry::Ray(s) => s.aabb(),
            Geometry::Ball(s) => s.aabb(),
            Geometry::Cuboid(s) => s.aabb(),
            Geometry::Voxels(s) => s.aabb(),
        }
    }

    /// Is this geometry a triangle mesh without any triangle?
    pub fn is_empty(&self) -> bool {
        matches!(self, Geometry::TriMesh(m) if m.is_empty())
    }

    /// The triangle mesh, if this geometry is one.
    pub fn as_trimesh(&self) -> Option<&TriMesh> {
        match self {
            Geometry::TriMesh(m) => Some(m),
            _ => None,
        }
    }

    /// Is the point inside of this geometry?
    ///
    /// Meshes use the generalized winding number, so they should be closed. Rays and
    /// heightfields contain nothing.
    pub fn contains_local_point(&self, pt: &Point<Real>) -> bool {
        match self {
            Geometry::TriMesh(m) => crate::query::contains_point(m, pt),
            Geometry::HeightField(_) | Geometry::Ray(_) => false,
            Geometry::Cylinder(s) => s.contains_point(pt),
            Geometry::Capsule(s) => s.contains_point(pt),
            Geometry::Ball(s) => s.contains_point(pt),
            Geometry::Cuboid(s) => s.contains_point(pt),
            Geometry::Voxels(s) => s.contains_point(pt),
        }
    }
}
