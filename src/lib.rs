/*!
physgeom3d
==========

**physgeom3d** is a 3-dimensional physical-geometry kernel written with
the rust programming language.

It provides:
- collidable shapes (triangle meshes, height fields, voxel grids and a small
  set of analytic primitives) behind an atomically reference-counted handle,
- bounding-volume trees built over triangle meshes, with several tree flavors
  competing for the tightest fit,
- pairwise intersection queries producing point contacts, areal contacts and
  contact borders together with an unprojection vector,
- boolean mesh subtraction with a complete, forward-chained change log,
- boxification: covering a mesh volume with a small set of axis-aligned boxes,
- a registry of physical bodies binding shapes to surface mappings and mass
  properties.

*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![deny(non_upper_case_globals)]
#![deny(unused_results)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![allow(missing_copy_implementations)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::module_inception)]
#![allow(clippy::manual_range_contains)] // This usually makes it way more verbose that it could be.
#![allow(clippy::type_complexity)]

#[cfg(feature = "serde-serialize")]
#[macro_use]
extern crate serde;
#[macro_use]
extern crate approx;
extern crate num_traits as num;

pub extern crate nalgebra as na;

pub mod body;
pub mod bounding_volume;
pub mod mass_properties;
pub mod partitioning;
pub mod query;
pub mod shape;
pub mod transformation;
pub mod utils;

mod pose;

mod real {
    /// The scalar type used throughout this crate.
    #[cfg(feature = "f64")]
    pub use f64 as Real;

    /// The scalar type used throughout this crate.
    #[cfg(not(feature = "f64"))]
    pub use f32 as Real;
}

/// Compilation flags dependent aliases for mathematical types.
pub mod math {
    pub use super::pose::Pose;
    pub use super::real::*;
    pub use na::{Isometry3, Matrix3, Point3, Translation3, UnitVector3, Vector3};
    use na::UnitQuaternion;

    /// The default tolerance used for geometric operations.
    pub const DEFAULT_EPSILON: Real = Real::EPSILON;

    /// The value of pi.
    pub const PI: Real = core::f64::consts::PI as Real;

    /// The dimension of the space.
    pub const DIM: usize = 3;

    /// The point type.
    pub use Point3 as Point;

    /// The vector type.
    pub use Vector3 as Vector;

    /// The unit vector type.
    pub use UnitVector3 as UnitVector;

    /// The matrix type.
    pub use Matrix3 as Matrix;

    /// The transformation matrix type.
    pub use Isometry3 as Isometry;

    /// The rotation type.
    pub type Rotation<N> = UnitQuaternion<N>;

    /// The principal angular inertia of a rigid body.
    pub type PrincipalAngularInertia<N> = Vector3<N>;

    /// Index type of mesh vertices. Meshes are capped to `u16::MAX` vertices.
    pub type VertexIndex = u16;

    /// Maximum number of vertices a triangle mesh may hold.
    pub const MAX_MESH_VERTICES: usize = u16::MAX as usize;
}
