//! Intersection queries between placed shapes.
//!
//! The entry point is [`intersect`]: both shapes are split into convex leaves (triangles,
//! boxes, dilated points and segments) pruned by their bounding volumes, leaf pairs are
//! tested exactly, and the resulting point contacts are merged into areal contacts with
//! their borders. Each contact carries the unprojection separating the first shape from
//! the second one.

pub use self::contact::{with_local_contacts, Contact, ContactArea, ContactBorder, ContactBuffer, PrimitiveRef};
pub use self::contains_point::{contains_point, triangles_winding_number, winding_number};
pub use self::intersect::intersect;
pub use self::leaf::{leaf_contact, triangle_triangle_segment, Leaf, LeafContact, Polytope};
pub use self::parameters::{IntersectionFlags, IntersectionParameters, UnprojectionMode};
pub use self::triangle_crossing::{
    crossing_tolerance, triangle_crossing, TriangleCrossing, TriangleCrossingPoint,
};
pub use self::world_data::WorldData;

mod contact;
mod contact_area;
mod contains_point;
pub mod gjk;
mod intersect;
mod leaf;
mod parameters;
mod triangle_crossing;
pub mod sat;
mod world_data;
