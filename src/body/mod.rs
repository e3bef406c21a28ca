//! Physical bodies: shapes bound to surface mappings and mass properties.
//!
//! A [`PhysicalBody`] is created once per distinct `(shape, surface, material mapping)`
//! combination by a [`PhysicalBodyRegistry`], and shared by everything that wants that mass
//! distribution through a reference-counted [`BodyHandle`].

pub use self::body_registry::{BodyHandle, InvalidHandle, PhysicalBodyRegistry, BODY_DENSITY};
pub use self::physical_body::PhysicalBody;

mod body_registry;
mod physical_body;
