//! Bounding volumes.

pub use self::aabb::Aabb;
pub use self::bounding_volume::BoundingVolume;
pub use self::obb::Obb;

mod aabb;
mod bounding_volume;
mod obb;
