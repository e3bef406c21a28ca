//! The Gilbert-Johnson-Keerthi distance algorithm.

pub use self::cso_point::CsoPoint;
pub use self::gjk::{closest_points, GjkResult};

mod cso_point;
mod gjk;
