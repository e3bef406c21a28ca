//! Various unsorted geometrical and logical operators.

pub use self::basis::{dominant_axis, orthonormal_basis};
pub use self::cov::{center, center_cov};
pub(crate) use self::inv::inv;
pub use self::point_key::PointKey;
pub use self::segment::{closest_point_on_segment, closest_points_segment_segment};
pub use self::sorted_pair::SortedPair;
pub(crate) use self::spade::sanitize_spade_point;
pub use self::strided::{StridedPoints, StridedPointsError};

mod basis;
mod cov;
mod inv;
mod point_key;
mod segment;
mod sorted_pair;
mod spade;
mod strided;
