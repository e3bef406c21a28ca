//! Decomposition of the volume of a mesh into a small set of axis-aligned boxes.

pub use self::boxify::boxify;
pub use self::parameters::{BoxificationError, BoxificationParameters, MAX_VOXEL_RESOLUTION};

mod boxify;
mod parameters;
mod voxel_grid;
