//! Spatial partitioning tools.

pub use self::bv_tree::{BvNode, BvTree, BvTreeKind};
pub use self::parameters::{
    BoundingVolumeParameters, BvParameters, BvParametersError, VoxelGridParameters,
};

mod bv_tree;
mod bv_tree_build;
mod bv_tree_traversal;
mod parameters;
