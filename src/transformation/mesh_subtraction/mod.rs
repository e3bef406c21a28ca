//! Boolean subtraction of a shape from a triangle mesh, with change tracking.

pub use self::mesh_subtraction::subtract_meshes;
pub use self::mesh_subtraction_error::MeshSubtractionError;
pub use self::mesh_update::{
    JunctionVertexFix, MeshUpdate, MeshUpdateLog, MeshUpdateLogError, MovedBox, RemovedTriangle,
    RemovedVertex, TriangleChange, TriangleSource, VertexChange,
};

mod mesh_subtraction;
mod mesh_subtraction_error;
mod mesh_update;
mod triangle_cut;
