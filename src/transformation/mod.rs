//! Transformation, editing and decomposition of meshes.

pub use self::boxification::{boxify, BoxificationError, BoxificationParameters};
pub use self::mesh_subtraction::{
    subtract_meshes, JunctionVertexFix, MeshSubtractionError, MeshUpdate, MeshUpdateLog,
    MeshUpdateLogError, MovedBox, RemovedTriangle, RemovedVertex, TriangleChange, TriangleSource,
    VertexChange,
};

pub mod boxification;
pub mod mesh_subtraction;
pub mod to_trimesh;
pub mod utils;
