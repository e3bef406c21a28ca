use crate::shape::MeshBuildError;

/// Errors that can occur when subtracting a shape from a triangle mesh.
#[derive(thiserror::Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum MeshSubtractionError {
    /// The edited shape is not a triangle mesh, or the subtracted shape does not enclose any
    /// volume (rays and heightfields).
    #[error("subtraction requires a triangle mesh minus a closed volume")]
    NotAMesh,
    /// The result would need more vertices than 16-bit indices can address.
    #[error("the resulting mesh would exceed 65535 vertices")]
    TooManyVertices,
    /// The resulting mesh could not be built.
    #[error("the resulting mesh could not be built: {0}")]
    MeshBuild(#[from] MeshBuildError),
}
