use crate::math::{Real, PI};

/// The largest accepted number of voxels along the longest side of a mesh.
pub const MAX_VOXEL_RESOLUTION: u32 = 4096;

/// Error returned by [`super::boxify`].
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoxificationError {
    /// Only triangle meshes can be boxified.
    #[error("only triangle meshes can be boxified")]
    NotAMesh,
    /// A parameter is out of its valid range.
    #[error("invalid boxification parameters")]
    InvalidParameters,
}

/// Parameters controlling the decomposition of a mesh volume into boxes.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BoxificationParameters {
    /// Triangles smaller than this area do not seed boxes.
    pub min_face_area: Real,
    /// Features thinner than this distance are smoothed away before growing boxes.
    pub distance_filter: Real,
    /// Number of voxels along the longest side of the mesh bounding box, at most
    /// [`MAX_VOXEL_RESOLUTION`].
    pub voxel_resolution: u32,
    /// Maximum angle, in radians, between a seeding triangle normal and its closest axis.
    pub max_face_tilt: Real,
    /// Fraction of the voxelized volume to cover before stopping.
    pub min_layer_filling: Real,
    /// Maximum fraction of a new layer of a growing box that may already be claimed by
    /// previous boxes.
    pub max_layer_reuse: Real,
    /// Voxel islands with at most this many connections between their cells are ignored.
    pub max_voxel_island_connections: Option<u32>,
}

impl Default for BoxificationParameters {
    fn default() -> Self {
        Self {
            min_face_area: 0.0,
            distance_filter: 0.0,
            voxel_resolution: 32,
            max_face_tilt: 10.0 * PI / 180.0,
            min_layer_filling: 0.9,
            max_layer_reuse: 0.1,
            max_voxel_island_connections: None,
        }
    }
}

impl BoxificationParameters {
    /// Checks that every parameter is within its valid range.
    pub fn validate(&self) -> Result<(), BoxificationError> {
        let fraction = |x: Real| (0.0..=1.0).contains(&x);
        let valid = (1..=MAX_VOXEL_RESOLUTION).contains(&self.voxel_resolution)
            && self.min_face_area >= 0.0
            && self.distance_filter >= 0.0
            && (0.0..=PI / 2.0).contains(&self.max_face_tilt)
            && fraction(self.min_layer_filling)
            && fraction(self.max_layer_reuse);

        if valid {
            Ok(())
        } else {
            Err(BoxificationError::InvalidParameters)
        }
    }
}
