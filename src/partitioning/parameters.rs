use crate::math::{Point, Real, Vector};

/// Error raised by invalid bounding-volume tree parameters.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum BvParametersError {
    /// The per-node triangle thresholds must be strictly positive.
    #[error("the per-node triangle thresholds must be strictly positive")]
    NonPositiveTriangleThreshold,
    /// The minimum per-node triangle count exceeds the maximum.
    #[error("the minimum per-node triangle count exceeds the maximum")]
    MinAboveMax,
    /// The AABB volume divisor must be strictly positive.
    #[error("the AABB volume divisor must be strictly positive")]
    NonPositiveVolumeDivisor,
    /// The voxel grid cell step must be strictly positive on every axis.
    #[error("the voxel grid cell step must be strictly positive on every axis")]
    NonPositiveCellStep,
    /// The voxel grid must have at least one cell along every axis.
    #[error("the voxel grid must have at least one cell along every axis")]
    EmptyGridSize,
}

/// Node-splitting policy of the bounding-volume tree builder.
///
/// When several tree flavors are requested, the builder keeps the one with the smallest
/// scaled volume. Axis-aligned flavors have their volume divided by `aabb_volume_divisor`,
/// so a divisor above one favors them.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingVolumeParameters {
    min_triangles_per_node: u32,
    max_triangles_per_node: u32,
    aabb_volume_divisor: Real,
}

impl Default for BoundingVolumeParameters {
    fn default() -> Self {
        Self {
            min_triangles_per_node: 2,
            max_triangles_per_node: 4,
            aabb_volume_divisor: 1.0,
        }
    }
}

impl BoundingVolumeParameters {
    /// Creates validated node-splitting parameters.
    pub fn new(
        min_triangles_per_node: u32,
        max_triangles_per_node: u32,
        aabb_volume_divisor: Real,
    ) -> Result<Self, BvParametersError> {
        let result = Self {
            min_triangles_per_node,
            max_triangles_per_node,
            aabb_volume_divisor,
        };
        result.validate()?;
        Ok(result)
    }

    /// Checks the invariants of these parameters.
    pub fn validate(&self) -> Result<(), BvParametersError> {
        if self.min_triangles_per_node == 0 || self.max_triangles_per_node == 0 {
            return Err(BvParametersError::NonPositiveTriangleThreshold);
        }

        if self.min_triangles_per_node > self.max_triangles_per_node {
            return Err(BvParametersError::MinAboveMax);
        }

        if !(self.aabb_volume_divisor > 0.0) {
            return Err(BvParametersError::NonPositiveVolumeDivisor);
        }

        Ok(())
    }

    /// The minimum number of triangles a node may be split into.
    pub fn min_triangles_per_node(&self) -> u32 {
        self.min_triangles_per_node
    }

    /// The number of triangles above which a node is split.
    pub fn max_triangles_per_node(&self) -> u32 {
        self.max_triangles_per_node
    }

    /// The divisor applied to the volume of axis-aligned candidates.
    pub fn aabb_volume_divisor(&self) -> Real {
        self.aabb_volume_divisor
    }
}

/// Parameters of a voxel-grid bounding-volume tree.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VoxelGridParameters {
    base: BoundingVolumeParameters,
    origin: Point<Real>,
    cell_step: Vector<Real>,
    grid_size: [u32; 3],
}

impl VoxelGridParameters {
    /// Creates validated voxel-grid parameters.
    pub fn new(
        base: BoundingVolumeParameters,
        origin: Point<Real>,
        cell_step: Vector<Real>,
        grid_size: [u32; 3],
    ) -> Result<Self, BvParametersError> {
        let result = Self {
            base,
            origin,
            cell_step,
            grid_size,
        };
        result.validate()?;
        Ok(result)
    }

    /// Checks the invariants of these parameters.
    pub fn validate(&self) -> Result<(), BvParametersError> {
        self.base.validate()?;

        if self.cell_step.iter().any(|s| !(*s > 0.0)) {
            return Err(BvParametersError::NonPositiveCellStep);
        }

        if self.grid_size.contains(&0) {
            return Err(BvParametersError::EmptyGridSize);
        }

        Ok(())
    }

    /// The generic node-splitting parameters.
    pub fn base(&self) -> &BoundingVolumeParameters {
        &self.base
    }

    /// The corner of the grid with the smallest coordinates.
    pub fn origin(&self) -> Point<Real> {
        self.origin
    }

    /// The size of a grid cell along each axis.
    pub fn cell_step(&self) -> Vector<Real> {
        self.cell_step
    }

    /// The number of cells along each axis.
    pub fn grid_size(&self) -> [u32; 3] {
        self.grid_size
    }
}

/// Construction parameters of a bounding-volume tree.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BvParameters {
    /// Generic node-splitting thresholds.
    Generic(BoundingVolumeParameters),
    /// A voxel grid with explicit placement.
    VoxelGrid(VoxelGridParameters),
}

impl Default for BvParameters {
    fn default() -> Self {
        BvParameters::Generic(BoundingVolumeParameters::default())
    }
}

impl From<BoundingVolumeParameters> for BvParameters {
    fn from(params: BoundingVolumeParameters) -> Self {
        BvParameters::Generic(params)
    }
}

impl From<VoxelGridParameters> for BvParameters {
    fn from(params: VoxelGridParameters) -> Self {
        BvParameters::VoxelGrid(params)
    }
}

impl BvParameters {
    /// The generic node-splitting parameters.
    pub fn base(&self) -> &BoundingVolumeParameters {
        match self {
            BvParameters::Generic(p) => p,
            BvParameters::VoxelGrid(p) => p.base(),
        }
    }

    /// The voxel-grid parameters, if any.
    pub fn voxel_grid(&self) -> Option<&VoxelGridParameters> {
        match self {
            BvParameters::Generic(_) => None,
            BvParameters::VoxelGrid(p) => Some(p),
        }
    }

    /// Checks the invariants of these parameters.
    pub fn validate(&self) -> Result<(), BvParametersError> {
        match self {
            BvParameters::Generic(p) => p.validate(),
            BvParameters::VoxelGrid(p) => p.validate(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{BoundingVolumeParameters, BvParametersError, VoxelGridParameters};
    use crate::math::{Point, Vector};

    #[test]
    fn parameters_validation() {
        assert_eq!(
            BoundingVolumeParameters::new(0, 4, 1.0),
            Err(BvParametersError::NonPositiveTriangleThreshold)
        );
        assert_eq!(
            BoundingVolumeParameters::new(5, 4, 1.0),
            Err(BvParametersError::MinAboveMax)
        );
        assert_eq!(
            BoundingVolumeParameters::new(2, 4, 0.0),
            Err(BvParametersError::NonPositiveVolumeDivisor)
        );
        let base = BoundingVolumeParameters::default();
        assert_eq!(
            VoxelGridParameters::new(base, Point::origin(), Vector::repeat(1.0), [4, 0, 4]),
            Err(BvParametersError::EmptyGridSize)
        );
        assert_eq!(
            VoxelGridParameters::new(base, Point::origin(), Vector::new(1.0, -1.0, 1.0), [1; 3]),
            Err(BvParametersError::NonPositiveCellStep)
        );
    }
}
