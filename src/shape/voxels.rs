use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::{ShapeError, ShapeType};

/// A dense grid of cubic voxels.
///
/// The voxel `(i, j, k)` spans the box `origin + [i, j, k] * cell_size` to
/// `origin + [i + 1, j + 1, k + 1] * cell_size`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Voxels {
    origin: Point<Real>,
    cell_size: Real,
    dims: [u32; 3],
    occupied: Vec<bool>,
}

impl Voxels {
    /// Creates a voxel grid from its occupancy, stored with `i` varying fastest.
    pub fn new(
        origin: Point<Real>,
        cell_size: Real,
        dims: [u32; 3],
        occupied: Vec<bool>,
    ) -> Result<Self, ShapeError> {
        let len = dims.iter().map(|d| *d as usize).product::<usize>();
        if cell_size <= 0.0 || !cell_size.is_finite() || len == 0 || occupied.len() != len {
            return Err(ShapeError::InvalidPrimitive(ShapeType::Voxels));
        }

        Ok(Self {
            origin,
            cell_size,
            dims,
            occupied,
        })
    }

    /// Creates a voxel grid where every cell listed in `cells` is occupied.
    pub fn from_cells(
        origin: Point<Real>,
        cell_size: Real,
        dims: [u32; 3],
        cells: &[[u32; 3]],
    ) -> Result<Self, ShapeError> {
        let len = dims.iter().map(|d| *d as usize).product::<usize>();
        let mut occupied = vec![false; len];
        for cell in cells {
            if (0..3).any(|i| cell[i] >= dims[i]) {
                return Err(ShapeError::InvalidPrimitive(ShapeType::Voxels));
            }
            occupied[Self::linear_index_in(dims, *cell)] = true;
        }
        Self::new(origin, cell_size, dims, occupied)
    }

    fn linear_index_in(dims: [u32; 3], cell: [u32; 3]) -> usize {
        cell[0] as usize + dims[0] as usize * (cell[1] as usize + dims[1] as usize * cell[2] as usize)
    }

    /// The origin of the grid.
    pub fn origin(&self) -> Point<Real> {
        self.origin
    }

    /// The edge length of a voxel.
    pub fn cell_size(&self) -> Real {
        self.cell_size
    }

    /// The number of cells along each axis.
    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    /// Is the given cell occupied? Cells out of the grid are empty.
    pub fn is_occupied(&self, cell: [u32; 3]) -> bool {
        (0..3).all(|i| cell[i] < self.dims[i])
            && self.occupied[Self::linear_index_in(self.dims, cell)]
    }

    /// The bounding box of the given cell.
    pub fn cell_aabb(&self, cell: [u32; 3]) -> Aabb {
        let mins = self.origin
            + Vector::new(cell[0] as Real, cell[1] as Real, cell[2] as Real) * self.cell_size;
        Aabb::new(mins, mins + Vector::repeat(self.cell_size))
    }

    /// Iterates through the occupied cells with their linear index.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (u32, [u32; 3])> + '_ {
        let [nx, ny, _] = self.dims;
        self.occupied
            .iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .map(move |(id, _)| {
                let id = id as u32;
                (id, [id % nx, (id / nx) % ny, id / (nx * ny)])
            })
    }

    /// The number of occupied cells.
    pub fn num_occupied(&self) -> usize {
        self.occupied.iter().filter(|o| **o).count()
    }

    /// The bounding box of the whole grid.
    pub fn aabb(&self) -> Aabb {
        let extents = Vector::new(
            self.dims[0] as Real,
            self.dims[1] as Real,
            self.dims[2] as Real,
        ) * self.cell_size;
        Aabb::new(self.origin, self.origin + extents)
    }

    /// Is `pt` inside of an occupied cell?
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        let rel = (pt - self.origin) / self.cell_size;
        if rel.iter().any(|c| *c < 0.0) {
            return false;
        }
        self.is_occupied([rel.x as u32, rel.y as u32, rel.z as u32])
    }
}

#[cfg(test)]
mod test {
    use super::Voxels;
    use crate::math::Point;

    #[test]
    fn voxels_occupancy() {
        let vox =
            Voxels::from_cells(Point::origin(), 0.5, [2, 2, 2], &[[0, 0, 0], [1, 1, 1]]).unwrap();
        assert_eq!(vox.num_occupied(), 2);
        assert!(vox.is_occupied([1, 1, 1]));
        assert!(!vox.is_occupied([1, 0, 1]));
        assert!(!vox.is_occupied([5, 0, 0]));
        assert!(vox.contains_point(&Point::new(0.75, 0.75, 0.75)));
        let cells: Vec<_> = vox.occupied_cells().map(|(_, c)| c).collect();
        assert_eq!(cells, vec![[0, 0, 0], [1, 1, 1]]);
    }
}
