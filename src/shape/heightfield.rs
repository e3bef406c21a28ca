use na::DMatrix;

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector};
use crate::shape::{ShapeError, ShapeType, Triangle};

/// A heightfield: a regular grid of heights along the local `y` axis.
///
/// The grid spans `[-scale.x / 2, scale.x / 2]` along `x` and `[-scale.z / 2, scale.z / 2]`
/// along `z`. Heights are multiplied by `scale.y`. Row `i` of the height matrix is along `z`,
/// column `j` along `x`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    heights: DMatrix<Real>,
    scale: Vector<Real>,
    aabb: Aabb,
}

impl HeightField {
    /// Initializes a new heightfield with the given heights and scaling factor.
    ///
    /// The height matrix needs at least two rows and two columns.
    pub fn new(heights: DMatrix<Real>, scale: Vector<Real>) -> Result<Self, ShapeError> {
        if heights.nrows() < 2
            || heights.ncols() < 2
            || scale.iter().any(|s| *s <= 0.0 || !s.is_finite())
            || heights.iter().any(|h| !h.is_finite())
        {
            return Err(ShapeError::InvalidPrimitive(ShapeType::HeightField));
        }

        let max = heights.max();
        let min = heights.min();
        let hscale = scale * 0.5;
        let aabb = Aabb::new(
            Point::new(-hscale.x, min * scale.y, -hscale.z),
            Point::new(hscale.x, max * scale.y, hscale.z),
        );

        Ok(HeightField {
            heights,
            scale,
            aabb,
        })
    }

    /// The number of cell rows of this heightfield.
    pub fn nrows(&self) -> usize {
        self.heights.nrows() - 1
    }

    /// The number of cell columns of this heightfield.
    pub fn ncols(&self) -> usize {
        self.heights.ncols() - 1
    }

    /// The number of triangles of this heightfield.
    pub fn num_triangles(&self) -> usize {
        self.nrows() * self.ncols() * 2
    }

    /// The heights of this heightfield.
    pub fn heights(&self) -> &DMatrix<Real> {
        &self.heights
    }

    /// The scale factor applied to this heightfield.
    pub fn scale(&self) -> &Vector<Real> {
        &self.scale
    }

    /// The local-space bounding box of this heightfield.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// The width of a single cell of this heightfield, without scaling.
    pub fn unit_cell_width(&self) -> Real {
        1.0 / (self.ncols() as Real)
    }

    /// The height of a single cell of this heightfield, without scaling.
    pub fn unit_cell_height(&self) -> Real {
        1.0 / (self.nrows() as Real)
    }

    pub(crate) fn vertex(&self, i: usize, j: usize) -> Point<Real> {
        let x = -0.5 + self.unit_cell_width() * (j as Real);
        let z = -0.5 + self.unit_cell_height() * (i as Real);
        let y = self.heights[(i, j)];
        Point::from(Vector::new(x, y, z).component_mul(&self.scale))
    }

    /// The two triangles at the cell (i, j) of this heightfield.
    ///
    /// Their identifiers are `2 * (i + j * nrows)` and `2 * (i + j * nrows) + 1`.
    pub fn triangles_at(&self, i: usize, j: usize) -> Option<[Triangle; 2]> {
        if i >= self.nrows() || j >= self.ncols() {
            return None;
        }

        let p00 = self.vertex(i, j);
        let p10 = self.vertex(i + 1, j);
        let p01 = self.vertex(i, j + 1);
        let p11 = self.vertex(i + 1, j + 1);

        Some([Triangle::new(p00, p10, p01), Triangle::new(p10, p11, p01)])
    }

    /// The triangle with the given identifier.
    pub fn triangle_at_id(&self, id: u32) -> Option<Triangle> {
        let cell = id as usize / 2;
        let tris = self.triangles_at(cell % self.nrows(), cell / self.nrows())?;
        Some(tris[id as usize % 2])
    }

    /// Iterates through all the triangles of this heightfield, with their identifiers.
    pub fn triangles(&self) -> impl Iterator<Item = (u32, Triangle)> + '_ {
        (0..self.num_triangles() as u32)
            .filter_map(move |id| self.triangle_at_id(id).map(|tri| (id, tri)))
    }

    fn quantize_floor(&self, val: Real, cell_size: Real, num_cells: usize) -> usize {
        let i = ((val + 0.5) / cell_size).floor();
        (i.max(0.0) as usize).min(num_cells - 1)
    }

    fn quantize_ceil(&self, val: Real, cell_size: Real, num_cells: usize) -> usize {
        let i = ((val + 0.5) / cell_size).ceil();
        (i.max(0.0) as usize).min(num_cells)
    }

    /// Applies the function `f` to all the triangles of this heightfield intersecting the given Aabb.
    pub fn map_elements_in_local_aabb(&self, aabb: &Aabb, f: &mut impl FnMut(u32, &Triangle)) {
        let ncells_x = self.ncols();
        let ncells_z = self.nrows();

        let ref_mins = aabb.mins.coords.component_div(&self.scale);
        let ref_maxs = aabb.maxs.coords.component_div(&self.scale);

        if ref_maxs.x <= -0.5 || ref_maxs.z <= -0.5 || ref_mins.x >= 0.5 || ref_mins.z >= 0.5 {
            // Outside of the heightfield bounds.
            return;
        }

        let min_x = self.quantize_floor(ref_mins.x, self.unit_cell_width(), ncells_x);
        let min_z = self.quantize_floor(ref_mins.z, self.unit_cell_height(), ncells_z);
        let max_x = self.quantize_ceil(ref_maxs.x, self.unit_cell_width(), ncells_x);
        let max_z = self.quantize_ceil(ref_maxs.z, self.unit_cell_height(), ncells_z);

        for j in min_x..max_x {
            for i in min_z..max_z {
                let y00 = self.heights[(i, j)];
                let y10 = self.heights[(i + 1, j)];
                let y01 = self.heights[(i, j + 1)];
                let y11 = self.heights[(i + 1, j + 1)];

                if (y00 > ref_maxs.y && y10 > ref_maxs.y && y01 > ref_maxs.y && y11 > ref_maxs.y)
                    || (y00 < ref_mins.y
                        && y10 < ref_mins.y
                        && y01 < ref_mins.y
                        && y11 < ref_mins.y)
                {
                    continue;
                }

                if let Some(tris) = self.triangles_at(i, j) {
                    let id = ((i + j * ncells_z) * 2) as u32;
                    f(id, &tris[0]);
                    f(id + 1, &tris[1]);
                }
            }
        }
    }
}
