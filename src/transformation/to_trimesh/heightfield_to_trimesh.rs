use crate::math::{Point, Real};
use crate::shape::HeightField;

impl HeightField {
    /// Discretize this heightfield as a triangle-mesh sharing vertices between adjacent cells.
    pub fn to_trimesh(&self) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        let nrows = self.nrows();
        let ncols = self.ncols();
        let mut vertices = Vec::with_capacity((nrows + 1) * (ncols + 1));
        let mut indices = Vec::with_capacity(self.num_triangles());

        for j in 0..=ncols {
            for i in 0..=nrows {
                vertices.push(self.vertex(i, j));
            }
        }

        let id = |i: usize, j: usize| (i + j * (nrows + 1)) as u32;

        for j in 0..ncols {
            for i in 0..nrows {
                indices.push([id(i, j), id(i + 1, j), id(i, j + 1)]);
                indices.push([id(i + 1, j), id(i + 1, j + 1), id(i, j + 1)]);
            }
        }

        (vertices, indices)
    }
}
