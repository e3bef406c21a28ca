use crate::math::{Point, Real, Vector};
use crate::shape::Voxels;

impl Voxels {
    /// Computes an unoptimized mesh representation of this shape.
    ///
    /// Each free face of each voxel will result in two triangles. No effort is made to merge
    /// adjacent triangles on large flat areas, nor to share vertices between faces.
    pub fn to_trimesh(&self) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
        let dims = self.dims();
        let mut vtx = vec![];
        let mut idx = vec![];

        for (_, cell) in self.occupied_cells() {
            let mins = self.cell_aabb(cell).mins;

            for dim in 0..3 {
                for upper in [false, true] {
                    let mut neighbor = cell;
                    let free = if upper {
                        neighbor[dim] += 1;
                        neighbor[dim] >= dims[dim] || !self.is_occupied(neighbor)
                    } else {
                        cell[dim] == 0 || {
                            neighbor[dim] -= 1;
                            !self.is_occupied(neighbor)
                        }
                    };

                    if !free {
                        continue;
                    }

                    let size = self.cell_size();
                    let e1 = Vector::ith((dim + 1) % 3, size);
                    let e2 = Vector::ith((dim + 2) % 3, size);
                    let mut base = mins;
                    if upper {
                        base[dim] += size;
                    }

                    let base_id = vtx.len() as u32;
                    vtx.push(base);
                    vtx.push(base + e1);
                    vtx.push(base + e1 + e2);
                    vtx.push(base + e2);

                    if upper {
                        idx.push([base_id, base_id + 1, base_id + 2]);
                        idx.push([base_id, base_id + 2, base_id + 3]);
                    } else {
                        idx.push([base_id, base_id + 3, base_id + 2]);
                        idx.push([base_id, base_id + 2, base_id + 1]);
                    }
                }
            }
        }

        (vtx, idx)
    }
}
