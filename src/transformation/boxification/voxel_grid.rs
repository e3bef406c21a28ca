use crate::bounding_volume::{Aabb, Obb};
use crate::math::{Point, Real, Vector};
use crate::shape::TriMesh;

/// The largest number of cells a grid may hold.
const MAX_VOXELS: usize = 1 << 24;

const NEIGHBORS: [(usize, i32); 6] = [(0, -1), (0, 1), (1, -1), (1, 1), (2, -1), (2, 1)];

/// A dense occupancy grid fitted to the bounding box of a mesh.
///
/// Cells may be anisotropic so the grid matches the box exactly.
#[derive(Clone, Debug)]
pub(super) struct VoxelGrid {
    origin: Point<Real>,
    cell: Vector<Real>,
    dims: [u32; 3],
    filled: Vec<bool>,
}

impl VoxelGrid {
    /// Voxelizes the volume enclosed by `mesh`, with `resolution` cells along the longest side
    /// of its bounding box.
    ///
    /// A cell is filled if its center is inside the mesh. Each row of cells along `x` is
    /// classified by a single ray, counting signed crossings of the surface.
    ///
    /// Returns `None` if the grid would exceed `MAX_VOXELS` cells.
    pub fn voxelize(mesh: &TriMesh, resolution: u32) -> Option<Self> {
        let aabb = mesh.local_aabb();
        let extents = aabb.extents();
        let step = extents.max() / resolution as Real;

        if step <= 0.0 || !step.is_finite() {
            return Some(Self {
                origin: aabb.mins,
                cell: Vector::repeat(1.0),
                dims: [1; 3],
                filled: vec![false],
            });
        }

        let dims = [0, 1, 2].map(|i| ((extents[i] / step).round() as u32).max(1));
        let num_cells = dims
            .iter()
            .try_fold(1usize, |n, d| n.checked_mul(*d as usize))
            .filter(|n| *n <= MAX_VOXELS)?;
        let cell = Vector::from_fn(|i, _| {
            if extents[i] > 0.0 {
                extents[i] / dims[i] as Real
            } else {
                step
            }
        });

        let mut grid = Self {
            origin: aabb.mins,
            cell,
            dims,
            filled: vec![false; num_cells],
        };

        let triangles: Vec<_> = mesh
            .triangles()
            .map(|tri| (tri, tri.aabb(), tri.scaled_normal()))
            .collect();
        let ray_dir = Vector::x() * (extents.x + 2.0 * step);
        let tolerance = cell.x * 1.0e-3;
        let mut hits: Vec<(Real, Real)> = vec![];

        for k in 0..dims[2] {
            for j in 0..dims[1] {
                let y = grid.origin.y + (j as Real + 0.5) * cell.y;
                let z = grid.origin.z + (k as Real + 0.5) * cell.z;
                let start = Point::new(aabb.mins.x - step, y, z);
                hits.clear();

                for (tri, tri_aabb, normal) in &triangles {
                    if y < tri_aabb.mins.y
                        || y > tri_aabb.maxs.y
                        || z < tri_aabb.mins.z
                        || z > tri_aabb.maxs.z
                        || normal.x == 0.0
                    {
                        continue;
                    }

                    if let Some(t) = tri.intersect_segment(&start, &ray_dir) {
                        hits.push((start.x + ray_dir.x * t, normal.x.signum()));
                    }
                }

                hits.sort_by(|a, b| a.0.total_cmp(&b.0));
                // A ray through a shared edge hits both triangles.
                hits.dedup_by(|b, a| (b.0 - a.0).abs() <= tolerance && a.1 == b.1);

                let mut depth = 0i32;
                let mut next_hit = 0;

                for i in 0..dims[0] {
                    let x = grid.origin.x + (i as Real + 0.5) * cell.x;
                    while next_hit < hits.len() && hits[next_hit].0 <= x {
                        depth += if hits[next_hit].1 < 0.0 { 1 } else { -1 };
                        next_hit += 1;
                    }

                    if depth > 0 {
                        let id = grid.index([i, j, k]);
                        grid.filled[id] = true;
                    }
                }
            }
        }

        Some(grid)
    }

    pub fn dims(&self) -> [u32; 3] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.filled.len()
    }

    pub fn index(&self, cell: [u32; 3]) -> usize {
        let [nx, ny, _] = self.dims;
        cell[0] as usize + nx as usize * (cell[1] as usize + ny as usize * cell[2] as usize)
    }

    fn cell_from_index(&self, id: usize) -> [u32; 3] {
        let [nx, ny, _] = self.dims.map(|d| d as usize);
        [id % nx, (id / nx) % ny, id / (nx * ny)].map(|c| c as u32)
    }

    pub fn is_filled(&self, cell: [u32; 3]) -> bool {
        (0..3).all(|i| cell[i] < self.dims[i]) && self.filled[self.index(cell)]
    }

    pub fn num_filled(&self) -> usize {
        self.filled.iter().filter(|f| **f).count()
    }

    pub fn min_cell_size(&self) -> Real {
        self.cell.min()
    }

    /// The filled cells, in storage order.
    pub fn filled_cells(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.filled
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(id, _)| self.cell_from_index(id))
    }

    /// The cell containing `pt`, if it is in the grid.
    pub fn cell_at(&self, pt: &Point<Real>) -> Option<[u32; 3]> {
        let rel = (pt - self.origin).component_div(&self.cell);
        let mut cell = [0; 3];

        for i in 0..3 {
            if rel[i] < 0.0 || rel[i] >= self.dims[i] as Real {
                return None;
            }
            cell[i] = rel[i] as u32;
        }

        Some(cell)
    }

    fn neighbor(&self, cell: [u32; 3], axis: usize, dir: i32) -> Option<[u32; 3]> {
        let mut result = cell;
        let coord = cell[axis] as i64 + dir as i64;

        if coord < 0 || coord >= self.dims[axis] as i64 {
            return None;
        }

        result[axis] = coord as u32;
        Some(result)
    }

    /// Calls `f` on the cells of the 3x3x3 block centered on `cell`, `None` for the cells
    /// out of the grid, and stops as soon as `f` returns `false`.
    fn all_around(&self, cell: [u32; 3], mut f: impl FnMut(Option<usize>) -> bool) -> bool {
        for dk in -1..=1 {
            for dj in -1..=1 {
                for di in -1..=1 {
                    let n = [di, dj, dk]
                        .iter()
                        .enumerate()
                        .try_fold(cell, |n, (axis, d)| self.neighbor(n, axis, *d));
                    if !f(n.map(|n| self.index(n))) {
                        return false;
                    }
                }
            }
        }

        true
    }

    /// Removes the features thinner than about `2 * radius` cells, with a morphological
    /// opening that never fills new cells.
    pub fn open(&mut self, radius: u32) {
        let original = self.filled.clone();

        for _ in 0..radius {
            let eroded: Vec<_> = (0..self.len())
                .map(|id| {
                    self.filled[id]
                        && self.all_around(self.cell_from_index(id), |n| {
                            n.is_some_and(|n| self.filled[n])
                        })
                })
                .collect();
            self.filled = eroded;
        }

        for _ in 0..radius {
            let dilated: Vec<_> = (0..self.len())
                .map(|id| {
                    self.filled[id]
                        || (original[id]
                            && !self.all_around(self.cell_from_index(id), |n| {
                                !n.is_some_and(|n| self.filled[n])
                            }))
                })
                .collect();
            self.filled = dilated;
        }
    }

    /// Empties the face-connected islands of cells with at most `max_connections` pairs of
    /// adjacent cells.
    pub fn remove_small_islands(&mut self, max_connections: u32) {
        let mut visited = vec![false; self.len()];
        let mut stack = vec![];
        let mut island = vec![];

        for seed in 0..self.len() {
            if !self.filled[seed] || visited[seed] {
                continue;
            }

            island.clear();
            stack.push(seed);
            visited[seed] = true;
            let mut connections = 0u32;

            while let Some(id) = stack.pop() {
                island.push(id);
                let cell = self.cell_from_index(id);

                for (axis, dir) in NEIGHBORS {
                    let Some(n) = self.neighbor(cell, axis, dir) else {
                        continue;
                    };
                    let nid = self.index(n);

                    if self.filled[nid] {
                        if dir > 0 {
                            connections += 1;
                        }
                        if !visited[nid] {
                            visited[nid] = true;
                            stack.push(nid);
                        }
                    }
                }
            }

            if connections <= max_connections {
                for id in &island {
                    self.filled[*id] = false;
                }
            }
        }
    }

    /// The box covering the cells from `lo` to `hi`, both included.
    pub fn cell_box(&self, lo: [u32; 3], hi: [u32; 3]) -> Obb {
        let corner = |c: [u32; 3]| {
            self.origin + Vector::new(c[0] as Real, c[1] as Real, c[2] as Real).component_mul(&self.cell)
        };
        Obb::from(Aabb::new(corner(lo), corner(hi.map(|c| c + 1))))
    }
}
