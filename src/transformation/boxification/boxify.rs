use super::voxel_grid::VoxelGrid;
use super::{BoxificationError, BoxificationParameters};
use crate::bounding_volume::Obb;
use crate::math::Real;
use crate::shape::{Geometry, TriMesh};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StopReason {
    FillReached,
    CapReached,
    NoSeeds,
}

/// Covers the volume of the triangle mesh `shape` with axis-aligned boxes.
///
/// The mesh is voxelized, then boxes are grown, one at a time, from the unclaimed cells just
/// below the largest axis-aligned triangles, and then from any unclaimed cell. A box grows one
/// layer of cells at a time in each direction while the layer is fully inside the mesh and
/// mostly unclaimed.
///
/// Boxes are written to `out`, in the local frame of the mesh, until the filled fraction of
/// the voxelized volume reaches `params.min_layer_filling` or `out` is full. Returns the
/// number of boxes written. Stopping early is not an error.
pub fn boxify(
    shape: &Geometry,
    params: &BoxificationParameters,
    out: &mut [Obb],
) -> Result<usize, BoxificationError> {
    params.validate()?;
    let mesh = shape.as_trimesh().ok_or(BoxificationError::NotAMesh)?;

    if out.is_empty() || mesh.is_empty() {
        return Ok(0);
    }

    let mut grid = VoxelGrid::voxelize(mesh, params.voxel_resolution)
        .ok_or(BoxificationError::InvalidParameters)?;
    let filter_radius = (params.distance_filter / (2.0 * grid.min_cell_size())).floor() as u32;
    grid.open(filter_radius);

    if let Some(max_connections) = params.max_voxel_island_connections {
        grid.remove_small_islands(max_connections);
    }

    let target = grid.num_filled();
    let mut claimed = vec![false; grid.len()];
    let mut num_claimed = 0;
    let mut count = 0;
    let seeds = face_seeds(mesh, &grid, params);
    let mut seeds = seeds.into_iter().chain(grid.filled_cells());

    let reason = loop {
        if num_claimed as Real >= params.min_layer_filling * target as Real {
            break StopReason::FillReached;
        }

        if count == out.len() {
            break StopReason::CapReached;
        }

        let Some(seed) = seeds.find(|cell| grid.is_filled(*cell) && !claimed[grid.index(*cell)])
        else {
            break StopReason::NoSeeds;
        };

        let (lo, hi) = grow(&grid, &claimed, seed, params.max_layer_reuse);

        for k in lo[2]..=hi[2] {
            for j in lo[1]..=hi[1] {
                for i in lo[0]..=hi[0] {
                    let id = grid.index([i, j, k]);
                    if !claimed[id] {
                        claimed[id] = true;
                        num_claimed += 1;
                    }
                }
            }
        }

        out[count] = grid.cell_box(lo, hi);
        count += 1;
    };

    log::debug!(
        "boxification stopped ({:?}): {} boxes cover {}/{} voxels",
        reason,
        count,
        num_claimed,
        target
    );

    Ok(count)
}

/// The cells just inside the triangles large enough and aligned enough with an axis, largest
/// triangles first.
fn face_seeds(mesh: &TriMesh, grid: &VoxelGrid, params: &BoxificationParameters) -> Vec<[u32; 3]> {
    let min_alignment = params.max_face_tilt.cos();
    let depth = grid.min_cell_size() * 0.5;

    let mut seeds: Vec<_> = mesh
        .triangles()
        .zip(mesh.normals())
        .filter_map(|(tri, normal)| {
            let area = tri.area();
            let alignment = normal.iter().fold(0.0, |m: Real, c| m.max(c.abs()));

            if area < params.min_face_area || area == 0.0 || alignment < min_alignment {
                return None;
            }

            let cell = grid.cell_at(&(tri.center() - normal * depth))?;
            Some((area, cell))
        })
        .collect();

    seeds.sort_by(|a, b| b.0.total_cmp(&a.0));
    seeds.into_iter().map(|(_, cell)| cell).collect()
}

/// Grows a box from `seed`, returning its first and last cells.
fn grow(grid: &VoxelGrid, claimed: &[bool], seed: [u32; 3], max_reuse: Real) -> ([u32; 3], [u32; 3]) {
    let dims = grid.dims();
    let mut lo = seed;
    let mut hi = seed;
    let mut blocked = [false; 6];

    loop {
        let mut grew = false;

        for dir in 0..6 {
            if blocked[dir] {
                continue;
            }

            let axis = dir / 2;
            let upper = dir % 2 == 1;
            let layer = if upper {
                (hi[axis] + 1 < dims[axis]).then(|| hi[axis] + 1)
            } else {
                lo[axis].checked_sub(1)
            };

            let Some(layer) = layer else {
                blocked[dir] = true;
                continue;
            };

            let (mut layer_lo, mut layer_hi) = (lo, hi);
            layer_lo[axis] = layer;
            layer_hi[axis] = layer;

            if layer_is_available(grid, claimed, layer_lo, layer_hi, max_reuse) {
                if upper {
                    hi[axis] = layer;
                } else {
                    lo[axis] = layer;
                }
                grew = true;
            } else {
                blocked[dir] = true;
            }
        }

        if !grew {
            return (lo, hi);
        }
    }
}

/// Is every cell of the layer filled, with a small enough fraction already claimed?
fn layer_is_available(
    grid: &VoxelGrid,
    claimed: &[bool],
    lo: [u32; 3],
    hi: [u32; 3],
    max_reuse: Real,
) -> bool {
    let mut total = 0;
    let mut reused = 0;

    for k in lo[2]..=hi[2] {
        for j in lo[1]..=hi[1] {
            for i in lo[0]..=hi[0] {
                let cell = [i, j, k];
                if !grid.is_filled(cell) {
                    return false;
                }

                total += 1;
                if claimed[grid.index(cell)] {
                    reused += 1;
                }
            }
        }
    }

    reused as Real <= max_reuse * total as Real
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bounding_volume::BoundingVolume;
    use crate::math::{Matrix, Point, Vector};
    use crate::shape::Voxels;
    use crate::transformation::to_trimesh::cuboid_mesh;
    use crate::transformation::utils::narrow_indices;

    fn cube() -> Geometry {
        let (vtx, idx) = cuboid_mesh(Vector::repeat(0.5));
        Geometry::TriMesh(TriMesh::new(vtx, idx).unwrap())
    }

    fn l_shape() -> Geometry {
        let voxels =
            Voxels::from_cells(Point::origin(), 1.0, [2, 2, 1], &[[0, 0, 0], [1, 0, 0], [0, 1, 0]])
                .unwrap();
        let (vtx, idx) = voxels.to_trimesh();
        Geometry::TriMesh(TriMesh::new(vtx, narrow_indices(&idx).unwrap()).unwrap())
    }

    fn slots(n: usize) -> Vec<Obb> {
        vec![Obb::new(Point::origin(), Matrix::identity(), Vector::zeros()); n]
    }

    fn total_volume(boxes: &[Obb]) -> Real {
        boxes.iter().map(|b| b.volume()).sum()
    }

    #[test]
    fn cube_is_one_box() {
        let mut out = slots(1);
        let n = boxify(&cube(), &BoxificationParameters::default(), &mut out).unwrap();

        assert_eq!(n, 1);
        assert_relative_eq!(out[0].volume(), 1.0, epsilon = 1.0e-4);
        assert_relative_eq!(out[0].center, Point::origin(), epsilon = 1.0e-4);
    }

    #[test]
    fn l_shape_needs_two_boxes() {
        let params = BoxificationParameters {
            voxel_resolution: 2,
            min_layer_filling: 1.0,
            ..Default::default()
        };
        let mut out = slots(4);

        let n = boxify(&l_shape(), &params, &mut out).unwrap();
        assert_eq!(n, 2);
        assert_relative_eq!(total_volume(&out[..n]), 3.0, epsilon = 1.0e-4);

        let n = boxify(&l_shape(), &params, &mut out[..1]).unwrap();
        assert_eq!(n, 1);
        assert_relative_eq!(total_volume(&out[..n]), 2.0, epsilon = 1.0e-4);
    }

    #[test]
    fn nothing_to_fill() {
        let params = BoxificationParameters {
            min_layer_filling: 0.0,
            ..Default::default()
        };
        let mut out = slots(4);
        assert_eq!(boxify(&cube(), &params, &mut out), Ok(0));
        assert_eq!(boxify(&cube(), &Default::default(), &mut []), Ok(0));
    }

    #[test]
    fn invalid_inputs() {
        let mut out = slots(1);
        let params = BoxificationParameters {
            voxel_resolution: 0,
            ..Default::default()
        };
        assert_eq!(
            boxify(&cube(), &params, &mut out),
            Err(BoxificationError::InvalidParameters)
        );

        // Too many cells along one side, then in total.
        for voxel_resolution in [3_000_000, 1024] {
            let params = BoxificationParameters {
                voxel_resolution,
                ..Default::default()
            };
            assert_eq!(
                boxify(&cube(), &params, &mut out),
                Err(BoxificationError::InvalidParameters)
            );
        }

        let ball = Geometry::Ball(crate::shape::Ball::new(Point::origin(), 1.0));
        assert_eq!(
            boxify(&ball, &Default::default(), &mut out),
            Err(BoxificationError::NotAMesh)
        );
    }
}
