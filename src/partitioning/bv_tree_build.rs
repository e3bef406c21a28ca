use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{BvNode, BvParameters, BvTree, BvTreeKind};
use crate::bounding_volume::{Aabb, BoundingVolume, Obb};
use crate::math::{Matrix, Point, Real, Vector, VertexIndex};
use crate::shape::MeshFlags;

impl BvTreeKind {
    /// The mesh flag requesting this flavor.
    pub fn flag(self) -> MeshFlags {
        match self {
            BvTreeKind::Aabb => MeshFlags::AABB,
            BvTreeKind::Obb => MeshFlags::OBB,
            BvTreeKind::SingleBox => MeshFlags::SINGLE_BOX,
            BvTreeKind::RotatedAabb => MeshFlags::ROTATED_AABB,
            BvTreeKind::VoxelGrid => MeshFlags::VOXEL_GRID,
        }
    }
}

impl BvTree {
    /// Builds a bounding-volume tree over the given triangles.
    ///
    /// Every flavor requested by `flags` is built, and the one with the smallest scaled volume
    /// is kept. Voxel-grid parameters always request the voxel-grid flavor. If no flavor is
    /// requested, an AABB tree is built.
    pub fn build(
        vertices: &[Point<Real>],
        indices: &[[VertexIndex; 3]],
        flags: MeshFlags,
        params: &BvParameters,
    ) -> Self {
        if indices.is_empty() {
            return BvTree::empty(BvTreeKind::Aabb);
        }

        let mut kinds: Vec<_> = BvTreeKind::ALL
            .into_iter()
            .filter(|kind| flags.contains(kind.flag()))
            .collect();

        if params.voxel_grid().is_some() && !kinds.contains(&BvTreeKind::VoxelGrid) {
            kinds.push(BvTreeKind::VoxelGrid);
        }

        if kinds.is_empty() {
            kinds.push(BvTreeKind::Aabb);
        }

        let builder = TreeBuilder::new(vertices, indices, params);

        #[cfg(feature = "parallel")]
        let candidates: Vec<_> = kinds.par_iter().map(|kind| builder.build(*kind)).collect();
        #[cfg(not(feature = "parallel"))]
        let candidates: Vec<_> = kinds.iter().map(|kind| builder.build(*kind)).collect();

        let divisor = params.base().aabb_volume_divisor();
        let best = candidates
            .into_iter()
            .min_by_key(|tree| OrderedFloat(tree.scaled_volume(divisor)));

        match best {
            Some(tree) => {
                log::debug!(
                    "selected {:?} bounding-volume tree with {} nodes, scaled volume {}",
                    tree.kind(),
                    tree.nodes().len(),
                    tree.scaled_volume(divisor)
                );
                tree
            }
            None => BvTree::empty(BvTreeKind::Aabb),
        }
    }
}

struct TreeBuilder<'a> {
    vertices: &'a [Point<Real>],
    indices: &'a [[VertexIndex; 3]],
    params: &'a BvParameters,
    centers: Vec<Point<Real>>,
}

/// The box in the frame `axes` enclosing `pts`.
fn box_in_frame(axes: &Matrix<Real>, pts: impl Iterator<Item = Point<Real>>) -> Obb {
    let mut local = Aabb::new_invalid();
    for pt in pts {
        local.take_point(Point::from(axes.tr_mul(&pt.coords)));
    }

    if !local.is_valid() {
        return Obb::new(Point::origin(), *axes, Vector::zeros());
    }

    Obb::new(
        Point::from(axes * local.center().coords),
        *axes,
        local.half_extents(),
    )
}

fn half_surface_area(aabb: &Aabb) -> Real {
    if !aabb.is_valid() {
        return 0.0;
    }
    let e = aabb.extents();
    e.x * e.y + e.y * e.z + e.z * e.x
}

impl<'a> TreeBuilder<'a> {
    fn new(
        vertices: &'a [Point<Real>],
        indices: &'a [[VertexIndex; 3]],
        params: &'a BvParameters,
    ) -> Self {
        let centers = indices
            .iter()
            .map(|idx| {
                Point::from(
                    (vertices[idx[0] as usize].coords
                        + vertices[idx[1] as usize].coords
                        + vertices[idx[2] as usize].coords)
                        / 3.0,
                )
            })
            .collect();

        Self {
            vertices,
            indices,
            params,
            centers,
        }
    }

    fn triangle_points(&self, tri: u32) -> impl Iterator<Item = Point<Real>> + '_ {
        self.indices[tri as usize]
            .iter()
            .map(move |i| self.vertices[*i as usize])
    }

    fn points_of<'b>(&'b self, tris: &'b [u32]) -> impl Iterator<Item = Point<Real>> + 'b {
        tris.iter().flat_map(move |t| self.triangle_points(*t))
    }

    fn build(&self, kind: BvTreeKind) -> BvTree {
        match kind {
            BvTreeKind::SingleBox => self.build_single_box(),
            BvTreeKind::VoxelGrid => self.build_voxel_grid(),
            BvTreeKind::Aabb | BvTreeKind::Obb | BvTreeKind::RotatedAabb => {
                self.build_split_tree(kind)
            }
        }
    }

    /*
     * Recursive splitting.
     */
    fn build_split_tree(&self, kind: BvTreeKind) -> BvTree {
        let frame = if kind == BvTreeKind::RotatedAabb {
            Obb::principal_axes(self.vertices)
        } else {
            Matrix::identity()
        };

        let mut triangles: Vec<u32> = (0..self.indices.len() as u32).collect();
        let mut nodes = Vec::new();
        let _ = self.split_node(kind, &frame, &mut triangles, 0, &mut nodes);

        BvTree {
            kind,
            nodes,
            triangles,
        }
    }

    fn fit(&self, kind: BvTreeKind, frame: &Matrix<Real>, tris: &[u32]) -> Obb {
        if kind == BvTreeKind::Obb {
            let pts: Vec<_> = self.points_of(tris).collect();
            box_in_frame(&Obb::principal_axes(&pts), pts.into_iter())
        } else {
            box_in_frame(frame, self.points_of(tris))
        }
    }

    fn split_node(
        &self,
        kind: BvTreeKind,
        frame: &Matrix<Real>,
        tris: &mut [u32],
        first: u32,
        nodes: &mut Vec<BvNode>,
    ) -> u32 {
        let id = nodes.len();
        let volume = self.fit(kind, frame, tris);
        nodes.push(BvNode {
            volume,
            children: None,
            first,
            count: tris.len() as u32,
        });

        let base = self.params.base();
        let min = base.min_triangles_per_node() as usize;
        let max = base.max_triangles_per_node() as usize;

        if tris.len() <= max {
            return id as u32;
        }

        let axes = if kind == BvTreeKind::Obb {
            volume.axes
        } else {
            *frame
        };

        let Some((axis, k)) = self.best_split(&axes, tris, min) else {
            log::debug!(
                "bounding-volume node with {} triangles cannot be split into children of at least {} triangles",
                tris.len(),
                min
            );
            return id as u32;
        };

        let dir = axes.column(axis).into_owned();
        tris.sort_by_key(|t| OrderedFloat(self.centers[*t as usize].coords.dot(&dir)));
        let (left, right) = tris.split_at_mut(k);
        let left_id = self.split_node(kind, frame, left, first, nodes);
        let right_id = self.split_node(kind, frame, right, first + k as u32, nodes);
        nodes[id].children = Some([left_id, right_id]);
        id as u32
    }

    /// Finds the axis and split position minimizing the surface-area cost, keeping at least
    /// `min` triangles on each side.
    fn best_split(&self, axes: &Matrix<Real>, tris: &[u32], min: usize) -> Option<(usize, usize)> {
        let n = tris.len();
        if n < 2 * min || n < 2 {
            return None;
        }

        let mut best: Option<(Real, usize, usize)> = None;
        let mut sorted = tris.to_vec();
        let mut prefix = vec![0.0; n + 1];

        for axis in 0..3 {
            let dir = axes.column(axis).into_owned();
            sorted.sort_by_key(|t| OrderedFloat(self.centers[*t as usize].coords.dot(&dir)));

            let local_aabb = |t: u32| {
                let mut aabb = Aabb::new_invalid();
                for pt in self.triangle_points(t) {
                    aabb.take_point(Point::from(axes.tr_mul(&pt.coords)));
                }
                aabb
            };

            let mut acc = Aabb::new_invalid();
            for (i, t) in sorted.iter().enumerate() {
                acc.merge(&local_aabb(*t));
                prefix[i + 1] = half_surface_area(&acc);
            }

            let mut acc = Aabb::new_invalid();
            for k in (min.max(1)..n).rev() {
                acc.merge(&local_aabb(sorted[k]));
                if k <= n - min {
                    let cost = prefix[k] * k as Real + half_surface_area(&acc) * (n - k) as Real;
                    if best.map_or(true, |b| cost < b.0) {
                        best = Some((cost, axis, k));
                    }
                }
            }
        }

        best.map(|(_, axis, k)| (axis, k))
    }

    /*
     * Single box.
     */
    fn build_single_box(&self) -> BvTree {
        let triangles: Vec<u32> = (0..self.indices.len() as u32).collect();
        let oriented = self.fit(BvTreeKind::Obb, &Matrix::identity(), &triangles);
        let aligned = self.fit(BvTreeKind::Aabb, &Matrix::identity(), &triangles);
        let volume = if oriented.volume() < aligned.volume() {
            oriented
        } else {
            aligned
        };

        BvTree {
            kind: BvTreeKind::SingleBox,
            nodes: vec![BvNode {
                volume,
                children: None,
                first: 0,
                count: triangles.len() as u32,
            }],
            triangles,
        }
    }

    /*
     * Voxel grid.
     */
    fn automatic_grid(&self) -> (Point<Real>, Vector<Real>, [u32; 3]) {
        let aabb = Aabb::from_points(self.vertices);
        let max = self.params.base().max_triangles_per_node().max(1) as Real;
        let num_cells = (self.indices.len() as Real / max).max(1.0);
        let per_axis = (num_cells.cbrt().ceil() as u32).clamp(1, 64);
        let extents = aabb.extents();
        let min_step = extents.max().max(1.0) * 1.0e-4;
        let step = (extents / per_axis as Real).map(|e| e.max(min_step));
        (aabb.mins, step, [per_axis; 3])
    }

    fn build_voxel_grid(&self) -> BvTree {
        let (origin, step, size) = match self.params.voxel_grid() {
            Some(grid) => (grid.origin(), grid.cell_step(), grid.grid_size()),
            None => self.automatic_grid(),
        };

        let mut cells: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        let mut outside = Vec::new();

        for tri in 0..self.indices.len() as u32 {
            let aabb = Aabb::from_points(&self.triangle_points(tri).collect::<Vec<_>>());
            let lo = (aabb.mins - origin).component_div(&step).map(|e| e.floor());
            let hi = (aabb.maxs - origin).component_div(&step).map(|e| e.floor());

            if (0..3).any(|i| lo[i] < 0.0 || hi[i] >= size[i] as Real) {
                // Parts of this triangle are not covered by any cell.
                outside.push(tri);
            }

            if (0..3).any(|i| hi[i] < 0.0 || lo[i] >= size[i] as Real) {
                continue;
            }

            let clamp = |v: Real, i: usize| (v.max(0.0) as u32).min(size[i] - 1);
            for k in clamp(lo.z, 2)..=clamp(hi.z, 2) {
                for j in clamp(lo.y, 1)..=clamp(hi.y, 1) {
                    for i in clamp(lo.x, 0)..=clamp(hi.x, 0) {
                        let id = i + size[0] * (j + size[1] * k);
                        cells.entry(id).or_default().push(tri);
                    }
                }
            }
        }

        let mut leaves: Vec<(Obb, Vec<u32>)> = Vec::with_capacity(cells.len() + 1);
        for (id, tris) in cells {
            let ijk = Vector::new(
                (id % size[0]) as Real,
                ((id / size[0]) % size[1]) as Real,
                (id / (size[0] * size[1])) as Real,
            );
            let cell_mins = origin + ijk.component_mul(&step);
            let cell = Aabb::new(cell_mins, cell_mins + step);
            let tris_aabb = Aabb::from_points(&self.points_of(&tris).collect::<Vec<_>>());
            let volume = cell.intersection(&tris_aabb).unwrap_or(cell);
            leaves.push((Obb::from(volume), tris));
        }

        if !outside.is_empty() {
            let aabb = Aabb::from_points(&self.points_of(&outside).collect::<Vec<_>>());
            leaves.push((Obb::from(aabb), outside));
        }

        let mut nodes = Vec::new();
        let mut triangles = Vec::new();
        if !leaves.is_empty() {
            let _ = build_leaf_hierarchy(&mut leaves, &mut nodes, &mut triangles);
        }

        BvTree {
            kind: BvTreeKind::VoxelGrid,
            nodes,
            triangles,
        }
    }
}

fn build_leaf_hierarchy(
    leaves: &mut [(Obb, Vec<u32>)],
    nodes: &mut Vec<BvNode>,
    triangles: &mut Vec<u32>,
) -> u32 {
    let id = nodes.len();
    let first = triangles.len() as u32;

    if let [(volume, tris)] = &*leaves {
        triangles.extend_from_slice(tris);
        nodes.push(BvNode {
            volume: *volume,
            children: None,
            first,
            count: tris.len() as u32,
        });
        return id as u32;
    }

    let mut aabb = Aabb::new_invalid();
    let mut centers = Aabb::new_invalid();
    for (volume, _) in leaves.iter() {
        aabb.merge(&volume.aabb());
        centers.take_point(volume.center);
    }

    nodes.push(BvNode {
        volume: Obb::from(aabb),
        children: None,
        first,
        count: 0,
    });

    let axis = centers.extents().imax();
    leaves.sort_by_key(|(volume, _)| OrderedFloat(volume.center[axis]));
    let mid = leaves.len() / 2;
    let (left, right) = leaves.split_at_mut(mid);
    let left_id = build_leaf_hierarchy(left, nodes, triangles);
    let right_id = build_leaf_hierarchy(right, nodes, triangles);

    nodes[id].children = Some([left_id, right_id]);
    nodes[id].count = triangles.len() as u32 - first;
    id as u32
}
