//! Triangle adjacency and island (connected component) discovery.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::math::{Point, Real, VertexIndex, DEFAULT_EPSILON};
use crate::shape::Triangle;
use crate::utils::SortedPair;

/// Sentinel stored as the neighbor of a boundary edge.
pub const NO_NEIGHBOR: u32 = u32::MAX;

/// A group of triangles.
///
/// Top-level islands are the maximal sets of triangles connected through shared edges. Islands
/// larger than the split threshold are further subdivided into child islands, linked through
/// `first_child`/`next_sibling`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Island {
    /// The triangles of this island.
    pub triangles: Vec<u32>,
    /// The signed volume enclosed by this island (zero-ish for open surfaces).
    pub volume: Real,
    /// The centroid of the island: volume-weighted if it encloses a volume, area-weighted otherwise.
    pub centroid: Point<Real>,
    /// The island this one was split from.
    pub parent: Option<u32>,
    /// The first sub-island of this island.
    pub first_child: Option<u32>,
    /// The next sub-island sharing the same parent.
    pub next_sibling: Option<u32>,
}

impl Island {
    /// The number of triangles of this island.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Adjacency and island information of a triangle mesh.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TopologyInfo {
    neighbors: Vec<[u32; 3]>,
    islands: Vec<Island>,
    num_top_level: usize,
    triangle_island: Vec<u32>,
}

impl TopologyInfo {
    /// Computes the adjacency and islands of the given mesh.
    ///
    /// Islands with more than `split_threshold` triangles get recursively split in two along the
    /// longest axis of their triangle centers.
    pub fn compute(
        vertices: &[Point<Real>],
        indices: &[[VertexIndex; 3]],
        split_threshold: usize,
    ) -> Self {
        let neighbors = compute_adjacency(indices);
        let components = connected_components(&neighbors);
        let mut triangle_island = vec![0; indices.len()];
        let mut islands = Vec::with_capacity(components.len());

        for (island_id, triangles) in components.into_iter().enumerate() {
            for tri in &triangles {
                triangle_island[*tri as usize] = island_id as u32;
            }
            islands.push(make_island(vertices, indices, triangles, None));
        }

        let num_top_level = islands.len();

        for island_id in 0..num_top_level {
            split_island(vertices, indices, &mut islands, island_id, split_threshold.max(1));
        }

        Self {
            neighbors,
            islands,
            num_top_level,
            triangle_island,
        }
    }

    /// The neighbors of every triangle. Neighbor `k` shares the edge `(k, (k + 1) % 3)`.
    ///
    /// Boundary edges are marked with [`NO_NEIGHBOR`].
    pub fn neighbors(&self) -> &[[u32; 3]] {
        &self.neighbors
    }

    /// The neighbor of triangle `tri` across its `edge`-th edge, if any.
    pub fn neighbor(&self, tri: u32, edge: usize) -> Option<u32> {
        let n = self.neighbors.get(tri as usize)?[edge % 3];
        (n != NO_NEIGHBOR).then_some(n)
    }

    /// Do the two triangles share an edge?
    pub fn are_adjacent(&self, tri1: u32, tri2: u32) -> bool {
        self.neighbors
            .get(tri1 as usize)
            .is_some_and(|n| n.contains(&tri2))
    }

    /// All the islands, top-level ones first.
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// The top-level islands. They partition the triangles of the mesh.
    pub fn top_level_islands(&self) -> &[Island] {
        &self.islands[..self.num_top_level]
    }

    /// The top-level island containing the given triangle.
    pub fn island_of(&self, tri: u32) -> u32 {
        self.triangle_island[tri as usize]
    }

    /// Iterates through the direct sub-islands of `island`.
    pub fn children(&self, island: u32) -> impl Iterator<Item = u32> + '_ {
        let mut curr = self.islands.get(island as usize).and_then(|i| i.first_child);
        core::iter::from_fn(move || {
            let id = curr?;
            curr = self.islands[id as usize].next_sibling;
            Some(id)
        })
    }

    /// Does every triangle edge have a neighbor?
    pub fn is_closed(&self) -> bool {
        self.neighbors
            .iter()
            .all(|n| n.iter().all(|id| *id != NO_NEIGHBOR))
    }
}

/// Computes, for each triangle, its neighbor across each of its edges.
///
/// Edges are matched by their (unordered) vertex pair. An edge shared by more than two
/// triangles is only paired for the first two triangles seen, so the adjacency stays symmetric.
pub fn compute_adjacency(indices: &[[VertexIndex; 3]]) -> Vec<[u32; 3]> {
    let mut neighbors = vec![[NO_NEIGHBOR; 3]; indices.len()];
    let mut pending: HashMap<SortedPair<VertexIndex>, (u32, usize)> = HashMap::new();

    for (tid, idx) in indices.iter().enumerate() {
        for k in 0..3 {
            let (a, b) = (idx[k], idx[(k + 1) % 3]);
            if a == b {
                continue;
            }

            match pending.entry(SortedPair::new(a, b)) {
                Entry::Occupied(entry) => {
                    let (other, other_k) = *entry.get();
                    if other != tid as u32 && neighbors[other as usize][other_k] == NO_NEIGHBOR {
                        neighbors[other as usize][other_k] = tid as u32;
                        neighbors[tid][k] = other;
                    }
                }
                Entry::Vacant(entry) => {
                    let _ = entry.insert((tid as u32, k));
                }
            }
        }
    }

    neighbors
}

/// Groups triangles into connected components by flood-filling the adjacency graph.
pub fn connected_components(neighbors: &[[u32; 3]]) -> Vec<Vec<u32>> {
    let mut visited = vec![false; neighbors.len()];
    let mut stack = Vec::new();
    let mut result = Vec::new();

    for seed in 0..neighbors.len() {
        if visited[seed] {
            continue;
        }

        let mut component = Vec::new();
        visited[seed] = true;
        stack.push(seed as u32);

        while let Some(tri) = stack.pop() {
            component.push(tri);
            for n in neighbors[tri as usize] {
                if n != NO_NEIGHBOR && !visited[n as usize] {
                    visited[n as usize] = true;
                    stack.push(n);
                }
            }
        }

        component.sort_unstable();
        result.push(component);
    }

    result
}

fn make_island(
    vertices: &[Point<Real>],
    indices: &[[VertexIndex; 3]],
    triangles: Vec<u32>,
    parent: Option<u32>,
) -> Island {
    let mut volume = 0.0;
    let mut weighted = Point::origin().coords;
    let mut area = 0.0;
    let mut area_weighted = Point::origin().coords;

    for tri in &triangles {
        let idx = indices[*tri as usize];
        let t = Triangle::new(
            vertices[idx[0] as usize],
            vertices[idx[1] as usize],
            vertices[idx[2] as usize],
        );
        let vol = t.a.coords.dot(&t.b.coords.cross(&t.c.coords)) / 6.0;
        volume += vol;
        weighted += (t.a.coords + t.b.coords + t.c.coords) * (vol / 4.0);

        let a = t.area();
        area += a;
        area_weighted += t.center().coords * a;
    }

    let centroid = if volume.abs() > DEFAULT_EPSILON {
        Point::from(weighted / volume)
    } else if area > 0.0 {
        Point::from(area_weighted / area)
    } else {
        Point::origin()
    };

    Island {
        triangles,
        volume,
        centroid,
        parent,
        first_child: None,
        next_sibling: None,
    }
}

fn split_island(
    vertices: &[Point<Real>],
    indices: &[[VertexIndex; 3]],
    islands: &mut Vec<Island>,
    island_id: usize,
    threshold: usize,
) {
    if islands[island_id].triangles.len() <= threshold {
        return;
    }

    let center = |tri: u32| {
        let idx = indices[tri as usize];
        (vertices[idx[0] as usize].coords
            + vertices[idx[1] as usize].coords
            + vertices[idx[2] as usize].coords)
            / 3.0
    };

    let mut triangles = islands[island_id].triangles.clone();
    let mut mins = center(triangles[0]);
    let mut maxs = mins;
    for tri in &triangles {
        let c = center(*tri);
        mins = mins.inf(&c);
        maxs = maxs.sup(&c);
    }

    let axis = (maxs - mins).imax();
    triangles.sort_by_key(|tri| OrderedFloat(center(*tri)[axis]));
    let right = triangles.split_off(triangles.len() / 2);

    let left_id = islands.len();
    let right_id = left_id + 1;
    let mut left_island = make_island(vertices, indices, triangles, Some(island_id as u32));
    left_island.next_sibling = Some(right_id as u32);
    islands.push(left_island);
    islands.push(make_island(vertices, indices, right, Some(island_id as u32)));
    islands[island_id].first_child = Some(left_id as u32);

    split_island(vertices, indices, islands, left_id, threshold);
    split_island(vertices, indices, islands, right_id, threshold);
}

#[cfg(test)]
mod test {
    use super::{compute_adjacency, TopologyInfo, NO_NEIGHBOR};
    use crate::math::{Point, Real};

    fn unit_quad() -> (Vec<Point<Real>>, Vec<[u16; 3]>) {
        (
            vec![
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
                Point::new(1.0, 1.0, 0.0),
                Point::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn adjacency_pairs_shared_edge() {
        let (_, idx) = unit_quad();
        let adj = compute_adjacency(&idx);
        assert_eq!(adj[0], [NO_NEIGHBOR, NO_NEIGHBOR, 1]);
        assert_eq!(adj[1], [0, NO_NEIGHBOR, NO_NEIGHBOR]);
    }

    #[test]
    fn islands_split_hierarchically() {
        let (vtx, idx) = unit_quad();
        let topo = TopologyInfo::compute(&vtx, &idx, 1);
        assert_eq!(topo.top_level_islands().len(), 1);
        assert_eq!(topo.islands().len(), 3);
        let children: Vec<_> = topo.children(0).collect();
        assert_eq!(children, vec![1, 2]);
        assert_eq!(topo.islands()[1].parent, Some(0));
        assert!(!topo.is_closed());
    }
}
