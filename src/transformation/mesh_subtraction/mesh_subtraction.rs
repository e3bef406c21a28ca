use std::collections::HashMap;

use super::triangle_cut::{cut_triangle, CutPiece};
use super::{
    JunctionVertexFix, MeshSubtractionError, MeshUpdate, MovedBox, RemovedTriangle,
    RemovedVertex, TriangleChange, TriangleSource, VertexChange,
};
use crate::bounding_volume::{Aabb, BoundingVolume, Obb};
use crate::math::{Point, Pose, Real, Vector, VertexIndex, MAX_MESH_VERTICES};
use crate::query::{
    contains_point, crossing_tolerance, triangle_crossing, triangles_winding_number,
    TriangleCrossing, TriangleCrossingPoint, WorldData,
};
use crate::shape::{FeatureId, Geometry, SharedShape, TriMesh, Triangle};
use crate::utils::{PointKey, SortedPair};

const IDENTITY_BARYCENTRIC: [[Real; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Barycentric tolerance below which a point is considered outside of a triangle it is coplanar with.
const ON_SURFACE_TOLERANCE: Real = 1.0e-4;

/// Identifies the point where an edge of one mesh crosses a triangle or an edge of the other.
///
/// Both triangles sharing an edge look the crossing up with the same key, so cut curves
/// are made of consecutive segments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum CrossingKey {
    /// An edge of the edited mesh crossing a triangle of the subtracted one.
    EditedEdge(SortedPair<u32>, u32),
    /// An edge of the subtracted mesh crossing a triangle of the edited one.
    SubtractedEdge(SortedPair<u32>, u32),
    /// An edge of the edited mesh crossing an edge of the subtracted one.
    Edges(SortedPair<u32>, SortedPair<u32>),
}

/// A pair of triangles, one from each mesh, with their corners in the working vertex buffer.
struct TrianglePair {
    t: u32,
    s: u32,
    idx_a: [u32; 3],
    idx_b: [u32; 3],
}

impl TrianglePair {
    fn edge_a(&self, k: u32) -> SortedPair<u32> {
        SortedPair::new(self.idx_a[k as usize], self.idx_a[(k as usize + 1) % 3])
    }

    fn edge_b(&self, k: u32) -> SortedPair<u32> {
        SortedPair::new(self.idx_b[k as usize], self.idx_b[(k as usize + 1) % 3])
    }
}

/// The crossing points found so far, shared by all the triangle pairs.
#[derive(Default)]
struct CrossingPoints {
    ids: HashMap<CrossingKey, u32>,
    /// Vertices of the subtracted mesh merged into a vertex of the edited one.
    aliases: HashMap<u32, u32>,
}

impl CrossingPoints {
    /// The ids of `pt` in the cuts of the edited and of the subtracted triangle.
    ///
    /// Crossing points lying on an edge are registered as edge points of the corresponding
    /// cuts.
    fn register(
        &mut self,
        pt: &TriangleCrossingPoint,
        pair: &TrianglePair,
        positions: &mut Vec<Point<Real>>,
        cuts_a: &mut Cuts,
        cuts_b: &mut Cuts,
    ) -> [u32; 2] {
        let ids = match (pt.feature1, pt.feature2) {
            (FeatureId::Vertex(i), FeatureId::Vertex(j)) => {
                let (va, vb) = (pair.idx_a[i as usize], pair.idx_b[j as usize]);
                let _ = self.aliases.entry(vb).or_insert(va);
                [va, vb]
            }
            (FeatureId::Vertex(i), _) => [pair.idx_a[i as usize]; 2],
            (_, FeatureId::Vertex(j)) => [pair.idx_b[j as usize]; 2],
            (feature1, feature2) => {
                let key = match (feature1, feature2) {
                    (FeatureId::Edge(i), FeatureId::Edge(j)) => {
                        Some(CrossingKey::Edges(pair.edge_a(i), pair.edge_b(j)))
                    }
                    (FeatureId::Edge(i), _) => Some(CrossingKey::EditedEdge(pair.edge_a(i), pair.s)),
                    (_, FeatureId::Edge(j)) => {
                        Some(CrossingKey::SubtractedEdge(pair.edge_b(j), pair.t))
                    }
                    _ => None,
                };

                let known = key.as_ref().and_then(|key| self.ids.get(key)).copied();
                let id = known.unwrap_or_else(|| {
                    positions.push(pt.point);
                    (positions.len() - 1) as u32
                });

                if let Some(key) = key {
                    let _ = self.ids.insert(key, id);
                }

                [id; 2]
            }
        };

        if let FeatureId::Edge(i) = pt.feature1 {
            cuts_a.add_edge_point(pair.edge_a(i), ids[0]);
        }
        if let FeatureId::Edge(j) = pt.feature2 {
            cuts_b.add_edge_point(pair.edge_b(j), ids[1]);
        }

        ids
    }

    fn resolve(&self, id: u32) -> u32 {
        self.aliases.get(&id).copied().unwrap_or(id)
    }
}

/// The cut segments and edge points of the triangles of one operand.
#[derive(Default)]
struct Cuts {
    segments: HashMap<u32, Vec<[u32; 2]>>,
    edge_points: HashMap<SortedPair<u32>, Vec<u32>>,
}

impl Cuts {
    fn add_edge_point(&mut self, edge: SortedPair<u32>, id: u32) {
        if id == edge.0 || id == edge.1 {
            return;
        }

        let points = self.edge_points.entry(edge).or_default();
        if !points.contains(&id) {
            points.push(id);
        }
    }

    fn add_segment(&mut self, tri: u32, [a, b]: [u32; 2]) {
        if a != b {
            self.segments.entry(tri).or_default().push([a, b]);
        }
    }

    fn edge_points(&self, a: u32, b: u32) -> &[u32] {
        self.edge_points
            .get(&SortedPair::new(a, b))
            .map(|pts| &pts[..])
            .unwrap_or(&[])
    }

    /// Is the triangle crossed by a cut, or does one of its edges hold a cut point?
    fn touches(&self, tri: u32, idx: &[u32; 3]) -> bool {
        self.segments.contains_key(&tri)
            || (0..3).any(|k| !self.edge_points(idx[k], idx[(k + 1) % 3]).is_empty())
    }

    /// Cuts the triangle `tri`, returning `None` if it is not touched by any cut.
    fn cut(
        &self,
        tri: u32,
        idx: [u32; 3],
        positions: &mut Vec<Point<Real>>,
    ) -> Option<Vec<CutPiece>> {
        if !self.touches(tri, &idx) {
            return None;
        }

        let segments = self.segments.get(&tri).map(|s| &s[..]).unwrap_or(&[]);
        let edge_points = [0, 1, 2].map(|k| self.edge_points(idx[k], idx[(k + 1) % 3]));
        let pieces = cut_triangle(idx, edge_points, segments, positions);
        (!pieces.is_empty()).then_some(pieces)
    }
}

/// A triangle of the result, expressed in the working vertex buffer.
#[derive(Copy, Clone, Debug)]
struct Face {
    vertices: [u32; 3],
    source: TriangleSource,
    barycentric: [[Real; 3]; 3],
    material: u8,
    whole: bool,
}

/// Subtracts the volume of `b` from the triangle mesh `a`.
///
/// The result is expressed in the local frame of `a`. Triangles of `a` crossed by the surface
/// of `b` are re-triangulated along the cut curves, pieces inside of `b` are discarded, and the
/// parts of the surface of `b` inside of `a` are added, flipped, to close the cavity. Primitive
/// shapes `b` are tessellated first.
///
/// If the shapes do not overlap, `a` itself is returned, together with an empty update if
/// `log_updates` is set. Appending the update to a [`super::MeshUpdateLog`] is up to the caller.
pub fn subtract_meshes(
    a: &SharedShape,
    wd_a: &WorldData,
    b: &Geometry,
    wd_b: &WorldData,
    log_updates: bool,
) -> Result<(SharedShape, Option<MeshUpdate>), MeshSubtractionError> {
    let mesh_a = a.as_trimesh().ok_or(MeshSubtractionError::NotAMesh)?;
    let unchanged = || {
        let update = log_updates.then(|| MeshUpdate::empty(a.clone(), a.clone()));
        Ok((a.clone(), update))
    };

    let pose_ab = wd_a.pose().inv_mul(&wd_b.pose());
    let (b_vertices, b_indices, b_materials) = subtracted_surface(b, &pose_ab)?;

    if mesh_a.is_empty() || b_indices.is_empty() {
        return unchanged();
    }

    let aabb_a = mesh_a.local_aabb();
    let aabb_b = Aabb::from_points(&b_vertices);

    if !aabb_a.intersects(&aabb_b) {
        return unchanged();
    }

    let num_a = mesh_a.vertices().len() as u32;
    let a_indices: Vec<[u32; 3]> = mesh_a.indices().iter().map(|t| t.map(u32::from)).collect();
    let b_indices: Vec<[u32; 3]> = b_indices
        .iter()
        .map(|t| t.map(|i| i + num_a))
        .collect();

    // Working vertex buffer: the vertices of `a`, then those of `b`, then the cut points.
    let mut positions: Vec<_> = mesh_a.vertices().to_vec();
    positions.extend_from_slice(&b_vertices);

    let triangle = |positions: &[Point<Real>], idx: &[u32; 3]| {
        Triangle::new(
            positions[idx[0] as usize],
            positions[idx[1] as usize],
            positions[idx[2] as usize],
        )
    };
    let b_triangles: Vec<_> = b_indices.iter().map(|idx| triangle(&positions, idx)).collect();

    /*
     * Compute the cut curves.
     */
    let tolerance = crossing_tolerance(aabb_a.extents().norm().max(aabb_b.extents().norm()));
    let mut pairs = vec![];
    let bv_tree = mesh_a.bv_tree();

    for (s, tri_b) in b_triangles.iter().enumerate() {
        let aabb = tri_b.aabb().loosened(tolerance);
        if !aabb.intersects(&aabb_a) {
            continue;
        }

        let volume = Obb::from(aabb);
        bv_tree.traverse_intersecting_leaves(&volume, None, &mut |_, node| {
            for t in bv_tree.node_triangles(node) {
                if mesh_a.triangle(*t).aabb().intersects(&aabb) {
                    pairs.push((*t, s as u32));
                }
            }
        });
    }

    let mut cuts_a = Cuts::default();
    let mut cuts_b = Cuts::default();
    let mut points = CrossingPoints::default();
    let mut pairs_by_a: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut pairs_by_b: HashMap<u32, Vec<u32>> = HashMap::new();

    for (t, s) in pairs {
        pairs_by_a.entry(t).or_default().push(s);
        pairs_by_b.entry(s).or_default().push(t);

        let pair = TrianglePair {
            t,
            s,
            idx_a: a_indices[t as usize],
            idx_b: b_indices[s as usize],
        };
        let tri_a = triangle(&positions, &pair.idx_a);
        let tri_b = b_triangles[s as usize];

        match triangle_crossing(&tri_a, &tri_b, tolerance) {
            Some(TriangleCrossing::Segment([p, q])) => {
                let mut register = |pt: &TriangleCrossingPoint| {
                    points.register(pt, &pair, &mut positions, &mut cuts_a, &mut cuts_b)
                };
                let [pa, pb] = register(&p);
                let [qa, qb] = register(&q);
                cuts_a.add_segment(t, [pa, qa]);
                cuts_b.add_segment(s, [pb, qb]);
            }
            Some(TriangleCrossing::Coplanar { cuts1, cuts2 }) => {
                // `cuts1` follows edges of `tri_b` across `tri_a`, and conversely.
                let mut segments_a = vec![];
                let mut segments_b = vec![];
                let mut register = |pt: &TriangleCrossingPoint| {
                    points.register(pt, &pair, &mut positions, &mut cuts_a, &mut cuts_b)
                };

                for [p, q] in &cuts1 {
                    segments_a.push([register(p)[0], register(q)[0]]);
                }
                for [p, q] in &cuts2 {
                    segments_b.push([register(p)[1], register(q)[1]]);
                }

                for segment in segments_a {
                    cuts_a.add_segment(t, segment);
                }
                for segment in segments_b {
                    cuts_b.add_segment(s, segment);
                }
            }
            None => {}
        }
    }

    /*
     * Cut and classify the triangles.
     */
    let inside_b = |pt: &Point<Real>| {
        aabb_b.contains_local_point(pt)
            && triangles_winding_number(b_triangles.iter().copied(), pt) > 0.5
    };
    let inside_a = |pt: &Point<Real>| contains_point(mesh_a, pt);
    // The normal of the first of `candidates` whose surface holds `pt`.
    let surface_normal = |pt: &Point<Real>,
                          candidates: Option<&Vec<u32>>,
                          tri: &dyn Fn(u32) -> Triangle|
     -> Option<Vector<Real>> {
        candidates?.iter().find_map(|i| {
            let tri = tri(*i);
            let normal = tri.normal()?;
            let on_plane = (pt - tri.a).dot(&normal).abs() <= tolerance;
            let inside = tri
                .barycentric_coordinates(pt)
                .is_some_and(|bcoords| bcoords.iter().all(|c| *c >= -ON_SURFACE_TOLERANCE));
            (on_plane && inside).then_some(normal)
        })
    };
    let b_triangle = |s: u32| b_triangles[s as usize];
    let a_triangle = |t: u32| mesh_a.triangle(t);
    // A face of `a` lying on the surface of `b` is kept only if both surfaces face each other.
    let keep_a = |pt: &Point<Real>, t: u32, normal: &Option<Vector<Real>>| {
        match (surface_normal(pt, pairs_by_a.get(&t), &b_triangle), normal) {
            (Some(normal_b), Some(normal)) => normal_b.dot(normal) < 0.0,
            _ => !inside_b(pt),
        }
    };

    let mut faces = vec![];
    let mut removed_triangles = vec![];
    let mut junction_fixes = vec![];
    let mut num_cut = 0;
    let mut dropped_any = false;

    for (t, idx) in a_indices.iter().enumerate() {
        let t = t as u32;
        let material = mesh_a.material(t).unwrap_or(0);
        let normal = triangle(&positions, idx).normal();

        if let Some(pieces) = cuts_a.cut(t, *idx, &mut positions) {
            num_cut += 1;
            removed_triangles.push(RemovedTriangle { index: t });

            if !cuts_a.segments.contains_key(&t) {
                // Only split because a neighbor was cut along a shared edge.
                for k in 0..3 {
                    for vertex in cuts_a.edge_points(idx[k], idx[(k + 1) % 3]) {
                        junction_fixes.push((t, k as u8, *vertex));
                    }
                }
            }

            for piece in pieces {
                let center = triangle(&positions, &piece.vertices).center();
                if keep_a(&center, t, &normal) {
                    faces.push(Face {
                        vertices: piece.vertices,
                        source: TriangleSource::Original(t),
                        barycentric: piece.barycentric,
                        material,
                        whole: false,
                    });
                } else {
                    dropped_any = true;
                }
            }
        } else if keep_a(&triangle(&positions, idx).center(), t, &normal) {
            faces.push(Face {
                vertices: *idx,
                source: TriangleSource::Original(t),
                barycentric: IDENTITY_BARYCENTRIC,
                material,
                whole: true,
            });
        } else {
            dropped_any = true;
            removed_triangles.push(RemovedTriangle { index: t });
        }
    }

    let num_kept_a = faces.len();

    for (s, idx) in b_indices.iter().enumerate() {
        let s = s as u32;
        let material = b_materials.get(s as usize).copied().unwrap_or(0);
        let pieces = cuts_b.cut(s, *idx, &mut positions).unwrap_or_else(|| {
            vec![CutPiece {
                vertices: *idx,
                barycentric: IDENTITY_BARYCENTRIC,
            }]
        });

        for piece in pieces {
            let center = triangle(&positions, &piece.vertices).center();
            // Parts of `b` on the surface of `a` never close the cavity.
            let on_a = surface_normal(&center, pairs_by_b.get(&s), &a_triangle).is_some();

            if !on_a && aabb_a.contains_local_point(&center) && inside_a(&center) {
                let [v0, v1, v2] = piece.vertices;
                let [b0, b1, b2] = piece.barycentric;
                faces.push(Face {
                    vertices: [v0, v2, v1],
                    source: TriangleSource::Subtracted(s),
                    barycentric: [b0, b2, b1],
                    material,
                    whole: false,
                });
            }
        }
    }

    if !dropped_any && faces.len() == num_kept_a {
        return unchanged();
    }

    // Merge the vertices of `b` that coincide with a vertex of `a`.
    for face in &mut faces {
        face.vertices = face.vertices.map(|v| points.resolve(v));
    }
    faces.retain(|face| {
        let [v0, v1, v2] = face.vertices;
        v0 != v1 && v1 != v2 && v2 != v0
    });

    log::debug!(
        "mesh subtraction: {} cut triangles, {} junction fixes, {} removed triangles",
        num_cut,
        junction_fixes.len(),
        removed_triangles.len()
    );

    /*
     * Compact the vertex buffer.
     */
    let mut used = vec![false; positions.len()];
    for face in &faces {
        for v in face.vertices {
            used[v as usize] = true;
        }
    }

    let mut remap = vec![u32::MAX; positions.len()];
    let mut new_vertices = vec![];
    let mut welded: HashMap<PointKey, u32> = HashMap::new();

    for (id, pt) in positions.iter().enumerate() {
        if !used[id] {
            continue;
        }

        if id as u32 >= num_a {
            if let Some(new) = welded.get(&PointKey(*pt)) {
                remap[id] = *new;
                continue;
            }
        }

        let new = new_vertices.len() as u32;
        new_vertices.push(*pt);
        remap[id] = new;
        let _ = welded.entry(PointKey(*pt)).or_insert(new);
    }

    if new_vertices.len() > MAX_MESH_VERTICES {
        log::warn!(
            "mesh subtraction aborted: the result needs {} vertices",
            new_vertices.len()
        );
        return Err(MeshSubtractionError::TooManyVertices);
    }

    let mut removed_vertices = vec![];
    let mut vertex_changes = vec![];
    // Original index of the new vertices that come from `a`.
    let mut new_to_old = vec![None; new_vertices.len()];

    for id in 0..num_a {
        let new = remap[id as usize];
        if new == u32::MAX {
            removed_vertices.push(RemovedVertex { index: id });
        } else {
            new_to_old[new as usize] = Some(id);
            if new != id {
                vertex_changes.push(VertexChange {
                    old: Some(id),
                    new,
                });
            }
        }
    }

    // Position in `vertex_changes` of each inserted vertex.
    let mut inserted = HashMap::new();
    for (new, old) in new_to_old.iter().enumerate() {
        if old.is_none() {
            let _ = inserted.insert(new as u32, vertex_changes.len());
            vertex_changes.push(VertexChange {
                old: None,
                new: new as u32,
            });
        }
    }

    let indices: Vec<[VertexIndex; 3]> = faces
        .iter()
        .map(|face| face.vertices.map(|v| remap[v as usize] as VertexIndex))
        .collect();
    let materials = mesh_a
        .materials()
        .map(|_| faces.iter().map(|face| face.material).collect());

    let mut triangle_changes = vec![];
    for (new, face) in faces.iter().enumerate() {
        let unmoved = face.whole && face.source == TriangleSource::Original(new as u32);
        if unmoved {
            continue;
        }

        let vertices = face.vertices.map(|v| {
            let new_v = remap[v as usize];
            match new_to_old[new_v as usize] {
                Some(old) => old as i32,
                None => -(inserted.get(&new_v).copied().unwrap_or(0) as i32) - 1,
            }
        });

        triangle_changes.push(TriangleChange {
            source: face.source,
            new: new as u32,
            barycentric: face.barycentric,
            vertices,
        });
    }

    let junction_fixes: Vec<_> = junction_fixes
        .into_iter()
        .filter_map(|(triangle, edge, vertex)| {
            let vertex = *remap.get(vertex as usize)?;
            (vertex != u32::MAX).then_some(JunctionVertexFix {
                triangle,
                edge,
                vertex,
            })
        })
        .collect();

    let result_mesh = mesh_a.with_same_settings(new_vertices, indices, materials)?;
    let moved_boxes = moved_boxes(mesh_a, &result_mesh);
    let result = SharedShape::from(result_mesh);

    let update = log_updates.then(|| MeshUpdate {
        source: a.clone(),
        result: result.clone(),
        removed_vertices,
        removed_triangles,
        vertex_changes,
        triangle_changes,
        junction_fixes,
        moved_boxes,
        relative_scale: 1.0,
    });

    Ok((result, update))
}

/// The closed surface of the subtracted shape, in the local frame of the edited mesh.
fn subtracted_surface(
    b: &Geometry,
    pose_ab: &Pose,
) -> Result<(Vec<Point<Real>>, Vec<[u32; 3]>, Vec<u8>), MeshSubtractionError> {
    let (vertices, indices, materials) = match b {
        Geometry::TriMesh(mesh) => (
            mesh.vertices().to_vec(),
            mesh.indices().iter().map(|t| t.map(u32::from)).collect(),
            mesh.materials().map(<[u8]>::to_vec).unwrap_or_default(),
        ),
        Geometry::Ray(_) | Geometry::HeightField(_) => {
            return Err(MeshSubtractionError::NotAMesh);
        }
        _ => {
            let (vertices, indices) = b.to_trimesh().ok_or(MeshSubtractionError::NotAMesh)?;
            (vertices, indices, vec![])
        }
    };

    let vertices = vertices
        .iter()
        .map(|pt| pose_ab.transform_point(pt))
        .collect();
    Ok((vertices, indices, materials))
}

fn moved_boxes(old: &TriMesh, new: &TriMesh) -> Vec<MovedBox> {
    let old_nodes = old.bv_tree().nodes();
    let new_nodes = new.bv_tree().nodes();

    (0..old_nodes.len().max(new_nodes.len()))
        .filter_map(|i| {
            let from = old_nodes.get(i).map(|n| n.volume);
            let to = new_nodes.get(i).map(|n| n.volume);
            (from != to).then_some(MovedBox {
                node: i as u32,
                from,
                to,
            })
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Vector;
    use crate::shape::{Ball, Cuboid, TriMeshBuilder};
    use crate::transformation::to_trimesh::cuboid_mesh;

    fn cube(half: Real) -> SharedShape {
        let (vtx, idx) = cuboid_mesh(Vector::repeat(half));
        SharedShape::trimesh(vtx, idx).unwrap()
    }

    fn mesh(shape: &SharedShape) -> &TriMesh {
        shape.as_trimesh().unwrap()
    }

    #[test]
    fn notch_in_a_cube() {
        let a = cube(1.0);
        let b = cube(0.5);
        let wd_b = WorldData::at(Vector::new(1.0, 0.1, 0.2));

        let (result, update) =
            subtract_meshes(&a, &WorldData::default(), &b, &wd_b, true).unwrap();
        let update = update.unwrap();

        assert!(!SharedShape::ptr_eq(&result, &a));
        assert_relative_eq!(mesh(&result).signed_volume(), 7.5, epsilon = 1.0e-3);
        assert!(SharedShape::ptr_eq(&update.source, &a));
        assert!(SharedShape::ptr_eq(&update.result, &result));
        assert!(!update.removed_triangles.is_empty());
        assert!(update
            .triangle_changes
            .iter()
            .any(|c| matches!(c.source, TriangleSource::Subtracted(_))));

        for change in &update.triangle_changes {
            for corner in change.vertices {
                assert!(update.resolve_vertex(corner).is_some());
            }
        }

        for pt in mesh(&result).vertices() {
            assert!(!(pt.x > 1.0 + 1.0e-4 || pt.y.abs() > 1.0 + 1.0e-4));
        }
    }

    #[test]
    fn carved_with_a_primitive() {
        let a = cube(1.0);
        let b = Geometry::Cuboid(Cuboid::axis_aligned(Vector::repeat(0.5)));
        let wd_b = WorldData::at(Vector::new(-1.0, 0.1, 0.2));

        let (result, _) = subtract_meshes(&a, &WorldData::default(), &b, &wd_b, false).unwrap();
        assert_relative_eq!(mesh(&result).signed_volume(), 7.5, epsilon = 1.0e-3);
    }

    #[test]
    fn enclosing_shape_removes_everything() {
        let a = cube(0.5);
        let b = cube(1.0);
        let (result, update) =
            subtract_meshes(&a, &WorldData::default(), &b, &WorldData::default(), true).unwrap();

        assert!(mesh(&result).is_empty());
        let update = update.unwrap();
        assert_eq!(update.removed_triangles.len(), 12);
        assert_eq!(update.removed_vertices.len(), 8);
    }

    #[test]
    fn disjoint_subtraction_is_the_identity() {
        let a = cube(0.5);
        let b = Geometry::Ball(Ball::new(Point::origin(), 0.5));
        let far = WorldData::at(Vector::new(10.0, 0.0, 0.0));

        let (result, update) = subtract_meshes(&a, &WorldData::default(), &b, &far, true).unwrap();
        assert!(SharedShape::ptr_eq(&result, &a));
        assert!(update.unwrap().is_empty());

        let (_, update) = subtract_meshes(&a, &WorldData::default(), &b, &far, false).unwrap();
        assert!(update.is_none());
    }

    #[test]
    fn flush_notch_keeps_the_mesh_closed() {
        let a = cube(1.0);
        let b = cube(0.5);

        // Flush with one face of `a`, then with two of them.
        for offset in [Vector::new(0.5, 0.0, 0.0), Vector::new(0.5, 0.5, 0.0)] {
            let (result, update) =
                subtract_meshes(&a, &WorldData::default(), &b, &WorldData::at(offset), true)
                    .unwrap();
            let result = mesh(&result);

            assert_relative_eq!(result.signed_volume(), 7.0, epsilon = 1.0e-3);
            assert!(result.topology().unwrap().is_closed());
            assert!(!update.unwrap().removed_triangles.is_empty());
        }
    }

    #[test]
    fn face_contact_is_the_identity() {
        let a = cube(1.0);
        let b = cube(0.5);
        let wd_b = WorldData::at(Vector::new(1.5, 0.0, 0.0));

        let (result, update) = subtract_meshes(&a, &WorldData::default(), &b, &wd_b, true).unwrap();
        assert!(SharedShape::ptr_eq(&result, &a));
        assert!(update.unwrap().is_empty());
        assert!(mesh(&result).topology().unwrap().is_closed());
    }

    #[test]
    fn subtracting_a_mesh_from_itself_empties_it() {
        let a = cube(1.0);

        for wd in [WorldData::default(), WorldData::at(Vector::new(3.0, -2.0, 0.5))] {
            let (result, update) = subtract_meshes(&a, &wd, &a, &wd, true).unwrap();
            assert!(mesh(&result).is_empty());
            assert_eq!(update.unwrap().removed_triangles.len(), 12);
        }
    }

    #[test]
    fn materials_follow_the_cut() {
        let (vtx, idx) = cuboid_mesh(Vector::repeat(1.0));
        let a = SharedShape::from_builder(
            TriMeshBuilder::new(vtx, idx.into_iter().flatten().collect())
                .materials((0..12).collect()),
        )
        .unwrap();
        let b = cube(0.5);
        let wd_b = WorldData::at(Vector::new(1.0, 0.1, 0.2));

        let (result, _) = subtract_meshes(&a, &WorldData::default(), &b, &wd_b, false).unwrap();
        let result = mesh(&result);
        assert_eq!(result.materials().map(<[u8]>::len), Some(result.num_triangles()));
    }

    #[test]
    fn rays_cannot_be_subtracted() {
        let a = cube(0.5);
        let ray = Geometry::Ray(crate::shape::Ray::new(Point::origin(), Vector::x()));
        let err = subtract_meshes(&a, &WorldData::default(), &ray, &WorldData::default(), false);
        assert_eq!(err.unwrap_err(), MeshSubtractionError::NotAMesh);

        let ball = SharedShape::new(Geometry::Ball(Ball::new(Point::origin(), 1.0))).unwrap();
        let err = subtract_meshes(&ball, &WorldData::default(), &a, &WorldData::default(), false);
        assert_eq!(err.unwrap_err(), MeshSubtractionError::NotAMesh);
    }
}
