use crate::bounding_volume::Obb;
use crate::math::Real;
use crate::shape::SharedShape;

/// A vertex of the original mesh that no triangle of the result references anymore.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RemovedVertex {
    /// Index of the vertex in the original mesh.
    pub index: u32,
}

/// A triangle of the original mesh absent from the result, either carved away or split.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RemovedTriangle {
    /// Index of the triangle in the original mesh.
    pub index: u32,
}

/// A vertex of the result whose index differs from the original one, or which is new.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VertexChange {
    /// Index of the vertex in the original mesh, `None` for inserted vertices.
    pub old: Option<u32>,
    /// Index of the vertex in the resulting mesh.
    pub new: u32,
}

/// The triangle a triangle of the result was cut from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum TriangleSource {
    /// A triangle of the original mesh.
    Original(u32),
    /// A triangle of the subtracted shape, now bounding the carved cavity.
    Subtracted(u32),
}

/// A triangle of the result that is new, split, or moved to another index.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct TriangleChange {
    /// The triangle this one was cut from.
    pub source: TriangleSource,
    /// Index of the triangle in the resulting mesh.
    pub new: u32,
    /// For each corner, its barycentric coordinates relative to the source triangle.
    ///
    /// Per-vertex attributes of the source triangle are remapped with these weights.
    pub barycentric: [[Real; 3]; 3],
    /// For each corner, the index of the original vertex it comes from if non-negative.
    ///
    /// A negative entry `v` refers to `vertex_changes[-v - 1]` instead.
    pub vertices: [i32; 3],
}

/// The split of a triangle that would otherwise keep a T-junction along one of its edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct JunctionVertexFix {
    /// The original triangle that had to be split.
    pub triangle: u32,
    /// The edge of the triangle holding the junction vertex.
    pub edge: u8,
    /// Index of the junction vertex in the resulting mesh.
    pub vertex: u32,
}

/// A node of the bounding-volume tree whose box differs between the original and the result.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MovedBox {
    /// Index of the node in both trees.
    pub node: u32,
    /// The box in the original tree, if it had that node.
    pub from: Option<Obb>,
    /// The box in the resulting tree, if it has that node.
    pub to: Option<Obb>,
}

/// The record of one boolean edit of a mesh.
#[derive(Clone, Debug)]
pub struct MeshUpdate {
    /// The edited shape.
    pub source: SharedShape,
    /// The shape resulting from the edit.
    pub result: SharedShape,
    /// Vertices of `source` absent from `result`.
    pub removed_vertices: Vec<RemovedVertex>,
    /// Triangles of `source` absent from `result`.
    pub removed_triangles: Vec<RemovedTriangle>,
    /// Moved and inserted vertices.
    pub vertex_changes: Vec<VertexChange>,
    /// Moved, split and inserted triangles.
    pub triangle_changes: Vec<TriangleChange>,
    /// Triangles split to remove T-junctions.
    pub junction_fixes: Vec<JunctionVertexFix>,
    /// Bounding-volume tree nodes whose placement changed.
    pub moved_boxes: Vec<MovedBox>,
    /// The scale of `result` relative to `source`.
    pub relative_scale: Real,
}

impl MeshUpdate {
    /// An update recording no change at all.
    pub fn empty(source: SharedShape, result: SharedShape) -> Self {
        Self {
            source,
            result,
            removed_vertices: vec![],
            removed_triangles: vec![],
            vertex_changes: vec![],
            triangle_changes: vec![],
            junction_fixes: vec![],
            moved_boxes: vec![],
            relative_scale: 1.0,
        }
    }

    /// Does this update record no change?
    pub fn is_empty(&self) -> bool {
        self.removed_vertices.is_empty()
            && self.removed_triangles.is_empty()
            && self.vertex_changes.is_empty()
            && self.triangle_changes.is_empty()
            && self.junction_fixes.is_empty()
            && self.moved_boxes.is_empty()
    }

    /// The index in the resulting mesh of the vertex a [`TriangleChange`] corner refers to.
    ///
    /// Returns `None` if the corner refers to an original vertex that was not kept.
    pub fn resolve_vertex(&self, corner: i32) -> Option<u32> {
        if corner < 0 {
            let change = self.vertex_changes.get((-corner - 1) as usize)?;
            return Some(change.new);
        }

        let old = corner as u32;

        if self.removed_vertices.iter().any(|v| v.index == old) {
            return None;
        }

        Some(
            self.vertex_changes
                .iter()
                .find(|c| c.old == Some(old))
                .map(|c| c.new)
                .unwrap_or(old),
        )
    }
}

/// Error returned when appending an update to a [`MeshUpdateLog`].
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeshUpdateLogError {
    /// The update does not edit the latest shape of the lineage.
    #[error("the update does not start from the latest shape of the log")]
    Detached,
}

/// The forward-only chain of edits applied to one mesh lineage.
#[derive(Clone, Debug)]
pub struct MeshUpdateLog {
    origin: SharedShape,
    updates: Vec<MeshUpdate>,
}

impl MeshUpdateLog {
    /// Starts a lineage at `origin`.
    pub fn new(origin: SharedShape) -> Self {
        Self {
            origin,
            updates: vec![],
        }
    }

    /// The first shape of the lineage.
    pub fn origin(&self) -> &SharedShape {
        &self.origin
    }

    /// The latest shape of the lineage.
    pub fn latest(&self) -> &SharedShape {
        self.updates
            .last()
            .map(|update| &update.result)
            .unwrap_or(&self.origin)
    }

    /// Appends an update and returns its position in the chain.
    ///
    /// The update must edit the latest shape of the lineage.
    pub fn append(&mut self, update: MeshUpdate) -> Result<usize, MeshUpdateLogError> {
        if !SharedShape::ptr_eq(&update.source, self.latest()) {
            return Err(MeshUpdateLogError::Detached);
        }

        self.updates.push(update);
        Ok(self.updates.len() - 1)
    }

    /// The number of updates in the chain.
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Is the chain empty?
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// The `i`-th update of the chain.
    pub fn get(&self, i: usize) -> Option<&MeshUpdate> {
        self.updates.get(i)
    }

    /// Iterates through the updates following the `i`-th one, included.
    pub fn walk_from(&self, i: usize) -> impl Iterator<Item = &MeshUpdate> + '_ {
        self.updates.get(i..).unwrap_or(&[]).iter()
    }

    /// The scale of the latest shape relative to the origin.
    pub fn cumulative_scale(&self) -> Real {
        self.updates.iter().map(|u| u.relative_scale).product()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Point;
    use crate::shape::{Ball, Geometry};

    fn ball(radius: Real) -> SharedShape {
        SharedShape::new(Geometry::Ball(Ball::new(Point::origin(), radius))).unwrap()
    }

    #[test]
    fn log_is_forward_only() {
        let a = ball(1.0);
        let b = ball(2.0);
        let c = ball(3.0);
        let mut log = MeshUpdateLog::new(a.clone());

        assert_eq!(log.append(MeshUpdate::empty(a.clone(), b.clone())), Ok(0));
        assert_eq!(
            log.append(MeshUpdate::empty(a.clone(), c.clone())),
            Err(MeshUpdateLogError::Detached)
        );
        assert_eq!(log.append(MeshUpdate::empty(b.clone(), c.clone())), Ok(1));

        assert!(SharedShape::ptr_eq(log.latest(), &c));
        assert_eq!(log.walk_from(1).count(), 1);
        assert_eq!(log.walk_from(5).count(), 0);
        assert!(log.walk_from(0).all(MeshUpdate::is_empty));
    }

    #[test]
    fn resolve_negative_corners() {
        let a = ball(1.0);
        let mut update = MeshUpdate::empty(a.clone(), a);
        update.vertex_changes.push(VertexChange { old: Some(4), new: 2 });
        update.vertex_changes.push(VertexChange { old: None, new: 7 });
        update.removed_vertices.push(RemovedVertex { index: 3 });

        assert_eq!(update.resolve_vertex(-2), Some(7));
        assert_eq!(update.resolve_vertex(4), Some(2));
        assert_eq!(update.resolve_vertex(3), None);
        assert_eq!(update.resolve_vertex(1), Some(1));
    }
}
