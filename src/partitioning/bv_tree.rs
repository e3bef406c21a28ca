use crate::bounding_volume::{BoundingVolume, Obb};
use crate::math::Real;

/// The flavor of a bounding-volume tree.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BvTreeKind {
    /// Axis-aligned boxes in the mesh local frame.
    Aabb,
    /// Oriented boxes fitted on the principal axes of each node.
    Obb,
    /// A single oriented box around the whole mesh.
    SingleBox,
    /// Axis-aligned boxes in the principal frame of the whole mesh.
    RotatedAabb,
    /// Cells of a regular grid.
    VoxelGrid,
}

impl BvTreeKind {
    /// All the flavors, in the order they are tried.
    pub const ALL: [BvTreeKind; 5] = [
        BvTreeKind::Aabb,
        BvTreeKind::Obb,
        BvTreeKind::SingleBox,
        BvTreeKind::RotatedAabb,
        BvTreeKind::VoxelGrid,
    ];

    /// Is this flavor made of boxes sharing a single frame?
    ///
    /// The volume of these trees is divided by the AABB volume divisor when candidates compete.
    pub fn is_axis_aligned(self) -> bool {
        matches!(
            self,
            BvTreeKind::Aabb | BvTreeKind::RotatedAabb | BvTreeKind::VoxelGrid
        )
    }
}

/// A node of a bounding-volume tree.
///
/// Every node covers the contiguous range `first..first + count` of the tree's triangle list.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BvNode {
    /// The volume enclosing every triangle of this node, in the mesh local frame.
    pub volume: Obb,
    /// The two children of an internal node, `None` for leaves.
    pub children: Option<[u32; 2]>,
    /// The first triangle reference of this node.
    pub first: u32,
    /// The number of triangle references of this node.
    pub count: u32,
}

impl BvNode {
    /// Is this node a leaf?
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// A bounding-volume tree over the triangles of a mesh.
///
/// Nodes are stored in an arena, the root being the first node. Leaves reference triangles
/// through the tree's triangle list. With the voxel-grid flavor, a triangle overlapping
/// several cells is referenced once per cell.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct BvTree {
    pub(crate) kind: BvTreeKind,
    pub(crate) nodes: Vec<BvNode>,
    pub(crate) triangles: Vec<u32>,
}

impl BvTree {
    /// A tree without any node.
    pub fn empty(kind: BvTreeKind) -> Self {
        Self {
            kind,
            nodes: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// The flavor of this tree.
    pub fn kind(&self) -> BvTreeKind {
        self.kind
    }

    /// Does this tree have no node?
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All the nodes of this tree.
    pub fn nodes(&self) -> &[BvNode] {
        &self.nodes
    }

    /// The node with the given index.
    pub fn node(&self, id: u32) -> Option<&BvNode> {
        self.nodes.get(id as usize)
    }

    /// The root node of this tree.
    pub fn root(&self) -> Option<&BvNode> {
        self.nodes.first()
    }

    /// The triangle references of the given node.
    pub fn node_triangles(&self, node: &BvNode) -> &[u32] {
        let start = node.first as usize;
        &self.triangles[start..start + node.count as usize]
    }

    /// Iterates through the leaves of this tree with their index.
    pub fn leaves(&self) -> impl Iterator<Item = (u32, &BvNode)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_leaf())
            .map(|(i, n)| (i as u32, n))
    }

    /// The number of leaves of this tree.
    pub fn num_leaves(&self) -> usize {
        self.leaves().count()
    }

    /// The sum of the volumes of all the nodes of this tree.
    pub fn total_volume(&self) -> Real {
        self.nodes.iter().map(|n| n.volume.volume()).sum()
    }

    /// The volume used to rank this tree against other candidates.
    pub fn scaled_volume(&self, aabb_volume_divisor: Real) -> Real {
        if self.kind.is_axis_aligned() {
            self.total_volume() / aabb_volume_divisor
        } else {
            self.total_volume()
        }
    }
}
