use smallvec::SmallVec;

use super::{BvNode, BvTree};
use crate::bounding_volume::{BoundingVolume, Obb};
use crate::math::Pose;

const TRAVERSAL_STACK_SIZE: usize = 32;

impl BvTree {
    /// The node traversals start from: `start` if it is a valid node index, the root otherwise.
    fn start_node(&self, start: Option<u32>) -> Option<u32> {
        match start {
            Some(id) if (id as usize) < self.nodes.len() => Some(id),
            _ => (!self.nodes.is_empty()).then_some(0),
        }
    }

    /// Calls `f` on every leaf whose volume intersects `volume`.
    ///
    /// `volume` is expressed in the local frame of this tree. The traversal starts at `start`
    /// (or the root if `None`).
    pub fn traverse_intersecting_leaves(
        &self,
        volume: &Obb,
        start: Option<u32>,
        f: &mut impl FnMut(u32, &BvNode),
    ) {
        let Some(start) = self.start_node(start) else {
            return;
        };

        let mut stack: SmallVec<[u32; TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push(start);

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            if !node.volume.intersects(volume) {
                continue;
            }

            match node.children {
                Some([left, right]) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => f(id, node),
            }
        }
    }

    /// Traverses the Bounding Volume Test Tree of this tree against `other`.
    ///
    /// `pose` maps the local frame of `other` into the local frame of `self`. The closure `f`
    /// is called with the indices of each pair of leaves whose volumes intersect.
    pub fn traverse_bvtt(
        &self,
        other: &BvTree,
        pose: &Pose,
        starts: (Option<u32>, Option<u32>),
        f: &mut impl FnMut(u32, u32),
    ) {
        let (Some(start1), Some(start2)) = (self.start_node(starts.0), other.start_node(starts.1))
        else {
            return;
        };

        let mut stack: SmallVec<[(u32, u32); TRAVERSAL_STACK_SIZE]> = SmallVec::new();
        stack.push((start1, start2));

        while let Some((id1, id2)) = stack.pop() {
            let node1 = &self.nodes[id1 as usize];
            let node2 = &other.nodes[id2 as usize];
            let volume2 = node2.volume.transformed(pose);

            if !node1.volume.intersects(&volume2) {
                continue;
            }

            match (node1.children, node2.children) {
                (None, None) => f(id1, id2),
                (Some([l1, r1]), None) => {
                    stack.push((r1, id2));
                    stack.push((l1, id2));
                }
                (None, Some([l2, r2])) => {
                    stack.push((id1, r2));
                    stack.push((id1, l2));
                }
                (Some([l1, r1]), Some([l2, r2])) => {
                    // Descend into the larger volume first.
                    if node1.volume.volume() >= volume2.volume() {
                        stack.push((r1, id2));
                        stack.push((l1, id2));
                    } else {
                        stack.push((id1, r2));
                        stack.push((id1, l2));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::bounding_volume::{Aabb, Obb};
    use crate::math::{Pose, Vector};
    use crate::partitioning::{BvParameters, BvTree};
    use crate::shape::MeshFlags;
    use crate::transformation::to_trimesh::cuboid_mesh;

    #[test]
    fn bvtt_prunes_distant_trees() {
        let (vtx, idx) = cuboid_mesh(Vector::repeat(0.5));
        let tree = BvTree::build(&vtx, &idx, MeshFlags::AABB, &BvParameters::default());

        let mut pairs = 0;
        let near = Pose::translation(Vector::new(0.5, 0.0, 0.0));
        tree.traverse_bvtt(&tree, &near, (None, None), &mut |_, _| pairs += 1);
        assert!(pairs > 0);

        let mut pairs = 0;
        let far = Pose::translation(Vector::new(5.0, 0.0, 0.0));
        tree.traverse_bvtt(&tree, &far, (None, None), &mut |_, _| pairs += 1);
        assert_eq!(pairs, 0);
    }

    #[test]
    fn intersecting_leaves_query() {
        let (vtx, idx) = cuboid_mesh(Vector::repeat(0.5));
        let tree = BvTree::build(&vtx, &idx, MeshFlags::AABB, &BvParameters::default());
        let probe = Obb::from(Aabb::from_half_extents(
            [0.5, 0.0, 0.0].into(),
            Vector::repeat(0.05),
        ));
        let mut hit = Vec::new();
        tree.traverse_intersecting_leaves(&probe, None, &mut |_, leaf| {
            hit.extend_from_slice(tree.node_triangles(leaf))
        });
        assert!(!hit.is_empty());
        assert!(hit.len() < idx.len());
    }
}
