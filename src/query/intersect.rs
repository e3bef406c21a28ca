//! Pairwise intersection of placed shapes.

use std::collections::{HashMap, HashSet};

use crate::bounding_volume::{Aabb, BoundingVolume, Obb};
use crate::math::{Matrix, Point, Pose, Real, Vector, DEFAULT_EPSILON};
use crate::query::contact_area::{assemble_contacts, RawContact};
use crate::query::leaf::{leaf_contact, Leaf, Polytope};
use crate::query::{
    ContactBuffer, IntersectionFlags, IntersectionParameters, PrimitiveRef, UnprojectionMode,
    WorldData,
};
use crate::shape::{Cuboid, Geometry, TopologyInfo, TriMesh, Triangle};
use crate::transformation::to_trimesh::DEFAULT_SUBDIVISIONS;

/// Number of uniform samples of a sweep before the time of impact is refined.
const SWEEP_SAMPLES: u32 = 16;
/// Number of bisection steps refining the time of impact of a sweep.
const SWEEP_REFINEMENTS: u32 = 10;

/// A leaf of a shape, placed in world-space.
#[derive(Copy, Clone, Debug)]
pub(crate) struct LeafRef {
    pub leaf: Leaf,
    pub prim: PrimitiveRef,
    pub aabb: Aabb,
}

impl LeafRef {
    fn new(leaf: Leaf, prim: PrimitiveRef) -> Self {
        Self {
            aabb: leaf.aabb(),
            leaf,
            prim,
        }
    }

    pub fn triangle(&self) -> Option<&Triangle> {
        match &self.leaf.core {
            Polytope::Triangle(t) if self.leaf.radius == 0.0 => Some(t),
            _ => None,
        }
    }
}

/// Computes the contacts between two placed shapes.
///
/// The contacts are written to `out`, which is cleared first, and their number is returned.
/// Zero contacts is a regular outcome for shapes that do not touch.
pub fn intersect(
    shape1: &Geometry,
    wd1: &WorldData,
    shape2: &Geometry,
    wd2: &WorldData,
    params: &IntersectionParameters,
    out: &mut ContactBuffer,
) -> usize {
    out.clear();

    if shape1.is_empty() || shape2.is_empty() {
        return 0;
    }

    let pose1 = wd1.pose();
    let pose2 = wd2.pose();
    let sweep = params
        .sweep_step
        .filter(|step| *step > 0.0 && wd1.velocity.norm_squared() > 0.0);
    let sweep_shift = sweep.map_or_else(Vector::zeros, |step| wd1.velocity * step);

    let aabb1 = shape1.local_aabb().transform_by(&pose1);
    let swept1 = aabb1.merged(&translated(&aabb1, &sweep_shift));
    let aabb2 = shape2.local_aabb().transform_by(&pose2);
    let Some(region) = swept1.intersection(&aabb2) else {
        return 0;
    };

    let margin = (region.extents().norm() * 1.0e-4).max(DEFAULT_EPSILON);
    let region = region.loosened(margin);
    let region1 = region.merged(&translated(&region, &-sweep_shift));

    let (leaves1, leaves2, pairs) = match (shape1, shape2, sweep) {
        (Geometry::TriMesh(m1), Geometry::TriMesh(m2), None) => {
            mesh_mesh_candidates(m1, wd1, &pose1, m2, wd2, &pose2, &region)
        }
        _ => {
            let leaves1 = collect_leaves(shape1, wd1, &pose1, &region1);
            let leaves2 = collect_leaves(shape2, wd2, &pose2, &region);
            let mut pairs = Vec::new();
            for (i, l1) in leaves1.iter().enumerate() {
                let swept = l1.aabb.merged(&translated(&l1.aabb, &sweep_shift));
                for (j, l2) in leaves2.iter().enumerate() {
                    if swept.intersects(&l2.aabb) {
                        pairs.push((i as u32, j as u32));
                    }
                }
            }
            (leaves1, leaves2, pairs)
        }
    };

    if pairs.is_empty() {
        return 0;
    }

    let single = params.flags.contains(IntersectionFlags::SINGLE_CONTACT);
    let contacts_at = |shift: &Vector<Real>| -> Vec<RawContact> {
        let mut raw = Vec::new();
        for (i, j) in &pairs {
            let l1 = &leaves1[*i as usize];
            let l2 = &leaves2[*j as usize];
            let leaf1 = l1.leaf.translated(shift);

            if !leaf1.aabb().intersects(&l2.aabb) {
                continue;
            }

            if let Some(contact) = leaf_contact(&leaf1, &l2.leaf) {
                raw.push(RawContact {
                    contact,
                    leaf1: *i,
                    leaf2: *j,
                });

                if single {
                    break;
                }
            }
        }
        raw
    };

    let (raw, toi) = match sweep {
        None => (contacts_at(&Vector::zeros()), None),
        Some(step) => match sweep_test(&contacts_at, &wd1.velocity, step) {
            Some((raw, toi)) => (raw, Some(toi)),
            None => return 0,
        },
    };

    let raw = clip_contacts(raw, params, wd1, &toi.map_or_else(Vector::zeros, |t| wd1.velocity * t));
    if raw.is_empty() {
        return 0;
    }

    assemble_contacts(
        &raw,
        &leaves1,
        &leaves2,
        (mesh_topology(shape1), mesh_topology(shape2)),
        params,
        out.contacts_mut(),
    );

    for contact in out.contacts_mut().iter_mut() {
        let vrel = wd1.velocity_at(&contact.point) - wd2.velocity_at(&contact.point);
        contact.vrel = vrel.dot(&contact.normal);

        match toi {
            Some(toi) => {
                contact.t = toi;
                contact.dir = -wd1.velocity.normalize();
            }
            None => {
                let (t, dir) =
                    unproject(params, &contact.normal, contact.depth, &contact.point, &vrel);
                contact.t = t;
                contact.dir = dir;
            }
        }
    }

    out.len()
}

fn translated(aabb: &Aabb, shift: &Vector<Real>) -> Aabb {
    Aabb::new(aabb.mins + shift, aabb.maxs + shift)
}

/// Finds the earliest time in `[0, step]` at which the swept contacts are not empty.
fn sweep_test(
    contacts_at: &impl Fn(&Vector<Real>) -> Vec<RawContact>,
    velocity: &Vector<Real>,
    step: Real,
) -> Option<(Vec<RawContact>, Real)> {
    let mut prev_t = 0.0;

    for k in 0..=SWEEP_SAMPLES {
        let t = step * k as Real / SWEEP_SAMPLES as Real;
        let raw = contacts_at(&(velocity * t));

        if raw.is_empty() {
            prev_t = t;
            continue;
        }

        if k == 0 {
            return Some((raw, 0.0));
        }

        let (mut lo, mut hi, mut best) = (prev_t, t, raw);
        for _ in 0..SWEEP_REFINEMENTS {
            let mid = (lo + hi) / 2.0;
            let raw = contacts_at(&(velocity * mid));
            if raw.is_empty() {
                lo = mid;
            } else {
                hi = mid;
                best = raw;
            }
        }

        return Some((best, hi));
    }

    None
}

/// Drops the contacts lying on the positive side of the clipping plane.
fn clip_contacts(
    raw: Vec<RawContact>,
    params: &IntersectionParameters,
    wd1: &WorldData,
    shift: &Vector<Real>,
) -> Vec<RawContact> {
    let Some(normal) = params.clipping_plane else {
        return raw;
    };

    let origin = wd1.world_center_of_mass() + shift;
    raw.into_iter()
        .filter(|c| (c.contact.point - origin).dot(&normal) <= 0.0)
        .collect()
}

/// Computes the unprojection parameter and direction of the first shape.
pub(crate) fn unproject(
    params: &IntersectionParameters,
    normal: &Vector<Real>,
    depth: Real,
    point: &Point<Real>,
    vrel: &Vector<Real>,
) -> (Real, Vector<Real>) {
    let clip = |dist: Real| {
        if dist > params.max_unprojection_distance {
            log::debug!(
                "Unprojection of {} clipped to {}.",
                dist,
                params.max_unprojection_distance
            );
            params.max_unprojection_distance
        } else {
            dist
        }
    };

    match params.unprojection_mode {
        UnprojectionMode::Linear => {
            let speed = vrel.norm();
            if speed > params.minimal_relative_speed {
                let dir = -vrel / speed;
                let along = dir.dot(normal);
                if along > DEFAULT_EPSILON.sqrt() {
                    return (clip(depth / along), dir);
                }
            }

            (clip(depth), *normal)
        }
        UnprojectionMode::Rotational { center, axis } => {
            let Some(axis) = axis.try_normalize(DEFAULT_EPSILON) else {
                return (clip(depth), *normal);
            };

            // Velocity of the contact point for a unit angular speed around the axis.
            let tangent = axis.cross(&(point - center));
            let along = tangent.dot(normal);
            if along.abs() <= DEFAULT_EPSILON {
                return (0.0, axis);
            }

            (clip(depth) / along.abs(), axis * along.signum())
        }
    }
}

/// Collects the leaves of `shape` intersecting the world-space `region`.
fn collect_leaves(shape: &Geometry, wd: &WorldData, pose: &Pose, region: &Aabb) -> Vec<LeafRef> {
    let mut out = Vec::new();
    let single = |leaf: Leaf| LeafRef::new(leaf, PrimitiveRef::default());

    match shape {
        Geometry::TriMesh(mesh) => {
            let local = Obb::from(*region).transformed(&pose.inverse());
            let mut seen = HashSet::new();
            mesh.bv_tree()
                .traverse_intersecting_leaves(&local, wd.start_node, &mut |node_id, node| {
                    for tri in mesh.bv_tree().node_triangles(node) {
                        if seen.insert(*tri) {
                            let leaf = mesh_leaf(mesh, pose, *tri, node_id);
                            if leaf.aabb.intersects(region) {
                                out.push(leaf);
                            }
                        }
                    }
                });
        }
        Geometry::HeightField(heightfield) => {
            let inv = pose.inverse();
            let local = Aabb::from_points(region.vertices().map(|p| inv.transform_point(&p)).iter());
            heightfield.map_elements_in_local_aabb(&local, &mut |id, tri| {
                let prim = PrimitiveRef {
                    id,
                    ..PrimitiveRef::default()
                };
                out.push(LeafRef::new(Leaf::from(tri.transformed(pose)), prim));
            });
        }
        Geometry::Voxels(voxels) => {
            for (id, cell) in voxels.occupied_cells() {
                let aabb = voxels.cell_aabb(cell);
                if !aabb.transform_by(pose).intersects(region) {
                    continue;
                }

                let cuboid = Cuboid::new(aabb.center(), Matrix::identity(), aabb.half_extents());
                let prim = PrimitiveRef {
                    id,
                    ..PrimitiveRef::default()
                };
                out.push(LeafRef::new(Leaf::from(cuboid.transformed(pose)), prim));
            }
        }
        Geometry::Cylinder(cylinder) => {
            let (vtx, idx) = cylinder.to_trimesh(DEFAULT_SUBDIVISIONS);
            for (id, t) in idx.iter().enumerate() {
                let tri = Triangle::new(vtx[t[0] as usize], vtx[t[1] as usize], vtx[t[2] as usize])
                    .transformed(pose);
                let prim = PrimitiveRef {
                    id: id as u32,
                    ..PrimitiveRef::default()
                };
                let leaf = LeafRef::new(Leaf::from(tri), prim);
                if leaf.aabb.intersects(region) {
                    out.push(leaf);
                }
            }
        }
        Geometry::Capsule(s) => out.push(single(Leaf::from(s.transformed(pose)))),
        Geometry::Ray(s) => out.push(single(Leaf::from(s.transformed(pose)))),
        Geometry::Ball(s) => out.push(single(Leaf::from(s.transformed(pose)))),
        Geometry::Cuboid(s) => out.push(single(Leaf::from(s.transformed(pose)))),
    }

    out
}

fn mesh_leaf(mesh: &TriMesh, pose: &Pose, tri: u32, node: u32) -> LeafRef {
    let prim = PrimitiveRef {
        id: tri,
        container_id: mesh.topology().map_or(0, |topo| topo.island_of(tri)),
        feature: Default::default(),
        node: Some(node),
    };
    LeafRef::new(Leaf::from(mesh.triangle(tri).transformed(pose)), prim)
}

/// Candidate triangle pairs of two meshes, pruned by a simultaneous traversal of their trees.
fn mesh_topology(shape: &Geometry) -> Option<&TopologyInfo> {
    shape.as_trimesh().and_then(TriMesh::topology)
}

fn mesh_mesh_candidates(
    m1: &TriMesh,
    wd1: &WorldData,
    pose1: &Pose,
    m2: &TriMesh,
    wd2: &WorldData,
    pose2: &Pose,
    region: &Aabb,
) -> (Vec<LeafRef>, Vec<LeafRef>, Vec<(u32, u32)>) {
    let mut leaves1 = Vec::new();
    let mut leaves2 = Vec::new();
    let mut slots1 = HashMap::new();
    let mut slots2 = HashMap::new();
    let mut pairs = HashSet::new();
    let (tree1, tree2) = (m1.bv_tree(), m2.bv_tree());

    let slot = |mesh: &TriMesh,
                pose: &Pose,
                tri: u32,
                node: u32,
                slots: &mut HashMap<u32, Option<u32>>,
                leaves: &mut Vec<LeafRef>| {
        *slots.entry(tri).or_insert_with(|| {
            let leaf = mesh_leaf(mesh, pose, tri, node);
            leaf.aabb.intersects(region).then(|| {
                leaves.push(leaf);
                leaves.len() as u32 - 1
            })
        })
    };

    tree1.traverse_bvtt(
        tree2,
        &pose1.inv_mul(pose2),
        (wd1.start_node, wd2.start_node),
        &mut |n1, n2| {
            let (Some(node1), Some(node2)) = (tree1.node(n1), tree2.node(n2)) else {
                return;
            };

            for tri1 in tree1.node_triangles(node1) {
                let Some(i) = slot(m1, pose1, *tri1, n1, &mut slots1, &mut leaves1) else {
                    continue;
                };

                for tri2 in tree2.node_triangles(node2) {
                    let Some(j) = slot(m2, pose2, *tri2, n2, &mut slots2, &mut leaves2) else {
                        continue;
                    };

                    if leaves1[i as usize].aabb.intersects(&leaves2[j as usize].aabb) {
                        let _ = pairs.insert((i, j));
                    }
                }
            }
        },
    );

    let mut pairs: Vec<_> = pairs.into_iter().collect();
    pairs.sort_unstable();
    (leaves1, leaves2, pairs)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::query::with_local_contacts;
    use crate::shape::Ball;
    use crate::transformation::to_trimesh::cuboid_mesh;

    fn cube(half: Real) -> Geometry {
        let (vtx, idx) = cuboid_mesh(Vector::repeat(half));
        Geometry::TriMesh(TriMesh::new(vtx, idx).unwrap())
    }

    fn ball_on_box(params: &IntersectionParameters, wd1: WorldData) -> ContactBuffer {
        let ball = Geometry::Ball(Ball::new(Point::origin(), 0.5));
        let cuboid = Geometry::Cuboid(Cuboid::axis_aligned(Vector::new(3.0, 1.0, 3.0)));
        let mut out = ContactBuffer::new();
        let _ = intersect(&ball, &wd1, &cuboid, &WorldData::default(), params, &mut out);
        out
    }

    #[test]
    fn resting_ball_unprojects_along_the_normal() {
        let wd1 = WorldData::at(Vector::new(0.0, 1.4, 0.0));
        let out = ball_on_box(&IntersectionParameters::default(), wd1);

        assert_eq!(out.len(), 1);
        let contact = &out.contacts()[0];
        assert_relative_eq!(contact.normal, Vector::y(), epsilon = 1.0e-3);
        assert_relative_eq!(contact.dir, Vector::y(), epsilon = 1.0e-3);
        assert_relative_eq!(contact.t, 0.1, epsilon = 1.0e-3);
    }

    #[test]
    fn moving_ball_unprojects_against_its_velocity() {
        let wd1 = WorldData::at(Vector::new(0.0, 1.4, 0.0)).with_velocity(Vector::new(1.0, -1.0, 0.0));
        let out = ball_on_box(&IntersectionParameters::default(), wd1);

        let contact = &out.contacts()[0];
        let expected_dir = Vector::new(-1.0, 1.0, 0.0).normalize();
        assert_relative_eq!(contact.dir, expected_dir, epsilon = 1.0e-3);
        assert_relative_eq!(contact.t, 0.1 * Real::sqrt(2.0), epsilon = 1.0e-3);
        assert!(contact.vrel < 0.0);
    }

    #[test]
    fn unprojection_is_clamped() {
        let wd1 = WorldData::at(Vector::new(0.0, 1.4, 0.0));
        let params = IntersectionParameters::default().with_max_unprojection_distance(0.05);
        let out = ball_on_box(&params, wd1);
        assert_relative_eq!(out.contacts()[0].t, 0.05);
    }

    #[test]
    fn rotational_unprojection_reports_an_angle() {
        let wd1 = WorldData::at(Vector::new(2.0, 1.4, 0.0));
        let params = IntersectionParameters::default().with_unprojection_mode(
            UnprojectionMode::Rotational {
                center: Point::origin(),
                axis: Vector::z(),
            },
        );
        let out = ball_on_box(&params, wd1);

        let contact = &out.contacts()[0];
        assert_relative_eq!(contact.dir, Vector::z(), epsilon = 1.0e-3);
        assert_relative_eq!(contact.t, 0.05, epsilon = 1.0e-3);
    }

    #[test]
    fn clipping_plane_discards_contacts() {
        let wd1 = WorldData::at(Vector::new(0.0, 1.4, 0.0));
        let below = IntersectionParameters::default().with_clipping_plane(-Vector::y());
        assert!(ball_on_box(&below, wd1).is_empty());

        let above = IntersectionParameters::default().with_clipping_plane(Vector::y());
        assert_eq!(ball_on_box(&above, wd1).len(), 1);
    }

    #[test]
    fn sweep_finds_the_time_of_impact() {
        let wd1 = WorldData::at(Vector::new(0.0, 3.0, 0.0)).with_velocity(-Vector::y());
        let params = IntersectionParameters::default().with_sweep_step(2.0);
        let out = ball_on_box(&params, wd1);

        assert_eq!(out.len(), 1);
        assert_relative_eq!(out.contacts()[0].t, 1.5, epsilon = 1.0e-2);

        let short = IntersectionParameters::default().with_sweep_step(1.0);
        assert!(ball_on_box(&short, wd1).is_empty());
    }

    #[test]
    fn crossing_meshes() {
        let a = cube(0.5);
        let b = cube(0.5);
        let wd2 = WorldData::at(Vector::new(0.8, 0.1, 0.2));
        let mut out = ContactBuffer::new();

        let n = intersect(&a, &WorldData::default(), &b, &wd2, &Default::default(), &mut out);
        assert!(n > 0);
        assert!(out.iter().all(|c| relative_eq!(c.normal.norm(), 1.0, epsilon = 1.0e-4)));
        assert!(out.iter().any(|c| !c.borders.is_empty()));

        let single = IntersectionParameters::default().with_flags(IntersectionFlags::SINGLE_CONTACT);
        assert_eq!(intersect(&a, &WorldData::default(), &b, &wd2, &single, &mut out), 1);

        let far = WorldData::at(Vector::new(10.0, 0.0, 0.0));
        assert_eq!(intersect(&a, &WorldData::default(), &b, &far, &single, &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn local_buffer_holds_the_results() {
        let a = cube(0.5);
        let ball = Geometry::Ball(Ball::new(Point::origin(), 0.25));
        let wd2 = WorldData::at(Vector::new(0.0, 0.6, 0.0));

        let n = with_local_contacts(|buffer| {
            intersect(&a, &WorldData::default(), &ball, &wd2, &Default::default(), buffer)
        });
        assert!(n >= 1);
    }
}
