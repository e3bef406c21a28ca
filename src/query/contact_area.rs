//! Merging of point contacts into areal contacts, and tracing of their borders.

use std::collections::VecDeque;

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::query::intersect::LeafRef;
use crate::query::leaf::{triangle_triangle_segment, LeafContact};
use crate::query::{Contact, ContactArea, ContactBorder, IntersectionFlags, IntersectionParameters};
use crate::shape::TopologyInfo;

/// A contact between two leaves, before merging.
#[derive(Copy, Clone, Debug)]
pub(crate) struct RawContact {
    pub contact: LeafContact,
    pub leaf1: u32,
    pub leaf2: u32,
}

type Topologies<'a> = (Option<&'a TopologyInfo>, Option<&'a TopologyInfo>);

/// A border segment with the triangles of each shape it comes from.
type Segment = (Point<Real>, Point<Real>, [u32; 2]);

/// Groups the raw contacts into point and areal contacts, and appends them to `out`.
///
/// Only the geometric fields of the contacts are set. The unprojection is left to
/// the caller.
pub(crate) fn assemble_contacts(
    raw: &[RawContact],
    leaves1: &[LeafRef],
    leaves2: &[LeafRef],
    topologies: Topologies,
    params: &IntersectionParameters,
    out: &mut Vec<Contact>,
) {
    let merge = !params
        .flags
        .intersects(IntersectionFlags::NO_AREA_CONTACTS | IntersectionFlags::SINGLE_CONTACT);
    let groups = if merge {
        group_contacts(raw, leaves1, leaves2, topologies, params.max_surface_gap_angle)
    } else {
        (0..raw.len()).map(|i| vec![i]).collect()
    };

    for group in groups {
        let primitives = |c: &RawContact| {
            let mut p1 = leaves1[c.leaf1 as usize].prim;
            let mut p2 = leaves2[c.leaf2 as usize].prim;
            p1.feature = c.contact.feature1;
            p2.feature = c.contact.feature2;
            [p1, p2]
        };

        let Some(deepest) = group
            .iter()
            .copied()
            .max_by(|a, b| raw[*a].contact.depth.total_cmp(&raw[*b].contact.depth))
        else {
            continue;
        };
        let rep = &raw[deepest];

        let mut contact = Contact {
            t: 0.0,
            point: rep.contact.point,
            normal: rep.contact.normal,
            dir: rep.contact.normal,
            vrel: 0.0,
            depth: rep.contact.depth,
            primitives: primitives(rep),
            area: None,
            borders: Vec::new(),
        };

        if group.len() > 1 {
            let normal = group
                .iter()
                .map(|i| raw[*i].contact.normal)
                .sum::<Vector<Real>>()
                .try_normalize(DEFAULT_EPSILON)
                .unwrap_or(rep.contact.normal);
            let points: Vec<_> = group.iter().map(|i| raw[*i].contact.point).collect();

            contact.point = crate::utils::center(&points);
            contact.normal = normal;
            contact.area = Some(ContactArea {
                normal,
                primitives: group.iter().map(|i| primitives(&raw[*i])).collect(),
                points,
            });
        }

        if !params.flags.contains(IntersectionFlags::NO_CONTACT_BORDER) {
            let segments: Vec<Segment> = group
                .iter()
                .filter_map(|i| {
                    let c = &raw[*i];
                    let l1 = &leaves1[c.leaf1 as usize];
                    let l2 = &leaves2[c.leaf2 as usize];
                    let (a, b) = triangle_triangle_segment(l1.triangle()?, l2.triangle()?)?;
                    Some((a, b, [l1.prim.id, l2.prim.id]))
                })
                .collect();

            let exact = params.flags.contains(IntersectionFlags::EXACT_BORDER);
            contact.borders = trace_borders(&segments, exact, topologies);
        }

        out.push(contact);
    }
}

/// Groups the contacts with close normals and adjacent primitives.
fn group_contacts(
    raw: &[RawContact],
    leaves1: &[LeafRef],
    leaves2: &[LeafRef],
    topologies: Topologies,
    max_gap_angle: Real,
) -> Vec<Vec<usize>> {
    let cos_gap = max_gap_angle.cos();
    let mut parents: Vec<usize> = (0..raw.len()).collect();

    fn find(parents: &mut [usize], mut i: usize) -> usize {
        while parents[i] != i {
            parents[i] = parents[parents[i]];
            i = parents[i];
        }
        i
    }

    let adjacent = |topo: Option<&TopologyInfo>, a: u32, b: u32| {
        topo.is_some_and(|topo| topo.are_adjacent(a, b))
    };

    for i in 0..raw.len() {
        for j in i + 1..raw.len() {
            let (ci, cj) = (&raw[i], &raw[j]);
            if ci.contact.normal.dot(&cj.contact.normal) < cos_gap {
                continue;
            }

            let id1 = |c: &RawContact| leaves1[c.leaf1 as usize].prim.id;
            let id2 = |c: &RawContact| leaves2[c.leaf2 as usize].prim.id;
            let touching = ci.leaf1 == cj.leaf1
                || ci.leaf2 == cj.leaf2
                || adjacent(topologies.0, id1(ci), id1(cj))
                || adjacent(topologies.1, id2(ci), id2(cj));

            if touching {
                let ri = find(&mut parents, i);
                let rj = find(&mut parents, j);
                parents[ri.max(rj)] = ri.min(rj);
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of_root = vec![usize::MAX; raw.len()];

    for i in 0..raw.len() {
        let root = find(&mut parents, i);
        if group_of_root[root] == usize::MAX {
            group_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[group_of_root[root]].push(i);
    }

    groups
}

/// Chains border segments into polylines.
///
/// With `exact` set, two segments are only chained if their triangles are topologically
/// consecutive, and each chain becomes its own border. Otherwise, segments are chained
/// by position only, and if they do not form a single polyline they are returned as one
/// unordered border.
fn trace_borders(segments: &[Segment], exact: bool, topologies: Topologies) -> Vec<ContactBorder> {
    if segments.is_empty() {
        return Vec::new();
    }

    let extents = Aabb::from_points(segments.iter().flat_map(|s| [&s.0, &s.1])).extents();
    let tol = (extents.norm() * 1.0e-4).max(DEFAULT_EPSILON.sqrt() * 1.0e-2);
    let close = |a: &Point<Real>, b: &Point<Real>| na::distance_squared(a, b) <= tol * tol;

    let adjacent = |topo: Option<&TopologyInfo>, a: u32, b: u32| {
        a == b || topo.is_some_and(|topo| topo.are_adjacent(a, b))
    };
    let consecutive = |s: &[u32; 2], t: &[u32; 2]| {
        !exact
            || (s[0] == t[0] && adjacent(topologies.1, s[1], t[1]))
            || (s[1] == t[1] && adjacent(topologies.0, s[0], t[0]))
    };

    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let (a, b, tris) = segments[start];
        let mut points = VecDeque::from([a, b]);
        let mut chain_tris = VecDeque::from([tris]);

        // Grow the tail, then the head.
        for at_tail in [true, false] {
            loop {
                let (end, end_tris) = if at_tail {
                    (points[points.len() - 1], chain_tris[chain_tris.len() - 1])
                } else {
                    (points[0], chain_tris[0])
                };

                let next = (0..segments.len()).find_map(|j| {
                    let (sa, sb, st) = &segments[j];
                    if used[j] || !consecutive(&end_tris, st) {
                        None
                    } else if close(sa, &end) {
                        Some((j, *sb))
                    } else if close(sb, &end) {
                        Some((j, *sa))
                    } else {
                        None
                    }
                });

                let Some((j, other)) = next else {
                    break;
                };
                used[j] = true;

                if at_tail {
                    points.push_back(other);
                    chain_tris.push_back(segments[j].2);
                } else {
                    points.push_front(other);
                    chain_tris.push_front(segments[j].2);
                }
            }
        }

        let closed = chain_tris.len() > 2 && close(&points[0], &points[points.len() - 1]);
        if closed {
            let _ = points.pop_back();
        }

        chains.push((Vec::from(points), Vec::from(chain_tris), closed));
    }

    if !exact && chains.len() > 1 {
        let points: Vec<_> = segments.iter().flat_map(|s| [s.0, s.1]).collect();
        return vec![ContactBorder {
            center: crate::utils::center(&points),
            points,
            segments: segments.iter().map(|s| s.2).collect(),
            closed: false,
            ordered: false,
        }];
    }

    chains
        .into_iter()
        .map(|(points, segments, closed)| ContactBorder {
            center: crate::utils::center(&points),
            points,
            segments,
            closed,
            ordered: true,
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn square_border_is_closed() {
        let p = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        // Shuffled and partially reversed segments.
        let segments = [
            (p[2], p[1], [1, 0]),
            (p[0], p[1], [0, 0]),
            (p[3], p[0], [3, 0]),
            (p[2], p[3], [2, 0]),
        ];

        let borders = trace_borders(&segments, false, (None, None));
        assert_eq!(borders.len(), 1);
        assert!(borders[0].closed && borders[0].ordered);
        assert_eq!(borders[0].points.len(), 4);
        assert_eq!(borders[0].num_segments(), 4);
        assert_relative_eq!(borders[0].center, Point::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn disconnected_segments_are_unordered() {
        let segments = [
            (Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0), [0, 0]),
            (Point::new(5.0, 0.0, 0.0), Point::new(6.0, 0.0, 0.0), [1, 1]),
        ];

        let borders = trace_borders(&segments, false, (None, None));
        assert_eq!(borders.len(), 1);
        assert!(!borders[0].ordered);
        assert_eq!(borders[0].segment(1), Some((segments[1].0, segments[1].1)));

        let borders = trace_borders(&segments, true, (None, None));
        assert_eq!(borders.len(), 2);
        assert!(borders.iter().all(|b| b.ordered && !b.closed));
    }
}
