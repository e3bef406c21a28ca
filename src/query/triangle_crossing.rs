//! Crossing of two triangles, with the features of both triangles each crossing point lies on.

use arrayvec::ArrayVec;

use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::shape::{FeatureId, Triangle};
use crate::utils::closest_point_on_segment;

/// A point where two triangles cross.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleCrossingPoint {
    /// The location of the point.
    pub point: Point<Real>,
    /// The feature of the first triangle the point lies on.
    pub feature1: FeatureId,
    /// The feature of the second triangle the point lies on.
    pub feature2: FeatureId,
}

/// The crossing of two triangles.
#[derive(Clone, Debug, PartialEq)]
pub enum TriangleCrossing {
    /// The triangles are not coplanar and cross along a segment.
    Segment([TriangleCrossingPoint; 2]),
    /// The triangles lie on the same plane and overlap.
    Coplanar {
        /// The parts of the edges of the second triangle inside of the first one.
        cuts1: ArrayVec<[TriangleCrossingPoint; 2], 3>,
        /// The parts of the edges of the first triangle inside of the second one.
        cuts2: ArrayVec<[TriangleCrossingPoint; 2], 3>,
    },
}

/// The tolerance used by [`triangle_crossing`] for shapes of the given size.
pub fn crossing_tolerance(scale: Real) -> Real {
    scale.max(1.0) * DEFAULT_EPSILON.sqrt() * 0.1
}

/// The endpoint of the section of a triangle by a plane.
#[derive(Copy, Clone, Debug)]
struct SectionEnd {
    param: Real,
    point: Point<Real>,
    feature: FeatureId,
}

/// The section of a triangle by a plane, parametrized along the crossing line.
#[derive(Copy, Clone, Debug)]
struct Section {
    ends: [SectionEnd; 2],
    /// The feature the inner points of the section lie on.
    inner: FeatureId,
}

/// Computes how two triangles cross.
///
/// Points closer than `tolerance` to a vertex or an edge are snapped to it, and triangles
/// closer than `tolerance` to the plane of the other are treated as coplanar. Triangles
/// touching at a single point do not cross.
pub fn triangle_crossing(
    tri1: &Triangle,
    tri2: &Triangle,
    tolerance: Real,
) -> Option<TriangleCrossing> {
    let n1 = tri1.normal()?;
    let n2 = tri2.normal()?;

    let Some(dir) = n1.cross(&n2).try_normalize(1.0e-6) else {
        if (tri1.a - tri2.a).dot(&n2).abs() > tolerance {
            return None;
        }

        return coplanar_crossing(tri1, &n1, tri2, &n2, tolerance);
    };

    let s1 = plane_section(tri1, &tri2.a, &n2, &dir, tolerance)?;
    let s2 = plane_section(tri2, &tri1.a, &n1, &dir, tolerance)?;

    if s1.ends[1].param <= s2.ends[0].param + tolerance
        || s2.ends[1].param <= s1.ends[0].param + tolerance
    {
        return None;
    }

    let merge = |e1: &SectionEnd, e2: &SectionEnd, take_first: bool| {
        if (e1.param - e2.param).abs() <= tolerance {
            let point = if e1.feature.vertex().is_some() || e2.feature.vertex().is_none() {
                e1.point
            } else {
                e2.point
            };
            TriangleCrossingPoint {
                point,
                feature1: e1.feature,
                feature2: e2.feature,
            }
        } else if take_first {
            TriangleCrossingPoint {
                point: e1.point,
                feature1: e1.feature,
                feature2: s2.inner,
            }
        } else {
            TriangleCrossingPoint {
                point: e2.point,
                feature1: s1.inner,
                feature2: e2.feature,
            }
        }
    };

    let lo = merge(&s1.ends[0], &s2.ends[0], s1.ends[0].param > s2.ends[0].param);
    let hi = merge(&s1.ends[1], &s2.ends[1], s1.ends[1].param < s2.ends[1].param);

    Some(TriangleCrossing::Segment([lo, hi]))
}

/// The section of `tri` by the plane through `origin` with normal `normal`.
///
/// Returns `None` if the section is empty, reduced to a point, or if the whole triangle lies
/// on the plane.
fn plane_section(
    tri: &Triangle,
    origin: &Point<Real>,
    normal: &Vector<Real>,
    dir: &Vector<Real>,
    tolerance: Real,
) -> Option<Section> {
    let vtx = tri.vertices();
    let dist = vtx.map(|v| {
        let d = (v - origin).dot(normal);
        if d.abs() <= tolerance {
            0.0
        } else {
            d
        }
    });

    let on_plane: ArrayVec<usize, 3> = (0..3).filter(|i| dist[*i] == 0.0).collect();
    if on_plane.len() == 3 {
        return None;
    }

    let mut hits: ArrayVec<(Point<Real>, FeatureId), 3> = ArrayVec::new();

    for i in &on_plane {
        hits.push((vtx[*i], FeatureId::Vertex(*i as u32)));
    }

    for k in 0..3 {
        let (i, j) = (k, (k + 1) % 3);
        if dist[i] * dist[j] < 0.0 {
            let t = dist[i] / (dist[i] - dist[j]);
            hits.push((vtx[i] + (vtx[j] - vtx[i]) * t, FeatureId::Edge(k as u32)));
        }
    }

    let mut ends = hits.iter().map(|(point, feature)| SectionEnd {
        param: dir.dot(&point.coords),
        point: *point,
        feature: *feature,
    });
    let first = ends.next()?;
    let (lo, hi) = ends.fold((first, first), |(lo, hi), e| {
        (
            if e.param < lo.param { e } else { lo },
            if e.param > hi.param { e } else { hi },
        )
    });

    if hi.param - lo.param <= tolerance {
        return None;
    }

    let inner = match on_plane[..] {
        [i, j] => {
            // The section runs along the edge joining `i` and `j`.
            let k = if (i + 1) % 3 == j { i } else { j };
            FeatureId::Edge(k as u32)
        }
        _ => FeatureId::Face(0),
    };

    Some(Section {
        ends: [lo, hi],
        inner,
    })
}

/// The feature of `tri` the point `pt`, assumed to lie on its plane and inside of it, is on.
fn locate(tri: &Triangle, pt: &Point<Real>, tolerance: Real) -> FeatureId {
    let vtx = tri.vertices();

    if let Some(i) = (0..3).find(|i| na::distance(&vtx[*i], pt) <= tolerance) {
        return FeatureId::Vertex(i as u32);
    }

    if let Some(k) = (0..3).find(|k| {
        let (a, b) = tri.edge(*k);
        na::distance(&closest_point_on_segment(&a, &b, pt), pt) <= tolerance
    }) {
        return FeatureId::Edge(k as u32);
    }

    FeatureId::Face(0)
}

/// Clips the edges of `edges_of` to the inside of `clip`, both triangles being coplanar.
///
/// The returned points have their features expressed as `(feature of clip, feature of
/// edges_of)`.
fn clip_edges(
    clip: &Triangle,
    clip_normal: &Vector<Real>,
    edges_of: &Triangle,
    tolerance: Real,
) -> ArrayVec<[(Point<Real>, FeatureId, FeatureId); 2], 3> {
    let clip_vtx = clip.vertices();
    let inward: [Vector<Real>; 3] = [0, 1, 2].map(|k| {
        let (a, b) = clip.edge(k);
        clip_normal.cross(&(b - a)).normalize()
    });
    let signed_dist =
        |k: usize, pt: &Point<Real>| (pt - clip_vtx[k]).dot(&inward[k]);

    let mut out = ArrayVec::new();

    for k in 0..3 {
        let (p, q) = edges_of.edge(k);
        let len = na::distance(&p, &q);
        let (mut s0, mut s1): (Real, Real) = (0.0, 1.0);
        let mut outside = false;

        for e in 0..3 {
            let (dp, dq) = (signed_dist(e, &p), signed_dist(e, &q));

            if dp < -tolerance && dq < -tolerance {
                outside = true;
                break;
            }

            if dp < -tolerance {
                s0 = s0.max(dp / (dp - dq));
            } else if dq < -tolerance {
                s1 = s1.min(dp / (dp - dq));
            }
        }

        if outside || (s1 - s0) * len <= tolerance {
            continue;
        }

        let end = |s: Real| {
            let feature_of_edge = if s * len <= tolerance {
                FeatureId::Vertex(k as u32)
            } else if (1.0 - s) * len <= tolerance {
                FeatureId::Vertex(((k + 1) % 3) as u32)
            } else {
                FeatureId::Edge(k as u32)
            };
            let point = match feature_of_edge {
                FeatureId::Vertex(i) => edges_of.vertices()[i as usize],
                _ => p + (q - p) * s,
            };
            let feature_of_clip = locate(clip, &point, tolerance);
            let point = match feature_of_clip {
                FeatureId::Vertex(i) => clip_vtx[i as usize],
                _ => point,
            };
            (point, feature_of_clip, feature_of_edge)
        };

        out.push([end(s0), end(s1)]);
    }

    out
}

fn coplanar_crossing(
    tri1: &Triangle,
    n1: &Vector<Real>,
    tri2: &Triangle,
    n2: &Vector<Real>,
    tolerance: Real,
) -> Option<TriangleCrossing> {
    let cuts1: ArrayVec<_, 3> = clip_edges(tri1, n1, tri2, tolerance)
        .into_iter()
        .map(|seg| {
            seg.map(|(point, feature1, feature2)| TriangleCrossingPoint {
                point,
                feature1,
                feature2,
            })
        })
        .collect();
    let cuts2: ArrayVec<_, 3> = clip_edges(tri2, n2, tri1, tolerance)
        .into_iter()
        .map(|seg| {
            seg.map(|(point, feature2, feature1)| TriangleCrossingPoint {
                point,
                feature1,
                feature2,
            })
        })
        .collect();

    if cuts1.is_empty() && cuts2.is_empty() {
        return None;
    }

    Some(TriangleCrossing::Coplanar { cuts1, cuts2 })
}
