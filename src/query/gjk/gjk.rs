//! The Gilbert-Johnson-Keerthi distance algorithm.

use arrayvec::ArrayVec;

use super::CsoPoint;
use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::shape::SupportMap;

const MAX_ITERATIONS: usize = 64;
const TETRAHEDRON_FACES: [([usize; 3], usize); 4] =
    [([0, 1, 2], 3), ([0, 1, 3], 2), ([0, 2, 3], 1), ([1, 2, 3], 0)];

type Selection = ArrayVec<(usize, Real), 4>;

/// Results of the GJK algorithm.
#[derive(Clone, Debug, PartialEq)]
pub enum GjkResult {
    /// The shapes overlap. The point lies inside of both of them.
    Intersection(Point<Real>),
    /// The shapes are disjoint. These are their closest points, in order.
    ClosestPoints(Point<Real>, Point<Real>),
}

/// Computes the closest points between two convex shapes expressed in the same frame.
///
/// Returns `None` if the shapes are further apart than `max_dist`.
pub fn closest_points<G1, G2>(g1: &G1, g2: &G2, max_dist: Real) -> Option<GjkResult>
where
    G1: ?Sized + SupportMap,
    G2: ?Sized + SupportMap,
{
    let eps_tol = DEFAULT_EPSILON * 100.0;
    let eps_rel = eps_tol.sqrt();
    let mut simplex: ArrayVec<CsoPoint, 4> = ArrayVec::new();
    simplex.push(CsoPoint::from_shapes(g1, g2, &Vector::x()));
    let mut prev_dist = Real::MAX;

    for _ in 0..MAX_ITERATIONS {
        let (proj, weights) = project_origin_and_reduce(&mut simplex);
        let dist = proj.coords.norm();
        let (p1, p2) = witnesses(&simplex, &weights);

        if dist <= eps_tol || simplex.len() == 4 {
            return Some(GjkResult::Intersection(na::center(&p1, &p2)));
        }

        if dist >= prev_dist {
            // No progress, the distance is as precise as it gets.
            return Some(GjkResult::ClosestPoints(p1, p2));
        }
        prev_dist = dist;

        let dir = -proj.coords / dist;
        let support = CsoPoint::from_shapes(g1, g2, &dir);
        let min_bound = -dir.dot(&support.point.coords);

        if min_bound > max_dist {
            return None;
        }

        if dist - min_bound <= eps_rel * dist
            || simplex.iter().any(|pt| pt.point == support.point)
        {
            return Some(GjkResult::ClosestPoints(p1, p2));
        }

        simplex.push(support);
    }

    let (_, weights) = project_origin_and_reduce(&mut simplex);
    let (p1, p2) = witnesses(&simplex, &weights);
    Some(GjkResult::ClosestPoints(p1, p2))
}

fn witnesses(simplex: &[CsoPoint], weights: &[Real]) -> (Point<Real>, Point<Real>) {
    let mut p1 = Vector::zeros();
    let mut p2 = Vector::zeros();

    for (pt, w) in simplex.iter().zip(weights.iter()) {
        p1 += pt.orig1.coords * *w;
        p2 += pt.orig2.coords * *w;
    }

    (Point::from(p1), Point::from(p2))
}

/// Projects the origin on the simplex, and removes the simplex vertices that do not
/// contribute to the projection.
///
/// Returns the projection and the barycentric weights of the remaining vertices.
fn project_origin_and_reduce(simplex: &mut ArrayVec<CsoPoint, 4>) -> (Point<Real>, ArrayVec<Real, 4>) {
    let pts: ArrayVec<Point<Real>, 4> = simplex.iter().map(|p| p.point).collect();
    let (proj, selection) = match pts.len() {
        1 => (pts[0], [(0, 1.0)].into_iter().collect()),
        2 => project_on_segment(&pts, [0, 1]),
        3 => project_on_triangle(&pts, [0, 1, 2]),
        _ => project_on_tetrahedron(&pts),
    };

    let reduced: ArrayVec<CsoPoint, 4> = selection.iter().map(|(i, _)| simplex[*i]).collect();
    *simplex = reduced;
    (proj, selection.iter().map(|(_, w)| *w).collect())
}

fn project_on_segment(pts: &[Point<Real>], ids: [usize; 2]) -> (Point<Real>, Selection) {
    let a = pts[ids[0]];
    let b = pts[ids[1]];
    let ab = b - a;
    let t = -a.coords.dot(&ab) / ab.norm_squared();
    let mut selection = Selection::new();

    // NOTE: the negated test also catches a degenerate segment.
    if !(t > 0.0) {
        selection.push((ids[0], 1.0));
        (a, selection)
    } else if t >= 1.0 {
        selection.push((ids[1], 1.0));
        (b, selection)
    } else {
        selection.push((ids[0], 1.0 - t));
        selection.push((ids[1], t));
        (a + ab * t, selection)
    }
}

// Inspired by Real-time collision detection by Christer Ericson.
fn project_on_triangle(pts: &[Point<Real>], ids: [usize; 3]) -> (Point<Real>, Selection) {
    let [ia, ib, ic] = ids;
    let (a, b, c) = (pts[ia], pts[ib], pts[ic]);
    let ab = b - a;
    let ac = c - a;
    let mut selection = Selection::new();

    let d1 = -ab.dot(&a.coords);
    let d2 = -ac.dot(&a.coords);
    if d1 <= 0.0 && d2 <= 0.0 {
        selection.push((ia, 1.0));
        return (a, selection);
    }

    let d3 = -ab.dot(&b.coords);
    let d4 = -ac.dot(&b.coords);
    if d3 >= 0.0 && d4 <= d3 {
        selection.push((ib, 1.0));
        return (b, selection);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        selection.push((ia, 1.0 - v));
        selection.push((ib, v));
        return (a + ab * v, selection);
    }

    let d5 = -ab.dot(&c.coords);
    let d6 = -ac.dot(&c.coords);
    if d6 >= 0.0 && d5 <= d6 {
        selection.push((ic, 1.0));
        return (c, selection);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        selection.push((ia, 1.0 - w));
        selection.push((ic, w));
        return (a + ac * w, selection);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        selection.push((ib, 1.0 - w));
        selection.push((ic, w));
        return (b + (c - b) * w, selection);
    }

    let sum = va + vb + vc;
    if sum <= DEFAULT_EPSILON {
        // Flat triangle: the closest point lies on one of its edges.
        return [[ia, ib], [ib, ic], [ia, ic]]
            .into_iter()
            .map(|edge| project_on_segment(pts, edge))
            .min_by(|x, y| x.0.coords.norm_squared().total_cmp(&y.0.coords.norm_squared()))
            .unwrap_or((a, selection));
    }

    let v = vb / sum;
    let w = vc / sum;
    selection.push((ia, 1.0 - v - w));
    selection.push((ib, v));
    selection.push((ic, w));
    (a + ab * v + ac * w, selection)
}

fn project_on_tetrahedron(pts: &[Point<Real>]) -> (Point<Real>, Selection) {
    let mut best: Option<(Point<Real>, Selection)> = None;

    for (face, opposite) in TETRAHEDRON_FACES {
        let [i, j, k] = face;
        let n = (pts[j] - pts[i]).cross(&(pts[k] - pts[i]));
        let side_origin = -n.dot(&pts[i].coords);
        let side_opposite = n.dot(&(pts[opposite] - pts[i]));

        if side_origin * side_opposite < 0.0 || side_opposite.abs() <= DEFAULT_EPSILON {
            let candidate = project_on_triangle(pts, face);
            let closer = best.as_ref().map_or(true, |(p, _)| {
                candidate.0.coords.norm_squared() < p.coords.norm_squared()
            });

            if closer {
                best = Some(candidate);
            }
        }
    }

    if let Some(best) = best {
        return best;
    }

    // The origin is inside of the tetrahedron.
    let (a, b, c, d) = (pts[0], pts[1], pts[2], pts[3]);
    let ab = b - a;
    let ac = c - a;
    let ad = d - a;
    let ao = -a.coords;
    let vol = ab.dot(&ac.cross(&ad));
    let wb = ao.dot(&ac.cross(&ad)) / vol;
    let wc = ab.dot(&ao.cross(&ad)) / vol;
    let wd = ab.dot(&ac.cross(&ao)) / vol;

    let selection = [(0, 1.0 - wb - wc - wd), (1, wb), (2, wc), (3, wd)]
        .into_iter()
        .collect();
    (Point::origin(), selection)
}
