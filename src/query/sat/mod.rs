//! Application of the Separating-Axis-Theorem (SAT) to polytopes.

use arrayvec::ArrayVec;

use crate::math::{Real, Vector, DEFAULT_EPSILON};
use crate::query::leaf::Polytope;

/// Finds the axis along which the two polytopes overlap the least.
///
/// Returns the axis, oriented from `p1` toward `p2`, and the overlap along it. Returns
/// `None` if a separating axis exists.
pub fn min_overlap_axis(p1: &Polytope, p2: &Polytope) -> Option<(Vector<Real>, Real)> {
    let mut axes: ArrayVec<Vector<Real>, 32> = ArrayVec::new();
    let edges1 = p1.edge_dirs();
    let edges2 = p2.edge_dirs();

    axes.extend(p1.face_normals());
    axes.extend(p2.face_normals());

    for e1 in &edges1 {
        for e2 in &edges2 {
            axes.push(e1.cross(e2));
        }
    }

    let centers = p2.center() - p1.center();
    axes.push(centers);

    let mut best: Option<(Vector<Real>, Real)> = None;

    for axis in axes {
        let Some(axis) = axis.try_normalize(DEFAULT_EPSILON) else {
            continue;
        };

        let (min1, max1) = p1.project(&axis);
        let (min2, max2) = p2.project(&axis);
        let overlap = max1.min(max2) - min1.max(min2);

        if overlap < 0.0 {
            return None;
        }

        if best.map_or(true, |(_, o)| overlap < o) {
            // Orient the axis from the first polytope toward the second one.
            let forward = max1 - min2;
            let backward = max2 - min1;
            let oriented = if forward < backward
                || (forward == backward && axis.dot(&centers) >= 0.0)
            {
                axis
            } else {
                -axis
            };
            best = Some((oriented, overlap));
        }
    }

    // Two points at the same location have no meaningful axis.
    Some(best.unwrap_or((Vector::y(), 0.0)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{Matrix, Point};
    use crate::shape::Cuboid;

    #[test]
    fn overlapping_cuboids_separate_along_the_shallowest_axis() {
        let c1 = Polytope::Cuboid(Cuboid::axis_aligned(Vector::repeat(1.0)));
        let c2 = Polytope::Cuboid(Cuboid::new(
            Point::new(1.8, 0.5, 0.0),
            Matrix::identity(),
            Vector::repeat(1.0),
        ));

        let (axis, overlap) = min_overlap_axis(&c1, &c2).unwrap();
        assert_relative_eq!(axis, Vector::x(), epsilon = 1.0e-5);
        assert_relative_eq!(overlap, 0.2, epsilon = 1.0e-5);
    }

    #[test]
    fn disjoint_segment_and_cuboid() {
        let c1 = Polytope::Cuboid(Cuboid::axis_aligned(Vector::repeat(1.0)));
        let s = Polytope::Segment(Point::new(2.0, -1.0, 0.0), Point::new(2.0, 1.0, 0.0));
        assert!(min_overlap_axis(&c1, &s).is_none());
    }
}
