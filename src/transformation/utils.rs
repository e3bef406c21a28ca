//! Low-level utilities for mesh generation.

use crate::math::{Point, Pose, Real, Vector, MAX_MESH_VERTICES, PI};

/// Applies the pose `pose` to every point of `points`.
pub fn transform(points: &mut [Point<Real>], pose: &Pose) {
    points
        .iter_mut()
        .for_each(|p| *p = pose.transform_point(p));
}

/// Pushes a discretized counterclockwise circle of the plane `y` to a buffer.
#[inline]
pub fn push_circle(radius: Real, nsubdiv: u32, dtheta: Real, y: Real, out: &mut Vec<Point<Real>>) {
    let mut curr_theta: Real = 0.0;

    for _ in 0..nsubdiv {
        out.push(Point::new(
            curr_theta.cos() * radius,
            y,
            curr_theta.sin() * radius,
        ));
        curr_theta += dtheta;
    }
}

/// Creates the index buffer of a tube joining two circles of `nsubdiv` vertices each.
///
/// The circle starting at `base_upper` must be above the one starting at `base_lower`.
#[inline]
pub fn push_ring_indices(base_lower: u32, base_upper: u32, nsubdiv: u32, out: &mut Vec<[u32; 3]>) {
    for j in 0..nsubdiv {
        let a = base_lower + j;
        let b = base_lower + (j + 1) % nsubdiv;
        let c = base_upper + j;
        let d = base_upper + (j + 1) % nsubdiv;
        out.push([a, c, b]);
        out.push([b, c, d]);
    }
}

/// Closes the circle starting at `base` with a fan centered on the pole `pole` lying below it.
#[inline]
pub fn push_lower_fan_indices(pole: u32, base: u32, nsubdiv: u32, out: &mut Vec<[u32; 3]>) {
    for j in 0..nsubdiv {
        out.push([pole, base + j, base + (j + 1) % nsubdiv]);
    }
}

/// Closes the circle starting at `base` with a fan centered on the pole `pole` lying above it.
#[inline]
pub fn push_upper_fan_indices(base: u32, pole: u32, nsubdiv: u32, out: &mut Vec<[u32; 3]>) {
    for j in 0..nsubdiv {
        out.push([base + j, pole, base + (j + 1) % nsubdiv]);
    }
}

/// Triangulates the closed surface obtained by revolving `profile` around the `y` axis.
///
/// Each element of the profile is a `(radius, y)` pair, ordered from the bottom of the
/// surface to its top. A zero radius is a pole and yields a single vertex. Triangles are
/// wound counterclockwise when seen from the outside.
pub fn revolution(profile: &[(Real, Real)], nsubdiv: u32) -> (Vec<Point<Real>>, Vec<[u32; 3]>) {
    let nsubdiv = nsubdiv.max(3);
    let dtheta = PI * 2.0 / nsubdiv as Real;
    let mut vtx = Vec::new();
    let mut idx = Vec::new();
    let mut prev: Option<(u32, bool)> = None;

    for &(radius, y) in profile {
        let first = vtx.len() as u32;
        let is_pole = radius <= 0.0;

        if is_pole {
            vtx.push(Point::new(0.0, y, 0.0));
        } else {
            push_circle(radius, nsubdiv, dtheta, y, &mut vtx);
        }

        match prev {
            Some((base, false)) if !is_pole => push_ring_indices(base, first, nsubdiv, &mut idx),
            Some((base, false)) => push_upper_fan_indices(base, first, nsubdiv, &mut idx),
            Some((pole, true)) if !is_pole => push_lower_fan_indices(pole, first, nsubdiv, &mut idx),
            _ => {}
        }

        prev = Some((first, is_pole));
    }

    (vtx, idx)
}

/// Maps points expressed in a frame whose `y` axis is `axis` to world-space, after
/// translating them by `center`.
///
/// The mapping preserves orientation so the triangle winding is unchanged.
pub fn align_y_axis(points: &mut [Point<Real>], center: &Point<Real>, axis: &Vector<Real>) {
    let e1 = crate::utils::orthonormal_basis(axis)[0];
    let e2 = e1.cross(axis);

    for p in points.iter_mut() {
        *p = center + e1 * p.x + axis * p.y + e2 * p.z;
    }
}

/// Converts an index buffer to 16-bit indices, or `None` if it references a vertex
/// beyond the maximum number of vertices a triangle mesh can hold.
pub fn narrow_indices(idx: &[[u32; 3]]) -> Option<Vec<[u16; 3]>> {
    idx.iter()
        .map(|t| {
            if t.iter().all(|i| (*i as usize) < MAX_MESH_VERTICES) {
                Some([t[0] as u16, t[1] as u16, t[2] as u16])
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shape::Triangle;

    #[test]
    fn revolution_is_closed_and_outward() {
        let profile = [(0.0, -1.0), (1.0, -1.0), (1.0, 1.0), (0.0, 1.0)];
        let (vtx, idx) = revolution(&profile, 8);
        assert_eq!(vtx.len(), 18);
        assert_eq!(idx.len(), 32);

        for t in &idx {
            let tri = Triangle::new(
                vtx[t[0] as usize],
                vtx[t[1] as usize],
                vtx[t[2] as usize],
            );
            let n = tri.scaled_normal();
            assert!(n.dot(&tri.center().coords) > 0.0);
        }
    }

    #[test]
    fn narrowing_rejects_large_indices() {
        assert_eq!(narrow_indices(&[[0, 1, 2]]), Some(vec![[0, 1, 2]]));
        assert_eq!(narrow_indices(&[[0, 1, 70_000]]), None);
    }
}
