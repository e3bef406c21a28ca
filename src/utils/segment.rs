use crate::math::{Point, Real, DEFAULT_EPSILON};

/// The point of the segment `[a, b]` closest to `pt`.
pub fn closest_point_on_segment(a: &Point<Real>, b: &Point<Real>, pt: &Point<Real>) -> Point<Real> {
    let ab = b - a;
    let sqnab = ab.norm_squared();

    if sqnab <= DEFAULT_EPSILON {
        return *a;
    }

    let t = na::clamp((pt - a).dot(&ab) / sqnab, 0.0, 1.0);
    a + ab * t
}

/// Parameters `(s, t)` of the closest points between the segments `[a1, b1]` and `[a2, b2]`.
///
/// The closest points are `a1 + (b1 - a1) * s` and `a2 + (b2 - a2) * t`.
// Inspired by Real-time collision detection by Christer Ericson.
pub fn closest_points_segment_segment(
    seg1: (&Point<Real>, &Point<Real>),
    seg2: (&Point<Real>, &Point<Real>),
) -> (Real, Real) {
    let d1 = seg1.1 - seg1.0;
    let d2 = seg2.1 - seg2.0;
    let r = seg1.0 - seg2.0;

    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let eps = DEFAULT_EPSILON;
    if a <= eps && e <= eps {
        return (0.0, 0.0);
    }

    if a <= eps {
        return (0.0, na::clamp(f / e, 0.0, 1.0));
    }

    let c = d1.dot(&r);
    if e <= eps {
        return (na::clamp(-c / a, 0.0, 1.0), 0.0);
    }

    let b = d1.dot(&d2);
    let ae = a * e;
    let bb = b * b;
    let denom = ae - bb;

    // Use absolute and ulps error to test collinearity.
    let mut s = if denom > eps && !ulps_eq!(ae, bb) {
        na::clamp((b * f - c * e) / denom, 0.0, 1.0)
    } else {
        0.0
    };

    let mut t = (b * s + f) / e;

    if t < 0.0 {
        t = 0.0;
        s = na::clamp(-c / a, 0.0, 1.0);
    } else if t > 1.0 {
        t = 1.0;
        s = na::clamp((b - c) / a, 0.0, 1.0);
    }

    (s, t)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn crossing_segments() {
        let (s, t) = closest_points_segment_segment(
            (&Point::new(-1.0, 0.0, 0.0), &Point::new(1.0, 0.0, 0.0)),
            (&Point::new(0.0, -1.0, 1.0), &Point::new(0.0, 1.0, 1.0)),
        );
        assert_relative_eq!(s, 0.5);
        assert_relative_eq!(t, 0.5);
    }

    #[test]
    fn point_projected_on_segment_is_clamped() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(1.0, 0.0, 0.0);
        let p = closest_point_on_segment(&a, &b, &Point::new(2.0, 1.0, 0.0));
        assert_eq!(p, b);
        let p = closest_point_on_segment(&a, &b, &Point::new(0.25, 1.0, 0.0));
        assert_relative_eq!(p, Point::new(0.25, 0.0, 0.0));
    }
}
