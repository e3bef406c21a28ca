use crate::math::Real;

/// Clamps a coordinate to the range of values accepted by `spade`.
///
/// Coordinates too close to zero are flushed to `0.0`.
pub fn sanitize_spade_coord(coord: Real) -> f64 {
    let coord = coord as f64;

    if coord.abs() <= spade::MIN_ALLOWED_VALUE {
        return 0.0;
    }

    if coord.abs() > spade::MAX_ALLOWED_VALUE {
        return spade::MAX_ALLOWED_VALUE * coord.signum();
    }

    coord
}

/// Converts a 2D point into a `spade` point with sanitized coordinates.
pub fn sanitize_spade_point(x: Real, y: Real) -> spade::Point2<f64> {
    spade::Point2::new(sanitize_spade_coord(x), sanitize_spade_coord(y))
}
