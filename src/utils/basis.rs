use crate::math::{Real, Vector};

/// Computes two unit vectors forming, with the unit vector `n`, an orthonormal basis.
///
/// Robust and branchless construction from "Building an Orthonormal Basis, Revisited",
/// Duff et al.
pub fn orthonormal_basis(n: &Vector<Real>) -> [Vector<Real>; 2] {
    let sign = if n.z >= 0.0 { 1.0 } else { -1.0 };
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;

    [
        Vector::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
        Vector::new(b, sign + n.y * n.y * a, -n.y),
    ]
}

/// Index of the coordinate axis most aligned with `v`.
pub fn dominant_axis(v: &Vector<Real>) -> usize {
    v.abs().imax()
}
