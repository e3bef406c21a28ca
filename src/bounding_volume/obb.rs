//! Oriented Bounding Box.

use crate::bounding_volume::{Aabb, BoundingVolume};
use crate::math::{Matrix, Point, Pose, Real, Vector, DIM};

/// An Oriented Bounding Box.
///
/// The columns of `axes` are the unit vectors of the box local frame.
#[derive(Debug, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Obb {
    /// The center of the box.
    pub center: Point<Real>,
    /// The local frame of the box, one unit axis per column.
    pub axes: Matrix<Real>,
    /// Half extents of the box along each of its axes.
    pub half_extents: Vector<Real>,
}

impl From<Aabb> for Obb {
    fn from(aabb: Aabb) -> Self {
        Self {
            center: aabb.center(),
            axes: Matrix::identity(),
            half_extents: aabb.half_extents(),
        }
    }
}

impl Obb {
    /// Creates a new oriented box.
    pub fn new(center: Point<Real>, axes: Matrix<Real>, half_extents: Vector<Real>) -> Self {
        Self {
            center,
            axes,
            half_extents,
        }
    }

    /// Computes the tightest box enclosing `pts` with the given frame.
    ///
    /// Returns `None` if `pts` is empty.
    pub fn enclosing_points_with_axes<'a>(
        axes: &Matrix<Real>,
        pts: impl IntoIterator<Item = &'a Point<Real>>,
    ) -> Option<Self> {
        let mut mins = Vector::repeat(Real::MAX);
        let mut maxs = Vector::repeat(-Real::MAX);
        let mut any = false;

        for pt in pts {
            any = true;
            let local = axes.tr_mul(&pt.coords);
            mins = mins.inf(&local);
            maxs = maxs.sup(&local);
        }

        if !any {
            return None;
        }

        Some(Self {
            center: Point::from(axes * ((mins + maxs) * 0.5)),
            axes: *axes,
            half_extents: (maxs - mins) * 0.5,
        })
    }

    /// The principal axes of a point cloud, as a right-handed orthonormal frame.
    pub fn principal_axes(pts: &[Point<Real>]) -> Matrix<Real> {
        if pts.len() < 2 {
            return Matrix::identity();
        }

        let (_, cov) = crate::utils::center_cov(pts);
        let mut eigv = cov.symmetric_eigen().eigenvectors;

        if eigv.determinant() < 0.0 {
            eigv = -eigv;
        }

        eigv
    }

    /// Computes an oriented box aligned with the principal axes of `pts`.
    ///
    /// The returned OBB is not guaranteed to be the smallest enclosing OBB.
    pub fn from_points(pts: &[Point<Real>]) -> Option<Self> {
        Self::enclosing_points_with_axes(&Self::principal_axes(pts), pts)
    }

    /// The `i`-th axis of this box.
    #[inline]
    pub fn axis(&self, i: usize) -> Vector<Real> {
        self.axes.column(i).into_owned()
    }

    /// The interval covered by this box once projected on `dir`.
    #[inline]
    pub fn project(&self, dir: &Vector<Real>) -> (Real, Real) {
        let c = self.center.coords.dot(dir);
        let r = (self.axes.tr_mul(dir)).abs().dot(&self.half_extents);
        (c - r, c + r)
    }

    /// The eight corners of this box.
    pub fn vertices(&self) -> [Point<Real>; 8] {
        let local = Aabb::from_half_extents(Point::origin(), self.half_extents).vertices();
        local.map(|p| self.center + self.axes * p.coords)
    }

    /// This box after being transformed by `pose`.
    pub fn transformed(&self, pose: &Pose) -> Self {
        Self {
            center: pose.transform_point(&self.center),
            axes: pose.rotation * self.axes,
            half_extents: self.half_extents * pose.scale.abs(),
        }
    }

    /// The world-space axis-aligned box enclosing this box.
    pub fn aabb(&self) -> Aabb {
        let half = self.axes.abs() * self.half_extents;
        Aabb::from_half_extents(self.center, half)
    }

    /// Does this box contain the given point?
    pub fn contains_point(&self, pt: &Point<Real>) -> bool {
        let local = self.axes.tr_mul(&(pt - self.center));
        (0..DIM).all(|i| local[i].abs() <= self.half_extents[i])
    }

    /// Separating-axis test between two oriented boxes.
    ///
    /// Tests the 15 candidate axes (3 + 3 face normals, 9 edge cross products).
    pub fn intersects_obb(&self, other: &Obb) -> bool {
        const EPS: Real = 1.0e-6;
        let r = self.axes.tr_mul(&other.axes);
        let abs_r = r.abs().add_scalar(EPS);
        let t = self.axes.tr_mul(&(other.center - self.center));
        let a = &self.half_extents;
        let b = &other.half_extents;

        for i in 0..3 {
            let ra = a[i];
            let rb = b[0] * abs_r[(i, 0)] + b[1] * abs_r[(i, 1)] + b[2] * abs_r[(i, 2)];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        for j in 0..3 {
            let ra = a[0] * abs_r[(0, j)] + a[1] * abs_r[(1, j)] + a[2] * abs_r[(2, j)];
            let rb = b[j];
            let proj = t[0] * r[(0, j)] + t[1] * r[(1, j)] + t[2] * r[(2, j)];
            if proj.abs() > ra + rb {
                return false;
            }
        }

        for i in 0..3 {
            let i1 = (i + 1) % 3;
            let i2 = (i + 2) % 3;
            for j in 0..3 {
                let j1 = (j + 1) % 3;
                let j2 = (j + 2) % 3;
                let ra = a[i1] * abs_r[(i2, j)] + a[i2] * abs_r[(i1, j)];
                let rb = b[j1] * abs_r[(i, j2)] + b[j2] * abs_r[(i, j1)];
                let proj = t[i2] * r[(i1, j)] - t[i1] * r[(i2, j)];
                if proj.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }
}

impl BoundingVolume for Obb {
    fn center(&self) -> Point<Real> {
        self.center
    }

    fn intersects(&self, other: &Obb) -> bool {
        self.intersects_obb(other)
    }

    fn contains(&self, other: &Obb) -> bool {
        other.vertices().iter().all(|v| self.contains_point(v))
    }

    fn merge(&mut self, other: &Obb) {
        *self = self.merged(other);
    }

    /// Merges both boxes into a box sharing the frame of `self`.
    fn merged(&self, other: &Obb) -> Obb {
        let corners = self.vertices().into_iter().chain(other.vertices());
        let pts: Vec<_> = corners.collect();
        Self::enclosing_points_with_axes(&self.axes, &pts).unwrap_or(*self)
    }

    fn loosen(&mut self, amount: Real) {
        self.half_extents.add_scalar_mut(amount);
    }

    fn loosened(&self, amount: Real) -> Obb {
        let mut result = *self;
        result.loosen(amount);
        result
    }

    fn volume(&self) -> Real {
        self.half_extents.product() * 8.0
    }
}

#[cfg(test)]
mod test {
    use super::Obb;
    use crate::bounding_volume::{Aabb, BoundingVolume};
    use crate::math::{Point, Pose, Vector};

    #[test]
    fn obb_sat_detects_separation() {
        let a = Obb::from(Aabb::new(Point::origin(), Point::new(1.0, 1.0, 1.0)));
        let rot = na::Rotation3::from_euler_angles(0.0, 0.0, core::f64::consts::FRAC_PI_4 as crate::math::Real)
            .into_inner();
        let close = a.transformed(&Pose::new(rot, Vector::new(0.5, 0.0, 0.0), 1.0));
        let far = a.transformed(&Pose::new(rot, Vector::new(5.0, 0.0, 0.0), 1.0));
        assert!(a.intersects(&close));
        assert!(!a.intersects(&far));
    }

    #[test]
    fn obb_fits_points() {
        let pts = Aabb::new(Point::new(-1.0, -2.0, -3.0), Point::new(1.0, 2.0, 3.0)).vertices();
        let obb = Obb::from_points(&pts).unwrap();
        assert_relative_eq!(obb.volume(), 48.0, epsilon = 1.0e-3);
        assert!(pts.iter().all(|p| obb.loosened(1.0e-4).contains_point(p)));
    }
}
