//! Definition of the triangle shape.

use crate::bounding_volume::Aabb;
use crate::math::{Point, Pose, Real, Vector, DEFAULT_EPSILON};
use crate::shape::FeatureId;

/// A triangle shape.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Triangle {
    /// The triangle first point.
    pub a: Point<Real>,
    /// The triangle second point.
    pub b: Point<Real>,
    /// The triangle third point.
    pub c: Point<Real>,
}

impl From<[Point<Real>; 3]> for Triangle {
    fn from(arr: [Point<Real>; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl Triangle {
    /// Creates a triangle from three points.
    #[inline]
    pub fn new(a: Point<Real>, b: Point<Real>, c: Point<Real>) -> Triangle {
        Triangle { a, b, c }
    }

    /// The three vertices of this triangle.
    #[inline]
    pub fn vertices(&self) -> [Point<Real>; 3] {
        [self.a, self.b, self.c]
    }

    /// The `k`-th edge of this triangle, joining the vertices `k` and `(k + 1) % 3`.
    #[inline]
    pub fn edge(&self, k: usize) -> (Point<Real>, Point<Real>) {
        let vtx = self.vertices();
        (vtx[k % 3], vtx[(k + 1) % 3])
    }

    /// A vector normal of this triangle.
    ///
    /// The vector points such that it is collinear to `AB × AC` (where `×` denotes the cross
    /// product).
    #[inline]
    pub fn scaled_normal(&self) -> Vector<Real> {
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        ab.cross(&ac)
    }

    /// The unit normal of this triangle assuming it is oriented ccw.
    ///
    /// Returns `None` if the triangle is degenerate.
    #[inline]
    pub fn normal(&self) -> Option<Vector<Real>> {
        self.scaled_normal().try_normalize(DEFAULT_EPSILON)
    }

    /// This triangle after being transformed by `pose`.
    #[inline]
    pub fn transformed(&self, pose: &Pose) -> Self {
        Triangle::new(
            pose.transform_point(&self.a),
            pose.transform_point(&self.b),
            pose.transform_point(&self.c),
        )
    }

    /// The same triangle with its winding reversed.
    #[inline]
    pub fn reversed(&self) -> Self {
        Triangle::new(self.a, self.c, self.b)
    }

    /// The bounding box of this triangle.
    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.a.inf(&self.b).inf(&self.c),
            self.a.sup(&self.b).sup(&self.c),
        )
    }

    /// Computes the extents of this triangle on the given direction.
    ///
    /// This computes the min and max values of the dot products between each
    /// vertex of this triangle and `dir`.
    #[inline]
    pub fn extents_on_dir(&self, dir: &Vector<Real>) -> (Real, Real) {
        let a = self.a.coords.dot(dir);
        let b = self.b.coords.dot(dir);
        let c = self.c.coords.dot(dir);
        (a.min(b).min(c), a.max(b).max(c))
    }

    /// The area of this triangle.
    #[inline]
    pub fn area(&self) -> Real {
        // Kahan's formula.
        let mut a = na::distance(&self.a, &self.b);
        let mut b = na::distance(&self.b, &self.c);
        let mut c = na::distance(&self.c, &self.a);

        let (c, b, a) = {
            if a < b {
                core::mem::swap(&mut a, &mut b);
            }
            if b < c {
                core::mem::swap(&mut b, &mut c);
            }
            if a < b {
                core::mem::swap(&mut a, &mut b);
            }
            (c, b, a)
        };

        let sqr = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
        sqr.max(0.0).sqrt() * 0.25
    }

    /// The geometric center of this triangle.
    #[inline]
    pub fn center(&self) -> Point<Real> {
        Point::from((self.a.coords + self.b.coords + self.c.coords) / 3.0)
    }

    /// The barycentric coordinates of the projection of `pt` on the plane of this triangle.
    ///
    /// Returns `None` if the triangle is degenerate.
    pub fn barycentric_coordinates(&self, pt: &Point<Real>) -> Option<[Real; 3]> {
        let v0 = self.b - self.a;
        let v1 = self.c - self.a;
        let v2 = pt - self.a;
        let d00 = v0.dot(&v0);
        let d01 = v0.dot(&v1);
        let d11 = v1.dot(&v1);
        let d20 = v2.dot(&v0);
        let d21 = v2.dot(&v1);
        let denom = d00 * d11 - d01 * d01;

        if denom.abs() <= DEFAULT_EPSILON * (d00 * d11).max(DEFAULT_EPSILON) {
            return None;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Some([1.0 - v - w, v, w])
    }

    /// The point of this triangle closest to `pt`, together with the feature it lies on.
    ///
    /// Edge `k` joins the vertices `k` and `(k + 1) % 3`.
    pub fn project_point(&self, pt: &Point<Real>) -> (Point<Real>, FeatureId) {
        // From "Real-Time Collision Detection", Ericson, section 5.1.5.
        let ab = self.b - self.a;
        let ac = self.c - self.a;
        let ap = pt - self.a;

        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return (self.a, FeatureId::Vertex(0));
        }

        let bp = pt - self.b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return (self.b, FeatureId::Vertex(1));
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return (self.a + ab * v, FeatureId::Edge(0));
        }

        let cp = pt - self.c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return (self.c, FeatureId::Vertex(2));
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return (self.a + ac * w, FeatureId::Edge(2));
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return (self.b + (self.c - self.b) * w, FeatureId::Edge(1));
        }

        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        (self.a + ab * v + ac * w, FeatureId::Face(0))
    }

    /// The intersection parameter of the segment `[a, a + dir]` with this triangle, if any.
    pub fn intersect_segment(&self, a: &Point<Real>, dir: &Vector<Real>) -> Option<Real> {
        // Möller–Trumbore, two-sided.
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let p = dir.cross(&e2);
        let det = e1.dot(&p);

        if det.abs() <= DEFAULT_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = a - self.a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&e1);
        let v = dir.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = e2.dot(&q) * inv_det;
        (0.0..=1.0).contains(&t).then_some(t)
    }
}
