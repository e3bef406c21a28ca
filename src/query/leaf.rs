//! Convex primitives the contact engine tests pairwise.

use arrayvec::ArrayVec;

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::query::gjk::{self, GjkResult};
use crate::query::sat;
use crate::query::triangle_crossing::{crossing_tolerance, triangle_crossing, TriangleCrossing};
use crate::shape::{Ball, Capsule, Cuboid, FeatureId, Ray, SupportMap, Triangle};

/// A convex polytope with at most eight vertices.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Polytope {
    /// A single point.
    Point(Point<Real>),
    /// A segment.
    Segment(Point<Real>, Point<Real>),
    /// A triangle.
    Triangle(Triangle),
    /// An oriented box.
    Cuboid(Cuboid),
}

impl SupportMap for Polytope {
    fn local_support_point(&self, dir: &Vector<Real>) -> Point<Real> {
        match self {
            Polytope::Point(p) => *p,
            Polytope::Segment(a, b) => {
                if (b - a).dot(dir) > 0.0 {
                    *b
                } else {
                    *a
                }
            }
            Polytope::Triangle(t) => t.local_support_point(dir),
            Polytope::Cuboid(c) => c.local_support_point(dir),
        }
    }
}

impl Polytope {
    /// The interval covered by this polytope projected on `dir`.
    pub fn project(&self, dir: &Vector<Real>) -> (Real, Real) {
        match self {
            Polytope::Point(p) => {
                let d = p.coords.dot(dir);
                (d, d)
            }
            Polytope::Segment(a, b) => {
                let da = a.coords.dot(dir);
                let db = b.coords.dot(dir);
                (da.min(db), da.max(db))
            }
            Polytope::Triangle(t) => t.extents_on_dir(dir),
            Polytope::Cuboid(c) => c.project(dir),
        }
    }

    /// The barycenter of this polytope.
    pub fn center(&self) -> Point<Real> {
        match self {
            Polytope::Point(p) => *p,
            Polytope::Segment(a, b) => na::center(a, b),
            Polytope::Triangle(t) => t.center(),
            Polytope::Cuboid(c) => c.center,
        }
    }

    /// The (non-normalized) normals of the faces of this polytope, up to symmetry.
    pub fn face_normals(&self) -> ArrayVec<Vector<Real>, 3> {
        let mut out = ArrayVec::new();
        match self {
            Polytope::Point(_) | Polytope::Segment(..) => {}
            Polytope::Triangle(t) => out.push(t.scaled_normal()),
            Polytope::Cuboid(c) => out.extend(c.rotation.column_iter().map(|col| col.into_owned())),
        }
        out
    }

    /// The directions of the edges of this polytope, up to symmetry.
    pub fn edge_dirs(&self) -> ArrayVec<Vector<Real>, 3> {
        let mut out = ArrayVec::new();
        match self {
            Polytope::Point(_) => {}
            Polytope::Segment(a, b) => out.push(b - a),
            Polytope::Triangle(t) => {
                out.push(t.b - t.a);
                out.push(t.c - t.b);
                out.push(t.a - t.c);
            }
            Polytope::Cuboid(c) => out.extend(c.rotation.column_iter().map(|col| col.into_owned())),
        }
        out
    }

    /// The feature of this polytope closest to `pt`.
    pub fn feature_at(&self, pt: &Point<Real>) -> FeatureId {
        match self {
            Polytope::Point(_) => FeatureId::Vertex(0),
            Polytope::Segment(a, b) => {
                let ab = b - a;
                let t = (pt - a).dot(&ab) / ab.norm_squared().max(DEFAULT_EPSILON);
                if t <= DEFAULT_EPSILON {
                    FeatureId::Vertex(0)
                } else if t >= 1.0 - DEFAULT_EPSILON {
                    FeatureId::Vertex(1)
                } else {
                    FeatureId::Edge(0)
                }
            }
            Polytope::Triangle(t) => t.project_point(pt).1,
            Polytope::Cuboid(c) => {
                // Faces are numbered 2 * axis, plus one on the positive side.
                let local = c.rotation.tr_mul(&(pt - c.center));
                let scaled = local.component_div(&c.half_extents);
                let axis = scaled.iamax();
                let positive = (scaled[axis] > 0.0) as u32;
                FeatureId::Face(2 * axis as u32 + positive)
            }
        }
    }

    /// The bounding box of this polytope.
    pub fn aabb(&self) -> Aabb {
        match self {
            Polytope::Point(p) => Aabb::new(*p, *p),
            Polytope::Segment(a, b) => Aabb::new(a.inf(b), a.sup(b)),
            Polytope::Triangle(t) => t.aabb(),
            Polytope::Cuboid(c) => c.aabb(),
        }
    }
}

/// A polytope dilated by a radius: the elementary piece of a shape tested for contacts.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Leaf {
    /// The polytope.
    pub core: Polytope,
    /// The dilation radius.
    pub radius: Real,
}

impl Leaf {
    /// A leaf without any dilation.
    pub fn new(core: Polytope) -> Self {
        Self { core, radius: 0.0 }
    }

    /// A leaf dilated by `radius`.
    pub fn rounded(core: Polytope, radius: Real) -> Self {
        Self { core, radius }
    }

    /// The bounding box of this leaf.
    pub fn aabb(&self) -> Aabb {
        let aabb = self.core.aabb();
        Aabb::new(
            aabb.mins - Vector::repeat(self.radius),
            aabb.maxs + Vector::repeat(self.radius),
        )
    }

    /// This leaf translated by `shift`.
    pub fn translated(&self, shift: &Vector<Real>) -> Self {
        let core = match self.core {
            Polytope::Point(p) => Polytope::Point(p + shift),
            Polytope::Segment(a, b) => Polytope::Segment(a + shift, b + shift),
            Polytope::Triangle(t) => Polytope::Triangle(Triangle::new(t.a + shift, t.b + shift, t.c + shift)),
            Polytope::Cuboid(c) => Polytope::Cuboid(Cuboid::new(c.center + shift, c.rotation, c.half_extents)),
        };
        Self::rounded(core, self.radius)
    }
}

impl From<Triangle> for Leaf {
    fn from(tri: Triangle) -> Self {
        Leaf::new(Polytope::Triangle(tri))
    }
}

impl From<Ball> for Leaf {
    fn from(ball: Ball) -> Self {
        Leaf::rounded(Polytope::Point(ball.center), ball.radius)
    }
}

impl From<Capsule> for Leaf {
    fn from(capsule: Capsule) -> Self {
        Leaf::rounded(Polytope::Segment(capsule.a, capsule.b), capsule.radius)
    }
}

impl From<Cuboid> for Leaf {
    fn from(cuboid: Cuboid) -> Self {
        Leaf::new(Polytope::Cuboid(cuboid))
    }
}

impl From<Ray> for Leaf {
    fn from(ray: Ray) -> Self {
        Leaf::new(Polytope::Segment(ray.origin, ray.end()))
    }
}

/// The contact between two leaves.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LeafContact {
    /// The contact point, halfway between both surfaces.
    pub point: Point<Real>,
    /// The contact normal, pointing from the second leaf toward the first one.
    pub normal: Vector<Real>,
    /// The penetration depth along the normal.
    pub depth: Real,
    /// The feature of the first leaf involved in the contact.
    pub feature1: FeatureId,
    /// The feature of the second leaf involved in the contact.
    pub feature2: FeatureId,
}

/// Computes the contact between two leaves expressed in the same frame, if they touch.
pub fn leaf_contact(leaf1: &Leaf, leaf2: &Leaf) -> Option<LeafContact> {
    let radii = leaf1.radius + leaf2.radius;

    match gjk::closest_points(&leaf1.core, &leaf2.core, radii)? {
        GjkResult::ClosestPoints(p1, p2) => {
            let delta = p2 - p1;
            let dist = delta.norm();
            if dist > radii {
                return None;
            }

            let n12 = if dist > DEFAULT_EPSILON {
                delta / dist
            } else {
                sat::min_overlap_axis(&leaf1.core, &leaf2.core)
                    .map_or_else(Vector::y, |(axis, _)| axis)
            };

            let s1 = p1 + n12 * leaf1.radius;
            let s2 = p2 - n12 * leaf2.radius;

            Some(LeafContact {
                point: na::center(&s1, &s2),
                normal: -n12,
                depth: radii - dist,
                feature1: leaf1.core.feature_at(&p1),
                feature2: leaf2.core.feature_at(&p2),
            })
        }
        GjkResult::Intersection(pt) => {
            let (normal, depth, point) = match (&leaf1.core, &leaf2.core) {
                (Polytope::Triangle(t1), Polytope::Triangle(t2)) => {
                    let (normal, depth) = triangle_triangle_depth(t1, t2);
                    let point = triangle_triangle_segment(t1, t2)
                        .map_or(pt, |(a, b)| na::center(&a, &b));
                    (normal, depth, point)
                }
                _ => {
                    let (n12, overlap) = sat::min_overlap_axis(&leaf1.core, &leaf2.core)
                        .unwrap_or((Vector::y(), 0.0));
                    (-n12, overlap + radii, pt)
                }
            };

            Some(LeafContact {
                point,
                normal,
                depth,
                feature1: leaf1.core.feature_at(&point),
                feature2: leaf2.core.feature_at(&point),
            })
        }
    }
}

/// The normal and depth of two crossing triangles, assuming both belong to closed
/// surfaces with outward normals.
///
/// The depth is how far one triangle sinks below the plane of the other. The shallowest
/// of both configurations wins.
fn triangle_triangle_depth(t1: &Triangle, t2: &Triangle) -> (Vector<Real>, Real) {
    let sink = |tri: &Triangle, plane: &Triangle, n: &Vector<Real>| {
        let lowest = tri
            .vertices()
            .iter()
            .map(|v| n.dot(&(v - plane.a)))
            .fold(Real::MAX, Real::min);
        (-lowest).max(0.0)
    };

    match (t1.normal(), t2.normal()) {
        (Some(n1), Some(n2)) => {
            let depth1 = sink(t1, t2, &n2);
            let depth2 = sink(t2, t1, &n1);
            if depth1 <= depth2 {
                (n2, depth1)
            } else {
                (-n1, depth2)
            }
        }
        (None, Some(n2)) => (n2, sink(t1, t2, &n2)),
        (Some(n1), None) => (-n1, sink(t2, t1, &n1)),
        (None, None) => (Vector::y(), 0.0),
    }
}

/// The segment along which two non-coplanar triangles cross each other.
///
/// Returns `None` if the triangles do not intersect or are coplanar.
pub fn triangle_triangle_segment(t1: &Triangle, t2: &Triangle) -> Option<(Point<Real>, Point<Real>)> {
    let scale = t1.aabb().extents().norm().max(t2.aabb().extents().norm());

    match triangle_crossing(t1, t2, crossing_tolerance(scale))? {
        TriangleCrossing::Segment([a, b]) => Some((a.point, b.point)),
        TriangleCrossing::Coplanar { .. } => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Matrix;

    #[test]
    fn ball_resting_on_cuboid() {
        let cuboid = Leaf::from(Cuboid::axis_aligned(Vector::repeat(1.0)));
        let ball = Leaf::from(Ball::new(Point::new(0.0, 1.4, 0.0), 0.5));

        let contact = leaf_contact(&ball, &cuboid).unwrap();
        assert_relative_eq!(contact.normal, Vector::y(), epsilon = 1.0e-3);
        assert_relative_eq!(contact.depth, 0.1, epsilon = 1.0e-3);
        assert_eq!(contact.feature2, FeatureId::Face(3));
    }

    #[test]
    fn deep_penetration_uses_the_shallowest_axis() {
        let c1 = Leaf::from(Cuboid::axis_aligned(Vector::repeat(1.0)));
        let c2 = Leaf::from(Cuboid::new(
            Point::new(0.0, 0.0, 1.5),
            Matrix::identity(),
            Vector::repeat(1.0),
        ));

        let contact = leaf_contact(&c1, &c2).unwrap();
        assert_relative_eq!(contact.normal, -Vector::z(), epsilon = 1.0e-4);
        assert_relative_eq!(contact.depth, 0.5, epsilon = 1.0e-4);
    }

    #[test]
    fn separated_leaves_do_not_touch() {
        let c1 = Leaf::from(Cuboid::axis_aligned(Vector::repeat(1.0)));
        let b = Leaf::from(Ball::new(Point::new(3.0, 0.0, 0.0), 1.0));
        assert!(leaf_contact(&c1, &b).is_none());
    }

    #[test]
    fn crossing_triangles() {
        let t1 = Triangle::new(
            Point::new(-1.0, 0.0, -1.0),
            Point::new(1.0, 0.0, -1.0),
            Point::new(0.0, 0.0, 1.0),
        );
        let t2 = Triangle::new(
            Point::new(0.0, -1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, -2.0),
        );

        let (a, b) = triangle_triangle_segment(&t1, &t2).unwrap();
        assert_relative_eq!(a.y, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!(b.y, 0.0, epsilon = 1.0e-5);
        assert_relative_eq!((a - b).norm(), 1.0, epsilon = 1.0e-4);
        assert!(triangle_triangle_segment(&t1, &t1).is_none());
        let contact = leaf_contact(&Leaf::from(t1), &Leaf::from(t2)).unwrap();
        assert_relative_eq!(contact.depth, 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(contact.point, Point::new(0.0, 0.0, -0.5), epsilon = 1.0e-5);
    }
}
