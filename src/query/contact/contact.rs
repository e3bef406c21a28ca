use crate::math::{Point, Real, Vector};
use crate::shape::FeatureId;

/// Identifies the primitive of a shape involved in a contact.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PrimitiveRef {
    /// The primitive index: a triangle for meshes and heightfields, a cell for voxel grids,
    /// and `0` for single primitives.
    pub id: u32,
    /// The index of the group the primitive belongs to: the top-level island for meshes
    /// with topology, `0` otherwise.
    pub container_id: u32,
    /// The feature of the primitive touched by the contact.
    pub feature: FeatureId,
    /// The bounding volume tree leaf holding the primitive, if any.
    pub node: Option<u32>,
}

/// A touching surface patch made of several merged point contacts.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ContactArea {
    /// The averaged normal of the patch.
    pub normal: Vector<Real>,
    /// The pairs of primitives touching inside of this patch.
    pub primitives: Vec<[PrimitiveRef; 2]>,
    /// The touching points, one per pair of primitives.
    pub points: Vec<Point<Real>>,
}

/// A polyline bounding an areal contact, made of triangle/triangle intersection segments.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ContactBorder {
    /// The vertices of the polyline.
    pub points: Vec<Point<Real>>,
    /// For each segment `[points[i], points[i + 1]]`, the triangles of each shape it
    /// comes from. The closing segment of a closed border is last.
    pub segments: Vec<[u32; 2]>,
    /// Does the last point connect back to the first one?
    pub closed: bool,
    /// Are the segments consecutive along the polyline? Unordered borders are a
    /// soup of segments stored as successive pairs of points.
    pub ordered: bool,
    /// The barycenter of the points.
    pub center: Point<Real>,
}

impl ContactBorder {
    /// The number of segments of this border.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// The endpoints of the `i`-th segment.
    pub fn segment(&self, i: usize) -> Option<(Point<Real>, Point<Real>)> {
        if i >= self.segments.len() {
            return None;
        }

        if !self.ordered {
            return Some((self.points[2 * i], self.points[2 * i + 1]));
        }

        let next = if i + 1 == self.points.len() { 0 } else { i + 1 };
        Some((self.points[i], self.points[next]))
    }
}

/// The result of an intersection query between two shapes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Contact {
    /// The parameter of the unprojection: a distance along `dir` for linear unprojections,
    /// an angle around `dir` for rotational ones, or the time of impact of a sweep test.
    pub t: Real,
    /// The world-space contact point.
    pub point: Point<Real>,
    /// The world-space contact normal, pointing from the second shape toward the first.
    pub normal: Vector<Real>,
    /// The unprojection direction of the first shape (the rotation axis for rotational
    /// unprojections).
    pub dir: Vector<Real>,
    /// The speed of the first shape relative to the second one at the contact point,
    /// along the normal. Negative when they approach each other.
    pub vrel: Real,
    /// The penetration depth along the normal.
    pub depth: Real,
    /// The primitives of each shape involved in the contact.
    pub primitives: [PrimitiveRef; 2],
    /// The touching patch, if this contact results from merged point contacts.
    pub area: Option<ContactArea>,
    /// The borders of the intersection.
    pub borders: Vec<ContactBorder>,
}
