use std::collections::HashMap;

use spade::{ConstrainedDelaunayTriangulation, Point2, Triangulation as _};

use crate::math::{Point, Real, Vector, DEFAULT_EPSILON};
use crate::shape::Triangle;
use crate::utils::sanitize_spade_point;

/// Barycentric tolerance below which a piece is considered outside of the cut triangle.
const OUTSIDE_TOLERANCE: Real = 1.0e-4;

/// One triangle resulting from cutting a mesh triangle.
#[derive(Copy, Clone, Debug)]
pub(super) struct CutPiece {
    /// Indices of the corners in the working vertex buffer.
    pub vertices: [u32; 3],
    /// Barycentric coordinates of each corner relative to the cut triangle.
    pub barycentric: [[Real; 3]; 3],
}

/// Re-triangulates a triangle so that none of its pieces crosses a cut segment.
///
/// `corners`, `edge_points` and `segments` index `positions`. `edge_points[k]` lists the
/// points lying on the edge joining the corners `k` and `(k + 1) % 3`. Vertices created where
/// segments cross each other are appended to `positions`.
///
/// Returns an empty list if the triangle is degenerate. The pieces have the orientation of
/// the original triangle.
pub(super) fn cut_triangle(
    corners: [u32; 3],
    edge_points: [&[u32]; 3],
    segments: &[[u32; 2]],
    positions: &mut Vec<Point<Real>>,
) -> Vec<CutPiece> {
    let triangle = Triangle::new(
        positions[corners[0] as usize],
        positions[corners[1] as usize],
        positions[corners[2] as usize],
    );
    let Some(normal) = triangle.normal() else {
        return vec![];
    };

    let plane = Plane::new(&triangle, normal);
    let mut cdt = ConstrainedDelaunayTriangulation::<Point2<f64>>::new();
    let mut id_to_handle = HashMap::new();
    let mut handle_to_id = HashMap::new();

    let mut insert = |cdt: &mut ConstrainedDelaunayTriangulation<Point2<f64>>, id: u32| {
        if let Some(handle) = id_to_handle.get(&id) {
            return Some(*handle);
        }

        match cdt.insert(plane.project(&positions[id as usize])) {
            Ok(handle) => {
                let _ = id_to_handle.insert(id, handle);
                let _ = handle_to_id.entry(handle).or_insert(id);
                Some(handle)
            }
            Err(err) => {
                log::debug!("cut point {} rejected by the triangulation: {:?}", id, err);
                None
            }
        }
    };

    let mut constraints = vec![];

    for k in 0..3 {
        let (a, b) = (corners[k], corners[(k + 1) % 3]);
        let pa = positions[a as usize];
        let ab = positions[b as usize] - pa;
        let mut on_edge: Vec<(Real, u32)> = edge_points[k]
            .iter()
            .map(|id| ((positions[*id as usize] - pa).dot(&ab), *id))
            .collect();
        on_edge.sort_by(|x, y| x.0.total_cmp(&y.0));

        let chain: Vec<_> = std::iter::once(a)
            .chain(on_edge.into_iter().map(|(_, id)| id))
            .chain(std::iter::once(b))
            .collect();
        constraints.extend(chain.windows(2).map(|w| [w[0], w[1]]));
    }

    constraints.extend_from_slice(segments);

    for [a, b] in constraints {
        if let (Some(ha), Some(hb)) = (insert(&mut cdt, a), insert(&mut cdt, b)) {
            if ha != hb {
                let _ = cdt.add_constraint_and_split(ha, hb, |v| v);
            }
        }
    }

    let scale = (triangle.b - triangle.a)
        .norm_squared()
        .max((triangle.c - triangle.a).norm_squared());
    let min_area = scale * DEFAULT_EPSILON * 10.0;
    let mut pieces = vec![];

    for face in cdt.inner_faces() {
        let vertices = face.vertices().map(|v| {
            *handle_to_id.entry(v.fix()).or_insert_with(|| {
                positions.push(plane.unproject(v.position()));
                (positions.len() - 1) as u32
            })
        });

        let pts = vertices.map(|id| positions[id as usize]);
        let scaled_normal = (pts[1] - pts[0]).cross(&(pts[2] - pts[0]));

        if scaled_normal.norm() <= min_area {
            continue;
        }

        let center = Triangle::from(pts).center();
        let inside = triangle
            .barycentric_coordinates(&center)
            .is_some_and(|bcoords| bcoords.iter().all(|c| *c >= -OUTSIDE_TOLERANCE));

        if !inside {
            continue;
        }

        let mut piece = CutPiece {
            vertices,
            barycentric: pts.map(|pt| {
                triangle
                    .barycentric_coordinates(&pt)
                    .unwrap_or([1.0 / 3.0; 3])
            }),
        };

        if scaled_normal.dot(&normal) < 0.0 {
            piece.vertices.swap(1, 2);
            piece.barycentric.swap(1, 2);
        }

        pieces.push(piece);
    }

    pieces
}

/// The plane of a triangle, with an orthonormal frame.
struct Plane {
    origin: Point<Real>,
    axes: [Vector<Real>; 2],
}

impl Plane {
    fn new(triangle: &Triangle, normal: Vector<Real>) -> Self {
        let u = (triangle.b - triangle.a).normalize();
        Self {
            origin: triangle.a,
            axes: [u, normal.cross(&u)],
        }
    }

    fn project(&self, pt: &Point<Real>) -> Point2<f64> {
        let d = pt - self.origin;
        sanitize_spade_point(d.dot(&self.axes[0]), d.dot(&self.axes[1]))
    }

    fn unproject(&self, pt: Point2<f64>) -> Point<Real> {
        self.origin + self.axes[0] * pt.x as Real + self.axes[1] * pt.y as Real
    }
}

#[cfg(test)]
mod test {
    use super::cut_triangle;
    use crate::math::Point;
    use crate::shape::Triangle;

    #[test]
    fn uncut_triangle_is_kept_whole() {
        let mut positions = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        let pieces = cut_triangle([0, 1, 2], [&[], &[], &[]], &[], &mut positions);
        assert_eq!(pieces.len(), 1);
        assert_eq!(positions.len(), 3);
    }

    #[test]
    fn cut_preserves_area_and_orientation() {
        // A cut from the middle of edge 0 to the middle of edge 1.
        let mut positions = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(0.0, 2.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
        ];
        let pieces = cut_triangle([0, 1, 2], [&[3], &[4], &[]], &[[3, 4]], &mut positions);
        assert_eq!(pieces.len(), 3);

        let mut area = 0.0;
        for piece in &pieces {
            let tri = Triangle::from(piece.vertices.map(|i| positions[i as usize]));
            assert!(tri.scaled_normal().z > 0.0);
            area += tri.area();

            for (corner, bcoords) in piece.vertices.iter().zip(piece.barycentric.iter()) {
                let pt = positions[*corner as usize];
                let expected = [1.0 - (pt.x + pt.y) / 2.0, pt.x / 2.0, pt.y / 2.0];
                for k in 0..3 {
                    assert_relative_eq!(bcoords[k], expected[k], epsilon = 1.0e-5);
                }
            }
        }
        assert_relative_eq!(area, 2.0, epsilon = 1.0e-5);

        // No piece straddles the cut along x = 1.
        for piece in &pieces {
            let xs = piece.vertices.map(|i| positions[i as usize].x);
            assert!(xs.iter().all(|x| *x >= 1.0 - 1.0e-5) || xs.iter().all(|x| *x <= 1.0 + 1.0e-5));
        }
    }
}
