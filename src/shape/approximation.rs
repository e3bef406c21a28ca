//! Substitution of meshes by the analytic primitive they approximate.

use crate::bounding_volume::Obb;
use crate::math::{Point, Real, Vector};
use crate::shape::{Ball, Capsule, Cuboid, Cylinder, Geometry, MeshFlags, TriMesh};

/// Tries the approximations requested by the mesh flags, in the order box, sphere, cylinder,
/// capsule, and returns the first primitive the mesh fits within `tolerance`.
///
/// The tolerance is relative to the size of the primitive.
pub fn approximate(mesh: &TriMesh, tolerance: Real) -> Option<Geometry> {
    let flags = mesh.flags();
    let vertices = mesh.vertices();
    let volume = mesh.signed_volume();

    if vertices.len() < 4 || volume <= 0.0 {
        return None;
    }

    let result = if flags.contains(MeshFlags::APPROX_BOX) {
        fit_box(vertices, volume, tolerance).map(Geometry::Cuboid)
    } else {
        None
    };

    let result = result.or_else(|| {
        flags
            .contains(MeshFlags::APPROX_SPHERE)
            .then(|| fit_sphere(vertices, volume, tolerance))
            .flatten()
            .map(Geometry::Ball)
    });

    let result = result.or_else(|| {
        flags
            .contains(MeshFlags::APPROX_CYLINDER)
            .then(|| fit_cylinder(vertices, volume, tolerance))
            .flatten()
            .map(Geometry::Cylinder)
    });

    let result = result.or_else(|| {
        flags
            .contains(MeshFlags::APPROX_CAPSULE)
            .then(|| fit_capsule(vertices, volume, tolerance))
            .flatten()
            .map(Geometry::Capsule)
    });

    if let Some(primitive) = &result {
        log::debug!(
            "mesh with {} triangles approximated by a {:?}",
            mesh.num_triangles(),
            primitive.shape_type()
        );
    }

    result
}

fn volume_matches(expected: Real, actual: Real, tolerance: Real) -> bool {
    (expected - actual).abs() <= expected * tolerance * 3.0
}

/// Fits an oriented box: every vertex lies on the box boundary and the volumes agree.
pub fn fit_box(vertices: &[Point<Real>], volume: Real, tolerance: Real) -> Option<Cuboid> {
    let obb = Obb::from_points(vertices)?;
    let cuboid = Cuboid::new(obb.center, obb.axes, obb.half_extents);

    if !cuboid.is_valid() || !volume_matches(cuboid.volume(), volume, tolerance) {
        return None;
    }

    let on_boundary = vertices.iter().all(|pt| {
        let local = obb.axes.tr_mul(&(pt - obb.center));
        let max_ratio = (0..3)
            .map(|i| local[i].abs() / obb.half_extents[i])
            .fold(0.0, Real::max);
        (max_ratio - 1.0).abs() <= tolerance
    });

    on_boundary.then_some(cuboid)
}

/// Fits a sphere centered on the vertex centroid.
pub fn fit_sphere(vertices: &[Point<Real>], volume: Real, tolerance: Real) -> Option<Ball> {
    let center = crate::utils::center(vertices);
    let radius = vertices
        .iter()
        .map(|pt| na::distance(pt, &center))
        .sum::<Real>()
        / vertices.len() as Real;
    let ball = Ball::new(center, radius);

    if !ball.is_valid() || !volume_matches(ball.volume(), volume, tolerance) {
        return None;
    }

    vertices
        .iter()
        .all(|pt| (na::distance(pt, &center) - radius).abs() <= radius * tolerance)
        .then_some(ball)
}

/// Distances of the vertices to the axis `axis` going through `center`: (axial, radial).
fn axial_radial(
    vertices: &[Point<Real>],
    center: &Point<Real>,
    axis: &Vector<Real>,
) -> Vec<(Real, Real)> {
    vertices
        .iter()
        .map(|pt| {
            let d = pt - center;
            let h = d.dot(axis);
            (h, (d - axis * h).norm())
        })
        .collect()
}

/// Fits a cylinder along one of the principal axes of the vertices.
pub fn fit_cylinder(vertices: &[Point<Real>], volume: Real, tolerance: Real) -> Option<Cylinder> {
    let obb = Obb::from_points(vertices)?;

    (0..3).find_map(|k| {
        let axis = obb.axis(k);
        let samples = axial_radial(vertices, &obb.center, &axis);
        let half_height = obb.half_extents[k];
        let radius = samples.iter().map(|s| s.1).fold(0.0, Real::max);
        let cylinder = Cylinder::new(obb.center, axis, half_height, radius);

        if !cylinder.is_valid() || !volume_matches(cylinder.volume(), volume, tolerance) {
            return None;
        }

        let fits = samples.iter().all(|(h, r)| {
            let on_side = (r - radius).abs() <= radius * tolerance;
            let on_cap = (h.abs() - half_height).abs() <= half_height * tolerance
                && *r <= radius * (1.0 + tolerance);
            on_side || on_cap
        });

        fits.then_some(cylinder)
    })
}

/// Fits a capsule along one of the principal axes of the vertices.
pub fn fit_capsule(vertices: &[Point<Real>], volume: Real, tolerance: Real) -> Option<Capsule> {
    let obb = Obb::from_points(vertices)?;

    (0..3).find_map(|k| {
        let axis = obb.axis(k);
        let samples = axial_radial(vertices, &obb.center, &axis);
        let radius = samples.iter().map(|s| s.1).fold(0.0, Real::max);
        let half_segment = obb.half_extents[k] - radius;

        if half_segment <= 0.0 {
            return None;
        }

        let capsule = Capsule::new(
            obb.center - axis * half_segment,
            obb.center + axis * half_segment,
            radius,
        );

        if !capsule.is_valid() || !volume_matches(capsule.volume(), volume, tolerance) {
            return None;
        }

        let fits = samples.iter().all(|(h, r)| {
            let excess = (h.abs() - half_segment).max(0.0);
            let dist = (excess * excess + r * r).sqrt();
            (dist - radius).abs() <= radius * tolerance
        });

        fits.then_some(capsule)
    })
}

#[cfg(test)]
mod test {
    use super::{fit_box, fit_sphere};
    use crate::bounding_volume::Aabb;
    use crate::math::{Point, Real, Vector};
    use crate::shape::{Ball, Capsule, Cylinder, Geometry, MeshFlags, TriMeshBuilder};
    use crate::transformation::to_trimesh::cuboid_mesh;

    fn build(vtx: Vec<Point<Real>>, idx: Vec<[u32; 3]>, flags: MeshFlags) -> Geometry {
        let idx = idx.iter().flatten().map(|i| *i as u16).collect();
        TriMeshBuilder::new(vtx, idx)
            .flags(MeshFlags::default() | flags)
            .build()
            .unwrap()
    }

    #[test]
    fn box_vertices_fit_a_box_not_a_sphere() {
        let pts = Aabb::new(Point::origin(), Point::new(2.0, 1.0, 1.0)).vertices();
        let cuboid = fit_box(&pts, 2.0, 0.05).unwrap();
        assert_relative_eq!(cuboid.volume(), 2.0, epsilon = 1.0e-3);
        assert!(fit_sphere(&pts, 2.0, 0.05).is_none());
        assert!(fit_box(&pts, 1.0, 0.05).is_none());
    }

    #[test]
    fn builder_substitutes_a_box() {
        let (vtx, idx) = cuboid_mesh(Vector::new(1.0, 0.5, 0.25));
        let idx = idx.iter().map(|t| t.map(u32::from)).collect();
        let geometry = build(vtx, idx, MeshFlags::APPROX_BOX | MeshFlags::APPROX_SPHERE);

        let Geometry::Cuboid(cuboid) = &geometry else {
            panic!("expected a box, got {:?}", geometry.shape_type());
        };
        assert_relative_eq!(cuboid.volume(), 1.0, epsilon = 1.0e-3);
    }

    #[test]
    fn builder_substitutes_a_sphere() {
        let (vtx, idx) = Ball::new(Point::new(1.0, 2.0, 3.0), 0.5).to_trimesh(32, 32);
        let geometry = build(vtx, idx, MeshFlags::APPROX_BOX | MeshFlags::APPROX_SPHERE);

        let Geometry::Ball(ball) = &geometry else {
            panic!("expected a sphere, got {:?}", geometry.shape_type());
        };
        assert_relative_eq!(ball.radius, 0.5, epsilon = 1.0e-3);
        assert_relative_eq!(ball.center, Point::new(1.0, 2.0, 3.0), epsilon = 1.0e-3);
    }

    #[test]
    fn builder_substitutes_a_cylinder() {
        let cylinder = Cylinder::new(Point::origin(), Vector::y(), 2.0, 0.5);
        let (vtx, idx) = cylinder.to_trimesh(32);

        // Not a sphere: the mesh is kept.
        let geometry = build(vtx.clone(), idx.clone(), MeshFlags::APPROX_SPHERE);
        assert!(matches!(geometry, Geometry::TriMesh(_)));

        let geometry = build(vtx, idx, MeshFlags::APPROX_CYLINDER);
        let Geometry::Cylinder(fitted) = &geometry else {
            panic!("expected a cylinder, got {:?}", geometry.shape_type());
        };
        assert_relative_eq!(fitted.half_height, 2.0, epsilon = 1.0e-3);
        assert_relative_eq!(fitted.radius, 0.5, epsilon = 1.0e-3);
        assert_relative_eq!(fitted.axis.dot(&Vector::y()).abs(), 1.0, epsilon = 1.0e-3);
    }

    #[test]
    fn builder_substitutes_a_capsule() {
        let capsule = Capsule::new(Point::new(0.0, -1.0, 0.0), Point::new(0.0, 1.0, 0.0), 0.5);
        let (vtx, idx) = capsule.to_trimesh(32, 32);
        let geometry = build(vtx, idx, MeshFlags::APPROX_CAPSULE);

        let Geometry::Capsule(fitted) = &geometry else {
            panic!("expected a capsule, got {:?}", geometry.shape_type());
        };
        assert_relative_eq!(fitted.radius, 0.5, epsilon = 1.0e-3);
        assert_relative_eq!(na::distance(&fitted.a, &fitted.b), 2.0, epsilon = 1.0e-2);
    }
}
