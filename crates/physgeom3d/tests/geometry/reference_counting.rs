use physgeom3d::body::PhysicalBodyRegistry;
use physgeom3d::math::{Point, Real, Vector};
use physgeom3d::shape::{Ball, Geometry, SharedShape};
use physgeom3d::transformation::to_trimesh::cuboid_mesh;

fn cube() -> SharedShape {
    let (vtx, idx) = cuboid_mesh(Vector::repeat(0.5));
    SharedShape::trimesh(vtx, idx).unwrap()
}

#[test]
fn shape_handles_round_trip() {
    let mut rng = oorandom::Rand32::new(3);
    let shape = cube();

    for _ in 0..10 {
        let n = rng.rand_range(1..20) as usize;
        let clones: Vec<_> = (0..n).map(|_| shape.clone()).collect();
        assert_eq!(shape.reference_count(), n + 1);
        drop(clones);
        assert_eq!(shape.reference_count(), 1);
    }

    let other = shape.clone();
    drop(shape);
    assert_eq!(other.reference_count(), 1);
}

#[test]
fn shape_locks_are_released_on_every_path() {
    let shape = cube();

    fn first_vertex(shape: &SharedShape) -> Option<Point<Real>> {
        let lock = shape.lock();
        let vertices = lock.vertices()?;
        vertices.first().copied()
    }

    assert!(first_vertex(&shape).is_some());
    assert_eq!(shape.lock_count(), 0);

    let ball = SharedShape::new(Geometry::Ball(Ball::new(Point::origin(), 1.0))).unwrap();
    assert!(first_vertex(&ball).is_none());
    assert_eq!(ball.lock_count(), 0);
}

#[test]
fn body_references_round_trip() {
    let mut rng = oorandom::Rand32::new(17);
    let shape = cube();
    let mut registry = PhysicalBodyRegistry::new();
    let handle = registry.register(Some(shape.clone()), 0, None);

    for _ in 0..10 {
        let n = rng.rand_range(1..20) as usize;
        for _ in 0..n {
            let _ = registry.increment_reference_count(handle).unwrap();
        }
        for _ in 0..n {
            let _ = registry.decrement_reference_count(handle).unwrap();
        }
        assert_eq!(registry.get(handle).unwrap().reference_count(), 1);
    }

    assert_eq!(shape.reference_count(), 2);
    assert_eq!(registry.decrement_reference_count(handle), Ok(0));
    assert_eq!(registry.live_bodies(), 0);
    assert_eq!(shape.reference_count(), 1);
}
