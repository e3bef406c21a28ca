use physgeom3d::bounding_volume::{BoundingVolume, Obb};
use physgeom3d::math::{Matrix, Point, Real, Vector};
use physgeom3d::partitioning::BoundingVolumeParameters;
use physgeom3d::query::WorldData;
use physgeom3d::shape::{Geometry, MeshFlags, SharedShape, TriMeshBuilder};
use physgeom3d::transformation::to_trimesh::cuboid_mesh;
use physgeom3d::transformation::{boxify, subtract_meshes, BoxificationParameters};

fn cube(half: Real, flags: MeshFlags) -> SharedShape {
    let (vtx, idx) = cuboid_mesh(Vector::repeat(half));
    let idx = idx.iter().flat_map(|t| t.iter().copied()).collect();
    let params = BoundingVolumeParameters::new(2, 4, 1.0).unwrap();
    SharedShape::from_builder(
        TriMeshBuilder::new(vtx, idx)
            .flags(flags)
            .bv_parameters(params),
    )
    .unwrap()
}

#[test]
fn unit_cube_tree_respects_thresholds() {
    let shape = cube(0.5, MeshFlags::AABB | MeshFlags::TOPOLOGY);
    let mesh = shape.as_trimesh().unwrap();
    assert_eq!(mesh.vertices().len(), 8);
    assert_eq!(mesh.num_triangles(), 12);

    let tree = mesh.bv_tree();
    let mut seen = vec![0; 12];
    for (_, leaf) in tree.leaves() {
        assert!(leaf.count >= 2 && leaf.count <= 4);
        for tri in tree.node_triangles(leaf) {
            seen[*tri as usize] += 1;
        }
    }

    assert!(tree.num_leaves() * 4 >= 12);
    assert!(tree.num_leaves() * 2 <= 12);
    assert!(seen.iter().all(|n| *n == 1));

    let aabb = shape.local_aabb().loosened(1.0e-5);
    assert!(mesh.vertices().iter().all(|pt| aabb.contains_local_point(pt)));
}

#[test]
fn subtracting_an_enclosing_cube_removes_everything() {
    let a = cube(0.5, MeshFlags::default());
    let b = cube(1.0, MeshFlags::default());
    let (result, update) =
        subtract_meshes(&a, &WorldData::default(), &b, &WorldData::default(), true).unwrap();

    assert!(result.is_empty());
    let update = update.unwrap();
    assert_eq!(update.removed_triangles.len(), 12);
    assert!(update.triangle_changes.is_empty());
}

#[test]
fn subtracting_a_distant_cube_changes_nothing() {
    let a = cube(0.5, MeshFlags::default());
    let b = cube(0.5, MeshFlags::default());
    let far = WorldData::at(Vector::new(10.0, 0.0, 0.0));
    let (result, update) = subtract_meshes(&a, &WorldData::default(), &b, &far, true).unwrap();

    assert!(SharedShape::ptr_eq(&result, &a));
    let update = update.unwrap();
    assert!(update.is_empty());
    assert!(update.removed_triangles.is_empty());
    assert!(update.triangle_changes.is_empty());
}

#[test]
fn boxifying_the_cube_with_one_slot() {
    let shape = cube(0.5, MeshFlags::default());
    let mut out = [Obb::new(Point::origin(), Matrix::identity(), Vector::zeros())];
    let n = boxify(&shape, &BoxificationParameters::default(), &mut out).unwrap();

    assert_eq!(n, 1);
    assert_relative_eq!(out[0].volume(), 1.0, epsilon = 1.0e-4);
}

#[test]
fn primitives_are_built_directly() {
    use physgeom3d::shape::{Ball, ShapeError, ShapeType};

    let ball = SharedShape::new(Geometry::Ball(Ball::new(Point::origin(), 1.0))).unwrap();
    assert_eq!(ball.shape_type(), ShapeType::Ball);

    let err = SharedShape::new(Geometry::Ball(Ball::new(Point::origin(), -1.0))).unwrap_err();
    assert_eq!(err, ShapeError::InvalidPrimitive(ShapeType::Ball));
}
