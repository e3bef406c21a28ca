use physgeom3d::math::{Real, Vector};
use physgeom3d::query::WorldData;
use physgeom3d::shape::SharedShape;
use physgeom3d::transformation::to_trimesh::cuboid_mesh;
use physgeom3d::transformation::{subtract_meshes, MeshUpdate, MeshUpdateLog, MeshUpdateLogError};

fn cube(half: Vector<Real>) -> SharedShape {
    let (vtx, idx) = cuboid_mesh(half);
    SharedShape::trimesh(vtx, idx).unwrap()
}

fn check_update(update: &MeshUpdate) {
    let source = update.source.as_trimesh().unwrap();
    let result = update.result.as_trimesh().unwrap();

    for change in &update.triangle_changes {
        assert!((change.new as usize) < result.num_triangles());
        for corner in change.vertices {
            let vid = update.resolve_vertex(corner).unwrap();
            assert!((vid as usize) < result.vertices().len());
        }
    }

    for fix in &update.junction_fixes {
        assert!(fix.edge < 3);
        assert!((fix.triangle as usize) < source.num_triangles());
        assert!((fix.vertex as usize) < result.vertices().len());
    }
}

#[test]
fn notches_are_chained_forward() {
    let a = cube(Vector::repeat(1.0));
    let tool = cube(Vector::repeat(0.5));
    let mut log = MeshUpdateLog::new(a.clone());

    let right = WorldData::at(Vector::new(1.0, 0.1, 0.2));
    let (r1, u1) = subtract_meshes(&a, &WorldData::default(), &tool, &right, true).unwrap();
    let u1 = u1.unwrap();
    check_update(&u1);
    assert_eq!(log.append(u1.clone()), Ok(0));

    let left = WorldData::at(Vector::new(-1.0, -0.15, 0.25));
    let (r2, u2) = subtract_meshes(log.latest(), &WorldData::default(), &tool, &left, true).unwrap();
    let u2 = u2.unwrap();
    check_update(&u2);
    assert!(SharedShape::ptr_eq(&u2.source, &r1));
    assert_eq!(log.append(u2), Ok(1));

    // Replaying the first edit is rejected: the log only moves forward.
    assert_eq!(log.append(u1), Err(MeshUpdateLogError::Detached));

    assert!(SharedShape::ptr_eq(log.latest(), &r2));
    assert!(SharedShape::ptr_eq(log.origin(), &a));
    assert_eq!(log.walk_from(0).count(), 2);
    assert_eq!(log.walk_from(1).count(), 1);
    assert_relative_eq!(log.cumulative_scale(), 1.0);

    let v1 = r1.as_trimesh().unwrap().signed_volume();
    let v2 = r2.as_trimesh().unwrap().signed_volume();
    assert_relative_eq!(v1, 7.5, epsilon = 1.0e-3);
    assert_relative_eq!(v2, 7.0, epsilon = 1.0e-3);
}

#[test]
fn unlogged_subtraction_returns_no_update() {
    let a = cube(Vector::repeat(1.0));
    let tool = cube(Vector::repeat(0.5));
    let wd = WorldData::at(Vector::new(1.0, 0.1, 0.2));
    let (result, update) = subtract_meshes(&a, &WorldData::default(), &tool, &wd, false).unwrap();

    assert!(update.is_none());
    assert!(!SharedShape::ptr_eq(&result, &a));
    assert_eq!(a.as_trimesh().unwrap().num_triangles(), 12);
}
