use physgeom3d::bounding_volume::{BoundingVolume, Obb};
use physgeom3d::math::{Matrix, Point, Real, Vector};
use physgeom3d::shape::{Geometry, TriMesh, Voxels};
use physgeom3d::transformation::utils::narrow_indices;
use physgeom3d::transformation::{boxify, BoxificationParameters};

// A random blob of voxels, always containing the central cell.
fn random_voxel_mesh(rng: &mut oorandom::Rand32) -> Geometry {
    let dims = [4, 4, 4];
    let mut cells = vec![[1, 1, 1]];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                if rng.rand_range(0..3) != 0 {
                    cells.push([i, j, k]);
                }
            }
        }
    }

    let voxels = Voxels::from_cells(Point::origin(), 1.0, dims, &cells).unwrap();
    let (vtx, idx) = voxels.to_trimesh();
    Geometry::TriMesh(TriMesh::new(vtx, narrow_indices(&idx).unwrap()).unwrap())
}

fn slots(n: usize) -> Vec<Obb> {
    vec![Obb::new(Point::origin(), Matrix::identity(), Vector::zeros()); n]
}

fn total_volume(boxes: &[Obb]) -> Real {
    boxes.iter().map(|b| b.volume()).sum()
}

#[test]
fn never_exceeds_the_capacity() {
    let mut rng = oorandom::Rand32::new(99);

    for _ in 0..10 {
        let shape = random_voxel_mesh(&mut rng);
        let params = BoxificationParameters {
            voxel_resolution: 4,
            min_layer_filling: 1.0,
            ..Default::default()
        };

        for capacity in [0, 1, 2, 5] {
            let mut out = slots(capacity);
            let n = boxify(&shape, &params, &mut out).unwrap();
            assert!(n <= capacity);
        }
    }
}

#[test]
fn volume_grows_with_the_layer_filling() {
    let mut rng = oorandom::Rand32::new(2024);

    for _ in 0..10 {
        let shape = random_voxel_mesh(&mut rng);
        let mut prev = 0.0;

        for filling in [0.0, 0.25, 0.5, 0.75, 0.9, 1.0] {
            let params = BoxificationParameters {
                voxel_resolution: 4,
                min_layer_filling: filling,
                ..Default::default()
            };
            let mut out = slots(64);
            let n = boxify(&shape, &params, &mut out).unwrap();
            let volume = total_volume(&out[..n]);

            assert!(volume >= prev - 1.0e-4);
            prev = volume;
        }
    }
}
