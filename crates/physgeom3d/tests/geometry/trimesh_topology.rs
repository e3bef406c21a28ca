use physgeom3d::math::{Point, Real};
use physgeom3d::shape::{compute_adjacency, connected_components, MeshFlags, TriMesh, TriMeshBuilder, NO_NEIGHBOR};

// A flat grid where each quad is kept with probability 1/2, so the surface usually falls
// apart into several islands.
fn random_grid(rng: &mut oorandom::Rand32, n: u16) -> TriMesh {
    let mut vertices = vec![];
    for i in 0..=n {
        for j in 0..=n {
            let h = rng.rand_float() as Real * 0.1;
            vertices.push(Point::new(i as Real, h, j as Real));
        }
    }

    let id = |i: u16, j: u16| i * (n + 1) + j;
    let mut indices = vec![];
    for i in 0..n {
        for j in 0..n {
            if (i, j) != (0, 0) && rng.rand_range(0..2) == 0 {
                continue;
            }

            indices.extend_from_slice(&[id(i, j), id(i, j + 1), id(i + 1, j + 1)]);
            indices.extend_from_slice(&[id(i, j), id(i + 1, j + 1), id(i + 1, j)]);
        }
    }

    TriMeshBuilder::new(vertices, indices)
        .flags(MeshFlags::AABB | MeshFlags::TOPOLOGY)
        .island_split_threshold(8)
        .build_mesh()
        .unwrap()
}

#[test]
fn adjacency_is_symmetric() {
    let mut rng = oorandom::Rand32::new(42);

    for _ in 0..20 {
        let mesh = random_grid(&mut rng, 6);
        let topology = mesh.topology().unwrap();
        let indices = mesh.indices();

        for (t1, neighbors) in topology.neighbors().iter().enumerate() {
            for (e, t2) in neighbors.iter().enumerate() {
                if *t2 == NO_NEIGHBOR {
                    continue;
                }

                let (a, b) = (indices[t1][e], indices[t1][(e + 1) % 3]);
                let back = topology.neighbors()[*t2 as usize]
                    .iter()
                    .position(|n| *n == t1 as u32)
                    .expect("neighborhood must be symmetric");
                let tri2 = indices[*t2 as usize];
                let (c, d) = (tri2[back], tri2[(back + 1) % 3]);
                assert!((a, b) == (d, c) || (a, b) == (c, d));
            }
        }
    }
}

#[test]
fn islands_partition_the_triangles() {
    let mut rng = oorandom::Rand32::new(1234);

    for _ in 0..20 {
        let mesh = random_grid(&mut rng, 8);
        let topology = mesh.topology().unwrap();
        let mut owner = vec![None; mesh.num_triangles()];

        for (island_id, island) in topology.top_level_islands().iter().enumerate() {
            assert!(island.parent.is_none());
            for tri in &island.triangles {
                assert_eq!(owner[*tri as usize], None);
                owner[*tri as usize] = Some(island_id as u32);
                assert_eq!(topology.island_of(*tri), island_id as u32);
            }
        }

        assert!(owner.iter().all(|o| o.is_some()));
        let total: usize = topology
            .top_level_islands()
            .iter()
            .map(|i| i.triangle_count())
            .sum();
        assert_eq!(total, mesh.num_triangles());

        // Sub-islands split their parent without losing triangles.
        for (island_id, island) in topology.islands().iter().enumerate() {
            let children: Vec<_> = topology.children(island_id as u32).collect();
            if children.is_empty() {
                continue;
            }

            let mut child_tris: Vec<u32> = children
                .iter()
                .flat_map(|c| topology.islands()[*c as usize].triangles.iter().copied())
                .collect();
            let mut tris = island.triangles.clone();
            child_tris.sort_unstable();
            tris.sort_unstable();
            assert_eq!(child_tris, tris);
        }
    }
}

#[test]
fn free_functions_agree_with_the_mesh() {
    let mut rng = oorandom::Rand32::new(7);
    let mesh = random_grid(&mut rng, 5);
    let neighbors = compute_adjacency(mesh.indices());
    let components = connected_components(&neighbors);
    let topology = mesh.topology().unwrap();

    assert_eq!(neighbors, topology.neighbors());
    assert_eq!(components.len(), topology.top_level_islands().len());
}
