use physgeom3d::math::{Real, Vector, PI};
use physgeom3d::na;
use physgeom3d::query::{intersect, ContactBuffer, IntersectionFlags, IntersectionParameters, WorldData};
use physgeom3d::shape::SharedShape;
use physgeom3d::transformation::to_trimesh::cuboid_mesh;

fn cube(half: Real) -> SharedShape {
    let (vtx, idx) = cuboid_mesh(Vector::repeat(half));
    SharedShape::trimesh(vtx, idx).unwrap()
}

/// A small cube poking through the `+x` face of a large one.
fn poking_cubes(params: &IntersectionParameters) -> ContactBuffer {
    let (a, b) = (cube(1.0), cube(0.5));
    let wd_b = WorldData::at(Vector::new(1.0, 0.1, 0.2));
    let mut out = ContactBuffer::new();
    let _ = intersect(&a, &WorldData::default(), &b, &wd_b, params, &mut out);
    out
}

#[test]
fn exact_border_follows_adjacent_triangles() {
    let params = IntersectionParameters::default()
        .with_max_surface_gap_angle(PI)
        .with_flags(IntersectionFlags::EXACT_BORDER);
    let out = poking_cubes(&params);

    assert_eq!(out.len(), 1);
    let contact = &out.contacts()[0];
    assert!(contact.area.is_some());
    assert_eq!(contact.borders.len(), 1);

    let border = &contact.borders[0];
    assert!(border.closed && border.ordered);
    assert_eq!(border.num_segments(), border.points.len());
    assert!(border.points.iter().all(|pt| relative_eq!(pt.x, 1.0, epsilon = 1.0e-4)));

    // Successive segments come from a common triangle of one of the shapes.
    let n = border.num_segments();
    for i in 0..n {
        let (s, t) = (border.segments[i], border.segments[(i + 1) % n]);
        assert!(s[0] == t[0] || s[1] == t[1], "{:?} then {:?}", s, t);

        let (_, end) = border.segment(i).unwrap();
        let (start, _) = border.segment((i + 1) % n).unwrap();
        assert_relative_eq!(end, start, epsilon = 1.0e-5);
    }

    // The border encloses the 1 x 1 section of the small cube.
    let perimeter: Real = (0..n)
        .map(|i| {
            let (a, b) = border.segment(i).unwrap();
            na::distance(&a, &b)
        })
        .sum();
    assert_relative_eq!(perimeter, 4.0, epsilon = 1.0e-3);
}

#[test]
fn border_and_area_flags() {
    let merged = IntersectionParameters::default().with_max_surface_gap_angle(PI);

    let out = poking_cubes(&merged.with_flags(IntersectionFlags::NO_CONTACT_BORDER));
    assert_eq!(out.len(), 1);
    assert!(out.iter().all(|c| c.borders.is_empty()));

    let points = poking_cubes(&merged.with_flags(IntersectionFlags::NO_AREA_CONTACTS));
    assert!(points.len() > 1);
    assert!(points.iter().all(|c| c.area.is_none()));

    let area = out.contacts()[0].area.as_ref().unwrap();
    assert_eq!(area.primitives.len(), points.len());
    assert_eq!(area.points.len(), points.len());
}

#[test]
fn surface_gap_angle_splits_areas() {
    // The small cube pokes through the edge between the `+x` and `+y` faces: contacts on
    // both faces have perpendicular normals.
    let (a, b) = (cube(1.0), cube(0.5));
    let wd_b = WorldData::at(Vector::new(1.0, 1.0, 0.2));
    let mut out = ContactBuffer::new();
    let wd_a = WorldData::default();

    let wide = IntersectionParameters::default().with_max_surface_gap_angle(PI);
    assert_eq!(intersect(&a, &wd_a, &b, &wd_b, &wide, &mut out), 1);
    assert!(out.contacts()[0].area.is_some());

    let narrow = IntersectionParameters::default().with_max_surface_gap_angle(0.2);
    assert!(intersect(&a, &wd_a, &b, &wd_b, &narrow, &mut out) >= 2);
    for area in out.iter().filter_map(|c| c.area.as_ref()) {
        assert_eq!(area.primitives.len(), area.points.len());
    }
}
