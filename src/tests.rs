// tests

use super::*;
use crate::camera::{
    cartesian_to_spherical, look_at, perspective_projection, spherical_to_cartesian, viewport_matrix,
};
use crate::float_types::{Real, EPSILON, FRAC_PI_2, PI, TAU};
use crate::sweep::{extrude, path_sweep, rotation_sweep, transform_sweep, tube};
use crate::text::{fit_text_in_rect, fit_text_quad};
use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

// --------------------------------------------------------
//   Helpers
// --------------------------------------------------------

/// Returns the bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]` of a mesh.
fn bounding_box(mesh: &Mesh) -> [Real; 6] {
    let aabb = mesh.bounds().expect("mesh has no vertices");
    [
        aabb.mins.x,
        aabb.mins.y,
        aabb.mins.z,
        aabb.maxs.x,
        aabb.maxs.y,
        aabb.maxs.z,
    ]
}

/// Tolerance for results that are exact up to round-off
#[cfg(feature = "f64")]
const TOL: Real = 1e-9;
#[cfg(feature = "f32")]
const TOL: Real = 1e-3;

/// Tolerance for pixel coordinates
#[cfg(feature = "f64")]
const PIXEL_TOL: Real = 1e-6;
#[cfg(feature = "f32")]
const PIXEL_TOL: Real = 1e-2;

/// Quick helper to compare floating-point results with an acceptable tolerance.
fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Every edge of a closed, consistently wound mesh is used once in each
/// direction.
fn is_closed_and_oriented(mesh: &Mesh) -> bool {
    let welded = mesh.weld(float_types::WELD_TOLERANCE).unwrap();
    let mut directed = hashbrown::HashMap::new();
    for t in &welded.indices {
        for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
            *directed.entry((a, b)).or_insert(0usize) += 1;
        }
    }
    directed
        .iter()
        .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
}

// --------------------------------------------------------
//   Vertex & Polygon Tests
// --------------------------------------------------------

#[test]
fn test_vertex_flip() {
    let mut v = Vertex::new(Point3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 0.0, 0.0));
    v.flip();
    // Position remains the same
    assert_eq!(v.pos, Point3::new(1.0, 2.0, 3.0));
    // Normal should be negated
    assert_eq!(v.normal, Vector3::new(-1.0, 0.0, 0.0));
}

#[test]
fn test_vertex_interpolate() {
    let v1 = Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::x());
    let v2 = Vertex::new(Point3::new(2.0, 2.0, 2.0), Vector3::y());
    let mid = v1.interpolate(&v2, 0.5);
    assert_eq!(mid.pos, Point3::new(1.0, 1.0, 1.0));
    assert!(approx_eq(mid.normal.x, 0.5, EPSILON));
    assert!(approx_eq(mid.normal.y, 0.5, EPSILON));
}

#[test]
fn test_polygon_needs_three_points() {
    let result = Polygon::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
    assert_eq!(result, Err(GeometryError::DegeneratePolygon(2)));
    assert!(Polygon::regular(2, 1.0).is_err());
}

#[test]
fn test_regular_polygon_faces_z() {
    let hexagon = Polygon::regular(6, 2.0).unwrap();
    assert_eq!(hexagon.points.len(), 6);
    assert!(approx_eq(hexagon.points[0].x, 2.0, EPSILON));
    let n = hexagon.normal();
    assert!(approx_eq(n.z, 1.0, EPSILON));
    assert!(approx_eq(hexagon.reversed().normal().z, -1.0, EPSILON));
    assert_eq!(hexagon.fan_triangles().len(), 4);
    assert_eq!(hexagon.edges().count(), 6);
}

#[test]
fn test_newell_normal_length_is_twice_area() {
    let rect = Polygon::rectangle(3.0, 2.0);
    let n = polygon::newell_normal(&rect.points);
    assert!(approx_eq(n.norm(), 12.0, TOL));
}

#[test]
fn test_orthonormal_basis_is_right_handed() {
    for n in [Vector3::x(), Vector3::y(), Vector3::new(1.0, 2.0, -3.0)] {
        let (u, v) = polygon::build_orthonormal_basis(n);
        assert!(approx_eq(u.dot(&v), 0.0, TOL));
        let expected = n.normalize();
        assert!((u.cross(&v) - expected).norm() < TOL);
    }
}

// --------------------------------------------------------
//   Mesh Tests
// --------------------------------------------------------

#[test]
fn test_add_polygon_fans_triangles() {
    let mut mesh = Mesh::new();
    mesh.add_polygon(&Polygon::regular(5, 1.0).unwrap().points).unwrap();
    assert_eq!(mesh.vertex_count(), 5);
    assert_eq!(mesh.triangle_count(), 3);
    assert!(mesh.normals.is_empty());
    assert!(mesh.face_normal(0).z > 0.0);

    assert_eq!(
        mesh.add_polygon(&[Point3::origin()]),
        Err(GeometryError::DegeneratePolygon(1))
    );
}

#[test]
fn test_textured_polygon_length_mismatch() {
    let mut mesh = Mesh::new();
    let rect = Polygon::rectangle(1.0, 1.0);
    let err = mesh
        .add_polygon_textured(&rect.points, &[Point2::origin()])
        .unwrap_err();
    assert_eq!(
        err,
        GeometryError::AttributeLengthMismatch {
            attribute: "texture_coords",
            expected: 4,
            found: 1
        }
    );
}

#[test]
fn test_attributes_stay_aligned() {
    let mut mesh = Mesh::new();
    mesh.add_point(Point3::origin());
    mesh.add_point_with_uv(Point3::new(1.0, 0.0, 0.0), Point2::new(1.0, 0.0));
    mesh.add_point_with_normal(Point3::new(0.0, 1.0, 0.0), Vector3::z());
    assert_eq!(mesh.texture_coords.len(), 3);
    assert_eq!(mesh.normals.len(), 3);
    assert_eq!(mesh.normals[0], Vector3::zeros());
    mesh.add_indexed_triangle(0, 1, 2);
    assert!(mesh.validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_index() {
    let mut mesh = Mesh::new();
    mesh.add_triangle(Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
    mesh.add_indexed_triangle(0, 1, 7);
    assert_eq!(
        mesh.validate(),
        Err(GeometryError::IndexOutOfRange {
            triangle: 1,
            index: 7,
            len: 3
        })
    );
}

#[test]
fn test_append_offsets_indices() {
    let a = Mesh::cube(Point3::origin(), 1.0).unwrap();
    let mut b = Mesh::cube(Point3::new(3.0, 0.0, 0.0), 1.0).unwrap();
    b.append(&a);
    assert_eq!(b.vertex_count(), 48);
    assert_eq!(b.triangle_count(), 24);
    assert!(b.indices[12..].iter().all(|t| t.iter().all(|&i| i >= 24)));
    assert!(approx_eq(b.volume(), 2.0, TOL));
}

#[test]
fn test_translate_and_scale() {
    let cube = Mesh::cube(Point3::origin(), 2.0).unwrap();
    let moved = cube.translate(Vector3::new(1.0, 2.0, 3.0)).scale(2.0, 1.0, 1.0);
    let bb = bounding_box(&moved);
    assert!(approx_eq(bb[0], 0.0, TOL));
    assert!(approx_eq(bb[3], 4.0, TOL));
    assert!(approx_eq(bb[1], 1.0, TOL));
    assert!(approx_eq(bb[5], 4.0, TOL));
    assert!(approx_eq(moved.volume(), 16.0, TOL));
}

#[test]
fn test_rotate_keeps_volume() {
    let cube = Mesh::cube(Point3::origin(), 2.0).unwrap();
    let rotated = cube.rotate(Vector3::new(1.0, 1.0, 0.0), 0.7);
    assert!(approx_eq(rotated.volume(), 8.0, TOL));
    // Normals rotate with the faces
    for t in 0..rotated.triangle_count() {
        let i = rotated.indices[t][0] as usize;
        assert!((rotated.normals[i] - rotated.face_normal(t)).norm() < TOL);
    }
}

#[test]
fn test_mirror_keeps_outward_winding() {
    let cone = Mesh::cone(Point3::new(1.0, 0.0, 0.0), Vector3::y(), 0.5, 16).unwrap();
    let volume = cone.volume();
    let mirrored = cone.mirror(Axis::X);
    assert!(volume > 0.0);
    assert!(approx_eq(mirrored.volume(), volume, TOL));
    assert!(bounding_box(&mirrored)[3] < 0.0);
}

#[test]
fn test_flip_negates_volume() {
    let mut cube = Mesh::cube(Point3::origin(), 1.0).unwrap();
    cube.flip();
    assert!(approx_eq(cube.volume(), -1.0, TOL));
    assert!(cube.normals.iter().all(|n| approx_eq(n.norm(), 1.0, TOL)));
}

#[test]
fn test_weld_merges_shared_corners() {
    let mut mesh = Mesh::new();
    let (a, b, c, d) = (
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    );
    mesh.add_triangle(a, b, c);
    mesh.add_triangle(a, c, d);
    // Degenerate sliver that collapses when welded
    mesh.add_triangle(a, b, b + Vector3::new(1e-9, 0.0, 0.0));
    assert_eq!(mesh.vertex_count(), 9);

    let welded = mesh.weld(1e-6).unwrap();
    assert_eq!(welded.vertex_count(), 4);
    assert_eq!(welded.triangle_count(), 2);
    assert!(welded.normals.is_empty());
}

#[test]
fn test_weld_merges_across_cell_boundary() {
    // Both points are well within tolerance but fall in different grid cells
    let mut mesh = Mesh::new();
    mesh.add_point(Point3::new(0.49e-6, 0.0, 0.0));
    mesh.add_point(Point3::new(0.51e-6, 0.0, 0.0));
    mesh.add_point(Point3::new(-0.01e-6, 0.0, 0.0));
    assert_eq!(mesh.weld(1e-6).unwrap().vertex_count(), 1);

    // Points farther apart than the tolerance stay separate
    let mut apart = Mesh::new();
    apart.add_point(Point3::new(0.0, 0.0, 0.0));
    apart.add_point(Point3::new(3e-6, 0.0, 0.0));
    assert_eq!(apart.weld(1e-6).unwrap().vertex_count(), 2);
}

#[test]
fn test_weld_rejects_bad_tolerance() {
    let sphere = Mesh::sphere(Point3::new(5.0, 5.0, 5.0), 1.0, 16, 8).unwrap();
    for tolerance in [0.0, -1.0, Real::NAN, Real::INFINITY] {
        assert!(matches!(
            sphere.weld(tolerance),
            Err(GeometryError::InvalidParameter(_))
        ));
    }
    let welded = sphere.weld(1e-4).unwrap();
    assert!(welded.triangle_count() > 0);
    assert!(welded.vertex_count() < sphere.vertex_count());
}

#[test]
fn test_compute_normals_smooths_welded_cube() {
    let mut cube = Mesh::cube(Point3::origin(), 2.0)
        .unwrap()
        .weld(float_types::WELD_TOLERANCE)
        .unwrap();
    assert_eq!(cube.vertex_count(), 8);
    cube.compute_normals();
    for (p, n) in cube.positions.iter().zip(&cube.normals) {
        // Corner normals point away from the center
        assert!(n.dot(&p.coords) > 0.0);
        assert!(approx_eq(n.norm(), 1.0, TOL));
    }
}

#[test]
fn test_flat_shaded_and_triangles() {
    let sphere = Mesh::sphere(Point3::origin(), 1.0, 8, 4).unwrap();
    let flat = sphere.flat_shaded();
    assert_eq!(flat.vertex_count(), sphere.triangle_count() * 3);
    assert_eq!(flat.texture_coords.len(), flat.vertex_count());
    for (t, tri) in flat.triangles().enumerate() {
        assert_eq!(tri[0].normal, flat.face_normal(t));
    }
    let rebuilt = Mesh::from_triangles(sphere.triangles());
    assert!(approx_eq(rebuilt.volume(), sphere.volume(), TOL));
}

#[test]
fn test_bounds_of_empty_mesh() {
    let mesh = Mesh::new();
    assert!(mesh.is_empty());
    assert!(mesh.bounds().is_none());
    assert_eq!(mesh.volume(), 0.0);
}

// --------------------------------------------------------
//   Shapes Tests
// --------------------------------------------------------

#[test]
fn test_cube_volume_and_area() {
    let cube = Mesh::cube(Point3::new(1.0, 1.0, 1.0), 2.0).unwrap();
    assert_eq!(cube.vertex_count(), 24);
    assert_eq!(cube.triangle_count(), 12);
    assert!(approx_eq(cube.volume(), 8.0, TOL));
    assert!(approx_eq(cube.surface_area(), 24.0, TOL));
    assert_eq!(bounding_box(&cube), [0.0, 0.0, 0.0, 2.0, 2.0, 2.0]);
    assert!(is_closed_and_oriented(&cube));
    assert!(Mesh::cube(Point3::origin(), 0.0).is_err());
}

#[test]
fn test_box_with_left_handed_edges_faces_out() {
    let mut mesh = Mesh::new();
    mesh.add_box(Point3::origin(), Vector3::y(), Vector3::x(), Vector3::z()).unwrap();
    assert!(approx_eq(mesh.volume(), 1.0, TOL));
    assert!(mesh
        .add_box(Point3::origin(), Vector3::x(), Vector3::y(), Vector3::x() + Vector3::y())
        .is_err());
}

#[test]
fn test_thin_box_is_not_coplanar() {
    let mut mesh = Mesh::new();
    mesh.add_box(
        Point3::origin(),
        Vector3::new(1e-3, 0.0, 0.0),
        Vector3::new(0.0, 1e-4, 0.0),
        Vector3::new(0.0, 0.0, 1e-4),
    )
    .unwrap();
    assert_eq!(mesh.triangle_count(), 12);
    assert!(mesh.volume() > 0.0);

    let flat = mesh.add_box(Point3::origin(), Vector3::x(), Vector3::y(), Vector3::x() + Vector3::y());
    assert!(flat.is_err());
    assert!(mesh.add_box(Point3::origin(), Vector3::zeros(), Vector3::y(), Vector3::z()).is_err());
    let nan_corner = Point3::new(Real::NAN, 0.0, 0.0);
    assert!(mesh.add_box(nan_corner, Vector3::x(), Vector3::y(), Vector3::z()).is_err());
    assert_eq!(mesh.triangle_count(), 12);
}

#[test]
fn test_add_face_orients_away_from_inside() {
    let mut mesh = Mesh::new();
    let square = Polygon::rectangle(1.0, 1.0);
    mesh.add_face(&square.points, Some(Point3::new(0.0, 0.0, 1.0))).unwrap();
    assert!(mesh.face_normal(0).z < 0.0);
    assert!(mesh.normals.iter().all(|n| approx_eq(n.z, -1.0, TOL)));
}

#[test]
fn test_sphere_counts_and_bounds() {
    let sphere = Mesh::sphere(Point3::origin(), 2.0, 32, 16).unwrap();
    assert_eq!(sphere.vertex_count(), 33 * 17);
    // Pole rows have one triangle per slice
    assert_eq!(sphere.triangle_count(), 32 * 30);
    let bb = bounding_box(&sphere);
    assert!(approx_eq(bb[1], -2.0, TOL));
    assert!(approx_eq(bb[4], 2.0, TOL));
    assert!(sphere.volume() > 0.0);
    assert!(sphere.volume() < 4.0 / 3.0 * PI * 8.0);
    for (p, n) in sphere.positions.iter().zip(&sphere.normals) {
        assert!((p.coords / 2.0 - n).norm() < TOL);
    }
    assert!(is_closed_and_oriented(&sphere));
}

#[test]
fn test_sphere_rejects_coarse_grid() {
    assert!(Mesh::sphere(Point3::origin(), 1.0, 2, 4).is_err());
    assert!(Mesh::sphere(Point3::origin(), 1.0, 8, 1).is_err());
    assert!(Mesh::sphere(Point3::origin(), -1.0, 8, 4).is_err());
}

#[test]
fn test_geodesic_sphere_shares_vertices() {
    let sphere = Mesh::geodesic_sphere(Point3::new(0.0, 1.0, 0.0), 3.0, 1).unwrap();
    assert_eq!(sphere.vertex_count(), 42);
    assert_eq!(sphere.triangle_count(), 80);
    for p in &sphere.positions {
        assert!(approx_eq((p - Point3::new(0.0, 1.0, 0.0)).norm(), 3.0, TOL));
    }
    assert!(sphere.volume() > 0.0);
}

#[test]
fn test_cylinder_volume() {
    let cylinder = Mesh::cylinder(Point3::origin(), Vector3::y() * 2.0, 1.0, 64).unwrap();
    assert!(approx_eq(cylinder.volume(), 2.0 * PI, 0.05));
    assert!(is_closed_and_oriented(&cylinder));
}

#[test]
fn test_cone_and_frustum() {
    let cone = Mesh::cone(Point3::origin(), Vector3::z() * 3.0, 1.0, 64).unwrap();
    assert!(approx_eq(cone.volume(), PI, 0.05));
    assert!(is_closed_and_oriented(&cone));

    let mut frustum = Mesh::new();
    frustum
        .add_frustum(Point3::origin(), Vector3::y(), 2.0, 1.0, 64, true)
        .unwrap();
    let expected = PI / 3.0 * (4.0 + 2.0 + 1.0);
    assert!(approx_eq(frustum.volume(), expected, 0.1));

    let mut mesh = Mesh::new();
    assert!(mesh.add_frustum(Point3::origin(), Vector3::zeros(), 1.0, 1.0, 8, true).is_err());
    assert!(mesh.add_frustum(Point3::origin(), Vector3::y(), 0.0, 0.0, 8, true).is_err());
    assert!(mesh.add_frustum(Point3::origin(), Vector3::y(), 1.0, 1.0, 2, true).is_err());
    assert!(mesh.is_empty());
}

#[test]
fn test_torus_volume() {
    let torus = Mesh::torus(Point3::origin(), 2.0, 0.5, 64, 32).unwrap();
    let expected = 2.0 * PI * PI * 2.0 * 0.25;
    assert!(approx_eq(torus.volume(), expected, 0.15));
    let bb = bounding_box(&torus);
    assert!(approx_eq(bb[4], 0.5, TOL));
    assert!(approx_eq(bb[5], 2.5, TOL));
}

// --------------------------------------------------------
//   Platonic Solids
// --------------------------------------------------------

#[test]
fn test_platonic_counts_satisfy_euler() {
    let expected = [(4, 6, 4, 3), (8, 12, 6, 4), (6, 12, 8, 3), (20, 30, 12, 5), (12, 30, 20, 3)];
    for (solid, (v, e, f, sides)) in PlatonicSolid::ALL.iter().zip(expected) {
        assert_eq!(solid.vertex_count(), v, "{solid:?}");
        assert_eq!(solid.edge_count(), e, "{solid:?}");
        assert_eq!(solid.face_count(), f, "{solid:?}");
        assert_eq!(solid.face_sides(), sides, "{solid:?}");
        assert_eq!(v + f, e + 2, "{solid:?}");

        assert_eq!(solid.vertices().len(), v);
        let faces = solid.faces();
        assert_eq!(faces.len(), f, "{solid:?}");
        assert!(faces.iter().all(|face| face.len() == sides));
    }
}

#[test]
fn test_platonic_meshes_are_closed() {
    for solid in PlatonicSolid::ALL {
        let mesh = Mesh::platonic(solid, Point3::new(1.0, 2.0, 3.0), 2.0).unwrap();
        assert_eq!(mesh.triangle_count(), solid.face_count() * (solid.face_sides() - 2));
        assert!(mesh.volume() > 0.0, "{solid:?}");
        assert!(is_closed_and_oriented(&mesh), "{solid:?}");
        for p in &mesh.positions {
            assert!(approx_eq((p - Point3::new(1.0, 2.0, 3.0)).norm(), 2.0, TOL));
        }
    }
}

// --------------------------------------------------------
//   Sweeps
// --------------------------------------------------------

#[test]
fn test_extrude_prism_volume() {
    let rect = Polygon::rectangle(2.0, 1.0);
    let prism = extrude(&rect.points, Vector3::z() * 3.0, SweepOptions::solid()).unwrap();
    assert!(approx_eq(prism.volume(), 6.0, TOL));
    assert!(is_closed_and_oriented(&prism));

    let flat = extrude(
        &rect.points,
        Vector3::z() * 3.0,
        SweepOptions {
            smooth: false,
            ..SweepOptions::solid()
        },
    )
    .unwrap();
    assert!(approx_eq(flat.volume(), 6.0, TOL));
}

#[test]
fn test_extrude_open_sides_only() {
    let rect = Polygon::rectangle(2.0, 1.0);
    let sides = extrude(&rect.points, Vector3::z(), SweepOptions::default()).unwrap();
    assert_eq!(sides.triangle_count(), 8);
    // Seam column duplicated for texture coordinates
    assert_eq!(sides.vertex_count(), 10);
    assert!(approx_eq(sides.surface_area(), 6.0, TOL));
}

#[test]
fn test_sweep_rejects_caps_on_open_generator() {
    let line = [Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
    let options = SweepOptions {
        close_generator: false,
        ..SweepOptions::solid()
    };
    assert!(matches!(
        extrude(&line, Vector3::z(), options),
        Err(GeometryError::InvalidParameter(_))
    ));
    assert!(transform_sweep(&line, &[Matrix4::identity()], SweepOptions::default()).is_err());
}

#[test]
fn test_full_rotation_sweep_closes() {
    // Profile from top to bottom at positive x, revolved around +Y
    let profile = [
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, -1.0, 0.0),
    ];
    let options = SweepOptions {
        close_generator: false,
        ..SweepOptions::default()
    };
    let band = rotation_sweep(&profile, Point3::origin(), Vector3::y(), TAU, 16, options).unwrap();
    assert_eq!(band.vertex_count(), 17 * 3);
    assert_eq!(band.triangle_count(), 16 * 2 * 2);

    // Outward: normals point away from the axis
    for (p, n) in band.positions.iter().zip(&band.normals) {
        let radial = Vector3::new(p.x, 0.0, p.z);
        assert!(n.dot(&radial) > 0.0);
    }
    // The seam rows coincide
    assert!((band.positions[0] - band.positions[16 * 3]).norm() < TOL);
    assert!(rotation_sweep(&profile, Point3::origin(), Vector3::y(), TAU, 2, options).is_err());
}

#[test]
fn test_partial_rotation_sweep() {
    let profile = [Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, -1.0, 0.0)];
    let options = SweepOptions {
        close_generator: false,
        ..SweepOptions::default()
    };
    let half = rotation_sweep(&profile, Point3::origin(), Vector3::y(), PI, 8, options).unwrap();
    assert_eq!(half.vertex_count(), 9 * 2);
    assert!(approx_eq(half.surface_area(), 2.0 * PI, 0.1));
}

#[test]
fn test_tube_along_straight_path() {
    let path = [Point3::origin(), Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 0.0, 2.0)];
    let t = tube(&path, 1.0, 64).unwrap();
    assert!(approx_eq(t.volume(), 2.0 * PI, 0.05));
    assert!(is_closed_and_oriented(&t));
}

#[test]
fn test_path_sweep_rejects_bad_paths() {
    let square = [
        Point2::new(-0.1, -0.1),
        Point2::new(0.1, -0.1),
        Point2::new(0.1, 0.1),
        Point2::new(-0.1, 0.1),
    ];
    let repeated = [Point3::origin(), Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
    assert!(path_sweep(&square, &repeated, SweepOptions::default()).is_err());

    let closed_options = SweepOptions {
        close_path: true,
        ..SweepOptions::default()
    };
    let loop_with_duplicate = [
        Point3::origin(),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::origin(),
    ];
    assert!(path_sweep(&square, &loop_with_duplicate, closed_options).is_err());
}

#[test]
fn test_closed_path_sweep_is_a_torus() {
    let ring: Vec<Point3<Real>> = (0..48)
        .map(|i| {
            let a = TAU * i as Real / 48.0;
            Point3::new(2.0 * a.cos(), 0.0, 2.0 * a.sin())
        })
        .collect();
    let circle: Vec<Point2<Real>> = Polygon::regular(16, 0.25)
        .unwrap()
        .points
        .iter()
        .map(|p| Point2::new(p.x, p.y))
        .collect();
    let options = SweepOptions {
        close_path: true,
        ..SweepOptions::default()
    };
    let torus = path_sweep(&circle, &ring, options).unwrap();
    assert_eq!(torus.triangle_count(), 48 * 16 * 2);
    // Polygonal cross-section and path make it slightly smaller than a true torus
    let expected = 2.0 * PI * PI * 2.0 * 0.0625;
    assert!(approx_eq(torus.volume().abs(), expected, 0.15));
}

// --------------------------------------------------------
//   Function Surfaces
// --------------------------------------------------------

#[test]
fn test_parametric_plane_counts() {
    let plane = Mesh::parametric_surface(
        |u, v| Point3::new(u, 0.0, v),
        (0.0, 4.0),
        (0.0, 3.0),
        4,
        3,
        SurfaceOptions::default(),
    )
    .unwrap();
    assert_eq!(plane.vertex_count(), 5 * 4);
    assert_eq!(plane.triangle_count(), 4 * 3 * 2);
    assert!(approx_eq(plane.surface_area(), 12.0, TOL));
    // du x dv = x * z = -y
    assert!(plane.normals.iter().all(|n| approx_eq(n.y, -1.0, TOL)));
    let last = plane.texture_coords[plane.vertex_count() - 1];
    assert_eq!(last, Point2::new(1.0, 1.0));
}

#[test]
fn test_parametric_wrap_shares_or_duplicates_seam() {
    let cylinder = |u: Real, v: Real| Point3::new(u.sin(), v, u.cos());
    let shared = Mesh::parametric_surface(
        cylinder,
        (0.0, TAU),
        (0.0, 1.0),
        8,
        2,
        SurfaceOptions {
            wrap_u: true,
            texture: false,
            ..SurfaceOptions::default()
        },
    )
    .unwrap();
    assert_eq!(shared.vertex_count(), 8 * 3);
    assert!(shared.texture_coords.is_empty());

    let textured = Mesh::parametric_surface(
        cylinder,
        (0.0, TAU),
        (0.0, 1.0),
        8,
        2,
        SurfaceOptions {
            wrap_u: true,
            ..SurfaceOptions::default()
        },
    )
    .unwrap();
    assert_eq!(textured.vertex_count(), 9 * 3);
    assert_eq!(textured.triangle_count(), shared.triangle_count());
    // Seam normals agree
    assert!((textured.normals[0] - textured.normals[8]).norm() < TOL);
}

#[test]
fn test_parametric_rejects_nan() {
    let result = Mesh::parametric_surface(
        |u, v| Point3::new(u, (v - 0.5).ln(), 0.0),
        (0.0, 1.0),
        (0.0, 1.0),
        2,
        2,
        SurfaceOptions::default(),
    );
    assert!(matches!(result, Err(GeometryError::NonFiniteCoordinate(_))));
}

#[test]
fn test_height_field_faces_up() {
    let mut mesh = Mesh::new();
    mesh.add_height_field(|x, z| 0.1 * x * z, (-1.0, 1.0), (-2.0, 2.0), 4, 8).unwrap();
    assert_eq!(mesh.vertex_count(), 5 * 9);
    assert!(mesh.normals.iter().all(|n| n.y > 0.0));
    let bb = bounding_box(&mesh);
    assert!(approx_eq(bb[0], -1.0, TOL));
    assert!(approx_eq(bb[5], 2.0, TOL));
    // u follows x
    let corner = mesh
        .positions
        .iter()
        .position(|p| approx_eq(p.x, 1.0, TOL) && approx_eq(p.z, -2.0, TOL))
        .unwrap();
    assert_eq!(mesh.texture_coords[corner], Point2::new(1.0, 0.0));
}

// --------------------------------------------------------
//   Camera
// --------------------------------------------------------

#[test]
fn test_spherical_round_trip() {
    let p = spherical_to_cartesian(3.0, 0.5, 1.2);
    let (r, theta, phi) = cartesian_to_spherical(&p);
    assert!(approx_eq(r, 3.0, TOL));
    assert!(approx_eq(theta, 0.5, TOL));
    assert!(approx_eq(phi, 1.2, TOL));

    // theta = 0 lies on +Z, phi = 0 on +Y
    let front = spherical_to_cartesian(1.0, 0.0, FRAC_PI_2);
    assert!((front - Point3::new(0.0, 0.0, 1.0)).norm() < TOL);
    assert_eq!(cartesian_to_spherical(&Point3::origin()), (0.0, 0.0, 0.0));
}

#[test]
fn test_perspective_depth_range() {
    let proj = perspective_projection(FRAC_PI_2, 1.5, 0.5, 100.0).unwrap();
    let depth = |z: Real| {
        let clip = proj * Vector4::new(0.0, 0.0, z, 1.0);
        clip.z / clip.w
    };
    assert!(approx_eq(depth(-0.5), 0.0, TOL));
    assert!(approx_eq(depth(-100.0), 1.0, TOL));

    let infinite = perspective_projection(FRAC_PI_2, 1.5, 0.5, Real::INFINITY).unwrap();
    let clip = infinite * Vector4::new(0.0, 0.0, -0.5, 1.0);
    assert!(approx_eq(clip.z / clip.w, 0.0, TOL));

    // Horizontal field of view: x at the edge of a 90 degree view maps to 1
    let clip = proj * Vector4::new(2.0, 0.0, -2.0, 1.0);
    assert!(approx_eq(clip.x / clip.w, 1.0, TOL));

    assert!(perspective_projection(0.0, 1.0, 0.5, 10.0).is_err());
    assert!(perspective_projection(1.0, 1.0, 0.5, 0.1).is_err());
}

#[test]
fn test_world_to_screen_center() {
    let camera = Camera::default();
    let p = camera.world_to_screen(&Point3::origin(), 800.0, 600.0).unwrap();
    assert!(approx_eq(p.x, 400.0, PIXEL_TOL));
    assert!(approx_eq(p.y, 300.0, PIXEL_TOL));

    // Up in the world is up on screen (smaller y)
    let above = camera.world_to_screen(&Point3::new(0.0, 1.0, 0.0), 800.0, 600.0).unwrap();
    assert!(above.y < 300.0);

    // Behind the camera
    assert!(camera.world_to_screen(&Point3::new(0.0, 0.0, 10.0), 800.0, 600.0).is_none());
}

#[test]
fn test_screen_to_ray_round_trips() {
    let camera = Camera {
        position: Point3::new(1.0, 2.0, 5.0),
        look_direction: Vector3::new(-0.2, -0.3, -1.0),
        ..Camera::default()
    };
    let center = camera.screen_to_ray(400.0, 300.0, 800.0, 600.0).unwrap();
    assert!((center.dir - camera.look_direction.normalize()).norm() < TOL);

    let ray = camera.screen_to_ray(100.0, 450.0, 800.0, 600.0).unwrap();
    let target = ray.point_at(7.0);
    let pixel = camera.world_to_screen(&target, 800.0, 600.0).unwrap();
    assert!(approx_eq(pixel.x, 100.0, PIXEL_TOL));
    assert!(approx_eq(pixel.y, 450.0, PIXEL_TOL));
}

#[test]
fn test_orthographic_rays_are_parallel() {
    let camera = Camera {
        projection: Projection::Orthographic {
            width: 4.0,
            near: 0.1,
            far: 50.0,
        },
        ..Camera::default()
    };
    let a = camera.screen_to_ray(0.0, 0.0, 800.0, 400.0).unwrap();
    let b = camera.screen_to_ray(800.0, 400.0, 800.0, 400.0).unwrap();
    assert_eq!(a.dir, b.dir);
    assert!(approx_eq(a.origin.x, -2.0, TOL));
    assert!(approx_eq(a.origin.y, 1.0, TOL));
    let p = camera.world_to_screen(&Point3::new(2.0, -1.0, 0.0), 800.0, 400.0).unwrap();
    assert!(approx_eq(p.x, 800.0, PIXEL_TOL));
    assert!(approx_eq(p.y, 400.0, PIXEL_TOL));
}

#[test]
fn test_controller_clamps() {
    let mut controller = SphericalCameraController::new(Point3::origin(), 0.1, 7.0, -1.0);
    let s = controller.settings;
    assert_eq!(controller.r, s.min_r);
    assert_eq!(controller.phi, s.pole_margin);
    assert!(controller.theta >= 0.0 && controller.theta < TAU);

    controller.apply(CameraMove::Up);
    assert_eq!(controller.phi, s.pole_margin);
    controller.apply(CameraMove::In);
    assert_eq!(controller.r, s.min_r);
    controller.apply(CameraMove::Out);
    assert!(approx_eq(controller.r, s.min_r + s.d_r, TOL));

    controller.rotate(0.0, 10.0);
    assert!(approx_eq(controller.phi, PI - s.pole_margin, TOL));
}

#[test]
fn test_controller_limits_pole_margin() {
    let center = Point3::origin();
    let wide = ControllerSettings {
        pole_margin: 2.0,
        ..ControllerSettings::default()
    };
    let mut controller = SphericalCameraController::new(center, 5.0, 0.0, 1.0).with_settings(wide);
    assert!(approx_eq(controller.phi, FRAC_PI_2, TOL));
    controller.rotate(0.3, 0.5);
    assert!(approx_eq(controller.phi, FRAC_PI_2, TOL));
    controller.drag(5.0, 5.0);
    controller.zoom(1.0);
    assert!(approx_eq(controller.phi, FRAC_PI_2, TOL));

    let unset = ControllerSettings {
        pole_margin: Real::NAN,
        ..ControllerSettings::default()
    };
    let mut controller = SphericalCameraController::new(center, 5.0, 0.0, 1.0).with_settings(unset);
    assert!(approx_eq(controller.phi, 1.0, TOL));
    controller.rotate(0.0, -5.0);
    assert_eq!(controller.phi, 0.0);

    let mut negative = SphericalCameraController::new(center, 5.0, 0.0, 1.0);
    negative.settings.pole_margin = -1.0;
    negative.rotate(0.0, 10.0);
    assert!(approx_eq(negative.phi, PI, TOL));
}

#[test]
fn test_look_at_maps_target_down_negative_z() {
    let eye = Point3::new(0.0, 2.0, 5.0);
    let target = Point3::new(0.0, 2.0, 0.0);
    let view = look_at(&eye, &target, &Vector3::y());
    let t = view * Vector4::new(target.x, target.y, target.z, 1.0);
    assert!(approx_eq(t.x, 0.0, TOL));
    assert!(approx_eq(t.y, 0.0, TOL));
    assert!(approx_eq(t.z, -5.0, TOL));
    let e = view * Vector4::new(eye.x, eye.y, eye.z, 1.0);
    assert!(approx_eq(e.xyz().norm(), 0.0, TOL));
    // +X stays on the right, +Y stays up
    let right = view * Vector4::new(1.0, 2.0, 0.0, 1.0);
    assert!(right.x > 0.0);
    let above = view * Vector4::new(0.0, 3.0, 0.0, 1.0);
    assert!(above.y > 0.0);

    // Looking straight down still gives a valid basis
    let down = look_at(&Point3::new(0.0, 5.0, 0.0), &Point3::origin(), &Vector3::y());
    let o = down * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert!(approx_eq(o.z, -5.0, TOL));
    assert!(o.iter().all(|c| c.is_finite()));
}

#[test]
fn test_viewport_matrix_corners() {
    let vp = viewport_matrix(800.0, 600.0);
    let top_left = vp * Vector4::new(-1.0, 1.0, 0.25, 1.0);
    assert_eq!((top_left.x, top_left.y, top_left.z), (0.0, 0.0, 0.25));
    let bottom_right = vp * Vector4::new(1.0, -1.0, 1.0, 1.0);
    assert_eq!((bottom_right.x, bottom_right.y), (800.0, 600.0));
    let center = vp * Vector4::new(0.0, 0.0, 0.5, 1.0);
    assert_eq!((center.x, center.y), (400.0, 300.0));
}

#[test]
fn test_controller_drives_camera() {
    let center = Point3::new(1.0, 0.0, 0.0);
    let mut controller = SphericalCameraController::from_position(center, Point3::new(1.0, 0.0, 4.0));
    assert!(approx_eq(controller.r, 4.0, TOL));
    assert!(approx_eq(controller.theta, 0.0, TOL));
    assert!(approx_eq(controller.phi, FRAC_PI_2, TOL));

    controller.apply(CameraMove::Right);
    let mut camera = Camera::default();
    controller.update(&mut camera);
    assert!(approx_eq((camera.position - center).norm(), 4.0, TOL));
    assert!(camera.position.x > 1.0);
    // Center of the screen shows the orbit center
    let p = camera.world_to_screen(&center, 640.0, 480.0).unwrap();
    assert!(approx_eq(p.x, 320.0, PIXEL_TOL));
    assert!(approx_eq(p.y, 240.0, PIXEL_TOL));

    controller.drag(-10.0, 0.0);
    assert!(approx_eq(controller.theta, 0.1 + 0.1, TOL));
}

// --------------------------------------------------------
//   Ray Hits
// --------------------------------------------------------

#[test]
fn test_ray_intersections_with_cube() {
    let cube = Mesh::cube(Point3::origin(), 2.0).unwrap();
    let hits = cube.ray_intersections(&Point3::new(0.3, 0.1, 5.0), &-Vector3::z());
    assert_eq!(hits.len(), 2);
    assert!(approx_eq(hits[0].distance, 4.0, TOL));
    assert!(approx_eq(hits[1].distance, 6.0, TOL));
    assert!(approx_eq(hits[0].point.z, 1.0, TOL));

    let first = cube.first_hit(&Point3::new(0.3, 0.1, 5.0), &-Vector3::z()).unwrap();
    assert_eq!(first, hits[0]);
    assert!(cube.first_hit(&Point3::new(3.0, 0.0, 5.0), &-Vector3::z()).is_none());
}

#[test]
fn test_nearest_hit_picks_closest_model() {
    let near = Mesh::cube(Point3::new(0.0, 0.0, 0.0), 1.0).unwrap();
    let far = Mesh::cube(Point3::new(0.0, 0.0, -3.0), 1.0).unwrap();
    let camera = Camera::default();
    let ray = camera.screen_to_ray(403.0, 299.0, 800.0, 600.0).unwrap();

    let models = [("far", &far), ("near", &near)];
    let (name, hit) = hit::nearest_hit(models, &ray).unwrap();
    assert_eq!(name, "near");
    assert!(approx_eq(hit.distance, 4.5, 1e-3));

    let empty: [(usize, &Mesh); 0] = [];
    assert!(hit::nearest_hit(empty, &ray).is_none());
}

// --------------------------------------------------------
//   Text
// --------------------------------------------------------

#[test]
fn test_fit_text_quad_keeps_aspect() {
    let extent = TextExtent { width: 200.0, height: 50.0 };
    let quad = fit_text_quad(Point3::origin(), Vector3::x(), Vector3::new(0.2, 1.0, 0.0), 1.0, extent)
        .unwrap();
    assert!(approx_eq(quad.width(), 4.0, TOL));
    assert!(approx_eq(quad.height(), 1.0, TOL));
    // Up is made perpendicular to the baseline
    assert!(approx_eq(quad.corners[3].x, 0.0, TOL));
    assert!(approx_eq(quad.normal().z, 1.0, TOL));

    assert!(fit_text_quad(Point3::origin(), Vector3::x(), Vector3::x(), 1.0, extent).is_err());
    let empty = TextExtent { width: 0.0, height: 1.0 };
    assert!(fit_text_quad(Point3::origin(), Vector3::x(), Vector3::y(), 1.0, empty).is_err());
}

#[test]
fn test_fit_text_in_rect_alignment() {
    let extent = TextExtent { width: 2.0, height: 1.0 };
    let rect = |horizontal, vertical| {
        fit_text_in_rect(
            Point3::origin(),
            Vector3::x() * 4.0,
            Vector3::y() * 4.0,
            extent,
            TextAlignment { horizontal, vertical },
        )
        .unwrap()
    };

    let centered = rect(HorizontalAlignment::Center, VerticalAlignment::Center);
    assert!(approx_eq(centered.width(), 4.0, TOL));
    assert!(approx_eq(centered.height(), 2.0, TOL));
    assert!(approx_eq(centered.corners[0].y, 1.0, TOL));

    let top = rect(HorizontalAlignment::Left, VerticalAlignment::Top);
    assert!(approx_eq(top.corners[3].y, 4.0, TOL));

    let stretched = rect(HorizontalAlignment::Center, VerticalAlignment::Stretch);
    assert!(approx_eq(stretched.height(), 4.0, TOL));
    assert!(approx_eq(stretched.width(), 4.0, TOL));

    // A tall rectangle limits the width instead
    let tall = fit_text_in_rect(
        Point3::origin(),
        Vector3::x() * 1.0,
        Vector3::y() * 4.0,
        extent,
        TextAlignment::default(),
    )
    .unwrap();
    assert!(approx_eq(tall.width(), 1.0, TOL));
    assert!(approx_eq(tall.corners[0].y, 1.75, TOL));
}

#[test]
fn test_text_quad_mesh() {
    let quad = fit_text_quad(
        Point3::origin(),
        Vector3::x(),
        Vector3::y(),
        1.0,
        TextExtent { width: 3.0, height: 1.0 },
    )
    .unwrap();
    let mut mesh = Mesh::new();
    mesh.add_text_quad(&quad);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    assert!(mesh.face_normal(0).z > 0.0);
    assert_eq!(mesh.texture_coords[3], Point2::new(0.0, 0.0));
    assert!(approx_eq(mesh.surface_area(), 3.0, TOL));
}

#[cfg(feature = "truetype-text")]
#[test]
fn test_text_mesh_from_font() {
    let font_data = include_bytes!("../assets/DejaVuSansMono.ttf");
    let (mesh, extent) = text::text_mesh("Hi!", font_data, 2.0).unwrap();
    assert!(mesh.triangle_count() > 0);
    mesh.validate().unwrap();
    for t in 0..mesh.triangle_count() {
        assert!(mesh.face_normal(t).z > 0.0);
    }
    assert!(extent.width > 0.0);
    assert!(extent.height >= 2.0);
    let bb = bounding_box(&mesh);
    assert!(bb[3] > bb[0]);

    assert!(text::text_mesh("Hi", font_data, 0.0).is_err());
    assert!(text::text_mesh("Hi", b"definitely not a font", 1.0).is_err());
}

// --------------------------------------------------------
//   Fractals
// --------------------------------------------------------

#[test]
fn test_sierpinski_counts() {
    let zero = fractal::sierpinski_tetrahedron(Point3::origin(), 1.0, 0).unwrap();
    assert_eq!(zero.triangle_count(), 4);
    let two = fractal::sierpinski_tetrahedron(Point3::origin(), 1.0, 2).unwrap();
    assert_eq!(two.triangle_count(), 4 * 16);
    // Each level keeps half the volume
    assert!(approx_eq(two.volume(), zero.volume() / 4.0, TOL));
    assert!(fractal::sierpinski_tetrahedron(Point3::origin(), 1.0, 9).is_err());
}

#[test]
fn test_menger_sponge_counts() {
    let sponge = fractal::menger_sponge(Point3::origin(), 3.0, 1).unwrap();
    assert_eq!(sponge.triangle_count(), 20 * 12);
    assert!(approx_eq(sponge.volume(), 20.0, TOL));
    assert_eq!(bounding_box(&sponge), [-1.5, -1.5, -1.5, 1.5, 1.5, 1.5]);
}

#[test]
fn test_subdivide_keeps_shape() {
    let cube = Mesh::cube(Point3::origin(), 2.0).unwrap();
    let fine = fractal::subdivide(&cube, 2).unwrap();
    assert_eq!(fine.triangle_count(), 12 * 16);
    assert!(approx_eq(fine.volume(), 8.0, TOL));
    assert_eq!(fine.weld(float_types::WELD_TOLERANCE).unwrap().vertex_count(), 6 * 25 - 12 * 5 + 8);
}

#[test]
fn test_subdivide_rejects_deep_levels() {
    let tetra = Mesh::platonic(PlatonicSolid::Tetrahedron, Point3::origin(), 1.0).unwrap();
    assert!(fractal::subdivide(&tetra, 9).is_err());
    assert_eq!(fractal::subdivide(&tetra, 0).unwrap().triangle_count(), 4);
}

#[test]
fn test_koch_surface() {
    let tetra = Mesh::platonic(PlatonicSolid::Tetrahedron, Point3::origin(), 1.0).unwrap();
    let spiky = fractal::koch_surface(&tetra, 1, 0.5).unwrap();
    assert_eq!(spiky.triangle_count(), 4 * 6);
    assert!(spiky.volume() > tetra.volume());
    let dented = fractal::koch_surface(&tetra, 1, -0.2).unwrap();
    assert!(dented.volume() < tetra.volume());
    assert!(fractal::koch_surface(&tetra, 7, 0.5).is_err());
}

#[test]
fn test_fractal_terrain_is_deterministic() {
    let a = fractal::fractal_terrain(8.0, 4, 0.5, 7).unwrap();
    let b = fractal::fractal_terrain(8.0, 4, 0.5, 7).unwrap();
    let c = fractal::fractal_terrain(8.0, 4, 0.5, 8).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.positions, c.positions);

    assert_eq!(a.vertex_count(), 17 * 17);
    assert_eq!(a.triangle_count(), 16 * 16 * 2);
    assert!(a.normals.iter().all(|n| n.y > 0.0));
    let bb = bounding_box(&a);
    assert!(approx_eq(bb[0], -4.0, TOL));
    assert!(approx_eq(bb[5], 4.0, TOL));

    assert!(fractal::fractal_terrain(8.0, 0, 0.5, 7).is_err());
    assert!(fractal::fractal_terrain(8.0, 4, 1.5, 7).is_err());
}

// --------------------------------------------------------
//   Wireframe
// --------------------------------------------------------

#[test]
fn test_cube_edges() {
    let cube = Mesh::cube(Point3::origin(), 2.0).unwrap();
    let all = wireframe::unique_edges(&cube, &WireframeOptions::default());
    assert_eq!(all.len(), 18);
    let outline = wireframe::unique_edges(
        &cube,
        &WireframeOptions {
            skip_coplanar: true,
            ..WireframeOptions::default()
        },
    );
    assert_eq!(outline.len(), 12);
    for (a, b) in outline {
        assert!(approx_eq((b - a).norm(), 2.0, TOL));
    }
}

#[test]
fn test_edge_set_ignores_direction() {
    let mut set = EdgeSet::new();
    let (a, b) = (Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
    assert!(set.insert(a, b));
    assert!(!set.insert(b, a));
    assert!(set.contains(&b, &a));
    assert_eq!(set.len(), 1);
    assert_eq!(set.edges().next(), Some((a, b)));
}

#[test]
fn test_to_wireframe() {
    let tetra = Mesh::platonic(PlatonicSolid::Tetrahedron, Point3::origin(), 1.0).unwrap();
    let wire = wireframe::to_wireframe(&tetra, 0.02, &WireframeOptions::default()).unwrap();
    assert_eq!(wire.triangle_count(), 6 * 12);
    assert!(wire.volume() > 0.0);

    let mut mesh = Mesh::new();
    assert!(mesh.add_segment(Point3::origin(), Point3::origin(), 0.1, Vector3::y()).is_err());
    // A vertical segment falls back to another side direction
    mesh.add_segment(Point3::origin(), Point3::new(0.0, 2.0, 0.0), 0.1, Vector3::y())
        .unwrap();
    assert!(approx_eq(mesh.volume(), 0.02, TOL));
}

#[test]
fn test_wireframe_skips_degenerate_triangles() {
    let mut mesh = Mesh::cube(Point3::origin(), 2.0).unwrap();
    mesh.add_triangle(Point3::origin(), Point3::origin(), Point3::new(1.0, 0.0, 0.0));
    assert_eq!(wireframe::unique_edges(&mesh, &WireframeOptions::default()).len(), 18 + 1);

    let wire = wireframe::to_wireframe(&mesh, 0.01, &WireframeOptions::default()).unwrap();
    assert_eq!(wire.triangle_count(), 19 * 12);
    wire.validate().unwrap();
}

#[test]
fn test_edge_set_matches_nearby_endpoints() {
    let tol = float_types::WELD_TOLERANCE;
    let mut set = EdgeSet::new();
    let b = Point3::new(1.0, 1.0, 1.0);
    // Endpoints a hair apart on either side of a grid cell boundary
    assert!(set.insert(Point3::new(-0.01 * tol, 0.0, 0.0), b));
    assert!(!set.insert(b, Point3::new(0.01 * tol, 0.0, 0.0)));
    assert!(set.contains(&Point3::origin(), &b));
    assert_eq!(set.len(), 1);

    assert!(!set.insert(b, b));
    assert!(!set.insert(b, b + Vector3::new(0.1 * tol, 0.0, 0.0)));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_segment_rejects_non_finite_input() {
    let mut mesh = Mesh::new();
    let (a, b) = (Point3::origin(), Point3::new(1.0, 0.0, 0.0));
    assert!(mesh.add_segment(a, b, Real::NAN, Vector3::y()).is_err());
    assert!(mesh.add_segment(a, Point3::new(Real::NAN, 0.0, 0.0), 0.1, Vector3::y()).is_err());
    assert!(mesh.add_segment(a, b, 0.1, Vector3::new(0.0, Real::INFINITY, 0.0)).is_err());
    assert!(mesh.is_empty());

    // Millimetre-scale wires are fine
    mesh.add_segment(a, Point3::new(1e-3, 0.0, 0.0), 1e-4, Vector3::y()).unwrap();
    assert_eq!(mesh.triangle_count(), 12);
}

#[test]
fn test_to_normals_mesh() {
    let cube = Mesh::cube(Point3::origin(), 2.0).unwrap();
    let normals = wireframe::to_normals_mesh(&cube, 0.5, 0.01).unwrap();
    assert_eq!(normals.triangle_count(), 24 * 12);
    let bb = bounding_box(&normals);
    assert!(approx_eq(bb[3], 1.5, 0.01));
    assert!(wireframe::to_normals_mesh(&cube, 0.0, 0.01).is_err());
}

// --------------------------------------------------------
//   IO
// --------------------------------------------------------

#[test]
fn test_to_stl_ascii() {
    let cube = Mesh::cube(Point3::origin(), 1.0).unwrap();
    let stl = cube.to_stl_ascii("cube");
    assert!(stl.starts_with("solid cube\n"));
    assert!(stl.trim_end().ends_with("endsolid cube"));
    assert_eq!(stl.matches("facet normal").count(), 12);
    assert_eq!(stl.matches("vertex").count(), 36);
}

#[cfg(feature = "stl-io")]
#[test]
fn test_stl_binary_round_trip() {
    let cube = Mesh::cube(Point3::new(1.0, 0.0, 0.0), 2.0).unwrap();
    let bytes = cube.to_stl_binary().unwrap();
    assert_eq!(bytes.len(), 84 + 50 * 12);

    let back = Mesh::from_stl(&bytes).unwrap();
    assert_eq!(back.triangle_count(), 12);
    assert!(approx_eq(back.volume(), 8.0, TOL));
    assert_eq!(back.weld(1e-4).unwrap().vertex_count(), 8);
}

#[test]
fn test_obj_export() {
    let mut mesh = Mesh::new();
    mesh.add_triangle(Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0));
    let obj = mesh.to_obj();
    assert_eq!(obj.lines().filter(|l| l.starts_with("v ")).count(), 3);
    assert!(obj.contains("f 1 2 3"));

    let cube = Mesh::cube(Point3::origin(), 1.0).unwrap();
    assert!(cube.to_obj().contains("f 1/1/1 2/2/2 3/3/3"));
}

#[test]
fn test_obj_parse_quads_and_negative_indices() {
    let text = "\
# a unit square
o square
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f -4//1 -3//1 -2//1 -1//1
";
    let mesh = Mesh::from_obj(text).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    assert!(mesh.texture_coords.is_empty());
    assert!(mesh.normals.iter().all(|n| *n == Vector3::z()));
    assert!(approx_eq(mesh.surface_area(), 1.0, TOL));
}

#[test]
fn test_obj_parse_single_coordinate_texture() {
    let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.25\nvt 0.5 0.75 0\nf 1/1 2/2 3/1\n";
    let mesh = Mesh::from_obj(text).unwrap();
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.texture_coords[0], Point2::new(0.25, 0.0));
    assert_eq!(mesh.texture_coords[1], Point2::new(0.5, 0.75));
    assert!(Mesh::from_obj("v 0 0 0\nvt\n").is_err());
}

#[test]
fn test_obj_round_trip_keeps_attributes() {
    let torus = Mesh::torus(Point3::origin(), 1.0, 0.25, 8, 6).unwrap();
    let back = Mesh::from_obj(&torus.to_obj()).unwrap();
    assert_eq!(back.vertex_count(), torus.vertex_count());
    assert_eq!(back.triangle_count(), torus.triangle_count());
    assert_eq!(back.texture_coords.len(), back.vertex_count());
    assert_eq!(back.normals.len(), back.vertex_count());
    assert!(approx_eq(back.volume(), torus.volume(), TOL));
}

#[test]
fn test_obj_parse_errors() {
    assert!(matches!(
        Mesh::from_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n"),
        Err(IoError::MalformedInput(_))
    ));
    assert!(matches!(
        Mesh::from_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n"),
        Err(IoError::MalformedInput(_))
    ));
    assert!(matches!(Mesh::from_obj("v 0 zero 0\n"), Err(IoError::ParseFloat(_))));
    assert!(matches!(
        Mesh::from_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 x\n"),
        Err(IoError::ParseInt(_))
    ));
    assert!(matches!(Mesh::from_obj("v 1 2\n"), Err(IoError::MalformedInput(_))));
    assert!(matches!(Mesh::from_obj("v 0 0 0\nf 1 1\n"), Err(IoError::MalformedInput(_))));
}

#[test]
fn test_error_display() {
    let err = GeometryError::DegeneratePolygon(2);
    assert_eq!(err.to_string(), "Polygon needs at least 3 points, got 2");
    let io: IoError = err.into();
    assert!(io.to_string().contains("got 2"));
    assert!(std::error::Error::source(&io).is_some());
}
