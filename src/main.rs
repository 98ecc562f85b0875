// main.rs
//
// Builds one mesh per generator and writes it under stl/

use meshkit3d::float_types::{Real, FRAC_PI_2, PI, TAU};
use meshkit3d::{
    fractal, sweep,
    text::{fit_text_quad, TextExtent},
    wireframe, Camera, Mesh, PlatonicSolid, Polygon, SphericalCameraController, SurfaceOptions,
    SweepOptions, WireframeOptions,
};
use nalgebra::{Point2, Point3, Vector3};
use std::error::Error;
use std::fs;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    fs::create_dir_all("stl")?;

    // 1) Primitive solids
    let origin = Point3::origin();
    write_stl("cube", &Mesh::cube(origin, 2.0)?)?;
    write_stl("sphere", &Mesh::sphere(origin, 1.0, 32, 16)?)?;
    write_stl("geodesic_sphere", &Mesh::geodesic_sphere(origin, 1.0, 3)?)?;
    write_stl("cylinder", &Mesh::cylinder(origin, Vector3::y() * 2.0, 0.5, 24)?)?;
    write_stl("cone", &Mesh::cone(origin, Vector3::y() * 2.0, 1.0, 24)?)?;
    write_stl("torus", &Mesh::torus(origin, 1.0, 0.3, 32, 16)?)?;

    // 2) Platonic solids in a row
    let mut solids = Mesh::new();
    for (i, solid) in PlatonicSolid::ALL.iter().enumerate() {
        solids.add_platonic(*solid, Point3::new(i as Real * 2.5, 0.0, 0.0), 1.0)?;
    }
    write_stl("platonic_solids", &solids)?;

    // 3) Sweeps
    let star: Vec<Point3<Real>> = (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { 1.0 } else { 0.45 };
            let a = TAU * i as Real / 10.0;
            Point3::new(r * a.cos(), r * a.sin(), 0.0)
        })
        .collect();
    let prism = sweep::extrude(
        &star,
        Vector3::z() * 0.5,
        SweepOptions {
            smooth: false,
            ..SweepOptions::solid()
        },
    )?;
    write_stl("star_prism", &prism)?;

    let profile: Vec<Point3<Real>> = (0..=8)
        .map(|i| {
            let t = i as Real / 8.0;
            Point3::new(0.6 + 0.3 * (PI * t).sin(), 1.0 - 2.0 * t, 0.0)
        })
        .collect();
    let vase = sweep::rotation_sweep(
        &profile,
        origin,
        Vector3::y(),
        TAU,
        32,
        SweepOptions {
            close_generator: false,
            ..SweepOptions::default()
        },
    )?;
    write_stl("vase", &vase)?;

    let helix: Vec<Point3<Real>> = (0..=64)
        .map(|i| {
            let a = i as Real * TAU / 16.0;
            Point3::new(a.cos() * 2.0, i as Real * 0.05, a.sin() * 2.0)
        })
        .collect();
    write_stl("helix_tube", &sweep::tube(&helix, 0.2, 12)?)?;

    // 4) Function surfaces
    let saddle = Mesh::parametric_surface(
        |u, v| Point3::new(u, u * u - v * v, v),
        (-1.0, 1.0),
        (-1.0, 1.0),
        24,
        24,
        SurfaceOptions::default(),
    )?;
    write_stl("saddle", &saddle)?;

    let mut ripples = Mesh::new();
    ripples.add_height_field(
        |x, z| 0.2 * (3.0 * (x * x + z * z).sqrt()).cos(),
        (-2.0, 2.0),
        (-2.0, 2.0),
        48,
        48,
    )?;
    write_stl("ripples", &ripples)?;

    // 5) Fractals
    write_stl("sierpinski", &fractal::sierpinski_tetrahedron(origin, 1.0, 3)?)?;
    write_stl("menger", &fractal::menger_sponge(origin, 2.0, 2)?)?;
    let octahedron = Mesh::platonic(PlatonicSolid::Octahedron, origin, 1.0)?;
    write_stl("koch", &fractal::koch_surface(&octahedron, 3, 0.5)?)?;
    write_stl("terrain", &fractal::fractal_terrain(10.0, 6, 0.55, 42)?)?;

    // 6) Wireframes and normals
    let cube = Mesh::cube(origin, 2.0)?;
    let options = WireframeOptions {
        skip_coplanar: true,
        ..WireframeOptions::default()
    };
    write_stl("cube_wireframe", &wireframe::to_wireframe(&cube, 0.05, &options)?)?;
    let ball = Mesh::sphere(origin, 1.0, 12, 6)?;
    write_stl("sphere_normals", &wireframe::to_normals_mesh(&ball, 0.3, 0.02)?)?;

    // 7) A text label fitted to a 4:1 texture
    let mut label = Mesh::new();
    let quad = fit_text_quad(
        Point3::new(-2.0, 1.5, 0.0),
        Vector3::x(),
        Vector3::y(),
        0.5,
        TextExtent { width: 256.0, height: 64.0 },
    )?;
    label.add_text_quad(&quad);
    fs::write("stl/label.obj", label.to_obj())?;

    // 8) Camera: orbit around the scene and pick what is under the cursor
    let mut camera = Camera::default();
    let mut controller = SphericalCameraController::new(origin, 6.0, 0.0, FRAC_PI_2);
    controller.drag(40.0, -20.0);
    controller.update(&mut camera);
    let ray = camera.screen_to_ray(400.0, 300.0, 800.0, 600.0)?;
    let scene = [("cube", &cube), ("vase", &vase)];
    match meshkit3d::hit::nearest_hit(scene, &ray) {
        Some((name, hit)) => log::info!("cursor hits {name} at distance {:.3}", hit.distance),
        None => log::info!("cursor hits nothing"),
    }
    log::info!(
        "camera at {:?} (theta {:.2}, phi {:.2})",
        camera.position,
        controller.theta,
        controller.phi
    );

    // 9) Round trip through OBJ
    let hexagon = Polygon::regular(6, 1.0)?;
    let mut flat = Mesh::new();
    flat.add_polygon_textured(
        &hexagon.points,
        &hexagon
            .points
            .iter()
            .map(|p| Point2::new(0.5 + p.x / 2.0, 0.5 - p.y / 2.0))
            .collect::<Vec<_>>(),
    )?;
    let reread = Mesh::from_obj(&flat.to_obj())?;
    write_stl("hexagon", &reread)?;

    Ok(())
}

#[cfg(feature = "stl-io")]
fn write_stl(name: &str, mesh: &Mesh) -> Result<(), Box<dyn Error>> {
    fs::write(format!("stl/{name}.stl"), mesh.to_stl_binary()?)?;
    Ok(())
}

#[cfg(not(feature = "stl-io"))]
fn write_stl(name: &str, mesh: &Mesh) -> Result<(), Box<dyn Error>> {
    fs::write(format!("stl/{name}.stl"), mesh.to_stl_ascii(name))?;
    Ok(())
}
