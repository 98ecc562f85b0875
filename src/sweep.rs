//! Surfaces made by repeating a generator polyline under a sequence of
//! transforms: extrusions, surfaces of revolution and tubes along a path.
//!
//! Front faces point along `generator direction x sweep direction`. A
//! generator that runs counter-clockwise when seen from ahead of the sweep
//! therefore produces an outward-facing tube.

use crate::errors::{invalid, GeometryError};
use crate::float_types::{Real, EPSILON, TAU};
use crate::mesh::Mesh;
use crate::polygon::{build_orthonormal_basis, centroid, Polygon};
use nalgebra::{Matrix3, Matrix4, Point2, Point3, Rotation3, Translation3, Unit, Vector3};

/// How rings are joined and closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOptions {
    /// Join the last generator point back to the first
    pub close_generator: bool,
    /// Join the last ring back to the first (full revolutions, closed paths)
    pub close_path: bool,
    /// Close the first ring with a flat face; needs `close_generator`
    pub cap_start: bool,
    /// Close the last ring with a flat face; needs `close_generator`
    pub cap_end: bool,
    /// Share vertices and average normals across the swept surface
    pub smooth: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        SweepOptions {
            close_generator: true,
            close_path: false,
            cap_start: false,
            cap_end: false,
            smooth: true,
        }
    }
}

impl SweepOptions {
    /// Closed generator with both ends capped, as for a solid prism or tube
    pub fn solid() -> Self {
        SweepOptions {
            cap_start: true,
            cap_end: true,
            ..SweepOptions::default()
        }
    }
}

/// Place a copy of `generator` under each transform and stitch consecutive
/// copies together with quads.
///
/// Texture `u` runs along the generator and `v` along the sweep. When a
/// direction is closed its seam vertices are duplicated for the texture and
/// their normals averaged so the seam does not show.
pub fn transform_sweep(
    generator: &[Point3<Real>],
    transforms: &[Matrix4<Real>],
    options: SweepOptions,
) -> Result<Mesh, GeometryError> {
    if generator.len() < 2 {
        return invalid(format!("generator needs at least 2 points, got {}", generator.len()));
    }
    if transforms.len() < 2 {
        return invalid(format!("sweep needs at least 2 rings, got {}", transforms.len()));
    }
    if (options.cap_start || options.cap_end) && !options.close_generator {
        return invalid("end caps need a closed generator");
    }

    let n = generator.len();
    let rings = transforms.len();
    let cols = n + options.close_generator as usize;
    let rows = rings + options.close_path as usize;

    let mut mesh = Mesh::with_capacity(rows * cols, 2 * rows * cols);
    for r in 0..rows {
        let mat = &transforms[r % rings];
        for c in 0..cols {
            mesh.push_vertex(
                mat.transform_point(&generator[c % n]),
                None,
                Some(Point2::new(
                    c as Real / (cols - 1) as Real,
                    r as Real / (rows - 1) as Real,
                )),
            );
        }
    }

    let at = |r: usize, c: usize| (r * cols + c) as u32;
    for r in 0..rows - 1 {
        for c in 0..cols - 1 {
            mesh.add_indexed_triangle_checked(at(r, c), at(r, c + 1), at(r + 1, c));
            mesh.add_indexed_triangle_checked(at(r, c + 1), at(r + 1, c + 1), at(r + 1, c));
        }
    }

    mesh.compute_normals();
    if options.close_generator {
        for r in 0..rows {
            mesh.average_normals(at(r, 0), at(r, cols - 1));
        }
    }
    if options.close_path {
        for c in 0..cols {
            mesh.average_normals(at(0, c), at(rows - 1, c));
        }
    }
    if !options.smooth {
        mesh = mesh.flat_shaded();
    }

    if options.close_path {
        if options.cap_start || options.cap_end {
            log::warn!("sweep: caps ignored on a closed path");
        }
    } else {
        let ring = |r: usize| -> Vec<Point3<Real>> {
            generator.iter().map(|p| transforms[r].transform_point(p)).collect()
        };
        if options.cap_start {
            let inner = centroid(&ring(1));
            mesh.add_face(&ring(0), Some(inner))?;
        }
        if options.cap_end {
            let inner = centroid(&ring(rings - 2));
            mesh.add_face(&ring(rings - 1), Some(inner))?;
        }
    }

    log::debug!(
        "sweep: {rings} rings of {n} points, {} triangles",
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Sweep by cumulative translations: ring `k` is the generator moved by
/// `offsets[0] + .. + offsets[k - 1]`.
pub fn translation_sweep(
    generator: &[Point3<Real>],
    offsets: &[Vector3<Real>],
    options: SweepOptions,
) -> Result<Mesh, GeometryError> {
    let mut transforms = Vec::with_capacity(offsets.len() + 1);
    let mut total = Vector3::zeros();
    transforms.push(Matrix4::identity());
    for offset in offsets {
        total += offset;
        transforms.push(Translation3::from(total).to_homogeneous());
    }
    transform_sweep(generator, &transforms, options)
}

/// Single-step translation sweep (a prism when the generator is closed and capped)
pub fn extrude(
    generator: &[Point3<Real>],
    direction: Vector3<Real>,
    options: SweepOptions,
) -> Result<Mesh, GeometryError> {
    if direction.norm_squared() < EPSILON * EPSILON {
        return invalid("extrusion direction has zero length");
    }
    translation_sweep(generator, &[direction], options)
}

/// Revolve `generator` by `angle` radians around the line through
/// `axis_point` along `axis`, in `steps` increments.
///
/// An angle of a full turn or more produces a closed surface whose last
/// step joins the first ring. A profile lying in the XY plane at positive X
/// and revolved around +Y faces outward when ordered from top to bottom.
pub fn rotation_sweep(
    generator: &[Point3<Real>],
    axis_point: Point3<Real>,
    axis: Vector3<Real>,
    angle: Real,
    steps: usize,
    options: SweepOptions,
) -> Result<Mesh, GeometryError> {
    if axis.norm_squared() < EPSILON * EPSILON {
        return invalid("rotation axis has zero length");
    }
    if steps < 1 {
        return invalid("rotation sweep needs at least 1 step");
    }
    let axis = Unit::new_normalize(axis);
    let to_origin = Translation3::from(-axis_point.coords).to_homogeneous();
    let back = Translation3::from(axis_point.coords).to_homogeneous();
    let about_axis = |a: Real| back * Rotation3::from_axis_angle(&axis, a).to_homogeneous() * to_origin;

    let full_turn = angle.abs() >= TAU - EPSILON;
    let mut options = options;
    let transforms: Vec<Matrix4<Real>> = if full_turn {
        if steps < 3 {
            return invalid("a full revolution needs at least 3 steps");
        }
        options.close_path = true;
        let step = TAU * angle.signum() / steps as Real;
        (0..steps).map(|i| about_axis(step * i as Real)).collect()
    } else {
        let step = angle / steps as Real;
        (0..=steps).map(|i| about_axis(step * i as Real)).collect()
    };
    transform_sweep(generator, &transforms, options)
}

/// Carry a planar generator along a 3D polyline.
///
/// Generator point `(x, y)` is placed at `path[i] + x u + y v`, where
/// `{u, v, t}` is a right-handed frame with `t` the path tangent. Frames
/// are parallel-transported from one path point to the next so the
/// generator does not spin around the path. On a closed path the twist
/// left over after one loop is spread evenly along it.
pub fn path_sweep(
    generator: &[Point2<Real>],
    path: &[Point3<Real>],
    options: SweepOptions,
) -> Result<Mesh, GeometryError> {
    if path.len() < 2 {
        return invalid(format!("path needs at least 2 points, got {}", path.len()));
    }
    if let Some(i) = path
        .windows(2)
        .position(|w| (w[1] - w[0]).norm_squared() < EPSILON * EPSILON)
    {
        return invalid(format!("path points {i} and {} coincide", i + 1));
    }
    let closed = options.close_path;
    if closed && (path[0] - path[path.len() - 1]).norm_squared() < EPSILON * EPSILON {
        return invalid("closed path repeats its first point at the end");
    }
    let tangents = path_tangents(path, closed);

    let (mut u, _) = build_orthonormal_basis(tangents[0]);
    let mut frames = Vec::with_capacity(path.len());
    frames.push(u);
    for w in tangents.windows(2) {
        u = transport(u, &w[0], &w[1]);
        frames.push(u);
    }

    if closed {
        let back = transport(u, &tangents[tangents.len() - 1], &tangents[0]);
        let twist = signed_angle(&frames[0], &back, &tangents[0]);
        let count = path.len() as Real;
        for (i, frame) in frames.iter_mut().enumerate() {
            let correction = -twist * i as Real / count;
            let rot = Rotation3::from_axis_angle(&Unit::new_normalize(tangents[i]), correction);
            *frame = rot * *frame;
        }
    }

    let transforms: Vec<Matrix4<Real>> = path
        .iter()
        .zip(frames.iter().zip(&tangents))
        .map(|(p, (u, t))| {
            let v = t.cross(u);
            let mut m = Matrix3::from_columns(&[*u, v, *t]).to_homogeneous();
            m.fixed_view_mut::<3, 1>(0, 3).copy_from(&p.coords);
            m
        })
        .collect();

    let generator: Vec<Point3<Real>> = generator.iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect();
    transform_sweep(&generator, &transforms, options)
}

/// Round tube of `radius` along `path`, capped at both ends.
pub fn tube(path: &[Point3<Real>], radius: Real, segments: usize) -> Result<Mesh, GeometryError> {
    if radius <= 0.0 {
        return invalid(format!("tube radius must be positive, got {radius}"));
    }
    let ring = Polygon::regular(segments, radius)?;
    let generator: Vec<Point2<Real>> = ring.points.iter().map(|p| Point2::new(p.x, p.y)).collect();
    path_sweep(&generator, path, SweepOptions::solid())
}

// Unit tangents: segment directions at the ends, bisectors in between.
fn path_tangents(path: &[Point3<Real>], closed: bool) -> Vec<Vector3<Real>> {
    let n = path.len();
    let dir = |a: usize, b: usize| (path[b] - path[a]).normalize();
    (0..n)
        .map(|i| {
            let incoming = if i > 0 {
                Some(dir(i - 1, i))
            } else if closed {
                Some(dir(n - 1, 0))
            } else {
                None
            };
            let outgoing = if i + 1 < n {
                Some(dir(i, i + 1))
            } else if closed {
                Some(dir(n - 1, 0))
            } else {
                None
            };
            match (incoming, outgoing) {
                (Some(a), Some(b)) => {
                    let sum = a + b;
                    if sum.norm_squared() < EPSILON {
                        b
                    } else {
                        sum.normalize()
                    }
                }
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => Vector3::z(),
            }
        })
        .collect()
}

// Rotate `u` by the smallest rotation taking tangent `from` to `to`.
fn transport(u: Vector3<Real>, from: &Vector3<Real>, to: &Vector3<Real>) -> Vector3<Real> {
    let rotated = match Rotation3::rotation_between(from, to) {
        Some(rot) => rot * u,
        // Path doubles back on itself
        None => -u,
    };
    // Remove drift so u stays perpendicular to the tangent
    (rotated - to * rotated.dot(to)).normalize()
}

fn signed_angle(a: &Vector3<Real>, b: &Vector3<Real>, axis: &Vector3<Real>) -> Real {
    a.cross(b).dot(axis).atan2(a.dot(b))
}
