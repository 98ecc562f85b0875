//! Self-similar shapes built by recursive subdivision.

use crate::enums::PlatonicSolid;
use crate::errors::{invalid, GeometryError};
use crate::float_types::{Real, EPSILON};
use crate::mesh::Mesh;
use crate::polygon::subdivide_triangle;
use crate::vertex::Vertex;
use nalgebra::{Point2, Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAX_SIERPINSKI_DEPTH: u32 = 8;
const MAX_MENGER_DEPTH: u32 = 4;
const MAX_KOCH_DEPTH: u32 = 6;
const MAX_SUBDIVIDE_LEVELS: u32 = 8;
const MAX_TERRAIN_DEPTH: u32 = 10;

/// Sierpinski tetrahedron: four half-size copies at the corners, `depth` times.
pub fn sierpinski_tetrahedron(
    center: Point3<Real>,
    circumradius: Real,
    depth: u32,
) -> Result<Mesh, GeometryError> {
    if depth > MAX_SIERPINSKI_DEPTH {
        return invalid(format!("sierpinski depth {depth} exceeds {MAX_SIERPINSKI_DEPTH}"));
    }
    if circumradius <= 0.0 {
        return invalid(format!("circumradius must be positive, got {circumradius}"));
    }
    let corners = PlatonicSolid::Tetrahedron.vertices();
    let mut mesh = Mesh::new();
    let mut pending = vec![(center, circumradius, depth)];
    while let Some((c, r, d)) = pending.pop() {
        if d == 0 {
            mesh.add_platonic(PlatonicSolid::Tetrahedron, c, r)?;
            continue;
        }
        for v in &corners {
            pending.push((c + v.coords * (r / 2.0), r / 2.0, d - 1));
        }
    }
    log::debug!("sierpinski tetrahedron depth {depth}: {} triangles", mesh.triangle_count());
    Ok(mesh)
}

/// Menger sponge: each cube is split into 27 and the 7 along the center
/// axes are removed, `depth` times. Faces between touching sub-cubes are
/// kept.
pub fn menger_sponge(center: Point3<Real>, size: Real, depth: u32) -> Result<Mesh, GeometryError> {
    if depth > MAX_MENGER_DEPTH {
        return invalid(format!("menger depth {depth} exceeds {MAX_MENGER_DEPTH}"));
    }
    if size <= 0.0 {
        return invalid(format!("sponge size must be positive, got {size}"));
    }
    let mut mesh = Mesh::new();
    let mut pending = vec![(center, size, depth)];
    while let Some((c, s, d)) = pending.pop() {
        if d == 0 {
            mesh.append(&Mesh::cube(c, s)?);
            continue;
        }
        let third = s / 3.0;
        for i in -1i32..=1 {
            for j in -1i32..=1 {
                for k in -1i32..=1 {
                    let zeros = [i, j, k].iter().filter(|&&x| x == 0).count();
                    if zeros > 1 {
                        continue;
                    }
                    let offset = Vector3::new(i as Real, j as Real, k as Real) * third;
                    pending.push((c + offset, third, d - 1));
                }
            }
        }
    }
    log::debug!("menger sponge depth {depth}: {} triangles", mesh.triangle_count());
    Ok(mesh)
}

/// Split every triangle into four at its edge midpoints, `levels` times.
///
/// Corners carry the source vertex normals when the mesh has them, face
/// normals otherwise, interpolated and renormalized. The result does not
/// share vertices; weld it for smooth shading.
pub fn subdivide(mesh: &Mesh, levels: u32) -> Result<Mesh, GeometryError> {
    if levels > MAX_SUBDIVIDE_LEVELS {
        return invalid(format!("subdivision levels {levels} exceed {MAX_SUBDIVIDE_LEVELS}"));
    }
    let mut result = Vec::with_capacity(mesh.triangle_count() * 4usize.pow(levels));
    for (t, tri) in mesh.indices.iter().enumerate() {
        let face = mesh.face_normal(t);
        let corner = |i: u32| {
            let normal = mesh.normals.get(i as usize).copied().unwrap_or(face);
            Vertex::new(mesh.positions[i as usize], normal)
        };
        let mut queue = vec![[corner(tri[0]), corner(tri[1]), corner(tri[2])]];
        for _ in 0..levels {
            queue = queue.into_iter().flat_map(subdivide_triangle).collect();
        }
        result.extend(queue);
    }
    result.iter_mut().flatten().for_each(Vertex::normalize_normal);
    Ok(Mesh::from_triangles(result))
}

/// Grow a tetrahedral spike out of the middle quarter of every triangle and
/// recurse into all six resulting triangles, `depth` times.
///
/// The spike's height is `height` times the edge length of the middle
/// triangle; negative heights dent inward.
pub fn koch_surface(mesh: &Mesh, depth: u32, height: Real) -> Result<Mesh, GeometryError> {
    if depth > MAX_KOCH_DEPTH {
        return invalid(format!("koch depth {depth} exceeds {MAX_KOCH_DEPTH}"));
    }
    let mut triangles: Vec<[Point3<Real>; 3]> =
        (0..mesh.triangle_count()).map(|t| mesh.triangle_points(t)).collect();

    for _ in 0..depth {
        let mut next = Vec::with_capacity(triangles.len() * 6);
        for [a, b, c] in triangles {
            let ab = Point3::from((a.coords + b.coords) / 2.0);
            let bc = Point3::from((b.coords + c.coords) / 2.0);
            let ca = Point3::from((c.coords + a.coords) / 2.0);
            let normal = (b - a).cross(&(c - a));
            if normal.norm_squared() < EPSILON * EPSILON {
                continue;
            }
            let edge = (bc - ab).norm();
            let mid = Point3::from((ab.coords + bc.coords + ca.coords) / 3.0);
            let apex = mid + normal.normalize() * (height * edge);

            next.push([a, ab, ca]);
            next.push([ab, b, bc]);
            next.push([ca, bc, c]);
            next.push([ab, bc, apex]);
            next.push([bc, ca, apex]);
            next.push([ca, ab, apex]);
        }
        triangles = next;
    }

    let mut out = Mesh::with_capacity(triangles.len() * 3, triangles.len());
    for [a, b, c] in triangles {
        let normal = (b - a).cross(&(c - a));
        if normal.norm_squared() < EPSILON * EPSILON {
            continue;
        }
        out.add_face(&[a, b, c], None)?;
    }
    log::debug!("koch surface depth {depth}: {} triangles", out.triangle_count());
    Ok(out)
}

/// Square terrain of side `size` centered on the origin, heights from the
/// diamond-square algorithm on a `2^depth + 1` grid.
///
/// The first random displacement spans `±size / 4` and each level
/// multiplies it by `roughness`. The same seed gives the same terrain.
pub fn fractal_terrain(size: Real, depth: u32, roughness: Real, seed: u64) -> Result<Mesh, GeometryError> {
    if depth < 1 || depth > MAX_TERRAIN_DEPTH {
        return invalid(format!("terrain depth must be in 1..={MAX_TERRAIN_DEPTH}, got {depth}"));
    }
    if size <= 0.0 {
        return invalid(format!("terrain size must be positive, got {size}"));
    }
    if !(roughness > 0.0 && roughness <= 1.0) {
        return invalid(format!("roughness must be in (0, 1], got {roughness}"));
    }

    let n = (1usize << depth) + 1;
    let mut heights = vec![0.0 as Real; n * n];
    let idx = |i: usize, j: usize| j * n + i;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut amplitude = size / 4.0;
    let mut step = n - 1;

    while step > 1 {
        let half = step / 2;

        // Diamond: centers of squares
        for j in (half..n).step_by(step) {
            for i in (half..n).step_by(step) {
                let avg = (heights[idx(i - half, j - half)]
                    + heights[idx(i + half, j - half)]
                    + heights[idx(i - half, j + half)]
                    + heights[idx(i + half, j + half)])
                    / 4.0;
                heights[idx(i, j)] = avg + jitter(&mut rng) * amplitude;
            }
        }

        // Square: edge midpoints, averaging the neighbours that exist
        for j in (0..n).step_by(half) {
            let start = if (j / half) % 2 == 0 { half } else { 0 };
            for i in (start..n).step_by(step) {
                let mut sum = 0.0;
                let mut count = 0.0;
                if i >= half {
                    sum += heights[idx(i - half, j)];
                    count += 1.0;
                }
                if i + half < n {
                    sum += heights[idx(i + half, j)];
                    count += 1.0;
                }
                if j >= half {
                    sum += heights[idx(i, j - half)];
                    count += 1.0;
                }
                if j + half < n {
                    sum += heights[idx(i, j + half)];
                    count += 1.0;
                }
                heights[idx(i, j)] = sum / count + jitter(&mut rng) * amplitude;
            }
        }

        amplitude *= roughness;
        step = half;
    }

    let cell = size / (n - 1) as Real;
    let origin = -size / 2.0;
    let mut mesh = Mesh::with_capacity(n * n, 2 * (n - 1) * (n - 1));
    for j in 0..n {
        for i in 0..n {
            mesh.add_point_with_uv(
                Point3::new(origin + i as Real * cell, heights[idx(i, j)], origin + j as Real * cell),
                Point2::new(i as Real / (n - 1) as Real, j as Real / (n - 1) as Real),
            );
        }
    }
    let at = |i: usize, j: usize| idx(i, j) as u32;
    for j in 0..n - 1 {
        for i in 0..n - 1 {
            mesh.add_indexed_triangle(at(i, j), at(i, j + 1), at(i + 1, j));
            mesh.add_indexed_triangle(at(i + 1, j), at(i, j + 1), at(i + 1, j + 1));
        }
    }
    mesh.compute_normals();
    log::debug!("fractal terrain {n}x{n}, seed {seed}");
    Ok(mesh)
}

fn jitter(rng: &mut StdRng) -> Real {
    rng.gen_range(-1.0..=1.0)
}
