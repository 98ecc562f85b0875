//! Vertex sets and faces of the five platonic solids.

use crate::enums::PlatonicSolid;
use crate::float_types::{Real, PHI};
use crate::polygon::{build_orthonormal_basis, centroid};
use hashbrown::HashSet;
use nalgebra::{Point3, Vector3};
use std::cmp::Ordering;

// Coordinates below are exact up to round-off at unit scale
const FACE_TOLERANCE: Real = 1e-4;

impl PlatonicSolid {
    /// Vertices on the unit sphere centered at the origin.
    pub fn vertices(&self) -> Vec<Point3<Real>> {
        let raw: Vec<[Real; 3]> = match self {
            PlatonicSolid::Tetrahedron => vec![
                [1.0, 1.0, 1.0],
                [1.0, -1.0, -1.0],
                [-1.0, 1.0, -1.0],
                [-1.0, -1.0, 1.0],
            ],
            PlatonicSolid::Cube => {
                let mut v = Vec::with_capacity(8);
                for x in [-1.0, 1.0] {
                    for y in [-1.0, 1.0] {
                        for z in [-1.0, 1.0] {
                            v.push([x, y, z]);
                        }
                    }
                }
                v
            }
            PlatonicSolid::Octahedron => vec![
                [1.0, 0.0, 0.0],
                [-1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, -1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, -1.0],
            ],
            PlatonicSolid::Dodecahedron => {
                let inv = 1.0 / PHI;
                let mut v = Vec::with_capacity(20);
                for x in [-1.0, 1.0] {
                    for y in [-1.0, 1.0] {
                        for z in [-1.0, 1.0] {
                            v.push([x, y, z]);
                        }
                    }
                }
                for a in [-1.0, 1.0] {
                    for b in [-1.0, 1.0] {
                        v.push([0.0, a * inv, b * PHI]);
                        v.push([a * inv, b * PHI, 0.0]);
                        v.push([a * PHI, 0.0, b * inv]);
                    }
                }
                v
            }
            PlatonicSolid::Icosahedron => {
                let mut v = Vec::with_capacity(12);
                for a in [-1.0, 1.0] {
                    for b in [-1.0, 1.0] {
                        v.push([0.0, a, b * PHI]);
                        v.push([a, b * PHI, 0.0]);
                        v.push([b * PHI, 0.0, a]);
                    }
                }
                v
            }
        };
        raw.into_iter()
            .map(|c| Point3::from(Vector3::from(c).normalize()))
            .collect()
    }

    /// Faces as index loops into [`PlatonicSolid::vertices`], each wound
    /// counter-clockwise seen from outside the solid.
    pub fn faces(&self) -> Vec<Vec<usize>> {
        convex_faces(&self.vertices())
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            PlatonicSolid::Tetrahedron => 4,
            PlatonicSolid::Cube => 8,
            PlatonicSolid::Octahedron => 6,
            PlatonicSolid::Dodecahedron => 20,
            PlatonicSolid::Icosahedron => 12,
        }
    }

    pub fn face_count(&self) -> usize {
        match self {
            PlatonicSolid::Tetrahedron => 4,
            PlatonicSolid::Cube => 6,
            PlatonicSolid::Octahedron => 8,
            PlatonicSolid::Dodecahedron => 12,
            PlatonicSolid::Icosahedron => 20,
        }
    }

    /// Sides per face
    pub fn face_sides(&self) -> usize {
        match self {
            PlatonicSolid::Tetrahedron | PlatonicSolid::Octahedron | PlatonicSolid::Icosahedron => 3,
            PlatonicSolid::Cube => 4,
            PlatonicSolid::Dodecahedron => 5,
        }
    }

    pub fn edge_count(&self) -> usize {
        self.face_count() * self.face_sides() / 2
    }
}

/// Faces of the convex hull of a small point set whose faces are regular
/// polygons. A supporting plane through three points is a face plane when
/// every other point lies on or behind it.
fn convex_faces(points: &[Point3<Real>]) -> Vec<Vec<usize>> {
    let n = points.len();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut faces = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let normal = (points[j] - points[i]).cross(&(points[k] - points[i]));
                if normal.norm() < FACE_TOLERANCE {
                    continue;
                }
                let mut normal = normal.normalize();
                let mut offset = normal.dot(&points[i].coords);

                let signed = |p: &Point3<Real>, nrm: &Vector3<Real>, d: Real| nrm.dot(&p.coords) - d;
                let any_front = points.iter().any(|p| signed(p, &normal, offset) > FACE_TOLERANCE);
                let any_back = points.iter().any(|p| signed(p, &normal, offset) < -FACE_TOLERANCE);
                match (any_front, any_back) {
                    (true, true) => continue,
                    (true, false) => {
                        normal = -normal;
                        offset = -offset;
                    }
                    _ => {}
                }

                let mut members: Vec<usize> = (0..n)
                    .filter(|&m| signed(&points[m], &normal, offset).abs() < FACE_TOLERANCE)
                    .collect();
                if !seen.insert(members.clone()) {
                    continue;
                }

                let face_points: Vec<Point3<Real>> = members.iter().map(|&m| points[m]).collect();
                let center = centroid(&face_points);
                let (u, v) = build_orthonormal_basis(normal);
                let angle = |m: usize| {
                    let d = points[m] - center;
                    d.dot(&v).atan2(d.dot(&u))
                };
                members.sort_by(|&a, &b| angle(a).partial_cmp(&angle(b)).unwrap_or(Ordering::Equal));
                faces.push(members);
            }
        }
    }
    faces
}
