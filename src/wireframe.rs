//! Wireframe conversion: thin boxes along the unique edges of a mesh.

use crate::errors::{invalid, GeometryError};
use crate::float_types::{Real, EPSILON, WELD_TOLERANCE};
use crate::mesh::{Mesh, PointGrid};
use crate::polygon::build_orthonormal_basis;
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireframeOptions {
    /// Drop edges shared by exactly two coplanar triangles (fan diagonals of flat faces)
    pub skip_coplanar: bool,
    /// Lengthen each segment by half the thickness at both ends so joints close
    pub extend_ends: bool,
    /// Preferred direction for one pair of sides of each segment box
    pub up: Vector3<Real>,
}

impl Default for WireframeOptions {
    fn default() -> Self {
        WireframeOptions {
            skip_coplanar: false,
            extend_ends: true,
            up: Vector3::y(),
        }
    }
}

#[derive(Debug, Clone)]
struct EdgeEntry {
    a: Point3<Real>,
    b: Point3<Real>,
    face_normals: Vec<Vector3<Real>>,
}

/// Undirected edges keyed by endpoint position, so an edge shared by two
/// triangles counts once even when each triangle has its own vertices.
/// Endpoints within `WELD_TOLERANCE` of each other are the same point, and
/// edges whose endpoints match are skipped. Iteration follows first
/// insertion.
#[derive(Debug, Clone)]
pub struct EdgeSet {
    points: PointGrid,
    lookup: HashMap<(u32, u32), usize>,
    entries: Vec<EdgeEntry>,
}

impl Default for EdgeSet {
    fn default() -> Self {
        EdgeSet {
            points: PointGrid::new(WELD_TOLERANCE),
            lookup: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl EdgeSet {
    pub fn new() -> Self {
        EdgeSet::default()
    }

    /// Every triangle edge of `mesh`
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut set = EdgeSet::new();
        for t in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle_points(t);
            let normal = mesh.face_normal(t);
            set.insert_with_normal(a, b, normal);
            set.insert_with_normal(b, c, normal);
            set.insert_with_normal(c, a, normal);
        }
        set
    }

    fn key(ia: u32, ib: u32) -> (u32, u32) {
        (ia.min(ib), ia.max(ib))
    }

    /// Add an edge; returns false if it (in either direction) was already
    /// present or if its endpoints coincide
    pub fn insert(&mut self, a: Point3<Real>, b: Point3<Real>) -> bool {
        self.insert_with_normal(a, b, Vector3::zeros())
    }

    fn insert_with_normal(&mut self, a: Point3<Real>, b: Point3<Real>, normal: Vector3<Real>) -> bool {
        let (ia, _) = self.points.insert(a);
        let (ib, _) = self.points.insert(b);
        if ia == ib {
            return false;
        }
        let key = EdgeSet::key(ia, ib);
        match self.lookup.get(&key) {
            Some(&i) => {
                self.entries[i].face_normals.push(normal);
                false
            }
            None => {
                self.lookup.insert(key, self.entries.len());
                self.entries.push(EdgeEntry {
                    a,
                    b,
                    face_normals: vec![normal],
                });
                true
            }
        }
    }

    pub fn contains(&self, a: &Point3<Real>, b: &Point3<Real>) -> bool {
        match (self.points.find(a), self.points.find(b)) {
            (Some(ia), Some(ib)) => self.lookup.contains_key(&EdgeSet::key(ia, ib)),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = (Point3<Real>, Point3<Real>)> + '_ {
        self.entries.iter().map(|e| (e.a, e.b))
    }

    /// Edges between exactly two triangles with the same facing
    fn is_coplanar(entry: &EdgeEntry) -> bool {
        match entry.face_normals.as_slice() {
            [n1, n2] => n1.dot(n2) > 1.0 - 1e-6,
            _ => false,
        }
    }
}

/// Each edge of `mesh` once, in first-seen order.
pub fn unique_edges(mesh: &Mesh, options: &WireframeOptions) -> Vec<(Point3<Real>, Point3<Real>)> {
    let set = EdgeSet::from_mesh(mesh);
    set.entries
        .iter()
        .filter(|e| !(options.skip_coplanar && EdgeSet::is_coplanar(e)))
        .map(|e| (e.a, e.b))
        .collect()
}

impl Mesh {
    /// Add a square box of side `thickness` running from `a` to `b`. Two of
    /// its sides face as close to `up` as the segment direction allows.
    pub fn add_segment(
        &mut self,
        a: Point3<Real>,
        b: Point3<Real>,
        thickness: Real,
        up: Vector3<Real>,
    ) -> Result<(), GeometryError> {
        if !(thickness > 0.0 && thickness.is_finite()) {
            return invalid(format!("segment thickness must be positive, got {thickness}"));
        }
        if !a.iter().chain(b.iter()).chain(up.iter()).all(|c| c.is_finite()) {
            return invalid("segment endpoints and up direction must be finite");
        }
        let dir = b - a;
        if dir.norm_squared() < EPSILON * EPSILON {
            return invalid("segment endpoints coincide");
        }
        let unit = dir.normalize();
        let side = unit.cross(&up);
        let (side, lift) = if side.norm_squared() < EPSILON {
            build_orthonormal_basis(unit)
        } else {
            let side = side.normalize();
            (side, side.cross(&unit))
        };
        let half = thickness / 2.0;
        let corner = a - side * half - lift * half;
        self.add_box(corner, dir, side * thickness, lift * thickness)
    }
}

/// Replace every face of `mesh` by boxes of `thickness` along its unique edges.
pub fn to_wireframe(mesh: &Mesh, thickness: Real, options: &WireframeOptions) -> Result<Mesh, GeometryError> {
    let edges = unique_edges(mesh, options);
    let mut wire = Mesh::with_capacity(edges.len() * 24, edges.len() * 12);
    for (a, b) in edges {
        let (a, b) = match (b - a).try_normalize(EPSILON) {
            Some(dir) if options.extend_ends => {
                let along = dir * (thickness / 2.0);
                (a - along, b + along)
            }
            _ => (a, b),
        };
        wire.add_segment(a, b, thickness, options.up)?;
    }
    log::debug!("wireframe: {} edges", wire.triangle_count() / 12);
    Ok(wire)
}

/// Segments of `length` along each vertex normal, for inspecting shading.
/// Normals are computed first if the mesh has none.
pub fn to_normals_mesh(mesh: &Mesh, length: Real, thickness: Real) -> Result<Mesh, GeometryError> {
    if !(length > 0.0 && length.is_finite()) {
        return invalid(format!("normal length must be positive, got {length}"));
    }
    let mut source = mesh.clone();
    if source.normals.is_empty() {
        source.compute_normals();
    }
    let mut out = Mesh::new();
    for (p, n) in source.positions.iter().zip(&source.normals) {
        if n.norm_squared() < EPSILON * EPSILON {
            continue;
        }
        out.add_segment(*p, p + n.normalize() * length, thickness, Vector3::y())?;
    }
    Ok(out)
}
