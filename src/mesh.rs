use crate::enums::Axis;
use crate::errors::{invalid, GeometryError};
use crate::float_types::{parry3d::bounding_volume::Aabb, Real, EPSILON};
use crate::polygon::centroid;
use crate::vertex::Vertex;
use hashbrown::HashMap;
use nalgebra::{Matrix3, Matrix4, Point2, Point3, Rotation3, Translation3, Unit, Vector3};

/// An indexed triangle mesh.
///
/// `normals` and `texture_coords` are per-vertex attributes: each is either
/// empty or holds exactly one entry per position. Every builder on `Mesh`
/// keeps that true, padding with zero normals / `(0, 0)` UVs when vertices
/// with and without an attribute are mixed.
///
/// Triangles are wound counter-clockwise when seen from their front side,
/// which for closed solids is the outside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Point3<Real>>,
    pub normals: Vec<Vector3<Real>>,
    pub texture_coords: Vec<Point2<Real>>,
    pub indices: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Mesh::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Mesh {
            positions: Vec::with_capacity(vertices),
            normals: Vec::new(),
            texture_coords: Vec::new(),
            indices: Vec::with_capacity(triangles),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Push one vertex, keeping the attribute lists aligned with `positions`.
    pub(crate) fn push_vertex(
        &mut self,
        pos: Point3<Real>,
        normal: Option<Vector3<Real>>,
        uv: Option<Point2<Real>>,
    ) -> u32 {
        let index = self.positions.len() as u32;
        if normal.is_some() || !self.normals.is_empty() {
            self.normals.resize(self.positions.len(), Vector3::zeros());
            self.normals.push(normal.unwrap_or_else(Vector3::zeros));
        }
        if uv.is_some() || !self.texture_coords.is_empty() {
            self.texture_coords.resize(self.positions.len(), Point2::origin());
            self.texture_coords.push(uv.unwrap_or_else(Point2::origin));
        }
        self.positions.push(pos);
        index
    }

    /// Add a position and return its index
    pub fn add_point(&mut self, pos: Point3<Real>) -> u32 {
        self.push_vertex(pos, None, None)
    }

    pub fn add_point_with_normal(&mut self, pos: Point3<Real>, normal: Vector3<Real>) -> u32 {
        self.push_vertex(pos, Some(normal), None)
    }

    pub fn add_point_with_uv(&mut self, pos: Point3<Real>, uv: Point2<Real>) -> u32 {
        self.push_vertex(pos, None, Some(uv))
    }

    /// Add a triangle between existing positions
    pub fn add_indexed_triangle(&mut self, i: u32, j: u32, k: u32) {
        self.indices.push([i, j, k]);
    }

    /// Add a triangle with three new positions, so it never shares
    /// vertices (and therefore normals) with its neighbours.
    pub fn add_triangle(&mut self, a: Point3<Real>, b: Point3<Real>, c: Point3<Real>) {
        let i = self.add_point(a);
        let j = self.add_point(b);
        let k = self.add_point(c);
        self.add_indexed_triangle(i, j, k);
    }

    /// Add a convex polygon as a triangle fan around its first point.
    pub fn add_polygon(&mut self, points: &[Point3<Real>]) -> Result<(), GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::DegeneratePolygon(points.len()));
        }
        let first = self.positions.len() as u32;
        for p in points {
            self.add_point(*p);
        }
        self.add_fan(first, points.len() as u32);
        Ok(())
    }

    /// Like [`Mesh::add_polygon`] with one texture coordinate per point.
    pub fn add_polygon_textured(
        &mut self,
        points: &[Point3<Real>],
        uvs: &[Point2<Real>],
    ) -> Result<(), GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::DegeneratePolygon(points.len()));
        }
        if uvs.len() != points.len() {
            return Err(GeometryError::AttributeLengthMismatch {
                attribute: "texture_coords",
                expected: points.len(),
                found: uvs.len(),
            });
        }
        let first = self.positions.len() as u32;
        for (p, uv) in points.iter().zip(uvs) {
            self.push_vertex(*p, None, Some(*uv));
        }
        self.add_fan(first, points.len() as u32);
        Ok(())
    }

    pub(crate) fn add_fan(&mut self, first: u32, count: u32) {
        for i in 1..count - 1 {
            self.add_indexed_triangle(first, first + i, first + i + 1);
        }
    }

    /// Add a triangle between existing positions unless it has no area.
    /// Returns whether it was added.
    pub(crate) fn add_indexed_triangle_checked(&mut self, i: u32, j: u32, k: u32) -> bool {
        let a = self.positions[i as usize];
        let b = self.positions[j as usize];
        let c = self.positions[k as usize];
        if (b - a).cross(&(c - a)).norm_squared() < EPSILON * EPSILON {
            return false;
        }
        self.add_indexed_triangle(i, j, k);
        true
    }

    /// Append `other`'s vertices and triangles to this mesh.
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.positions.len() as u32;
        for (i, p) in other.positions.iter().enumerate() {
            self.push_vertex(
                *p,
                other.normals.get(i).copied(),
                other.texture_coords.get(i).copied(),
            );
        }
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
    }

    /// Apply an affine transform. Normals go through the inverse-transpose,
    /// and a transform that flips handedness also flips the winding so front
    /// faces stay in front.
    pub fn transform(&self, mat: &Matrix4<Real>) -> Mesh {
        let linear: Matrix3<Real> = mat.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(linear);

        let mut mesh = self.clone();
        for p in &mut mesh.positions {
            *p = mat.transform_point(p);
        }
        for n in &mut mesh.normals {
            let t = normal_matrix * *n;
            *n = if t.norm_squared() > EPSILON * EPSILON {
                t.normalize()
            } else {
                t
            };
        }
        if linear.determinant() < 0.0 {
            for t in &mut mesh.indices {
                t.swap(1, 2);
            }
        }
        mesh
    }

    pub fn translate(&self, v: Vector3<Real>) -> Mesh {
        self.transform(&Translation3::from(v).to_homogeneous())
    }

    /// Rotate by `angle` radians around `axis` through the origin
    pub fn rotate(&self, axis: Vector3<Real>, angle: Real) -> Mesh {
        if axis.norm_squared() < EPSILON * EPSILON {
            return self.clone();
        }
        let rot = Rotation3::from_axis_angle(&Unit::new_normalize(axis), angle);
        self.transform(&rot.to_homogeneous())
    }

    pub fn scale(&self, sx: Real, sy: Real, sz: Real) -> Mesh {
        self.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)))
    }

    /// Mirror across the plane through the origin perpendicular to `axis`
    pub fn mirror(&self, axis: Axis) -> Mesh {
        let (sx, sy, sz) = match axis {
            Axis::X => (-1.0, 1.0, 1.0),
            Axis::Y => (1.0, -1.0, 1.0),
            Axis::Z => (1.0, 1.0, -1.0),
        };
        self.scale(sx, sy, sz)
    }

    /// Reverse the winding of every triangle and negate the normals
    pub fn flip(&mut self) {
        for t in &mut self.indices {
            t.swap(1, 2);
        }
        for n in &mut self.normals {
            *n = -*n;
        }
    }

    /// Axis-aligned bounds of the positions, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        let first = self.positions.first()?;
        let mut mins = *first;
        let mut maxs = *first;
        for p in &self.positions[1..] {
            mins = mins.inf(p);
            maxs = maxs.sup(p);
        }
        Some(Aabb::new(mins, maxs))
    }

    /// Average of the positions
    pub fn centroid(&self) -> Point3<Real> {
        centroid(&self.positions)
    }

    pub fn triangle_points(&self, triangle: usize) -> [Point3<Real>; 3] {
        let [i, j, k] = self.indices[triangle];
        [
            self.positions[i as usize],
            self.positions[j as usize],
            self.positions[k as usize],
        ]
    }

    /// Unit normal of one triangle, zero if the triangle has no area
    pub fn face_normal(&self, triangle: usize) -> Vector3<Real> {
        let [a, b, c] = self.triangle_points(triangle);
        let n = (b - a).cross(&(c - a));
        if n.norm_squared() < EPSILON * EPSILON {
            return Vector3::zeros();
        }
        n.normalize()
    }

    /// Replace the vertex normals with area-weighted averages of the
    /// adjacent face normals. Only vertices shared between triangles are
    /// smoothed, so call [`Mesh::weld`] first on flat-built meshes.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.positions.len()];
        for t in &self.indices {
            let a = self.positions[t[0] as usize];
            let b = self.positions[t[1] as usize];
            let c = self.positions[t[2] as usize];
            let weighted = (b - a).cross(&(c - a));
            for &i in t {
                normals[i as usize] += weighted;
            }
        }
        for n in &mut normals {
            if n.norm_squared() > EPSILON * EPSILON {
                n.normalize_mut();
            }
        }
        self.normals = normals;
    }

    /// Give two seam vertices the normalized sum of their normals.
    pub(crate) fn average_normals(&mut self, a: u32, b: u32) {
        let (a, b) = (a as usize, b as usize);
        let sum = self.normals[a] + self.normals[b];
        let n = if sum.norm_squared() > EPSILON * EPSILON {
            sum.normalize()
        } else {
            sum
        };
        self.normals[a] = n;
        self.normals[b] = n;
    }

    /// Copy of the mesh with no shared vertices, each corner carrying its
    /// triangle's face normal. Texture coordinates are kept.
    pub fn flat_shaded(&self) -> Mesh {
        let mut flat = Mesh::with_capacity(self.indices.len() * 3, self.indices.len());
        for (t, tri) in self.indices.iter().enumerate() {
            let n = self.face_normal(t);
            let first = flat.positions.len() as u32;
            for &i in tri {
                let uv = self.texture_coords.get(i as usize).copied();
                flat.push_vertex(self.positions[i as usize], Some(n), uv);
            }
            flat.add_indexed_triangle(first, first + 1, first + 2);
        }
        flat
    }

    /// Merge positions closer than `tolerance` into one shared vertex.
    ///
    /// Each position joins the closest kept vertex within `tolerance`, so
    /// points straddling a grid cell boundary still merge. Triangles that
    /// collapse onto an edge or a point are dropped. Texture coordinates
    /// keep the value of the first merged vertex; normals, if present, are
    /// recomputed so the result is smooth shaded.
    pub fn weld(&self, tolerance: Real) -> Result<Mesh, GeometryError> {
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return invalid(format!("weld tolerance must be positive and finite, got {tolerance}"));
        }
        let mut grid = PointGrid::new(tolerance);
        let mut remap = Vec::with_capacity(self.positions.len());
        let mut welded = Mesh::with_capacity(self.positions.len(), self.indices.len());

        for (i, p) in self.positions.iter().enumerate() {
            let (index, fresh) = grid.insert(*p);
            if fresh {
                welded.push_vertex(*p, None, self.texture_coords.get(i).copied());
            }
            remap.push(index);
        }

        let mut dropped = 0usize;
        for t in &self.indices {
            let [i, j, k] = t.map(|v| remap[v as usize]);
            if i == j || j == k || k == i {
                dropped += 1;
                continue;
            }
            welded.add_indexed_triangle(i, j, k);
        }
        if dropped > 0 {
            log::trace!("weld dropped {dropped} collapsed triangles");
        }
        if !self.normals.is_empty() {
            welded.compute_normals();
        }
        Ok(welded)
    }

    pub fn surface_area(&self) -> Real {
        (0..self.indices.len())
            .map(|t| {
                let [a, b, c] = self.triangle_points(t);
                (b - a).cross(&(c - a)).norm() * 0.5
            })
            .sum()
    }

    /// Signed enclosed volume; positive for a closed mesh wound outward.
    pub fn volume(&self) -> Real {
        (0..self.indices.len())
            .map(|t| {
                let [a, b, c] = self.triangle_points(t);
                a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
            })
            .sum()
    }

    /// Check the attribute lengths, the indices and the coordinates.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let len = self.positions.len();
        if !self.normals.is_empty() && self.normals.len() != len {
            return Err(GeometryError::AttributeLengthMismatch {
                attribute: "normals",
                expected: len,
                found: self.normals.len(),
            });
        }
        if !self.texture_coords.is_empty() && self.texture_coords.len() != len {
            return Err(GeometryError::AttributeLengthMismatch {
                attribute: "texture_coords",
                expected: len,
                found: self.texture_coords.len(),
            });
        }
        for (triangle, t) in self.indices.iter().enumerate() {
            if let Some(&index) = t.iter().find(|&&i| i as usize >= len) {
                return Err(GeometryError::IndexOutOfRange { triangle, index, len });
            }
        }
        if let Some(i) = self
            .positions
            .iter()
            .position(|p| !p.iter().all(|c| c.is_finite()))
        {
            return Err(GeometryError::NonFiniteCoordinate(i));
        }
        Ok(())
    }

    /// Iterate the triangles as vertex triples carrying the face normal.
    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        (0..self.indices.len()).map(move |t| {
            let n = self.face_normal(t);
            self.triangle_points(t).map(|p| Vertex::new(p, n))
        })
    }

    /// Build a mesh from independent triangles, one new vertex per corner.
    pub fn from_triangles<I>(triangles: I) -> Mesh
    where
        I: IntoIterator<Item = [Vertex; 3]>,
    {
        let mut mesh = Mesh::new();
        for tri in triangles {
            let first = mesh.positions.len() as u32;
            for v in &tri {
                mesh.push_vertex(v.pos, Some(v.normal), None);
            }
            mesh.add_indexed_triangle(first, first + 1, first + 2);
        }
        mesh
    }
}

/// Grid cell of a point at the given spacing.
fn grid_cell(p: &Point3<Real>, spacing: Real) -> [i64; 3] {
    [
        (p.x / spacing).floor() as i64,
        (p.y / spacing).floor() as i64,
        (p.z / spacing).floor() as i64,
    ]
}

/// Points bucketed by grid cell of side `tolerance`. Lookups scan the 27
/// cells around a query, which covers every point within `tolerance`.
#[derive(Debug, Clone)]
pub(crate) struct PointGrid {
    tolerance: Real,
    cells: HashMap<[i64; 3], Vec<u32>>,
    points: Vec<Point3<Real>>,
}

impl PointGrid {
    pub(crate) fn new(tolerance: Real) -> Self {
        PointGrid {
            tolerance,
            cells: HashMap::new(),
            points: Vec::new(),
        }
    }

    /// Closest stored point within `tolerance` of `p`
    pub(crate) fn find(&self, p: &Point3<Real>) -> Option<u32> {
        let [x, y, z] = grid_cell(p, self.tolerance);
        let limit = self.tolerance * self.tolerance;
        let mut best: Option<(u32, Real)> = None;
        for dx in -1..=1i64 {
            for dy in -1..=1i64 {
                for dz in -1..=1i64 {
                    let cell = [x.saturating_add(dx), y.saturating_add(dy), z.saturating_add(dz)];
                    let Some(ids) = self.cells.get(&cell) else {
                        continue;
                    };
                    for &id in ids {
                        let d = (self.points[id as usize] - p).norm_squared();
                        if d <= limit && best.map_or(true, |(_, b)| d < b) {
                            best = Some((id, d));
                        }
                    }
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// Index of the stored point matching `p`, storing it if there is none.
    /// The flag is true when `p` was stored.
    pub(crate) fn insert(&mut self, p: Point3<Real>) -> (u32, bool) {
        if let Some(id) = self.find(&p) {
            return (id, false);
        }
        let id = self.points.len() as u32;
        self.points.push(p);
        self.cells
            .entry(grid_cell(&p, self.tolerance))
            .or_default()
            .push(id);
        (id, true)
    }
}
