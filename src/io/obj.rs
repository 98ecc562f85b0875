use super::IoError;
use crate::float_types::Real;
use crate::mesh::Mesh;
use hashbrown::HashMap;
use nalgebra::{Point2, Point3, Vector3};
use std::fmt::Write;

/// One `v/vt/vn` corner of an OBJ face, as zero-based indices.
type Corner = (usize, Option<usize>, Option<usize>);

impl Mesh {
    /// Export to Wavefront OBJ text.
    ///
    /// Positions, texture coordinates and normals share one index per
    /// vertex, so faces are written as `f v/v/v` (or the shorter forms
    /// when an attribute is absent).
    pub fn to_obj(&self) -> String {
        let mut out = String::new();
        for p in &self.positions {
            let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
        }
        for uv in &self.texture_coords {
            let _ = writeln!(out, "vt {} {}", uv.x, uv.y);
        }
        for n in &self.normals {
            let _ = writeln!(out, "vn {} {} {}", n.x, n.y, n.z);
        }

        let has_uv = !self.texture_coords.is_empty();
        let has_normal = !self.normals.is_empty();
        for tri in &self.indices {
            out.push('f');
            for &i in tri {
                let i = i + 1;
                let _ = match (has_uv, has_normal) {
                    (false, false) => write!(out, " {i}"),
                    (true, false) => write!(out, " {i}/{i}"),
                    (false, true) => write!(out, " {i}//{i}"),
                    (true, true) => write!(out, " {i}/{i}/{i}"),
                };
            }
            out.push('\n');
        }
        out
    }

    /// Parse Wavefront OBJ text.
    ///
    /// Reads `v`, `vt`, `vn` and `f` statements. Faces with more than
    /// three corners are split into a fan, and negative indices count back
    /// from the latest element. Each distinct `v/vt/vn` combination becomes
    /// one vertex. Grouping and material statements are skipped.
    pub fn from_obj(text: &str) -> Result<Mesh, IoError> {
        let mut positions: Vec<Point3<Real>> = Vec::new();
        let mut uvs: Vec<Point2<Real>> = Vec::new();
        let mut normals: Vec<Vector3<Real>> = Vec::new();
        let mut faces: Vec<Vec<Corner>> = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            let mut fields = line.split_whitespace();
            let Some(keyword) = fields.next() else {
                continue;
            };
            let values: Vec<&str> = fields.collect();

            match keyword {
                "v" => {
                    let [x, y, z] = parse_reals::<3>(&values, line_no)?;
                    positions.push(Point3::new(x, y, z));
                }
                "vt" => {
                    let [u] = parse_reals::<1>(&values, line_no)?;
                    let v = values.get(1).map(|t| t.parse::<Real>()).transpose()?;
                    uvs.push(Point2::new(u, v.unwrap_or(0.0)));
                }
                "vn" => {
                    let [x, y, z] = parse_reals::<3>(&values, line_no)?;
                    normals.push(Vector3::new(x, y, z));
                }
                "f" => {
                    if values.len() < 3 {
                        return Err(IoError::MalformedInput(format!(
                            "line {}: face needs at least 3 corners",
                            line_no + 1
                        )));
                    }
                    let corners = values
                        .iter()
                        .map(|c| parse_corner(c, positions.len(), uvs.len(), normals.len(), line_no))
                        .collect::<Result<Vec<_>, _>>()?;
                    faces.push(corners);
                }
                "o" | "g" | "s" | "usemtl" | "mtllib" => {}
                other => log::warn!("line {}: skipping unsupported OBJ statement `{other}`", line_no + 1),
            }
        }

        let any_uv = faces.iter().flatten().any(|c| c.1.is_some());
        let any_normal = faces.iter().flatten().any(|c| c.2.is_some());

        let mut mesh = Mesh::new();
        let mut vertex_of: HashMap<Corner, u32> = HashMap::new();
        for face in &faces {
            let mut ids = Vec::with_capacity(face.len());
            for corner in face {
                let id = *vertex_of.entry(*corner).or_insert_with(|| {
                    let (v, vt, vn) = *corner;
                    mesh.push_vertex(
                        positions[v],
                        any_normal.then(|| vn.map_or_else(Vector3::zeros, |i| normals[i])),
                        any_uv.then(|| vt.map_or_else(Point2::origin, |i| uvs[i])),
                    )
                });
                ids.push(id);
            }
            for i in 1..ids.len() - 1 {
                mesh.add_indexed_triangle(ids[0], ids[i], ids[i + 1]);
            }
        }

        mesh.validate()?;
        log::debug!(
            "read OBJ: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

fn parse_reals<const N: usize>(values: &[&str], line_no: usize) -> Result<[Real; N], IoError> {
    if values.len() < N {
        return Err(IoError::MalformedInput(format!(
            "line {}: expected {N} numbers, found {}",
            line_no + 1,
            values.len()
        )));
    }
    let mut out = [0.0; N];
    for (slot, text) in out.iter_mut().zip(values) {
        *slot = text.parse::<Real>()?;
    }
    Ok(out)
}

// OBJ indices are 1-based; negative ones are relative to the end.
fn resolve_index(text: &str, len: usize, line_no: usize) -> Result<usize, IoError> {
    let raw: i64 = text.parse()?;
    let resolved = if raw > 0 {
        raw - 1
    } else {
        len as i64 + raw
    };
    if raw == 0 || resolved < 0 || resolved >= len as i64 {
        return Err(IoError::MalformedInput(format!(
            "line {}: index {raw} out of range for {len} elements",
            line_no + 1
        )));
    }
    Ok(resolved as usize)
}

fn parse_corner(
    text: &str,
    n_positions: usize,
    n_uvs: usize,
    n_normals: usize,
    line_no: usize,
) -> Result<Corner, IoError> {
    let mut parts = text.split('/');
    let v = resolve_index(parts.next().unwrap_or(""), n_positions, line_no)?;
    let vt = match parts.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, n_uvs, line_no)?),
        _ => None,
    };
    let vn = match parts.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(s, n_normals, line_no)?),
        _ => None,
    };
    Ok((v, vt, vn))
}
