use super::IoError;
use crate::float_types::Real;
use crate::mesh::Mesh;
use nalgebra::{Point3, Vector3};
use std::io::Cursor;

impl Mesh {
    /// Export to binary STL (returns `Vec<u8>`)
    ///
    /// Coordinates are narrowed to `f32` as the format requires.
    pub fn to_stl_binary(&self) -> Result<Vec<u8>, IoError> {
        let mut triangles = Vec::with_capacity(self.triangle_count());
        for t in 0..self.triangle_count() {
            let normal = self.face_normal(t);
            let [a, b, c] = self.triangle_points(t);
            triangles.push(stl_io::Triangle {
                normal: stl_io::Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    stl_io::Vertex::new([a.x as f32, a.y as f32, a.z as f32]),
                    stl_io::Vertex::new([b.x as f32, b.y as f32, b.z as f32]),
                    stl_io::Vertex::new([c.x as f32, c.y as f32, c.z as f32]),
                ],
            });
        }

        let mut cursor = Cursor::new(Vec::new());
        stl_io::write_stl(&mut cursor, triangles.iter())?;

        Ok(cursor.into_inner())
    }

    /// Read binary or ASCII STL data.
    ///
    /// Every facet gets its own three vertices with the facet normal, so
    /// the result is flat shaded; [`Mesh::weld`] merges shared corners.
    pub fn from_stl(stl_data: &[u8]) -> Result<Mesh, IoError> {
        let mut cursor = Cursor::new(stl_data);
        let stl_reader = stl_io::create_stl_reader(&mut cursor)?;

        let mut mesh = Mesh::new();
        for tri in stl_reader {
            let tri = tri?;
            let normal = Vector3::new(
                tri.normal[0] as Real,
                tri.normal[1] as Real,
                tri.normal[2] as Real,
            );
            let first = mesh.positions.len() as u32;
            for v in &tri.vertices {
                mesh.add_point_with_normal(
                    Point3::new(v[0] as Real, v[1] as Real, v[2] as Real),
                    normal,
                );
            }
            mesh.add_indexed_triangle(first, first + 1, first + 2);
        }

        mesh.validate()?;
        log::debug!("read {} STL facets", mesh.triangle_count());
        Ok(mesh)
    }
}
