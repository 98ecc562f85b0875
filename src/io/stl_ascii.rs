use crate::mesh::Mesh;
use std::fmt::Write;

impl Mesh {
    /// Export to ASCII STL
    ///
    /// Each triangle becomes a facet carrying its face normal; vertex
    /// normals and texture coordinates are not representable in STL.
    ///
    /// ```
    /// # use meshkit3d::Mesh;
    /// # use nalgebra::Point3;
    /// let cube = Mesh::cube(Point3::origin(), 1.0).unwrap();
    /// let stl_text = cube.to_stl_ascii("cube");
    /// assert!(stl_text.starts_with("solid cube"));
    /// ```
    pub fn to_stl_ascii(&self, name: &str) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(out, "solid {name}");

        for t in 0..self.triangle_count() {
            let normal = self.face_normal(t);
            let _ = writeln!(
                out,
                "  facet normal {:.6} {:.6} {:.6}",
                normal.x, normal.y, normal.z
            );
            out.push_str("    outer loop\n");
            for p in self.triangle_points(t) {
                let _ = writeln!(out, "      vertex {:.6} {:.6} {:.6}", p.x, p.y, p.z);
            }
            out.push_str("    endloop\n");
            out.push_str("  endfacet\n");
        }

        let _ = writeln!(out, "endsolid {name}");
        out
    }
}
