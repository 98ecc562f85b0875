//! Placing text in a scene as a textured rectangle.
//!
//! Rendering glyphs into a texture belongs to the caller's graphics stack.
//! This module only sizes and places the rectangle so the texture is shown
//! without distortion, and optionally builds real glyph geometry.

use crate::enums::{HorizontalAlignment, VerticalAlignment};
use crate::errors::{invalid, GeometryError};
use crate::float_types::{Real, EPSILON};
use crate::mesh::Mesh;
use nalgebra::{Point2, Point3, Vector3};

/// Size of a rendered piece of text in any consistent unit (pixels, ems).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: Real,
    pub height: Real,
}

impl TextExtent {
    pub fn aspect(&self) -> Real {
        self.width / self.height
    }

    fn check(&self) -> Result<(), GeometryError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return invalid(format!(
                "text extent must be positive, got {} x {}",
                self.width, self.height
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextAlignment {
    pub horizontal: HorizontalAlignment,
    pub vertical: VerticalAlignment,
}

/// Rectangle that carries a text texture.
/// Corners are bottom-left, bottom-right, top-right, top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct TextQuad {
    pub corners: [Point3<Real>; 4],
}

impl TextQuad {
    /// Texture coordinates matching `corners`, with (0, 0) at the top-left of the image
    pub const UVS: [[Real; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    pub fn width(&self) -> Real {
        (self.corners[1] - self.corners[0]).norm()
    }

    pub fn height(&self) -> Real {
        (self.corners[3] - self.corners[0]).norm()
    }

    /// Side the text is readable from
    pub fn normal(&self) -> Vector3<Real> {
        (self.corners[1] - self.corners[0])
            .cross(&(self.corners[3] - self.corners[0]))
            .normalize()
    }
}

// Unit right vector and the unit up vector made perpendicular to it.
fn text_axes(
    right: &Vector3<Real>,
    up: &Vector3<Real>,
) -> Result<(Vector3<Real>, Vector3<Real>), GeometryError> {
    if right.norm_squared() < EPSILON * EPSILON || up.norm_squared() < EPSILON * EPSILON {
        return invalid("text direction vectors must be non-zero");
    }
    let r = right.normalize();
    let u = up - r * up.dot(&r);
    if u.norm_squared() < EPSILON * EPSILON {
        return invalid("text up vector is parallel to the baseline");
    }
    Ok((r, u.normalize()))
}

fn quad(corner: Point3<Real>, r: Vector3<Real>, u: Vector3<Real>, w: Real, h: Real) -> TextQuad {
    TextQuad {
        corners: [corner, corner + r * w, corner + r * w + u * h, corner + u * h],
    }
}

/// Quad of the given `height` starting at `corner` (its bottom-left) and
/// running along `right`, as wide as the text's aspect ratio requires.
pub fn fit_text_quad(
    corner: Point3<Real>,
    right: Vector3<Real>,
    up: Vector3<Real>,
    height: Real,
    extent: TextExtent,
) -> Result<TextQuad, GeometryError> {
    extent.check()?;
    if height <= 0.0 {
        return invalid(format!("text height must be positive, got {height}"));
    }
    let (r, u) = text_axes(&right, &up)?;
    Ok(quad(corner, r, u, height * extent.aspect(), height))
}

/// Largest quad inside the rectangle spanned by `width_vec` and
/// `height_vec` from `corner` that keeps the text's aspect ratio, placed
/// according to `alignment`. A `Stretch` alignment fills that direction.
pub fn fit_text_in_rect(
    corner: Point3<Real>,
    width_vec: Vector3<Real>,
    height_vec: Vector3<Real>,
    extent: TextExtent,
    alignment: TextAlignment,
) -> Result<TextQuad, GeometryError> {
    extent.check()?;
    let (r, u) = text_axes(&width_vec, &height_vec)?;
    let rect_w = width_vec.norm();
    let rect_h = height_vec.dot(&u);

    let scale = (rect_w / extent.width).min(rect_h / extent.height);
    let w = match alignment.horizontal {
        HorizontalAlignment::Stretch => rect_w,
        _ => extent.width * scale,
    };
    let h = match alignment.vertical {
        VerticalAlignment::Stretch => rect_h,
        _ => extent.height * scale,
    };

    let x = match alignment.horizontal {
        HorizontalAlignment::Left | HorizontalAlignment::Stretch => 0.0,
        HorizontalAlignment::Center => (rect_w - w) / 2.0,
        HorizontalAlignment::Right => rect_w - w,
    };
    let y = match alignment.vertical {
        VerticalAlignment::Bottom | VerticalAlignment::Stretch => 0.0,
        VerticalAlignment::Center => (rect_h - h) / 2.0,
        VerticalAlignment::Top => rect_h - h,
    };

    Ok(quad(corner + r * x + u * y, r, u, w, h))
}

impl Mesh {
    /// Add a text quad as two triangles facing [`TextQuad::normal`].
    pub fn add_text_quad(&mut self, text: &TextQuad) {
        let normal = text.normal();
        let first = self.positions.len() as u32;
        for (corner, uv) in text.corners.iter().zip(TextQuad::UVS) {
            self.push_vertex(*corner, Some(normal), Some(Point2::new(uv[0], uv[1])));
        }
        self.add_fan(first, 4);
    }
}

#[cfg(feature = "truetype-text")]
use meshtext::{Glyph, MeshGenerator, MeshText};

/// Flat glyph triangles for `text` in the XY plane, facing +Z, with the
/// baseline on the X axis and glyphs `size` units tall.
///
/// Does not handle kerning or multiple lines: the cursor advances by each
/// glyph's bounding-box width. Also returns the extent of the laid-out
/// text, ready for [`fit_text_quad`].
#[cfg(feature = "truetype-text")]
pub fn text_mesh(text: &str, font_data: &[u8], size: Real) -> Result<(Mesh, TextExtent), GeometryError> {
    if !(size > 0.0 && size.is_finite()) {
        return invalid(format!("text size must be positive, got {size}"));
    }
    if !is_font_file(font_data) {
        return invalid("font data is not a TrueType or OpenType font");
    }
    let mut generator = MeshGenerator::new(font_data.to_vec());
    let mut mesh = Mesh::new();
    let mut cursor_x: Real = 0.0;

    for ch in text.chars() {
        if ch.is_control() {
            continue;
        }
        let glyph: MeshText = match generator.generate_glyph(ch, true, None) {
            Ok(m) => m,
            Err(err) => {
                log::warn!("no glyph for {ch:?}: {err}");
                cursor_x += size;
                continue;
            }
        };

        for tri in glyph.vertices.chunks_exact(9) {
            let p = |k: usize| {
                Point3::new(
                    tri[k] as Real * size + cursor_x,
                    tri[k + 1] as Real * size,
                    tri[k + 2] as Real * size,
                )
            };
            let (a, b, c) = (p(0), p(3), p(6));
            let z = (b - a).cross(&(c - a)).z;
            if z.abs() < EPSILON {
                continue;
            }
            if z > 0.0 {
                mesh.add_triangle(a, b, c);
            } else {
                mesh.add_triangle(a, c, b);
            }
        }

        let glyph_width = (glyph.bbox.max.x - glyph.bbox.min.x) as Real;
        cursor_x += glyph_width * size;
    }

    let mut extent = TextExtent { width: cursor_x, height: size };
    if let Some(bounds) = mesh.bounds() {
        extent.height = extent.height.max(bounds.maxs.y - bounds.mins.y);
    }
    log::debug!("text mesh for {text:?}: {} triangles", mesh.triangle_count());
    Ok((mesh, extent))
}

// sfnt version tag of a single font or a font collection
#[cfg(feature = "truetype-text")]
fn is_font_file(data: &[u8]) -> bool {
    data.len() >= 12
        && matches!(&data[..4], [0, 1, 0, 0] | b"OTTO" | b"true" | b"ttcf")
}
