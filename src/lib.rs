//! Triangle-mesh generation for 3D scenes.
//!
//! Builders for primitive solids, Platonic solids, sweep and parametric
//! surfaces, fractals, text placement and wireframes, all producing an
//! indexed [`Mesh`]. A spherical camera model with projection helpers and
//! ray picking completes the toolkit.

#![forbid(unsafe_code)]

pub mod float_types;
pub mod errors;
pub mod enums;
pub mod vertex;
pub mod polygon;
pub mod mesh;
pub mod shapes3d;
pub mod platonic;
pub mod sweep;
pub mod surface;
pub mod text;
pub mod fractal;
pub mod wireframe;
pub mod camera;
pub mod hit;
pub mod io;

pub use camera::{Camera, ControllerSettings, Projection, SphericalCameraController};
pub use enums::{Axis, CameraMove, HorizontalAlignment, PlatonicSolid, VerticalAlignment};
pub use errors::GeometryError;
pub use hit::RayHit;
pub use io::IoError;
pub use mesh::Mesh;
pub use polygon::Polygon;
pub use sweep::SweepOptions;
pub use surface::SurfaceOptions;
pub use text::{TextAlignment, TextExtent, TextQuad};
pub use vertex::Vertex;
pub use wireframe::{EdgeSet, WireframeOptions};

#[cfg(test)]
mod tests;
