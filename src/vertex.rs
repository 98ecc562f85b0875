use crate::float_types::{Real, EPSILON};
use nalgebra::{Point3, Vector3};

/// A loose mesh corner: position plus shading normal. Subdivision, the
/// geodesic sphere and [`crate::Mesh::from_triangles`] work on triples of
/// these before anything is indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,
    pub normal: Vector3<Real>,
}

impl Vertex {
    pub const fn new(pos: Point3<Real>, normal: Vector3<Real>) -> Self {
        Vertex { pos, normal }
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// Blend position and normal toward `other` by `t`. The normal is not
    /// renormalized.
    pub fn interpolate(&self, other: &Vertex, t: Real) -> Vertex {
        Vertex::new(self.pos.lerp(&other.pos, t), self.normal.lerp(&other.normal, t))
    }

    /// Rescale the normal to unit length; zero normals stay zero.
    pub fn normalize_normal(&mut self) {
        if self.normal.norm_squared() > EPSILON * EPSILON {
            self.normal.normalize_mut();
        }
    }
}
