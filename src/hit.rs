use crate::float_types::{
    parry3d::{
        query::{Ray, RayCast},
        shape::Triangle,
    },
    Real, EPSILON,
};
use crate::mesh::Mesh;
use nalgebra::{Isometry3, Point3, Vector3};

/// Where a ray meets a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    pub point: Point3<Real>,
    /// Ray parameter at the hit; a true distance when the direction is unit length
    pub distance: Real,
    /// Index into [`Mesh::indices`]
    pub triangle: usize,
}

impl Mesh {
    /// Every place where the ray from `origin` along `direction` crosses a
    /// triangle, front or back, sorted nearest first. Hits closer together
    /// than `EPSILON` (a ray through a shared edge) are reported once.
    pub fn ray_intersections(&self, origin: &Point3<Real>, direction: &Vector3<Real>) -> Vec<RayHit> {
        let ray = Ray::new(*origin, *direction);
        let iso = Isometry3::identity();

        let mut hits = Vec::new();
        for t in 0..self.indices.len() {
            let [a, b, c] = self.triangle_points(t);
            let triangle = Triangle::new(a, b, c);
            if let Some(hit) = triangle.cast_ray_and_get_normal(&iso, &ray, Real::MAX, true) {
                hits.push(RayHit {
                    point: ray.point_at(hit.time_of_impact),
                    distance: hit.time_of_impact,
                    triangle: t,
                });
            }
        }

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.dedup_by(|a, b| (a.distance - b.distance).abs() < EPSILON);

        hits
    }

    /// Nearest hit, if any
    pub fn first_hit(&self, origin: &Point3<Real>, direction: &Vector3<Real>) -> Option<RayHit> {
        self.ray_intersections(origin, direction).into_iter().next()
    }
}

/// Nearest hit among several meshes, returned with the key of the mesh it
/// belongs to. Typically fed with [`crate::camera::Camera::screen_to_ray`].
pub fn nearest_hit<'a, K, I>(models: I, ray: &Ray) -> Option<(K, RayHit)>
where
    I: IntoIterator<Item = (K, &'a Mesh)>,
{
    let mut best: Option<(K, RayHit)> = None;
    for (key, mesh) in models {
        if let Some(hit) = mesh.first_hit(&ray.origin, &ray.dir) {
            let closer = best
                .as_ref()
                .map_or(true, |(_, current)| hit.distance < current.distance);
            if closer {
                best = Some((key, hit));
            }
        }
    }
    best
}
