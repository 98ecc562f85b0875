use crate::camera::spherical_to_cartesian;
use crate::enums::PlatonicSolid;
use crate::errors::{invalid, GeometryError};
use crate::float_types::{Real, EPSILON, PI, TAU, WELD_TOLERANCE};
use crate::mesh::Mesh;
use crate::polygon::{build_orthonormal_basis, centroid, newell_normal, subdivide_triangle};
use crate::vertex::Vertex;
use nalgebra::{Point2, Point3, Vector3};

impl Mesh {
    /// Add a flat face with one shared normal, fanned from its first point.
    /// When `outside` is given the loop is reversed if needed so its front
    /// faces away from that point.
    pub fn add_face(
        &mut self,
        points: &[Point3<Real>],
        outside: Option<Point3<Real>>,
    ) -> Result<(), GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::DegeneratePolygon(points.len()));
        }
        let mut loop_points = points.to_vec();
        let mut normal = newell_normal(&loop_points);
        if normal.norm_squared() < EPSILON * EPSILON {
            return invalid("face has no area");
        }
        normal.normalize_mut();
        if let Some(inner) = outside {
            if normal.dot(&(centroid(&loop_points) - inner)) < 0.0 {
                loop_points.reverse();
                normal = -normal;
            }
        }
        let first = self.positions.len() as u32;
        for p in &loop_points {
            self.push_vertex(*p, Some(normal), None);
        }
        self.add_fan(first, loop_points.len() as u32);
        Ok(())
    }

    /// Add a parallelepiped spanned by the edge vectors `u`, `v`, `w` from
    /// `corner`. Each of the 6 faces is flat with texture coordinates
    /// covering the unit square, and all faces point outward whatever the
    /// handedness of `u`, `v`, `w`.
    pub fn add_box(
        &mut self,
        corner: Point3<Real>,
        u: Vector3<Real>,
        v: Vector3<Real>,
        w: Vector3<Real>,
    ) -> Result<(), GeometryError> {
        if !corner.iter().all(|c| c.is_finite()) {
            return invalid("box corner must be finite");
        }
        // Sine-like measure: the volume over the product of edge lengths.
        let scale = u.norm() * v.norm() * w.norm();
        if !(scale > 0.0 && u.dot(&v.cross(&w)).abs() >= EPSILON * scale) {
            return invalid("box edge vectors are coplanar");
        }
        let p = |i: Real, j: Real, k: Real| corner + u * i + v * j + w * k;
        let center = p(0.5, 0.5, 0.5);
        let faces = [
            [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)],
            [p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0)],
            [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)],
            [p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0)],
            [p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), p(0.0, 0.0, 1.0)],
            [p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0)],
        ];
        let uvs = [
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.0),
        ];
        for mut face in faces {
            let mut normal = newell_normal(&face).normalize();
            if normal.dot(&(centroid(&face) - center)) < 0.0 {
                face.reverse();
                normal = -normal;
            }
            let first = self.positions.len() as u32;
            for (corner, uv) in face.iter().zip(uvs) {
                self.push_vertex(*corner, Some(normal), Some(uv));
            }
            self.add_fan(first, 4);
        }
        Ok(())
    }

    /// Axis-aligned cube of edge length `size` centered on `center`
    pub fn cube(center: Point3<Real>, size: Real) -> Result<Mesh, GeometryError> {
        if size <= 0.0 {
            return invalid(format!("cube size must be positive, got {size}"));
        }
        let h = size / 2.0;
        let mut mesh = Mesh::with_capacity(24, 12);
        mesh.add_box(
            center - Vector3::new(h, h, h),
            Vector3::x() * size,
            Vector3::y() * size,
            Vector3::z() * size,
        )?;
        Ok(mesh)
    }

    /// Add a truncated cone whose bottom circle is centered on `base` and
    /// whose top circle is centered on `base + axis`.
    ///
    /// Sides are smooth shaded with a seam column of duplicated vertices so
    /// texture `u` runs 0..1 around the axis. A radius of zero collapses that
    /// end to a point, and `caps` closes the non-degenerate ends with flat discs.
    pub fn add_frustum(
        &mut self,
        base: Point3<Real>,
        axis: Vector3<Real>,
        bottom_radius: Real,
        top_radius: Real,
        segments: usize,
        caps: bool,
    ) -> Result<(), GeometryError> {
        if segments < 3 {
            return invalid(format!("frustum needs at least 3 segments, got {segments}"));
        }
        let height = axis.norm();
        if height < EPSILON {
            return invalid("frustum axis has zero length");
        }
        if bottom_radius < 0.0 || top_radius < 0.0 {
            return invalid("frustum radii must not be negative");
        }
        if bottom_radius < EPSILON && top_radius < EPSILON {
            return invalid("frustum needs one non-zero radius");
        }

        let dir = axis / height;
        let (u, v) = build_orthonormal_basis(dir);
        let top = base + axis;
        let radial = |i: usize| {
            let a = TAU * i as Real / segments as Real;
            u * a.cos() + v * a.sin()
        };
        let side_normal = |r: Vector3<Real>| (r * height + dir * (bottom_radius - top_radius)).normalize();
        let bottom_point = bottom_radius < EPSILON;
        let top_point = top_radius < EPSILON;

        for i in 0..segments {
            let s = i as Real / segments as Real;
            let s1 = (i + 1) as Real / segments as Real;
            let (r0, r1) = (radial(i), radial(i + 1));
            let (n0, n1) = (side_normal(r0), side_normal(r1));
            let mid = side_normal((r0 + r1).normalize());

            let b0 = self.push_vertex(base + r0 * bottom_radius, Some(if bottom_point { mid } else { n0 }), Some(Point2::new(s, 1.0)));
            let b1 = self.push_vertex(base + r1 * bottom_radius, Some(if bottom_point { mid } else { n1 }), Some(Point2::new(s1, 1.0)));
            let t0 = self.push_vertex(top + r0 * top_radius, Some(if top_point { mid } else { n0 }), Some(Point2::new(s, 0.0)));
            let t1 = self.push_vertex(top + r1 * top_radius, Some(if top_point { mid } else { n1 }), Some(Point2::new(s1, 0.0)));

            if !top_point {
                self.add_indexed_triangle(b0, t1, t0);
            }
            if !bottom_point {
                self.add_indexed_triangle(b0, b1, t1);
            }
        }

        if caps {
            if !bottom_point {
                self.add_disc(base, -dir, u, v, bottom_radius, segments, true);
            }
            if !top_point {
                self.add_disc(top, dir, u, v, top_radius, segments, false);
            }
        }
        Ok(())
    }

    // Flat disc fanned around its center. `reverse` winds it against u x v.
    #[allow(clippy::too_many_arguments)]
    fn add_disc(
        &mut self,
        center: Point3<Real>,
        normal: Vector3<Real>,
        u: Vector3<Real>,
        v: Vector3<Real>,
        radius: Real,
        segments: usize,
        reverse: bool,
    ) {
        let c = self.push_vertex(center, Some(normal), Some(Point2::new(0.5, 0.5)));
        let first = self.positions.len() as u32;
        for i in 0..segments {
            let a = TAU * i as Real / segments as Real;
            let (cos, sin) = (a.cos(), a.sin());
            self.push_vertex(
                center + (u * cos + v * sin) * radius,
                Some(normal),
                Some(Point2::new(0.5 + 0.5 * cos, 0.5 - 0.5 * sin)),
            );
        }
        for i in 0..segments as u32 {
            let a = first + i;
            let b = first + (i + 1) % segments as u32;
            if reverse {
                self.add_indexed_triangle(c, b, a);
            } else {
                self.add_indexed_triangle(c, a, b);
            }
        }
    }

    pub fn add_cylinder(
        &mut self,
        base: Point3<Real>,
        axis: Vector3<Real>,
        radius: Real,
        segments: usize,
        caps: bool,
    ) -> Result<(), GeometryError> {
        if radius < EPSILON {
            return invalid("cylinder radius must be positive");
        }
        self.add_frustum(base, axis, radius, radius, segments, caps)
    }

    /// Add a cone with its base disc at `base` and its apex at `base + axis`
    pub fn add_cone(
        &mut self,
        base: Point3<Real>,
        axis: Vector3<Real>,
        radius: Real,
        segments: usize,
        cap: bool,
    ) -> Result<(), GeometryError> {
        if radius < EPSILON {
            return invalid("cone radius must be positive");
        }
        self.add_frustum(base, axis, radius, 0.0, segments, cap)
    }

    pub fn cylinder(
        base: Point3<Real>,
        axis: Vector3<Real>,
        radius: Real,
        segments: usize,
    ) -> Result<Mesh, GeometryError> {
        let mut mesh = Mesh::new();
        mesh.add_cylinder(base, axis, radius, segments, true)?;
        log::debug!("cylinder: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
        Ok(mesh)
    }

    pub fn cone(
        base: Point3<Real>,
        axis: Vector3<Real>,
        radius: Real,
        segments: usize,
    ) -> Result<Mesh, GeometryError> {
        let mut mesh = Mesh::new();
        mesh.add_cone(base, axis, radius, segments, true)?;
        log::debug!("cone: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
        Ok(mesh)
    }

    /// Add a latitude/longitude sphere.
    ///
    /// `num_theta` slices run around the Y axis and `num_phi` stacks run from
    /// the +Y pole to the -Y pole. Vertex `(i, j)` sits at
    /// `(r sinφ sinθ, r cosφ, r sinφ cosθ)` with `θ = 2π i / num_theta`,
    /// `φ = π j / num_phi`, and gets texture coordinates `(i / num_theta, j / num_phi)`.
    pub fn add_sphere(
        &mut self,
        center: Point3<Real>,
        radius: Real,
        num_theta: usize,
        num_phi: usize,
    ) -> Result<(), GeometryError> {
        if radius <= 0.0 {
            return invalid(format!("sphere radius must be positive, got {radius}"));
        }
        if num_theta < 3 || num_phi < 2 {
            return invalid(format!(
                "sphere needs num_theta >= 3 and num_phi >= 2, got {num_theta} x {num_phi}"
            ));
        }

        let first = self.positions.len() as u32;
        let columns = num_theta as u32 + 1;
        for j in 0..=num_phi {
            let phi = PI * j as Real / num_phi as Real;
            for i in 0..=num_theta {
                let theta = TAU * i as Real / num_theta as Real;
                let dir = spherical_to_cartesian(1.0, theta, phi).coords;
                self.push_vertex(
                    center + dir * radius,
                    Some(dir),
                    Some(Point2::new(
                        i as Real / num_theta as Real,
                        j as Real / num_phi as Real,
                    )),
                );
            }
        }

        let at = |j: usize, i: usize| first + j as u32 * columns + i as u32;
        for j in 0..num_phi {
            for i in 0..num_theta {
                // Pole rows would otherwise emit zero-area triangles
                if j > 0 {
                    self.add_indexed_triangle(at(j, i), at(j + 1, i), at(j, i + 1));
                }
                if j + 1 < num_phi {
                    self.add_indexed_triangle(at(j, i + 1), at(j + 1, i), at(j + 1, i + 1));
                }
            }
        }
        Ok(())
    }

    pub fn sphere(
        center: Point3<Real>,
        radius: Real,
        num_theta: usize,
        num_phi: usize,
    ) -> Result<Mesh, GeometryError> {
        let mut mesh = Mesh::new();
        mesh.add_sphere(center, radius, num_theta, num_phi)?;
        log::debug!("sphere: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
        Ok(mesh)
    }

    /// Add a sphere built by splitting each icosahedron face into four
    /// `subdivisions` times, pushing new points out onto the sphere. Vertices
    /// are shared and normals are radial.
    pub fn add_geodesic_sphere(
        &mut self,
        center: Point3<Real>,
        radius: Real,
        subdivisions: u32,
    ) -> Result<(), GeometryError> {
        if radius <= 0.0 {
            return invalid(format!("sphere radius must be positive, got {radius}"));
        }
        let solid = PlatonicSolid::Icosahedron;
        let corners = solid.vertices();
        let mut triangles: Vec<[Vertex; 3]> = solid
            .faces()
            .iter()
            .map(|f| [f[0], f[1], f[2]].map(|i| Vertex::new(corners[i], corners[i].coords)))
            .collect();

        for _ in 0..subdivisions {
            triangles = triangles
                .into_iter()
                .flat_map(subdivide_triangle)
                .map(|tri| {
                    tri.map(|v| {
                        let dir = v.pos.coords.normalize();
                        Vertex::new(Point3::from(dir), dir)
                    })
                })
                .collect();
        }

        let mut unit = Mesh::from_triangles(triangles).weld(WELD_TOLERANCE)?;
        unit.normals = unit.positions.iter().map(|p| p.coords.normalize()).collect();
        let placed = unit.scale(radius, radius, radius).translate(center.coords);
        self.append(&placed);
        Ok(())
    }

    pub fn geodesic_sphere(
        center: Point3<Real>,
        radius: Real,
        subdivisions: u32,
    ) -> Result<Mesh, GeometryError> {
        let mut mesh = Mesh::new();
        mesh.add_geodesic_sphere(center, radius, subdivisions)?;
        log::debug!(
            "geodesic sphere: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Add a torus around the Y axis through `center`.
    ///
    /// The tube circle of radius `minor` has its center `major` away from the
    /// axis. `num_theta` steps go around the Y axis and `num_phi` around the tube.
    pub fn add_torus(
        &mut self,
        center: Point3<Real>,
        major: Real,
        minor: Real,
        num_theta: usize,
        num_phi: usize,
    ) -> Result<(), GeometryError> {
        if major <= 0.0 || minor <= 0.0 {
            return invalid("torus radii must be positive");
        }
        if num_theta < 3 || num_phi < 3 {
            return invalid(format!(
                "torus needs at least 3 x 3 steps, got {num_theta} x {num_phi}"
            ));
        }

        let first = self.positions.len() as u32;
        let rows = num_phi as u32 + 1;
        for i in 0..=num_theta {
            let theta = TAU * i as Real / num_theta as Real;
            let radial = Vector3::new(theta.sin(), 0.0, theta.cos());
            let ring_center = center + radial * major;
            for j in 0..=num_phi {
                let phi = TAU * j as Real / num_phi as Real;
                let normal = radial * phi.cos() + Vector3::y() * phi.sin();
                self.push_vertex(
                    ring_center + normal * minor,
                    Some(normal),
                    Some(Point2::new(
                        i as Real / num_theta as Real,
                        j as Real / num_phi as Real,
                    )),
                );
            }
        }

        let at = |i: usize, j: usize| first + i as u32 * rows + j as u32;
        for i in 0..num_theta {
            for j in 0..num_phi {
                self.add_indexed_triangle(at(i, j), at(i + 1, j), at(i, j + 1));
                self.add_indexed_triangle(at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
            }
        }
        Ok(())
    }

    pub fn torus(
        center: Point3<Real>,
        major: Real,
        minor: Real,
        num_theta: usize,
        num_phi: usize,
    ) -> Result<Mesh, GeometryError> {
        let mut mesh = Mesh::new();
        mesh.add_torus(center, major, minor, num_theta, num_phi)?;
        log::debug!("torus: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
        Ok(mesh)
    }

    /// Add a platonic solid with its vertices on a sphere of `circumradius`.
    /// Faces are flat shaded.
    pub fn add_platonic(
        &mut self,
        solid: PlatonicSolid,
        center: Point3<Real>,
        circumradius: Real,
    ) -> Result<(), GeometryError> {
        if circumradius <= 0.0 {
            return invalid(format!("circumradius must be positive, got {circumradius}"));
        }
        let corners: Vec<Point3<Real>> = solid
            .vertices()
            .into_iter()
            .map(|p| center + p.coords * circumradius)
            .collect();
        for face in solid.faces() {
            let points: Vec<Point3<Real>> = face.iter().map(|&i| corners[i]).collect();
            self.add_face(&points, Some(center))?;
        }
        Ok(())
    }

    pub fn platonic(
        solid: PlatonicSolid,
        center: Point3<Real>,
        circumradius: Real,
    ) -> Result<Mesh, GeometryError> {
        let mut mesh = Mesh::new();
        mesh.add_platonic(solid, center, circumradius)?;
        log::debug!("{solid:?}: {} triangles", mesh.triangle_count());
        Ok(mesh)
    }
}
