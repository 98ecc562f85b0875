//! Meshes sampled from functions: parametric surfaces `(u, v) -> point`
//! and height fields `y = f(x, z)`.

use crate::errors::{invalid, GeometryError};
use crate::float_types::{Real, EPSILON};
use crate::mesh::Mesh;
use nalgebra::{Point2, Point3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceOptions {
    /// The surface closes on itself along `u` (f(u_max, v) == f(u_min, v))
    pub wrap_u: bool,
    /// The surface closes on itself along `v`
    pub wrap_v: bool,
    /// Emit texture coordinates normalized to [0, 1]
    pub texture: bool,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        SurfaceOptions {
            wrap_u: false,
            wrap_v: false,
            texture: true,
        }
    }
}

impl Mesh {
    /// Sample `f` on an `nu` x `nv` grid of cells over the given ranges and
    /// add the result as a smooth-shaded surface.
    ///
    /// Front faces point along `df/du x df/dv`. A wrapped direction joins its
    /// last cell back to the first sample; without texture coordinates the
    /// seam shares vertices, with them the seam column is duplicated and its
    /// normals averaged. Cells that collapse to zero area (poles) are skipped.
    pub fn add_parametric_surface<F>(
        &mut self,
        f: F,
        u_range: (Real, Real),
        v_range: (Real, Real),
        nu: usize,
        nv: usize,
        options: SurfaceOptions,
    ) -> Result<(), GeometryError>
    where
        F: Fn(Real, Real) -> Point3<Real> + Sync,
    {
        if nu < 1 || nv < 1 {
            return invalid(format!("surface needs at least 1 x 1 cells, got {nu} x {nv}"));
        }
        if (u_range.1 - u_range.0).abs() < EPSILON || (v_range.1 - v_range.0).abs() < EPSILON {
            return invalid("surface parameter range is empty");
        }

        let share_u = options.wrap_u && !options.texture;
        let share_v = options.wrap_v && !options.texture;
        let cols = if share_u { nu } else { nu + 1 };
        let rows = if share_v { nv } else { nv + 1 };

        let u_at = |i: usize| u_range.0 + (u_range.1 - u_range.0) * i as Real / nu as Real;
        let v_at = |j: usize| v_range.0 + (v_range.1 - v_range.0) * j as Real / nv as Real;
        // Wrapped seams sample the start again so both sides match exactly
        let sample = |k: usize| {
            let (i, j) = (k % cols, k / cols);
            let i = if options.wrap_u && i == nu { 0 } else { i };
            let j = if options.wrap_v && j == nv { 0 } else { j };
            f(u_at(i), v_at(j))
        };

        #[cfg(feature = "parallel")]
        let samples: Vec<Point3<Real>> = (0..rows * cols).into_par_iter().map(sample).collect();
        #[cfg(not(feature = "parallel"))]
        let samples: Vec<Point3<Real>> = (0..rows * cols).map(sample).collect();

        if let Some(k) = samples.iter().position(|p| !p.iter().all(|c| c.is_finite())) {
            return Err(GeometryError::NonFiniteCoordinate(k));
        }

        let mut patch = Mesh::with_capacity(samples.len(), 2 * nu * nv);
        for (k, p) in samples.into_iter().enumerate() {
            let uv = options.texture.then(|| {
                Point2::new(
                    (k % cols) as Real / nu as Real,
                    (k / cols) as Real / nv as Real,
                )
            });
            patch.push_vertex(p, None, uv);
        }

        let at = |i: usize, j: usize| ((j % rows) * cols + (i % cols)) as u32;
        for j in 0..nv {
            for i in 0..nu {
                patch.add_indexed_triangle_checked(at(i, j), at(i + 1, j), at(i, j + 1));
                patch.add_indexed_triangle_checked(at(i + 1, j), at(i + 1, j + 1), at(i, j + 1));
            }
        }

        patch.compute_normals();
        if options.wrap_u && !share_u {
            for j in 0..rows {
                patch.average_normals(at(0, j), at(nu, j));
            }
        }
        if options.wrap_v && !share_v {
            for i in 0..cols {
                patch.average_normals(at(i, 0), at(i, nv));
            }
        }

        log::debug!(
            "parametric surface: {} vertices, {} triangles",
            patch.vertex_count(),
            patch.triangle_count()
        );
        self.append(&patch);
        Ok(())
    }

    pub fn parametric_surface<F>(
        f: F,
        u_range: (Real, Real),
        v_range: (Real, Real),
        nu: usize,
        nv: usize,
        options: SurfaceOptions,
    ) -> Result<Mesh, GeometryError>
    where
        F: Fn(Real, Real) -> Point3<Real> + Sync,
    {
        let mut mesh = Mesh::new();
        mesh.add_parametric_surface(f, u_range, v_range, nu, nv, options)?;
        Ok(mesh)
    }

    /// Add the graph of `y = f(x, z)` sampled on `nx` x `nz` cells, facing +Y.
    /// Texture `u` follows x and `v` follows z.
    pub fn add_height_field<F>(
        &mut self,
        f: F,
        x_range: (Real, Real),
        z_range: (Real, Real),
        nx: usize,
        nz: usize,
    ) -> Result<(), GeometryError>
    where
        F: Fn(Real, Real) -> Real + Sync,
    {
        let first = self.positions.len();
        // z as the first parameter makes dz x dx point up
        self.add_parametric_surface(
            |z, x| Point3::new(x, f(x, z), z),
            z_range,
            x_range,
            nz,
            nx,
            SurfaceOptions::default(),
        )?;
        for uv in &mut self.texture_coords[first..] {
            *uv = Point2::new(uv.y, uv.x);
        }
        Ok(())
    }
}

