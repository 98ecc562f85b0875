//! Camera transforms and the spherical orbit controller.
//!
//! World space is right-handed with +Y up. A camera looks down its local
//! -Z axis; projections map view-space depth `[near, far]` to `[0, 1]`.

use crate::enums::CameraMove;
use crate::errors::{invalid, GeometryError};
use crate::float_types::{parry3d::query::Ray, Real, EPSILON, FRAC_PI_2, PI, TAU};
use nalgebra::{Matrix4, Point2, Point3, Vector3, Vector4};

/// Point at radius `r`, azimuth `theta` and polar angle `phi`:
/// `(r sinφ sinθ, r cosφ, r sinφ cosθ)`.
///
/// `phi` is measured from +Y, `theta` from +Z toward +X.
pub fn spherical_to_cartesian(r: Real, theta: Real, phi: Real) -> Point3<Real> {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Point3::new(r * sin_phi * sin_theta, r * cos_phi, r * sin_phi * cos_theta)
}

/// Inverse of [`spherical_to_cartesian`]: returns `(r, theta, phi)` with
/// `theta` in `(-π, π]` and `phi` in `[0, π]`. The origin maps to all zeros.
pub fn cartesian_to_spherical(p: &Point3<Real>) -> (Real, Real, Real) {
    let r = p.coords.norm();
    if r < EPSILON {
        return (0.0, 0.0, 0.0);
    }
    let phi = (p.y / r).clamp(-1.0, 1.0).acos();
    let theta = p.x.atan2(p.z);
    (r, theta, phi)
}

// Right, up and forward unit vectors. Falls back to another up vector when
// `up` is parallel to the view direction.
fn view_basis(
    forward: &Vector3<Real>,
    up: &Vector3<Real>,
) -> (Vector3<Real>, Vector3<Real>, Vector3<Real>) {
    let f = forward.normalize();
    let mut right = f.cross(up);
    if right.norm_squared() < EPSILON {
        let fallback = if f.y.abs() < 0.9 { Vector3::y() } else { Vector3::z() };
        right = f.cross(&fallback);
    }
    let right = right.normalize();
    let true_up = right.cross(&f);
    (right, true_up, f)
}

/// Right-handed view matrix for a camera at `eye` looking at `target`.
pub fn look_at(eye: &Point3<Real>, target: &Point3<Real>, up: &Vector3<Real>) -> Matrix4<Real> {
    let forward = target - eye;
    let forward = if forward.norm_squared() < EPSILON * EPSILON {
        -Vector3::z()
    } else {
        forward
    };
    let (s, u, f) = view_basis(&forward, up);
    let e = eye.coords;
    Matrix4::new(
        s.x, s.y, s.z, -s.dot(&e),
        u.x, u.y, u.z, -u.dot(&e),
        -f.x, -f.y, -f.z, f.dot(&e),
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Perspective projection from a *horizontal* field of view in radians.
/// `far` may be infinite.
pub fn perspective_projection(
    horizontal_fov: Real,
    aspect: Real,
    near: Real,
    far: Real,
) -> Result<Matrix4<Real>, GeometryError> {
    if !(horizontal_fov > 0.0 && horizontal_fov < PI) {
        return invalid(format!("field of view must be in (0, π), got {horizontal_fov}"));
    }
    if aspect <= 0.0 {
        return invalid(format!("aspect ratio must be positive, got {aspect}"));
    }
    if near <= 0.0 || far <= near {
        return invalid(format!("need 0 < near < far, got near={near} far={far}"));
    }
    let fx = 1.0 / (horizontal_fov / 2.0).tan();
    let fy = fx * aspect;

    let (m22, m23) = if far.is_finite() {
        let range_inv = 1.0 / (near - far);
        (far * range_inv, far * near * range_inv)
    } else {
        (-1.0, -near)
    };

    Ok(Matrix4::new(
        fx, 0.0, 0.0, 0.0,
        0.0, fy, 0.0, 0.0,
        0.0, 0.0, m22, m23,
        0.0, 0.0, -1.0, 0.0,
    ))
}

/// Orthographic projection showing `width` world units across.
pub fn orthographic_projection(
    width: Real,
    aspect: Real,
    near: Real,
    far: Real,
) -> Result<Matrix4<Real>, GeometryError> {
    if width <= 0.0 || aspect <= 0.0 {
        return invalid("orthographic width and aspect must be positive");
    }
    if !far.is_finite() || far <= near {
        return invalid(format!("need finite near < far, got near={near} far={far}"));
    }
    let height = width / aspect;
    let range_inv = 1.0 / (near - far);
    Ok(Matrix4::new(
        2.0 / width, 0.0, 0.0, 0.0,
        0.0, 2.0 / height, 0.0, 0.0,
        0.0, 0.0, range_inv, near * range_inv,
        0.0, 0.0, 0.0, 1.0,
    ))
}

/// Maps normalized device coordinates to pixels, origin at the top-left
/// with y growing downward.
pub fn viewport_matrix(width: Real, height: Real) -> Matrix4<Real> {
    let (hw, hh) = (width / 2.0, height / 2.0);
    Matrix4::new(
        hw, 0.0, 0.0, hw,
        0.0, -hh, 0.0, hh,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Horizontal field of view in radians
        field_of_view: Real,
        near: Real,
        /// Can be [`Real::INFINITY`]
        far: Real,
    },
    Orthographic {
        /// Visible width in world units
        width: Real,
        near: Real,
        far: Real,
    },
}

/// A positioned camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<Real>,
    pub look_direction: Vector3<Real>,
    pub up_direction: Vector3<Real>,
    pub projection: Projection,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            position: Point3::new(0.0, 0.0, 5.0),
            look_direction: -Vector3::z(),
            up_direction: Vector3::y(),
            projection: Projection::Perspective {
                field_of_view: PI / 4.0,
                near: 0.125,
                far: Real::INFINITY,
            },
        }
    }
}

impl Camera {
    pub fn view_matrix(&self) -> Matrix4<Real> {
        look_at(
            &self.position,
            &(self.position + self.look_direction),
            &self.up_direction,
        )
    }

    pub fn projection_matrix(&self, aspect: Real) -> Result<Matrix4<Real>, GeometryError> {
        match self.projection {
            Projection::Perspective {
                field_of_view,
                near,
                far,
            } => perspective_projection(field_of_view, aspect, near, far),
            Projection::Orthographic { width, near, far } => {
                orthographic_projection(width, aspect, near, far)
            }
        }
    }

    /// Projection times view
    pub fn view_projection(&self, aspect: Real) -> Result<Matrix4<Real>, GeometryError> {
        Ok(self.projection_matrix(aspect)? * self.view_matrix())
    }

    /// Pixel position of a world point on a `width` x `height` viewport, or
    /// `None` if the point is behind a perspective camera.
    pub fn world_to_screen(&self, p: &Point3<Real>, width: Real, height: Real) -> Option<Point2<Real>> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let clip = self.view_projection(width / height).ok()? * Vector4::new(p.x, p.y, p.z, 1.0);
        if clip.w <= EPSILON {
            return None;
        }
        let ndc = Point3::new(clip.x / clip.w, clip.y / clip.w, clip.z / clip.w);
        let screen = viewport_matrix(width, height).transform_point(&ndc);
        Some(Point2::new(screen.x, screen.y))
    }

    /// World-space ray through pixel `(x, y)`, for hit testing.
    /// The direction is normalized.
    pub fn screen_to_ray(&self, x: Real, y: Real, width: Real, height: Real) -> Result<Ray, GeometryError> {
        if width <= 0.0 || height <= 0.0 {
            return invalid("viewport size must be positive");
        }
        let aspect = width / height;
        let ndc_x = 2.0 * x / width - 1.0;
        let ndc_y = 1.0 - 2.0 * y / height;
        let (right, up, forward) = view_basis(&self.look_direction, &self.up_direction);

        match self.projection {
            Projection::Perspective { field_of_view, .. } => {
                let half = (field_of_view / 2.0).tan();
                let dir = forward + right * (ndc_x * half) + up * (ndc_y * half / aspect);
                Ok(Ray::new(self.position, dir.normalize()))
            }
            Projection::Orthographic { width: w, .. } => {
                let origin = self.position + right * (ndc_x * w / 2.0) + up * (ndc_y * w / aspect / 2.0);
                Ok(Ray::new(origin, forward))
            }
        }
    }
}

/// Step sizes and limits for [`SphericalCameraController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    pub d_theta: Real,
    pub d_phi: Real,
    pub d_r: Real,
    pub min_r: Real,
    /// Closest the polar angle may get to either pole, kept within [0, π/2]
    pub pole_margin: Real,
    /// Radians per pixel of drag
    pub drag_sensitivity: Real,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        ControllerSettings {
            d_theta: 0.1,
            d_phi: 0.1,
            d_r: 0.25,
            min_r: 0.5,
            pole_margin: 0.01,
            drag_sensitivity: 0.01,
        }
    }
}

/// Orbits a camera around `center` on a sphere of radius `r`, keeping it
/// pointed at the center with +Y up.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalCameraController {
    pub center: Point3<Real>,
    pub r: Real,
    pub theta: Real,
    pub phi: Real,
    pub settings: ControllerSettings,
}

impl SphericalCameraController {
    pub fn new(center: Point3<Real>, r: Real, theta: Real, phi: Real) -> Self {
        let mut controller = SphericalCameraController {
            center,
            r,
            theta,
            phi,
            settings: ControllerSettings::default(),
        };
        controller.clamp();
        controller
    }

    /// Controller whose camera currently sits at `position`
    pub fn from_position(center: Point3<Real>, position: Point3<Real>) -> Self {
        let (r, theta, phi) = cartesian_to_spherical(&Point3::from(position - center));
        SphericalCameraController::new(center, r, theta, phi)
    }

    pub fn with_settings(mut self, settings: ControllerSettings) -> Self {
        self.settings = settings;
        self.clamp();
        self
    }

    pub fn position(&self) -> Point3<Real> {
        self.center + spherical_to_cartesian(self.r, self.theta, self.phi).coords
    }

    pub fn apply(&mut self, step: CameraMove) {
        let s = self.settings;
        match step {
            CameraMove::Left => self.rotate(-s.d_theta, 0.0),
            CameraMove::Right => self.rotate(s.d_theta, 0.0),
            CameraMove::Up => self.rotate(0.0, -s.d_phi),
            CameraMove::Down => self.rotate(0.0, s.d_phi),
            CameraMove::In => self.zoom(-s.d_r),
            CameraMove::Out => self.zoom(s.d_r),
        }
    }

    pub fn rotate(&mut self, d_theta: Real, d_phi: Real) {
        self.theta += d_theta;
        self.phi += d_phi;
        self.clamp();
    }

    pub fn zoom(&mut self, d_r: Real) {
        self.r += d_r;
        self.clamp();
    }

    /// Turn a pointer drag in pixels into an orbit. Dragging right swings the
    /// scene right (the camera moves to lower theta); dragging down tips the
    /// camera toward the +Y pole.
    pub fn drag(&mut self, dx: Real, dy: Real) {
        let k = self.settings.drag_sensitivity;
        self.rotate(-dx * k, -dy * k);
    }

    /// Move `camera` to the controller's position, looking at the center.
    pub fn update(&self, camera: &mut Camera) {
        let position = self.position();
        camera.position = position;
        camera.look_direction = self.center - position;
        camera.up_direction = Vector3::y();
    }

    fn clamp(&mut self) {
        let s = self.settings;
        if self.r < s.min_r {
            log::trace!("camera radius {} clamped to {}", self.r, s.min_r);
            self.r = s.min_r;
        }
        let margin = if s.pole_margin.is_nan() {
            0.0
        } else {
            s.pole_margin.clamp(0.0, FRAC_PI_2)
        };
        let (lo, hi) = (margin, PI - margin);
        if self.phi < lo || self.phi > hi {
            log::trace!("camera polar angle {} clamped", self.phi);
            self.phi = self.phi.clamp(lo, hi);
        }
        self.theta = self.theta.rem_euclid(TAU);
    }
}
