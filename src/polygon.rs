use crate::errors::GeometryError;
use crate::float_types::{Real, EPSILON, TAU};
use crate::vertex::Vertex;
use nalgebra::{Point3, Vector3};

/// A closed loop of points, assumed (roughly) planar.
/// Used for mesh faces, sweep generators and text quads.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point3<Real>>,
}

impl Polygon {
    /// Create a polygon from its points in winding order
    pub fn new(points: Vec<Point3<Real>>) -> Result<Self, GeometryError> {
        if points.len() < 3 {
            return Err(GeometryError::DegeneratePolygon(points.len()));
        }
        Ok(Polygon { points })
    }

    /// Regular `n`-gon in the XY plane centered on the origin, counter-clockwise seen from +Z.
    /// The first point lies on +X.
    pub fn regular(sides: usize, radius: Real) -> Result<Self, GeometryError> {
        if sides < 3 {
            return Err(GeometryError::DegeneratePolygon(sides));
        }
        let points = (0..sides)
            .map(|i| {
                let a = TAU * i as Real / sides as Real;
                Point3::new(radius * a.cos(), radius * a.sin(), 0.0)
            })
            .collect();
        Ok(Polygon { points })
    }

    /// Axis-aligned `width` x `height` rectangle in the XY plane, centered on the origin.
    pub fn rectangle(width: Real, height: Real) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Polygon {
            points: vec![
                Point3::new(-hw, -hh, 0.0),
                Point3::new(hw, -hh, 0.0),
                Point3::new(hw, hh, 0.0),
                Point3::new(-hw, hh, 0.0),
            ],
        }
    }

    /// Return an iterator over paired points each forming an edge of the polygon
    pub fn edges(&self) -> impl Iterator<Item = (&Point3<Real>, &Point3<Real>)> {
        self.points.iter().zip(self.points.iter().cycle().skip(1))
    }

    /// Unit normal from Newell's method; works for non-convex loops.
    /// Returns +Z for a loop with no area.
    pub fn normal(&self) -> Vector3<Real> {
        let n = newell_normal(&self.points);
        if n.norm_squared() < EPSILON * EPSILON {
            return Vector3::z();
        }
        n.normalize()
    }

    /// Average of the points
    pub fn centroid(&self) -> Point3<Real> {
        centroid(&self.points)
    }

    /// Same loop, opposite winding
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Polygon { points }
    }

    /// Fan triangulation around the first point. Exact for convex loops.
    pub fn fan_triangles(&self) -> Vec<[usize; 3]> {
        (1..self.points.len() - 1).map(|i| [0, i, i + 1]).collect()
    }
}

/// Unnormalized Newell normal; its length is twice the loop's area.
pub fn newell_normal(points: &[Point3<Real>]) -> Vector3<Real> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let current = points[i];
        let next = points[(i + 1) % n];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

pub(crate) fn centroid(points: &[Point3<Real>]) -> Point3<Real> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as Real)
}

/// Given a normal vector `n`, build two perpendicular unit vectors `u` and `v` so that
/// {u, v, n} forms an orthonormal basis. `n` is assumed non‐zero.
pub fn build_orthonormal_basis(n: Vector3<Real>) -> (Vector3<Real>, Vector3<Real>) {
    let n = n.normalize();

    // Cross with the axis along n's smallest component
    let other = if n.x.abs() < n.y.abs() && n.x.abs() < n.z.abs() {
        Vector3::x()
    } else if n.y.abs() < n.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let v = n.cross(&other).normalize();
    let u = v.cross(&n).normalize();

    (u, v)
}

/// Split a triangle into four at its edge midpoints
pub fn subdivide_triangle(tri: [Vertex; 3]) -> Vec<[Vertex; 3]> {
    let v01 = tri[0].interpolate(&tri[1], 0.5);
    let v12 = tri[1].interpolate(&tri[2], 0.5);
    let v20 = tri[2].interpolate(&tri[0], 0.5);

    vec![
        [tri[0].clone(), v01.clone(), v20.clone()],
        [v01.clone(), tri[1].clone(), v12.clone()],
        [v20.clone(), v12.clone(), tri[2].clone()],
        [v01, v12, v20],
    ]
}
