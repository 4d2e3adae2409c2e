//! Primitive collision shapes and intersection algorithms
//!
//! Provides rays and triangles with the discrete intersection tests used
//! for line-of-sight style queries and contact resolution.

use crate::foundation::bounds::AABB;
use crate::foundation::math::{constants::EPSILON_F64, utils, Mat4, Vec3, Vector3};
use super::plane::Plane;

/// A ray for ray casting and line-of-sight checks
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized on construction)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: utils::normalize_or_zero(&direction),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Result of a ray query against level geometry
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Index of the triangle that was hit
    pub triangle: u32,
    /// The distance from the ray origin to the hit point
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
    /// The surface normal at the intersection point
    pub normal: Vec3,
}

/// A triangle for collision detection
///
/// Winding decides which side is the front face: the normal follows the
/// right-hand rule over `v0 -> v1 -> v2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Unit normal (right-hand rule), zero for degenerate triangles
    pub fn normal(&self) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        utils::normalize_or_zero(&edge1.cross(&edge2))
    }

    /// Supporting plane, `None` for degenerate triangles
    pub fn plane(&self) -> Option<Plane> {
        Plane::from_triangle(self.v0, self.v1, self.v2)
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Tight bounding box around the three vertices
    pub fn bounds(&self) -> AABB {
        AABB {
            min: self.v0.inf(&self.v1).inf(&self.v2),
            max: self.v0.sup(&self.v1).sup(&self.v2),
        }
    }

    /// Triangle with every vertex transformed by `matrix`
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        Self {
            v0: utils::transform_position(matrix, &self.v0),
            v1: utils::transform_position(matrix, &self.v1),
            v2: utils::transform_position(matrix, &self.v2),
        }
    }

    /// Triangle rescaled into the ellipsoid space of `radius`
    pub fn to_ellipsoid_space(&self, radius: &Vec3) -> Self {
        Self {
            v0: self.v0.component_div(radius),
            v1: self.v1.component_div(radius),
            v2: self.v2.component_div(radius),
        }
    }

    /// Ray intersection as `(distance, u, v)`, where `u` and `v` weight `v1` and `v2`
    ///
    /// Both faces are hit; callers that care about facing compare the ray
    /// direction against [`Triangle::normal`]. Rays lying in the triangle's
    /// plane and degenerate triangles never hit.
    #[allow(clippy::cast_possible_truncation)]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32, f32)> {
        let a = utils::widen(&self.v0);
        let edge1 = utils::widen(&self.v1) - a;
        let edge2 = utils::widen(&self.v2) - a;
        let direction = utils::widen(&ray.direction);

        let area = edge1.cross(&edge2).norm();
        if area <= EPSILON_F64 * edge1.norm() * edge2.norm() {
            return None;
        }

        // |det| is the triangle's doubled area times the cosine to its normal
        let h = direction.cross(&edge2);
        let det = edge1.dot(&h);
        if det.abs() <= EPSILON_F64 * area {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = utils::widen(&ray.origin) - a;
        let u = inv_det * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = inv_det * direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(&q);
        (t >= 0.0).then_some((t as f32, u as f32, v as f32))
    }

    /// Closest point on the triangle to `point`
    ///
    /// Degenerate triangles fall back to the nearest point on their edges.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let (a, b, c) = (utils::widen(&self.v0), utils::widen(&self.v1), utils::widen(&self.v2));
        let p = utils::widen(&point);
        let ab = b - a;
        let ac = c - a;

        let area_squared = ab.cross(&ac).norm_squared();
        if area_squared <= EPSILON_F64 * ab.norm_squared() * ac.norm_squared() {
            let nearest = [(a, b), (b, c), (c, a)]
                .into_iter()
                .map(|(start, end)| closest_on_segment(&p, &start, &end))
                .min_by(|x, y| (x - p).norm_squared().total_cmp(&(y - p).norm_squared()))
                .unwrap_or(a);
            return utils::narrow(&nearest);
        }

        let d1 = ab.dot(&(p - a));
        let d2 = ac.dot(&(p - a));
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.v0;
        }

        let d3 = ab.dot(&(p - b));
        let d4 = ac.dot(&(p - b));
        if d3 >= 0.0 && d4 <= d3 {
            return self.v1;
        }

        let d5 = ab.dot(&(p - c));
        let d6 = ac.dot(&(p - c));
        if d6 >= 0.0 && d5 <= d6 {
            return self.v2;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            return utils::narrow(&(a + ab * (d1 / (d1 - d3))));
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            return utils::narrow(&(a + ac * (d2 / (d2 - d6))));
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && d4 - d3 >= 0.0 && d5 - d6 >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return utils::narrow(&(b + (c - b) * w));
        }

        // Inside the face; the three weights sum to the squared doubled area
        let denom = va + vb + vc;
        utils::narrow(&(a + ab * (vb / denom) + ac * (vc / denom)))
    }
}

fn closest_on_segment(point: &Vector3<f64>, start: &Vector3<f64>, end: &Vector3<f64>) -> Vector3<f64> {
    let segment = end - start;
    let length_squared = segment.norm_squared();
    if length_squared == 0.0 {
        return *start;
    }
    let t = ((point - start).dot(&segment) / length_squared).clamp(0.0, 1.0);
    start + segment * t
}
