//! Planes and point-in-triangle classification

use crate::foundation::math::{utils, Vec3};

/// Relative slack allowed when the sub-triangle areas are summed
///
/// The areas of a point strictly inside add up to exactly one full area;
/// anything outside adds at least twice the area of the excess region.
pub const POINT_IN_TRIANGLE_TOLERANCE: f32 = 1.0e-4;

/// Plane through `origin` with unit `normal`
///
/// `equation` holds `[a, b, c, d]` of `ax + by + cz + d = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// A point on the plane
    pub origin: Vec3,
    /// Unit normal; its side is the front face
    pub normal: Vec3,
    /// Implicit equation coefficients
    pub equation: [f32; 4],
}

impl Plane {
    /// Plane through `origin` facing along `normal` (normalized here)
    pub fn from_origin_normal(origin: Vec3, normal: Vec3) -> Self {
        let normal = normal.try_normalize(f32::EPSILON).unwrap_or(normal);
        Self {
            origin,
            normal,
            equation: [normal.x, normal.y, normal.z, -normal.dot(&origin)],
        }
    }

    /// Plane of the triangle `p1 p2 p3`, `None` when the triangle is degenerate
    pub fn from_triangle(p1: Vec3, p2: Vec3, p3: Vec3) -> Option<Self> {
        let normal = (p2 - p1).cross(&(p3 - p1)).try_normalize(f32::EPSILON)?;
        Some(Self::from_origin_normal(p1, normal))
    }

    /// Signed distance from the plane, positive on the front side
    pub fn signed_distance(&self, point: &Vec3) -> f64 {
        let [a, b, c, d] = self.equation;
        utils::dot_f64(&Vec3::new(a, b, c), point) + f64::from(d)
    }

    /// True when travelling along `direction` approaches the front face
    pub fn is_front_facing_to(&self, direction: &Vec3) -> bool {
        utils::dot_f64(&self.normal, direction) <= 0.0
    }
}

/// Cross-product area ratio test for `point` inside triangle `p1 p2 p3`
///
/// Degenerate triangles contain nothing. Points on an edge count as inside.
pub fn point_in_triangle(point: &Vec3, p1: &Vec3, p2: &Vec3, p3: &Vec3) -> bool {
    let area = (p2 - p1).cross(&(p3 - p1)).norm();
    if area <= f32::EPSILON {
        return false;
    }

    let to_p1 = p1 - point;
    let to_p2 = p2 - point;
    let to_p3 = p3 - point;

    let alpha = to_p2.cross(&to_p3).norm() / area;
    let beta = to_p3.cross(&to_p1).norm() / area;
    let gamma = to_p1.cross(&to_p2).norm() / area;

    (alpha + beta + gamma - 1.0).abs() <= POINT_IN_TRIANGLE_TOLERANCE
}
