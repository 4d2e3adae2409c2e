//! Swept ellipsoid against triangle collision
//!
//! The moving ellipsoid is rescaled into its own ellipsoid space, where it
//! becomes a unit sphere. A triangle is then tested in three stages:
//!
//! 1. the time interval during which the sphere overlaps the triangle's plane,
//! 2. the face test at the start of that interval,
//! 3. the vertex and edge quadratics when the face test misses.
//!
//! Each triangle test is a pure function of the packet's input state. The
//! packet keeps the nearest hit over any number of triangles, so triangles can
//! be offered in any order, across any number of broad-phase batches.

use crate::foundation::math::{constants::EPSILON_F64, utils, Vec3};
use crate::physics::PhysicsError;
use super::plane::{point_in_triangle, Plane};
use super::primitives::Triangle;

/// One triangle's earliest contact with the swept sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Time of impact as a fraction of the step, in `[0, 1]`
    pub t: f64,
    /// Distance travelled before contact, in ellipsoid space
    pub distance: f64,
    /// Contact point on the triangle, in ellipsoid space
    pub point: Vec3,
    /// Plane of the triangle that was hit
    pub plane: Plane,
    /// The triangle that was hit, in ellipsoid space
    pub triangle: Triangle,
}

/// Collision record shared by every triangle test of one movement query
#[derive(Debug, Clone)]
pub struct CollisionPacket {
    /// Start position in world space
    pub position: Vec3,
    /// Step velocity in world space
    pub velocity: Vec3,
    /// Ellipsoid radii along each axis
    pub ellipsoid_radius: Vec3,

    /// Start position in ellipsoid space
    pub base_point: Vec3,
    /// Step velocity in ellipsoid space
    pub e_velocity: Vec3,
    /// Normalized ellipsoid-space velocity, zero when not moving
    pub normalized_velocity: Vec3,

    /// Whether any triangle has been hit
    pub found_collision: bool,
    /// Ellipsoid-space distance to the nearest hit
    pub nearest_distance: f64,
    /// Time of impact of the nearest hit
    pub t: f64,
    /// Contact point of the nearest hit, in ellipsoid space
    pub intersection_point: Vec3,
    /// Plane of the nearest hit
    pub plane: Option<Plane>,
    /// Triangle of the nearest hit, in ellipsoid space
    pub triangle: Option<Triangle>,
}

impl CollisionPacket {
    /// Packet for an ellipsoid at `position` moving by `velocity` this step
    pub fn new(position: Vec3, velocity: Vec3, ellipsoid_radius: Vec3) -> Result<Self, PhysicsError> {
        let valid = ellipsoid_radius.iter().all(|r| r.is_finite() && *r > f32::EPSILON);
        if !valid {
            log::warn!("Rejected collision packet with ellipsoid radius {:?}", ellipsoid_radius);
            return Err(PhysicsError::InvalidRadius(ellipsoid_radius.into()));
        }

        let base_point = position.component_div(&ellipsoid_radius);
        let e_velocity = velocity.component_div(&ellipsoid_radius);
        Ok(Self {
            position,
            velocity,
            ellipsoid_radius,
            base_point,
            e_velocity,
            normalized_velocity: utils::normalize_or_zero(&e_velocity),
            found_collision: false,
            nearest_distance: f64::MAX,
            t: 1.0,
            intersection_point: Vec3::zeros(),
            plane: None,
            triangle: None,
        })
    }

    /// Packet for a unit sphere already expressed in ellipsoid space
    pub fn unit_sphere(base_point: Vec3, e_velocity: Vec3) -> Self {
        Self {
            position: base_point,
            velocity: e_velocity,
            ellipsoid_radius: Vec3::repeat(1.0),
            base_point,
            e_velocity,
            normalized_velocity: utils::normalize_or_zero(&e_velocity),
            found_collision: false,
            nearest_distance: f64::MAX,
            t: 1.0,
            intersection_point: Vec3::zeros(),
            plane: None,
            triangle: None,
        }
    }

    /// Keep `hit` if it is the first hit or strictly nearer than the current one
    pub fn offer(&mut self, hit: SweepHit) -> bool {
        if self.found_collision && hit.distance >= self.nearest_distance {
            return false;
        }

        self.found_collision = true;
        self.nearest_distance = hit.distance;
        self.t = hit.t;
        self.intersection_point = hit.point;
        self.plane = Some(hit.plane);
        self.triangle = Some(hit.triangle);
        true
    }

    /// Test a triangle already expressed in this packet's ellipsoid space
    pub fn check_ellipsoid_triangle(&mut self, triangle: &Triangle) -> bool {
        match sweep_sphere_triangle(self, triangle) {
            Some(hit) => self.offer(hit),
            None => false,
        }
    }

    /// Test a world-space triangle
    pub fn check_triangle(&mut self, triangle: &Triangle) -> bool {
        let e_triangle = triangle.to_ellipsoid_space(&self.ellipsoid_radius);
        self.check_ellipsoid_triangle(&e_triangle)
    }

    /// Test every world-space triangle; true when any of them improved the packet
    pub fn check_triangles<'a, I>(&mut self, triangles: I) -> bool
    where
        I: IntoIterator<Item = &'a Triangle>,
    {
        triangles
            .into_iter()
            .fold(false, |improved, triangle| self.check_triangle(triangle) | improved)
    }

    /// World-space contact point of the nearest hit
    pub fn world_intersection_point(&self) -> Option<Vec3> {
        self.found_collision
            .then(|| self.intersection_point.component_mul(&self.ellipsoid_radius))
    }
}

/// Smallest root of `a t^2 + b t + c` in `(0, max]`
///
/// A negative discriminant is the ordinary "no contact" case. A leading
/// coefficient that vanishes next to `b` and `c` (zero velocity, motion along
/// an edge) also reports no root; slow motion with a tiny but meaningful `a`
/// still solves.
pub fn lowest_root(a: f64, b: f64, c: f64, max: f64) -> Option<f64> {
    if a.abs() <= f64::EPSILON * (b.abs() + c.abs()) {
        return None;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    // Avoids cancellation between -b and the square root when a is small
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let mut r1 = q / a;
    let mut r2 = if q == 0.0 { r1 } else { c / q };
    if r1 > r2 {
        std::mem::swap(&mut r1, &mut r2);
    }

    if r1 > 0.0 && r1 <= max {
        return Some(r1);
    }
    if r2 > 0.0 && r2 <= max {
        return Some(r2);
    }
    None
}

/// Earliest contact of the packet's unit sphere with an ellipsoid-space triangle
pub fn sweep_sphere_triangle(packet: &CollisionPacket, triangle: &Triangle) -> Option<SweepHit> {
    let plane = Plane::from_triangle(triangle.v0, triangle.v1, triangle.v2)?;

    if !plane.is_front_facing_to(&packet.normalized_velocity) {
        return None;
    }

    let base = packet.base_point;
    let velocity = packet.e_velocity;
    let signed_distance = plane.signed_distance(&base);
    let normal_dot_velocity = utils::dot_f64(&plane.normal, &velocity);

    let (t0, embedded) = if normal_dot_velocity.abs() <= EPSILON_F64 {
        // Moving parallel to the plane: inside the slab for the whole step or never
        if signed_distance.abs() > 1.0 {
            return None;
        }
        (0.0, true)
    } else {
        let mut t0 = (-1.0 - signed_distance) / normal_dot_velocity;
        let mut t1 = (1.0 - signed_distance) / normal_dot_velocity;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > 1.0 || t1 < 0.0 {
            return None;
        }
        (t0.clamp(0.0, 1.0), false)
    };

    let velocity_length = utils::length_squared_f64(&velocity).sqrt();
    let hit = |t: f64, point: Vec3| SweepHit {
        t,
        distance: t * velocity_length,
        point,
        plane,
        triangle: *triangle,
    };

    if !embedded {
        let plane_point = base - plane.normal + utils::scale_f64(&velocity, t0);
        if point_in_triangle(&plane_point, &triangle.v0, &triangle.v1, &triangle.v2) {
            return Some(hit(t0, plane_point));
        }
    }

    let mut best: Option<(f64, Vec3)> = None;
    let mut t = 1.0;
    let velocity_squared = utils::length_squared_f64(&velocity);

    for vertex in [triangle.v0, triangle.v1, triangle.v2] {
        let b = 2.0 * utils::dot_f64(&velocity, &(base - vertex));
        let c = utils::length_squared_f64(&(vertex - base)) - 1.0;
        if let Some(root) = lowest_root(velocity_squared, b, c, t) {
            t = root;
            best = Some((root, vertex));
        }
    }

    for (start, end) in [
        (triangle.v0, triangle.v1),
        (triangle.v1, triangle.v2),
        (triangle.v2, triangle.v0),
    ] {
        let edge = end - start;
        let base_to_vertex = start - base;
        let edge_squared = utils::length_squared_f64(&edge);
        if edge_squared == 0.0 {
            continue;
        }
        let edge_dot_velocity = utils::dot_f64(&edge, &velocity);
        let edge_dot_base_to_vertex = utils::dot_f64(&edge, &base_to_vertex);

        let a = edge_squared * -velocity_squared + edge_dot_velocity * edge_dot_velocity;
        let b = edge_squared * (2.0 * utils::dot_f64(&velocity, &base_to_vertex))
            - 2.0 * edge_dot_velocity * edge_dot_base_to_vertex;
        let c = edge_squared * (1.0 - utils::length_squared_f64(&base_to_vertex))
            + edge_dot_base_to_vertex * edge_dot_base_to_vertex;

        if let Some(root) = lowest_root(a, b, c, t) {
            // Only contacts between the edge's endpoints count
            let f = (edge_dot_velocity * root - edge_dot_base_to_vertex) / edge_squared;
            if (0.0..=1.0).contains(&f) {
                t = root;
                best = Some((root, start + utils::scale_f64(&edge, f)));
            }
        }
    }

    best.map(|(t, point)| hit(t, point))
}
