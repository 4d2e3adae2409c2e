//! Static level collision geometry
//!
//! Owns the world-space triangles of a level together with an octree of
//! triangle indices. Every query runs the broad phase first (box query
//! against the tree) and only hands the surviving triangles to the exact
//! narrow-phase tests.

use serde::{Deserialize, Serialize};

use crate::foundation::bounds::AABB;
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::physics::world::{Environment, SweepContact};
use crate::physics::PhysicsError;
use crate::spatial::{Octree, OctreeConfig};
use super::plane::Plane;
use super::primitives::{Ray, RayHit, Triangle};
use super::sweep::CollisionPacket;

/// Collide-and-slide tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    /// Upper bound on slide iterations per move
    pub max_slide_iterations: u32,
    /// Ellipsoid-space gap kept between the collider and a surface
    pub slide_epsilon: f32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            max_slide_iterations: 5,
            slide_epsilon: 0.005,
        }
    }
}

/// Triangle soup plus its broad-phase index
#[derive(Debug, Clone)]
pub struct LevelGeometry {
    triangles: Vec<Triangle>,
    tree: Octree<u32>,
    bounds: AABB,
    slide: SlideConfig,
}

impl LevelGeometry {
    /// Build from world-space triangles
    pub fn from_triangles(
        triangles: Vec<Triangle>,
        octree: OctreeConfig,
        slide: SlideConfig,
    ) -> Result<Self, PhysicsError> {
        if u32::try_from(triangles.len()).is_err() {
            return Err(PhysicsError::InvalidMesh(format!(
                "{} triangles exceed the u32 index range",
                triangles.len()
            )));
        }

        let bounds = AABB::from_points(triangles.iter().flat_map(|tri| [tri.v0, tri.v1, tri.v2]))
            .unwrap_or_default();

        let mut level = Self {
            triangles,
            tree: Octree::new(octree),
            bounds,
            slide,
        };
        level.populate_tree()?;
        Ok(level)
    }

    /// Build from an indexed vertex buffer, three indices per triangle
    pub fn from_mesh(
        vertices: &[Vec3],
        indices: &[u32],
        octree: OctreeConfig,
        slide: SlideConfig,
    ) -> Result<Self, PhysicsError> {
        Self::from_transformed_mesh(vertices, indices, &Mat4::identity(), octree, slide)
    }

    /// Build from a model-space indexed vertex buffer placed by `transform`
    pub fn from_transformed_mesh(
        vertices: &[Vec3],
        indices: &[u32],
        transform: &Mat4,
        octree: OctreeConfig,
        slide: SlideConfig,
    ) -> Result<Self, PhysicsError> {
        if indices.len() % 3 != 0 {
            log::error!("Index buffer length {} is not a multiple of 3", indices.len());
            return Err(PhysicsError::InvalidMesh(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }

        let vertex = |index: u32| {
            vertices.get(index as usize).copied().ok_or_else(|| {
                log::error!("Index {} is out of range for {} vertices", index, vertices.len());
                PhysicsError::InvalidMesh(format!(
                    "index {index} out of range for {} vertices",
                    vertices.len()
                ))
            })
        };

        let triangles = indices
            .chunks_exact(3)
            .map(|chunk| {
                Ok(Triangle::new(vertex(chunk[0])?, vertex(chunk[1])?, vertex(chunk[2])?).transformed(transform))
            })
            .collect::<Result<Vec<_>, PhysicsError>>()?;

        Self::from_triangles(triangles, octree, slide)
    }

    fn populate_tree(&mut self) -> Result<(), PhysicsError> {
        let objects = self
            .triangles
            .iter()
            .enumerate()
            .map(|(index, tri)| (index as u32, tri.bounds()));
        self.tree.initialize(self.bounds, objects)?;
        self.tree.build()?;
        log::info!(
            "Level geometry ready: {} triangles in {} octree nodes",
            self.triangles.len(),
            self.tree.stats().node_count
        );
        Ok(())
    }

    /// Reset the octree and rebuild it over the same triangles with `octree`
    pub fn rebuild(&mut self, octree: OctreeConfig) -> Result<(), PhysicsError> {
        let released = self.tree.reconfigure(octree);
        log::debug!("Rebuilding level octree, released {} nodes", released);
        self.populate_tree()
    }

    /// All triangles, indexed by the values stored in the tree
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangle by index
    pub fn triangle(&self, index: u32) -> Option<&Triangle> {
        self.triangles.get(index as usize)
    }

    /// Bounds of every vertex
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// The broad-phase index
    pub fn octree(&self) -> &Octree<u32> {
        &self.tree
    }

    /// Slide tuning in use
    pub fn slide_config(&self) -> &SlideConfig {
        &self.slide
    }

    /// Broad-phase candidates near `region`
    pub fn candidates<'a>(&'a self, region: &AABB) -> impl Iterator<Item = (u32, &'a Triangle)> + 'a {
        self.tree
            .candidates(region)
            .filter_map(move |index| self.triangle(index).map(|tri| (index, tri)))
    }

    /// Test every candidate along the packet's path, keeping the nearest hit
    pub fn sweep_packet(&self, packet: &mut CollisionPacket) -> bool {
        let start = AABB::from_center_extents(packet.position, packet.ellipsoid_radius);
        let swept = start.union(&start.translated(packet.velocity));
        packet.check_triangles(self.candidates(&swept).map(|(_, tri)| tri))
    }

    /// Swept collision of an ellipsoid moving by `velocity` this step
    pub fn sweep(&self, position: Vec3, velocity: Vec3, radius: Vec3) -> Result<CollisionPacket, PhysicsError> {
        let mut packet = CollisionPacket::new(position, velocity, radius)?;
        self.sweep_packet(&mut packet);
        Ok(packet)
    }

    /// Move an ellipsoid by `velocity`, sliding along whatever it hits
    ///
    /// Returns the world-space resting position.
    pub fn slide(&self, position: Vec3, velocity: Vec3, radius: Vec3) -> Result<Vec3, PhysicsError> {
        // Validates the radius before the loop divides by it
        CollisionPacket::new(position, velocity, radius)?;

        let epsilon = f64::from(self.slide.slide_epsilon);
        let mut e_position = position.component_div(&radius);
        let mut e_velocity = velocity.component_div(&radius);

        for _ in 0..self.slide.max_slide_iterations {
            if utils::length_squared_f64(&e_velocity).sqrt() < epsilon {
                break;
            }

            let mut packet = CollisionPacket::new(
                e_position.component_mul(&radius),
                e_velocity.component_mul(&radius),
                radius,
            )?;
            self.sweep_packet(&mut packet);

            let destination = e_position + e_velocity;
            if !packet.found_collision {
                e_position = destination;
                break;
            }

            let mut new_base = e_position;
            let mut intersection = packet.intersection_point;
            if packet.nearest_distance >= epsilon {
                let direction = utils::normalize_or_zero(&e_velocity);
                new_base += utils::scale_f64(&direction, packet.nearest_distance - epsilon);
                intersection -= utils::scale_f64(&direction, epsilon);
            }

            let Some(slide_normal) = (new_base - intersection).try_normalize(f32::EPSILON) else {
                e_position = new_base;
                break;
            };
            let slide_plane = Plane::from_origin_normal(intersection, slide_normal);
            let new_destination = destination - utils::scale_f64(&slide_normal, slide_plane.signed_distance(&destination));

            e_velocity = new_destination - intersection;
            e_position = new_base;
        }

        Ok(e_position.component_mul(&radius))
    }

    /// Nearest triangle hit by `ray` within `max_distance`
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let segment = AABB::new(ray.origin, ray.point_at(max_distance));
        self.candidates(&segment)
            .filter_map(|(index, tri)| {
                let (t, _u, _v) = tri.intersect_ray(ray)?;
                (t <= max_distance).then(|| RayHit {
                    triangle: index,
                    distance: t,
                    point: ray.point_at(t),
                    normal: tri.normal(),
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Closest surface point within `max_distance`, with the triangle it lies on
    pub fn closest_surface_point(&self, point: Vec3, max_distance: f32) -> Option<(u32, Vec3)> {
        let region = AABB::from_center_extents(point, Vec3::repeat(max_distance));
        let max_squared = max_distance * max_distance;
        self.candidates(&region)
            .map(|(index, tri)| {
                let closest = tri.closest_point(point);
                (index, closest, (closest - point).norm_squared())
            })
            .filter(|(_, _, distance_squared)| *distance_squared <= max_squared)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(index, closest, _)| (index, closest))
    }

    /// Earliest front face crossed by the segment from `start` to `start + displacement`
    fn first_front_face_crossing(&self, start: Vec3, displacement: Vec3) -> Option<SweepContact> {
        let length = displacement.norm();
        if length <= f32::EPSILON {
            return None;
        }
        let ray = Ray::new(start, displacement);
        let segment = AABB::new(start, start + displacement);
        self.candidates(&segment)
            .filter(|(_, tri)| utils::dot_f64(&tri.normal(), &ray.direction) < 0.0)
            .filter_map(|(_, tri)| {
                let (distance, _u, _v) = tri.intersect_ray(&ray)?;
                (distance <= length).then(|| SweepContact {
                    t: distance / length,
                    point: ray.point_at(distance),
                    normal: tri.normal(),
                })
            })
            .min_by(|a, b| a.t.total_cmp(&b.t))
    }
}

impl Environment for LevelGeometry {
    /// A point behind the face of its nearest triangle is inside solid volume
    fn closest_point(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        let (index, closest) = self.closest_surface_point(point, max_distance)?;
        let inside = self
            .triangle(index)
            .and_then(Triangle::plane)
            .is_some_and(|plane| plane.signed_distance(&point) < 0.0);
        Some(if inside { point } else { closest })
    }

    /// Swept sphere against front faces; a zero radius sweeps a segment
    #[allow(clippy::cast_possible_truncation)]
    fn first_contact(&self, start: Vec3, displacement: Vec3, radius: f32) -> Option<SweepContact> {
        if radius <= f32::EPSILON {
            return self.first_front_face_crossing(start, displacement);
        }

        let packet = match self.sweep(start, displacement, Vec3::repeat(radius)) {
            Ok(packet) => packet,
            Err(err) => {
                log::warn!("Swept contact query failed: {}", err);
                return None;
            }
        };
        let point = packet.world_intersection_point()?;
        let t = packet.t as f32;
        let center = start + displacement * t;
        let normal = (center - point)
            .try_normalize(f32::EPSILON)
            .or_else(|| packet.plane.map(|plane| plane.normal))?;
        Some(SweepContact { t, point, normal })
    }
}
