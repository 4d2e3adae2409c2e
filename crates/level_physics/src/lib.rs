//! # Level Physics
//!
//! Collision and body simulation against static level geometry.
//!
//! ## Features
//!
//! - **Loose Octree**: One-shot broad-phase index over level triangles, generic
//!   over a small set of numeric payload kinds
//! - **Swept Collision**: Continuous ellipsoid vs triangle tests with a shared
//!   nearest-hit packet, plus collide-and-slide response
//! - **Bodies**: Joints joined by distance constraints, stepped with
//!   semi-implicit Euler against a pluggable environment
//! - **Configuration**: TOML/RON loading for every tunable
//!
//! ## Quick Start
//!
//! ```rust
//! use level_physics::prelude::*;
//!
//! fn main() -> Result<(), PhysicsError> {
//!     let vertices = [
//!         Vec3::new(-10.0, 0.0, -10.0),
//!         Vec3::new(10.0, 0.0, -10.0),
//!         Vec3::new(10.0, 0.0, 10.0),
//!         Vec3::new(-10.0, 0.0, 10.0),
//!     ];
//!     let indices = [0, 2, 1, 0, 3, 2];
//!     let config = PhysicsConfig::default();
//!     let level = LevelGeometry::from_mesh(&vertices, &indices, config.octree.clone(), config.slide.clone())?;
//!
//!     let packet = level.sweep(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.0, -4.0, 0.0), Vec3::repeat(1.0))?;
//!     assert!(packet.found_collision);
//!
//!     let ball = Body::sphere(Vec3::new(0.0, 2.0, 0.0), 0.5, 1.0)?;
//!     let mut world = World::new(vec![ball], Box::new(level), config.world);
//!     world.step(1.0 / 60.0)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod physics;
pub mod spatial;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PhysicsConfig},
        foundation::{
            bounds::AABB,
            collections::LinkedList,
            math::{Mat4, Vec3},
        },
        physics::{
            Body, BodyFlags, CollisionApproval, CollisionPacket, Environment, Joint,
            LevelGeometry, PhysicsError, Ray, SlideConfig, SweepContact, Triangle, World, WorldConfig,
        },
        spatial::{Octree, OctreeConfig, OctreeError, OctreePayload, PayloadKind, QueryDescent},
    };
}
