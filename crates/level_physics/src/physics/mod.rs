//! Physics module for level collision and soft-body stepping
//!
//! Collision runs against static level triangles: the octree narrows the
//! candidate set and the swept ellipsoid tests find the first contact.
//! Bodies are joints held together by distance constraints and are advanced
//! by [`World::step`].

pub mod body;
pub mod collision;
pub mod world;

use crate::config::ConfigError;
use crate::spatial::OctreeError;

pub use body::{Body, BodyFlags, Connection, Joint, JOINT_SIZE_STEP};
pub use collision::{
    CollisionPacket,
    LevelGeometry,
    Plane,
    Ray,
    RayHit,
    SlideConfig,
    SweepHit,
    Triangle,
};
pub use world::{CollisionApproval, Environment, StepReport, SweepContact, World, WorldConfig};

/// Errors raised by bodies, the world and level geometry
#[derive(thiserror::Error, Debug)]
pub enum PhysicsError {
    /// A body needs at least one joint
    #[error("Body has no joints")]
    EmptyBody,

    /// Connection refers to a missing joint or joins a joint to itself
    #[error("Invalid connection {a} -> {b} for a body with {joint_count} joints")]
    InvalidConnection {
        /// First joint index
        a: usize,
        /// Second joint index
        b: usize,
        /// Joints in the body
        joint_count: usize,
    },

    /// Body mass must be finite and positive
    #[error("Invalid body mass: {0}")]
    InvalidMass(f32),

    /// No body at this index
    #[error("Body {0} not found")]
    BodyNotFound(usize),

    /// Time step must be finite and positive
    #[error("Invalid time step: {0}")]
    InvalidTimeStep(f32),

    /// Ellipsoid radii must be finite and positive
    #[error("Invalid ellipsoid radius: {0:?}")]
    InvalidRadius([f32; 3]),

    /// Malformed level mesh
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Broad-phase failure
    #[error("Spatial index error: {0}")]
    Spatial(#[from] OctreeError),

    /// Configuration failure
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
