//! Collision detection against static triangle geometry
//!
//! # Module Organization
//!
//! - [`primitives`] - Rays and triangles with discrete intersection tests
//! - [`plane`] - Planes, signed distance, facing and point-in-triangle
//! - [`sweep`] - Swept ellipsoid vs triangle and the shared collision packet
//! - [`mesh`] - Static level geometry indexed by an octree
//!
//! # Key Types
//!
//! - [`CollisionPacket`] - Running nearest-hit record for one movement query
//! - [`LevelGeometry`] - Broad-phase + narrow-phase over a triangle soup
//! - [`Ray`], [`Triangle`], [`Plane`] - Primitive geometric types

pub mod primitives;
pub mod plane;
pub mod sweep;
pub mod mesh;

pub use primitives::{Ray, RayHit, Triangle};
pub use plane::{point_in_triangle, Plane};
pub use sweep::{lowest_root, sweep_sphere_triangle, CollisionPacket, SweepHit};
pub use mesh::{LevelGeometry, SlideConfig};
