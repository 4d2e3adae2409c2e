//! Spatial partitioning data structures
//!
//! Provides the broad-phase index used to narrow static level geometry
//! down to the triangles near a moving body.

mod octree;
mod payload;

pub use octree::{
    BucketedObject, Octree, OctreeConfig, OctreeError, OctreeNode, OctreeStats, QueryDescent,
};
pub use payload::{OctreePayload, PayloadKind};
