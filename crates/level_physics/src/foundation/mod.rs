//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and operations
//! - Axis-aligned bounding boxes
//! - Collections and data structures
//! - Logging utilities

pub mod math;
pub mod bounds;
pub mod collections;
pub mod logging;
