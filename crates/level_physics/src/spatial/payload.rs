//! Numeric payload kinds an octree can store
//!
//! A tree picks exactly one kind when it is created; every node of that tree
//! flattens its objects into an array of that one type.

use std::fmt;

use serde::{Deserialize, Serialize};

mod sealed {
    pub trait Sealed {}
}

/// Runtime name of an octree's payload type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// `u32`, typically a triangle or object index
    U32,
    /// `i32`
    I32,
    /// `u8`
    U8,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U8 => "u8",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Element type of an octree's flattened node arrays
///
/// Implemented for exactly `u32`, `i32`, `u8`, `f32` and `f64`.
pub trait OctreePayload: sealed::Sealed + Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The kind this type is reported as
    const KIND: PayloadKind;
}

macro_rules! impl_payload {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}

            impl OctreePayload for $ty {
                const KIND: PayloadKind = PayloadKind::$kind;
            }
        )*
    };
}

impl_payload! {
    u32 => U32,
    i32 => I32,
    u8 => U8,
    f32 => F32,
    f64 => F64,
}
