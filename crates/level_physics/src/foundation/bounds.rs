//! Axis-aligned bounding boxes
//!
//! Used as the node region of the octree, as the per-object bounds of
//! bucketed objects and as the query volume of broad-phase lookups.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box for spatial queries
///
/// All containment and overlap tests treat the bounds as inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from two opposite corners, in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Create an AABB from exact corners, rejecting inverted or NaN bounds
    pub fn try_new(min: Vec3, max: Vec3) -> Option<Self> {
        let aabb = Self { min, max };
        aabb.is_valid().then_some(aabb)
    }

    /// Create an AABB centered at a point with given extents (half-size)
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self::new(center - extents, center + extents)
    }

    /// Smallest box containing every point, `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |aabb, p| Self {
            min: aabb.min.inf(&p),
            max: aabb.max.sup(&p),
        }))
    }

    /// `min <= max` on every axis (false when any coordinate is NaN)
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Full edge length along each axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if `other` lies entirely inside this AABB
    pub fn contains_aabb(&self, other: &AABB) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Smallest AABB enclosing both boxes
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// This box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> AABB {
        AABB {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// This box grown by `margin` on every side
    pub fn expanded(&self, margin: f32) -> AABB {
        let margin = Vec3::repeat(margin);
        AABB::new(self.min - margin, self.max + margin)
    }

    /// One of the 8 equal sub-boxes split around the center
    ///
    /// Octant layout (bit 0 = +X, bit 1 = +Y, bit 2 = +Z):
    /// 0: -X, -Y, -Z
    /// 1: +X, -Y, -Z
    /// 2: -X, +Y, -Z
    /// 3: +X, +Y, -Z
    /// 4: -X, -Y, +Z
    /// 5: +X, -Y, +Z
    /// 6: -X, +Y, +Z
    /// 7: +X, +Y, +Z
    pub fn octant(&self, index: usize) -> AABB {
        let center = self.center();
        let pick = |bit: usize, low: f32, mid: f32, high: f32| {
            if index & bit != 0 { (mid, high) } else { (low, mid) }
        };
        let (min_x, max_x) = pick(1, self.min.x, center.x, self.max.x);
        let (min_y, max_y) = pick(2, self.min.y, center.y, self.max.y);
        let (min_z, max_z) = pick(4, self.min.z, center.z, self.max.z);
        AABB {
            min: Vec3::new(min_x, min_y, min_z),
            max: Vec3::new(max_x, max_y, max_z),
        }
    }

    /// All 8 octants in index order
    pub fn octants(&self) -> [AABB; 8] {
        std::array::from_fn(|index| self.octant(index))
    }
}
