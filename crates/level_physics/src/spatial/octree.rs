//! Octree spatial partitioning structure
//!
//! A loose octree built once over static content. Each object is stored at
//! the shallowest node whose region fully contains its bounds, so objects
//! straddling an octant boundary stay with the parent instead of being
//! duplicated into several children.
//!
//! Construction is a two-phase affair. While a node is being built its
//! objects sit in a transient linked-list bucket; once the node's children
//! are done the bucket is flattened into a contiguous array of the tree's
//! payload type, which is all a query ever scans.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::bounds::AABB;
use crate::foundation::collections::LinkedList;
use crate::spatial::payload::{OctreePayload, PayloadKind};

/// How a bounding-box query walks below a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryDescent {
    /// Visit every child; each node still gates its own data on overlap
    #[default]
    Exhaustive,
    /// Skip children whose region misses the query box
    Pruned,
}

/// Configuration for octree behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Minimum node size: a non-root node whose every axis extent is at or
    /// below this is finalized without subdividing
    pub min_node_size: f32,

    /// Descent policy used by [`Octree::query`]
    pub descent: QueryDescent,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            min_node_size: 5.0,
            descent: QueryDescent::Exhaustive,
        }
    }
}

/// Octree construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OctreeError {
    /// Region has inverted or NaN bounds
    #[error("Invalid region: min {min:?} max {max:?}")]
    InvalidRegion {
        /// Minimum corner as given
        min: [f32; 3],
        /// Maximum corner as given
        max: [f32; 3],
    },

    /// Minimum node size must be positive and finite
    #[error("Invalid minimum node size: {0}")]
    InvalidMinNodeSize(f32),

    /// Build requested before a region was assigned
    #[error("Octree has not been initialized with a region")]
    NotInitialized,

    /// Initialize requested on a tree that already holds built nodes
    #[error("Octree is already built; reset it before initializing again")]
    AlreadyBuilt,

    /// The flat payload array could not be allocated
    #[error("Allocation failed for {requested} {kind} payload elements")]
    Allocation {
        /// Number of elements requested
        requested: usize,
        /// Payload kind of the tree
        kind: PayloadKind,
    },
}

/// One object waiting to be placed, paired with its bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketedObject<T> {
    /// Value copied into the flat array at finalization
    pub payload: T,
    /// Bounds used for octant containment
    pub bounds: AABB,
}

#[derive(Debug, Clone)]
enum NodeState<T> {
    Unbuilt(LinkedList<BucketedObject<T>>),
    Built(Box<[T]>),
}

/// Single node in the octree hierarchy
#[derive(Debug, Clone)]
pub struct OctreeNode<T: OctreePayload> {
    region: AABB,
    depth: u32,
    state: NodeState<T>,
    children: [Option<Box<OctreeNode<T>>>; 8],
}

impl<T: OctreePayload> OctreeNode<T> {
    /// Create an unbuilt node with no pending objects
    pub fn new(region: AABB, depth: u32) -> Self {
        Self::with_objects(region, depth, LinkedList::new())
    }

    fn with_objects(region: AABB, depth: u32, objects: LinkedList<BucketedObject<T>>) -> Self {
        Self {
            region,
            depth,
            state: NodeState::Unbuilt(objects),
            children: std::array::from_fn(|_| None),
        }
    }

    /// Assign a region and a pending object list, discarding any previous contents
    pub fn initialize(&mut self, region: AABB, objects: LinkedList<BucketedObject<T>>) {
        self.region = region;
        self.state = NodeState::Unbuilt(objects);
        self.children = std::array::from_fn(|_| None);
    }

    /// World-space region covered by this node
    pub fn region(&self) -> &AABB {
        &self.region
    }

    /// Depth in the tree (0 = root)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// True once the pending bucket has been flattened
    pub fn is_built(&self) -> bool {
        matches!(self.state, NodeState::Built(_))
    }

    /// The flat payload array, `None` while the node is unbuilt
    pub fn data(&self) -> Option<&[T]> {
        match &self.state {
            NodeState::Built(data) => Some(&data[..]),
            NodeState::Unbuilt(_) => None,
        }
    }

    /// Number of objects still waiting in the pending bucket
    pub fn pending_len(&self) -> usize {
        match &self.state {
            NodeState::Unbuilt(pending) => pending.len(),
            NodeState::Built(_) => 0,
        }
    }

    /// Child in octant `index` (see [`AABB::octant`] for the layout)
    pub fn child(&self, index: usize) -> Option<&OctreeNode<T>> {
        self.children.get(index)?.as_deref()
    }

    /// Iterate over the allocated children
    pub fn children(&self) -> impl Iterator<Item = &OctreeNode<T>> {
        self.children.iter().flatten().map(|child| &**child)
    }

    /// Number of allocated children
    pub fn child_count(&self) -> usize {
        self.children.iter().flatten().count()
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.child_count() == 0
    }

    /// Build this node and, recursively, its children
    pub fn build(&mut self, config: &OctreeConfig) -> Result<(), OctreeError> {
        let pending_len = match &self.state {
            NodeState::Unbuilt(pending) => pending.len(),
            NodeState::Built(_) => return Ok(()),
        };

        if pending_len == 0 {
            return Ok(());
        }

        // A lone object never justifies another level
        if pending_len == 1 {
            return self.finalize();
        }

        let size = self.region.size();
        let at_min_size = size.x <= config.min_node_size
            && size.y <= config.min_node_size
            && size.z <= config.min_node_size;
        if self.depth > 0 && at_min_size {
            return self.finalize();
        }

        let octants = self.region.octants();
        let NodeState::Unbuilt(pending) = &mut self.state else {
            return Ok(());
        };

        // Objects that fit an octant entirely move down; straddlers stay put
        let buckets: [LinkedList<BucketedObject<T>>; 8] = std::array::from_fn(|index| {
            let octant = &octants[index];
            pending.extract_if(|object| octant.contains_aabb(&object.bounds))
        });

        for (index, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            let mut child = Box::new(OctreeNode::with_objects(octants[index], self.depth + 1, bucket));
            child.build(config)?;
            self.children[index] = Some(child);
        }

        self.finalize()
    }

    /// Flatten the pending bucket into the node's payload array
    pub fn finalize(&mut self) -> Result<(), OctreeError> {
        let NodeState::Unbuilt(pending) = &mut self.state else {
            return Ok(());
        };

        let mut data = Vec::new();
        if data.try_reserve_exact(pending.len()).is_err() {
            log::error!(
                "Octree node at depth {} failed to allocate {} {} elements",
                self.depth,
                pending.len(),
                T::KIND
            );
            return Err(OctreeError::Allocation {
                requested: pending.len(),
                kind: T::KIND,
            });
        }

        data.extend(std::mem::take(pending).into_iter().map(|object| object.payload));
        self.state = NodeState::Built(data.into_boxed_slice());
        Ok(())
    }

    fn collect<'a>(&'a self, query: &AABB, descent: QueryDescent, results: &mut Vec<&'a [T]>) {
        if let NodeState::Built(data) = &self.state {
            if !data.is_empty() && self.region.intersects(query) {
                results.push(&data[..]);
            }
        }

        for child in self.children() {
            if descent == QueryDescent::Pruned && !child.region.intersects(query) {
                continue;
            }
            child.collect(query, descent, results);
        }
    }

    /// Destroy children depth-first, then this node; returns nodes released
    fn destroy(self: Box<Self>) -> usize {
        let node = *self;
        let mut released = 0;
        for child in node.children.into_iter().flatten() {
            released += child.destroy();
        }
        released + 1
    }

    fn accumulate_stats(&self, stats: &mut OctreeStats) {
        stats.node_count += 1;
        stats.max_depth = stats.max_depth.max(self.depth);
        if let NodeState::Built(data) = &self.state {
            stats.built_count += 1;
            stats.payload_count += data.len();
        }
        for child in self.children() {
            child.accumulate_stats(stats);
        }
    }
}

/// Shape summary of a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OctreeStats {
    /// Total allocated nodes, root included
    pub node_count: usize,
    /// Nodes holding a flat array
    pub built_count: usize,
    /// Deepest node depth
    pub max_depth: u32,
    /// Elements across all flat arrays
    pub payload_count: usize,
}

/// Octree spatial partitioning structure
///
/// The payload kind is fixed by `T` for the lifetime of the tree, including
/// across [`Octree::reset`].
#[derive(Debug, Clone)]
pub struct Octree<T: OctreePayload> {
    root: Box<OctreeNode<T>>,
    config: OctreeConfig,
    initialized: bool,
}

impl<T: OctreePayload> Octree<T> {
    /// Create an empty tree
    pub fn new(config: OctreeConfig) -> Self {
        Self {
            root: Box::new(OctreeNode::new(AABB::default(), 0)),
            config,
            initialized: false,
        }
    }

    /// Create, initialize and build a tree in one go
    pub fn from_objects<I>(config: OctreeConfig, region: AABB, objects: I) -> Result<Self, OctreeError>
    where
        I: IntoIterator<Item = (T, AABB)>,
    {
        let mut octree = Self::new(config);
        octree.initialize(region, objects)?;
        octree.build()?;
        Ok(octree)
    }

    /// Payload kind chosen for this tree
    pub fn payload_kind(&self) -> PayloadKind {
        T::KIND
    }

    /// Tree configuration
    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    /// Root node
    pub fn root(&self) -> &OctreeNode<T> {
        &self.root
    }

    /// True once the root has been flattened
    pub fn is_built(&self) -> bool {
        self.root.is_built()
    }

    /// Assign the root region and the objects to place
    ///
    /// Returns the number of objects queued.
    pub fn initialize<I>(&mut self, region: AABB, objects: I) -> Result<usize, OctreeError>
    where
        I: IntoIterator<Item = (T, AABB)>,
    {
        if self.root.is_built() || !self.root.is_leaf() {
            log::warn!("Refusing to initialize an octree that is already built");
            return Err(OctreeError::AlreadyBuilt);
        }
        if !region.is_valid() {
            log::error!("Octree region is invalid: {:?}", region);
            return Err(OctreeError::InvalidRegion {
                min: region.min.into(),
                max: region.max.into(),
            });
        }

        let objects: LinkedList<BucketedObject<T>> = objects
            .into_iter()
            .map(|(payload, bounds)| BucketedObject { payload, bounds })
            .collect();

        let outside = objects.iter().filter(|object| !region.contains_aabb(&object.bounds)).count();
        if outside > 0 {
            log::warn!("{} octree objects extend beyond the root region and stay at the root", outside);
        }

        let queued = objects.len();
        self.root.initialize(region, objects);
        self.initialized = true;
        log::debug!("Octree<{}> initialized with {} objects", T::KIND, queued);
        Ok(queued)
    }

    /// Subdivide and finalize the whole tree
    pub fn build(&mut self) -> Result<(), OctreeError> {
        if !self.initialized {
            log::error!("Octree build requested before initialize");
            return Err(OctreeError::NotInitialized);
        }
        if !self.config.min_node_size.is_finite() || self.config.min_node_size <= 0.0 {
            log::error!("Octree minimum node size is invalid: {}", self.config.min_node_size);
            return Err(OctreeError::InvalidMinNodeSize(self.config.min_node_size));
        }

        self.root.build(&self.config)?;

        let stats = self.stats();
        log::info!(
            "Octree<{}> built: {} nodes, depth {}, {} payload elements",
            T::KIND,
            stats.node_count,
            stats.max_depth,
            stats.payload_count
        );
        Ok(())
    }

    /// Destroy every node and install a fresh empty root in place
    ///
    /// Returns the number of nodes released. The tree keeps its payload kind
    /// and configuration, and must be initialized again before building.
    pub fn reset(&mut self) -> usize {
        let old_root = std::mem::replace(&mut self.root, Box::new(OctreeNode::new(AABB::default(), 0)));
        let released = old_root.destroy();
        self.initialized = false;
        log::debug!("Octree<{}> reset, released {} nodes", T::KIND, released);
        released
    }

    /// Reset the tree and switch to `config` for the next build
    pub fn reconfigure(&mut self, config: OctreeConfig) -> usize {
        let released = self.reset();
        self.config = config;
        released
    }

    /// Flat arrays of every built node overlapping `region`
    pub fn query(&self, region: &AABB) -> Vec<&[T]> {
        self.query_with(region, self.config.descent)
    }

    /// Like [`Octree::query`] with an explicit descent policy
    pub fn query_with(&self, region: &AABB, descent: QueryDescent) -> Vec<&[T]> {
        let mut results = Vec::new();
        self.root.collect(region, descent, &mut results);
        results
    }

    /// Total payload elements a query for `region` would return
    pub fn count_candidates(&self, region: &AABB) -> usize {
        self.query(region).iter().map(|data| data.len()).sum()
    }

    /// Iterate over every candidate payload for `region`
    pub fn candidates<'a>(&'a self, region: &AABB) -> impl Iterator<Item = T> + 'a {
        self.query(region).into_iter().flat_map(|data| data.iter().copied())
    }

    /// Shape summary of the tree
    pub fn stats(&self) -> OctreeStats {
        let mut stats = OctreeStats::default();
        self.root.accumulate_stats(&mut stats);
        stats
    }
}

impl<T: OctreePayload> Default for Octree<T> {
    fn default() -> Self {
        Self::new(OctreeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn cube(min: f32, max: f32) -> AABB {
        AABB::new(Vec3::repeat(min), Vec3::repeat(max))
    }

    fn small_box(center: Vec3) -> AABB {
        AABB::from_center_extents(center, Vec3::repeat(0.5))
    }

    #[test]
    fn test_build_without_initialize_fails() {
        let mut octree: Octree<u32> = Octree::default();
        assert_eq!(octree.build(), Err(OctreeError::NotInitialized));
    }

    #[test]
    fn test_initialize_rejects_inverted_region() {
        let mut octree: Octree<u32> = Octree::default();
        let inverted = AABB { min: Vec3::repeat(1.0), max: Vec3::zeros() };
        let result = octree.initialize(inverted, Vec::new());
        assert!(matches!(result, Err(OctreeError::InvalidRegion { .. })));
    }

    #[test]
    fn test_invalid_min_node_size_is_rejected() {
        let config = OctreeConfig { min_node_size: 0.0, ..OctreeConfig::default() };
        let result = Octree::<u8>::from_objects(config, cube(-10.0, 10.0), [(1, small_box(Vec3::zeros()))]);
        assert_eq!(result.unwrap_err(), OctreeError::InvalidMinNodeSize(0.0));
    }

    #[test]
    fn test_empty_build_leaves_root_unbuilt() {
        let mut octree: Octree<u32> = Octree::default();
        octree.initialize(cube(-10.0, 10.0), Vec::new()).unwrap();
        octree.build().unwrap();
        assert!(!octree.is_built());
        assert_eq!(octree.count_candidates(&cube(-10.0, 10.0)), 0);
    }

    #[test]
    fn test_single_object_finalizes_root_without_children() {
        let octree = Octree::<u32>::from_objects(
            OctreeConfig::default(),
            cube(-100.0, 100.0),
            [(7, small_box(Vec3::new(50.0, 50.0, 50.0)))],
        )
        .unwrap();

        assert!(octree.root().is_built());
        assert_eq!(octree.root().child_count(), 0);
        assert_eq!(octree.root().data(), Some(&[7u32][..]));
    }

    #[test]
    fn test_one_object_per_octant_fills_children() {
        let region = cube(-100.0, 100.0);
        let objects: Vec<(i32, AABB)> = region
            .octants()
            .iter()
            .enumerate()
            .take(6)
            .map(|(index, octant)| (index as i32, small_box(octant.center())))
            .collect();

        let octree = Octree::from_objects(OctreeConfig::default(), region, objects).unwrap();
        let root = octree.root();

        assert_eq!(root.child_count(), 6);
        assert!(root.children().all(OctreeNode::is_built));
        assert_eq!(root.data(), Some(&[][..]));
        for index in 0..6 {
            assert_eq!(root.child(index).unwrap().data(), Some(&[index as i32][..]));
        }
        assert!(root.child(6).is_none());
        assert!(root.child(7).is_none());
    }

    #[test]
    fn test_straddling_object_stays_at_parent() {
        let region = cube(-100.0, 100.0);
        let objects = [
            (1.5f32, small_box(Vec3::zeros())),
            (2.5f32, small_box(Vec3::new(50.0, 50.0, 50.0))),
            (3.5f32, small_box(Vec3::new(-50.0, -50.0, -50.0))),
        ];
        let octree = Octree::from_objects(OctreeConfig::default(), region, objects).unwrap();

        assert_eq!(octree.root().data(), Some(&[1.5f32][..]));
        assert_eq!(octree.root().child_count(), 2);
        assert_eq!(octree.payload_kind(), PayloadKind::F32);
    }

    #[test]
    fn test_min_node_size_caps_depth() {
        let region = cube(0.0, 64.0);
        let objects: Vec<(u8, AABB)> = (0..4u8)
            .map(|i| (i, AABB::from_center_extents(Vec3::repeat(1.0), Vec3::repeat(0.1))))
            .collect();
        let config = OctreeConfig { min_node_size: 8.0, ..OctreeConfig::default() };
        let octree = Octree::from_objects(config, region, objects).unwrap();

        let stats = octree.stats();
        // 64 -> 32 -> 16 -> 8, where the 8-unit node stops subdividing
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.payload_count, 4);
    }

    #[test]
    fn test_query_gates_on_region_overlap() {
        let region = cube(-100.0, 100.0);
        let objects = [
            (1u32, small_box(Vec3::new(-75.0, -75.0, -75.0))),
            (2u32, small_box(Vec3::new(75.0, 75.0, 75.0))),
        ];
        let octree = Octree::from_objects(OctreeConfig::default(), region, objects).unwrap();

        let near_first = cube(-80.0, -70.0);
        let hits: Vec<u32> = octree.candidates(&near_first).collect();
        assert_eq!(hits, vec![1]);
        assert_eq!(octree.count_candidates(&region), 2);
    }

    #[test]
    fn test_reset_installs_fresh_root() {
        let region = cube(-100.0, 100.0);
        let objects: Vec<(u32, AABB)> = region
            .octants()
            .iter()
            .enumerate()
            .map(|(index, octant)| (index as u32, small_box(octant.center())))
            .collect();
        let mut octree = Octree::from_objects(OctreeConfig::default(), region, objects.clone()).unwrap();
        let before = octree.count_candidates(&region);

        assert_eq!(octree.reset(), 9);
        assert!(!octree.is_built());
        assert_eq!(octree.root().child_count(), 0);
        assert_eq!(octree.build(), Err(OctreeError::NotInitialized));

        octree.initialize(region, objects).unwrap();
        octree.build().unwrap();
        assert_eq!(octree.count_candidates(&region), before);
    }

    #[test]
    fn test_reconfigure_applies_to_next_build() {
        let region = cube(0.0, 64.0);
        let objects: Vec<(u8, AABB)> = (0..4u8)
            .map(|i| (i, AABB::from_center_extents(Vec3::repeat(1.0), Vec3::repeat(0.1))))
            .collect();
        let mut octree = Octree::from_objects(OctreeConfig::default(), region, objects.clone()).unwrap();
        let nodes = octree.stats().node_count;

        let config = OctreeConfig { min_node_size: 8.0, descent: QueryDescent::Pruned };
        assert_eq!(octree.reconfigure(config.clone()), nodes);
        assert_eq!(octree.config(), &config);
        assert!(!octree.is_built());

        octree.initialize(region, objects).unwrap();
        octree.build().unwrap();
        assert_eq!(octree.stats().max_depth, 3);
        assert_eq!(octree.count_candidates(&region), 4);
    }

    #[test]
    fn test_initialize_after_build_requires_reset() {
        let mut octree = Octree::<u32>::from_objects(
            OctreeConfig::default(),
            cube(-10.0, 10.0),
            [(0, small_box(Vec3::zeros()))],
        )
        .unwrap();
        assert_eq!(octree.initialize(cube(-10.0, 10.0), Vec::new()), Err(OctreeError::AlreadyBuilt));
    }
}
