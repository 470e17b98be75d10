//! Preallocated [`octree`](tree::Octree) for per-frame proximity queries.
//!
//! Partitions a fixed world volume into recursively subdivided cells so that
//! moving, axis aligned objects can find their neighbours without testing every
//! pair.
//!
//! ## Available methods:
//!
//! - [`Registration`](tree::Octree::register)
//! - [`Rebuild`](tree::Octree::update_index)
//! - [`Nearby objects`](tree::Octree::get_nearby)
//! - [`Closure traversal`](tree::Octree::intersect_with)
//! - [`Teardown`](tree::Octree::teardown)
//!
//! To enable bevy integrations:
//!
//! ```toml
//! [dependencies]
//! static_octree = { version = "0.1", features = ["bevy"] }
//! ```
//!
//! ## Optimizations:
//!
//! - Every node for every depth is built once, up front, in a flat
//!   [`NodePool`](pool::NodePool). Node ids are plain indices and a node's
//!   children are found arithmetically ([`depth_index`](pool::depth_index)).
//! - A rebuild only flips activation flags and clears object lists.
//!   Lists keep their capacity, so a steady state frame does not allocate.
//! - Traversal stacks are [`heapless`], split scratch space is a [`smallvec`].
//! - No smart pointers ([`Rc`](`std::rc::Rc`), [`RefCell`](std::cell::RefCell) e.t.c).
//!   Objects are referenced by [`ObjectId`] and their bounds are read through a
//!   [`BoundsProvider`] owned by the caller.
//!
//! ## Example
//!
//! ```rust
//! use static_octree::prelude::*;
//!
//! fn main() -> Result<(), TreeError> {
//!     let config = OctreeConfig::from_faces(-10.0, 10.0, 10.0, -10.0, 10.0, -10.0, 2, 1);
//!     let mut tree = Octree::from_config(config)?;
//!
//!     // The caller owns the objects, the tree only keeps their ids.
//!     let objects = vec![
//!         Aabb::new(TVec3::splat(5.0f32), TVec3::splat(0.5))?,
//!         Aabb::new(TVec3::splat(-5.0), TVec3::splat(0.5))?,
//!     ];
//!     tree.register(ObjectId(0));
//!     tree.register(ObjectId(1));
//!
//!     let report = tree.update_index(&objects);
//!     assert_eq!(report.map(|r| r.inserted), Some(2));
//!
//!     assert_eq!(tree.get_nearby(ObjectId(0), &objects)?, &[ObjectId(0)]);
//!     assert_eq!(tree.get_nearby(ObjectId(1), &objects)?, &[ObjectId(1)]);
//!
//!     tree.teardown();
//!     Ok(())
//! }
//! ```
//!
//! ## Check yourself list:
//!
//! - tests
//!
//!   ```sh
//!   cargo test --all-targets --all-features --release
//!   ```
//!
//! - clippy
//!
//!   ```sh
//!   cargo clippy --all-targets --all-features
//!   ```
//!
//! - benchmark
//!
//!   ```sh
//!   cargo bench
//!   ```

#[cfg(feature = "bevy")]
pub mod bevy_integration;
pub mod bounding;
pub mod config;
pub mod intersect_with;
pub mod manager;
pub mod node;
pub mod outline;
pub mod pool;
pub mod prelude;
pub mod tree;

use bounding::{Aabb, Float};
use std::{
    collections::HashMap,
    error::Error,
    fmt::{self},
    ops::Deref,
    sync::Arc,
};

/// Implement to represent your object as a volume in a [`tree`](tree::Octree).
///
/// The returned bounds must live in the same coordinate space
/// as the tree's world bounds.
pub trait Volume {
    type F: Float;

    fn volume(&self) -> Aabb<Self::F>;
}

impl<T> Volume for Box<T>
where
    T: Volume,
{
    type F = T::F;

    fn volume(&self) -> Aabb<Self::F> {
        self.deref().volume()
    }
}

impl<T> Volume for Arc<T>
where
    T: Volume,
{
    type F = T::F;

    fn volume(&self) -> Aabb<Self::F> {
        self.deref().volume()
    }
}

/// Resolves an [`ObjectId`] to the object's current bounds.
///
/// The tree stores ids only. Bounds are read when the tree is rebuilt
/// and when a query is made for an object.
pub trait BoundsProvider<F: Float> {
    fn bounds(&self, object: ObjectId) -> Option<Aabb<F>>;
}

impl<F: Float, T: Volume<F = F>> BoundsProvider<F> for [T] {
    fn bounds(&self, object: ObjectId) -> Option<Aabb<F>> {
        self.get(usize::from(object)).map(Volume::volume)
    }
}

impl<F: Float, T: Volume<F = F>> BoundsProvider<F> for Vec<T> {
    fn bounds(&self, object: ObjectId) -> Option<Aabb<F>> {
        self.as_slice().bounds(object)
    }
}

impl<F: Float, T: Volume<F = F>> BoundsProvider<F> for HashMap<ObjectId, T> {
    fn bounds(&self, object: ObjectId) -> Option<Aabb<F>> {
        self.get(&object).map(Volume::volume)
    }
}

/// Index [`tree.nodes`](pool::NodePool) with it.
///
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Flat index following this one.
    #[inline]
    pub(crate) fn next(self) -> Self {
        NodeId(self.0 + 1)
    }
}

impl From<NodeId> for usize {
    fn from(value: NodeId) -> Self {
        value.0 as usize
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        NodeId(value as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId {}", self.0)
    }
}

/// Handle of a caller owned object.
///
/// ```rust
/// use static_octree::prelude::*;
///
/// let objects = vec![Aabb::new(TVec3::splat(0.0f32), TVec3::splat(0.25)).unwrap()];
/// assert!(objects.bounds(ObjectId(0)).is_some());
/// assert!(objects.bounds(ObjectId(1)).is_none());
/// ```
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ObjectId(pub u32);

impl From<ObjectId> for usize {
    fn from(value: ObjectId) -> Self {
        value.0 as usize
    }
}

impl From<usize> for ObjectId {
    fn from(value: usize) -> Self {
        ObjectId(value as u32)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId: {}", self.0)
    }
}

/// Enum of all possible errors of the octree's operations.
#[derive(Debug, PartialEq)]
pub enum TreeError {
    /// Invalid world bounds, depth limit or node capacity.
    Configuration(String),

    /// Operation on an [`OctreeManager`](manager::OctreeManager) that holds no tree.
    UninitializedUse(String),

    /// [`OctreeManager`](manager::OctreeManager) already holds a tree.
    AlreadyInitialized(String),

    /// Query issued after registration or [`mark_dirty`](tree::Octree::mark_dirty)
    /// but before the next rebuild.
    StaleQuery(String),

    /// Object is out of bounds of tree's root [`Aabb`].
    OutOfTreeBounds(String),

    /// [`BoundsProvider`] has no bounds for an [`ObjectId`].
    ObjectNotFound(String),

    /// [`Aabb`] extents are negative or not finite.
    NotPositive(String),
}

impl Error for TreeError {}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Configuration(info) => write!(f, "Invalid tree configuration. {info}"),
            TreeError::UninitializedUse(info) => write!(f, "Tree is not initialized. {info}"),
            TreeError::AlreadyInitialized(info) => {
                write!(f, "Tree is already initialized. {info}")
            }
            TreeError::StaleQuery(info) => write!(f, "Tree needs a rebuild. {info}"),
            TreeError::OutOfTreeBounds(info) => write!(f, "Out of tree bounds. {info}"),
            TreeError::ObjectNotFound(info) => write!(f, "Object not found. {info}"),
            TreeError::NotPositive(info) => {
                write!(f, "All AABB dimensions should be positive. {info}")
            }
        }
    }
}
