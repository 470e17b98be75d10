//! Crate's core types reimports.

pub use crate::{
    bounding::{classify, Aabb, Collider, Containment, Float, TVec3},
    config::OctreeConfig,
    manager::OctreeManager,
    node::{Node, NodeState},
    outline::{NoOutline, Outline, OutlineFactory, OutlineState, OutlineStates},
    pool::{depth_index, NodePool},
    tree::{Octree, RebuildReport, ROOT},
    BoundsProvider, NodeId, ObjectId, TreeError, Volume,
};
