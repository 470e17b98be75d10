use core::fmt;

use crate::{
    bounding::{Aabb, Float},
    outline::Outline,
    NodeId, ObjectId,
};

/// One cell of the tree.
///
/// Nodes are never created or destroyed after the tree is built.
/// Whether a node takes part in the current frame is tracked by
/// `active` and `has_children` only.
pub struct Node<F: Float, O> {
    pub aabb: Aabb<F>,
    pub depth: u32,
    pub parent: Option<NodeId>,
    /// Fixed child slots. Only meaningful while `has_children` is set.
    pub children: [NodeId; 8],
    pub active: bool,
    pub has_children: bool,
    pub objects: Vec<ObjectId>,
    pub outline: O,
}

impl<F: Float, O> Node<F, O> {
    pub(crate) fn new(
        aabb: Aabb<F>,
        depth: u32,
        parent: Option<NodeId>,
        children: [NodeId; 8],
        outline: O,
    ) -> Self {
        Node {
            aabb,
            depth,
            parent,
            children,
            active: false,
            has_children: false,
            objects: Vec::new(),
            outline,
        }
    }

    #[inline]
    pub fn first_child(&self) -> NodeId {
        self.children[0]
    }

    pub fn state(&self) -> NodeState {
        match (self.active, self.has_children) {
            (false, _) => NodeState::Inactive,
            (true, false) => NodeState::Leaf,
            (true, true) => NodeState::Branch,
        }
    }
}

impl<F: Float, O: Outline> Node<F, O> {
    /// Joins the live tree as a leaf.
    pub(crate) fn activate(&mut self) {
        self.active = true;
        self.has_children = false;
        self.outline.show();
    }

    /// Leaves the live tree. The object list keeps its capacity.
    pub(crate) fn deactivate(&mut self) {
        self.active = false;
        self.objects.clear();
        self.outline.hide();
    }
}

impl<F: Float, O> fmt::Debug for Node<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("aabb", &self.aabb)
            .field("depth", &self.depth)
            .field("parent", &self.parent)
            .field("state", &self.state())
            .field("objects", &self.objects)
            .finish_non_exhaustive()
    }
}

/// Activation state of a [`Node`].
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeState {
    #[default]
    Inactive,
    /// Live, may hold objects directly.
    Leaf,
    /// Live, children are live too. Holds only objects
    /// that straddle its children.
    Branch,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Inactive => write!(f, "NodeState: Inactive"),
            NodeState::Leaf => write!(f, "NodeState: Leaf"),
            NodeState::Branch => write!(f, "NodeState: Branch"),
        }
    }
}
