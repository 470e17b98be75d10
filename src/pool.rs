//! [`NodePool`] implementation.
//!
//! Every node of every depth lives in one flat vector. Depth `d` starts at
//! [`depth_index(d - 1)`](depth_index) and the children of node `i` are the
//! eight slots starting at `8 * i + 1`.

use std::{
    array::from_fn,
    iter::Enumerate,
    ops::{Index, IndexMut},
};

use crate::{
    bounding::{Aabb, Float},
    node::Node,
    outline::OutlineFactory,
    NodeId,
};

/// Deepest supported subdivision.
pub const MAX_DEPTH: u32 = 8;

/// Number of nodes in depths `0..=depth`: `1 + 8 + ... + 8^depth`.
///
/// ```rust
/// use static_octree::pool::depth_index;
///
/// assert_eq!(depth_index(0), 1);
/// assert_eq!(depth_index(1), 9);
/// assert_eq!(depth_index(2), 73);
/// ```
pub const fn depth_index(depth: u32) -> usize {
    let mut sum = 0;
    let mut level = 1;
    let mut i = 0;
    while i <= depth {
        sum += level;
        level *= 8;
        i += 1;
    }
    sum
}

/// [`depth_index`] returning `None` on overflow.
pub fn checked_depth_index(depth: u32) -> Option<usize> {
    let mut sum: usize = 0;
    let mut level: usize = 1;
    for i in 0..=depth {
        sum = sum.checked_add(level)?;
        if i < depth {
            level = level.checked_mul(8)?;
        }
    }
    Some(sum)
}

/// Id of child `k` of the node at flat `index` and `depth`.
#[inline]
pub fn child_index(index: usize, depth: u32, k: usize) -> NodeId {
    // depth_index(d + 1) == 8 * depth_index(d) + 1, so the subtraction comes last.
    (depth_index(depth + 1) + index * 8 + k - depth_index(depth) * 8).into()
}

/// Flat store of all the nodes of a tree.
///
/// Built once and never resized.
pub struct NodePool<F: Float, O> {
    pub(crate) vec: Vec<Node<F, O>>,
}

impl<F: Float, O> NodePool<F, O> {
    /// Builds the full tree down to `max_depth` by bisecting `aabb`.
    ///
    /// Children are pushed in id order, so a node's slots are filled
    /// exactly when its parent is visited.
    pub(crate) fn build<A>(aabb: Aabb<F>, max_depth: u32, factory: &mut A) -> Self
    where
        A: OutlineFactory<F, Outline = O>,
    {
        let total = depth_index(max_depth);
        let mut vec = Vec::with_capacity(total);

        let outline = factory.create(aabb.center(), aabb.size());
        vec.push(Node::new(aabb, 0, None, from_fn(|k| child_index(0, 0, k)), outline));

        let branches = depth_index(max_depth - 1);
        for index in 0..branches {
            let parent: &Node<F, O> = &vec[index];
            let depth = parent.depth + 1;
            let octants = parent.aabb.split();
            for (k, octant) in octants.into_iter().enumerate() {
                let id = child_index(index, depth - 1, k);
                debug_assert_eq!(usize::from(id), vec.len());

                let outline = factory.create(octant.center(), octant.size());
                let slots = from_fn(|c| child_index(id.into(), depth, c));
                vec.push(Node::new(octant, depth, Some(index.into()), slots, outline));
            }
        }

        debug_assert_eq!(vec.len(), total);
        NodePool { vec }
    }

    /// Returns the number of nodes of all depths.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.vec.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    #[inline(always)]
    pub fn get(&self, node: NodeId) -> Option<&Node<F, O>> {
        self.vec.get(usize::from(node))
    }

    /// Iterates over all the nodes, active or not, in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Node<F, O>> {
        self.vec.iter()
    }

    /// Iterates over all the nodes together with their ids.
    pub fn iter_nodes(&self) -> NodeIterator<'_, F, O> {
        NodeIterator {
            inner: self.vec.iter().enumerate(),
        }
    }

    /// Iterates over the nodes of the live tree.
    pub fn iter_active(&self) -> impl Iterator<Item = (NodeId, &Node<F, O>)> {
        self.iter_nodes().filter(|(_, node)| node.active)
    }
}

/// Indexing a [`pool`](NodePool) of [`nodes`](Node) with [`NodeId`]
///
/// ```ignore
/// let node = &tree.nodes[NodeId(42)];
/// ```
impl<F: Float, O> Index<NodeId> for NodePool<F, O> {
    type Output = Node<F, O>;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.vec[usize::from(index)]
    }
}

/// Mutable Indexing a [`pool`](NodePool) of [`nodes`](Node) with [`NodeId`]
///
/// ```ignore
/// let mut node = &mut tree.nodes[NodeId(42)];
/// ```
impl<F: Float, O> IndexMut<NodeId> for NodePool<F, O> {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.vec[usize::from(index)]
    }
}

impl<F: Float, O> std::fmt::Debug for NodePool<F, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodePool")
            .field("len", &self.vec.len())
            .finish_non_exhaustive()
    }
}

/// Iterator for a [`NodePool`] that includes node ids.
#[derive(Clone)]
pub struct NodeIterator<'pool, F: Float, O> {
    inner: Enumerate<std::slice::Iter<'pool, Node<F, O>>>,
}

impl<'pool, F: Float, O> Iterator for NodeIterator<'pool, F, O> {
    type Item = (NodeId, &'pool Node<F, O>);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(i, node)| (i.into(), node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<F: Float, O> DoubleEndedIterator for NodeIterator<'_, F, O> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(i, node)| (i.into(), node))
    }
}

impl<F: Float, O> ExactSizeIterator for NodeIterator<'_, F, O> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bounding::TVec3, outline::NoOutline};

    #[test]
    fn test_depth_index_closed_form() {
        for d in 0..=MAX_DEPTH {
            let closed = (8usize.pow(d + 1) - 1) / 7;
            assert_eq!(depth_index(d), closed, "depth {d}");
            assert_eq!(checked_depth_index(d), Some(closed), "depth {d}");
        }
    }

    #[test]
    fn test_depth_index_increasing() {
        for d in 0..MAX_DEPTH {
            assert!(depth_index(d) < depth_index(d + 1));
        }
    }

    #[test]
    fn test_checked_depth_index_overflow() {
        assert_eq!(checked_depth_index(64), None);
    }

    #[test]
    fn test_child_index() {
        assert_eq!(child_index(0, 0, 0), NodeId(1));
        assert_eq!(child_index(0, 0, 7), NodeId(8));
        assert_eq!(child_index(1, 1, 0), NodeId(9));
        assert_eq!(child_index(8, 1, 7), NodeId(72));
        assert_eq!(child_index(9, 2, 0), NodeId(73));
    }

    #[test]
    fn test_build() {
        let aabb = Aabb::from_faces(0.0f32, 4.0, 4.0, 0.0, 4.0, 0.0);
        let pool = NodePool::build(aabb, 2, &mut NoOutline);

        assert_eq!(pool.len(), 73);
        assert_eq!(pool[NodeId(0)].aabb, aabb);
        assert_eq!(pool[NodeId(0)].depth, 0);
        assert!(pool.iter().all(|n| !n.active && !n.has_children));

        // Octant 7 of the root is the (+,+,+) corner.
        let corner = &pool[NodeId(8)];
        assert_eq!(corner.aabb.min, TVec3::splat(2.0));
        assert_eq!(corner.aabb.max, TVec3::splat(4.0));
        assert_eq!(corner.parent, Some(NodeId(0)));

        // Its own (-,-,-) child.
        let inner = &pool[corner.first_child()];
        assert_eq!(corner.first_child(), NodeId(65));
        assert_eq!(inner.aabb.min, TVec3::splat(2.0));
        assert_eq!(inner.aabb.max, TVec3::splat(3.0));
        assert_eq!(inner.depth, 2);

        // Children of every depth tile their parent.
        for (id, node) in pool.iter_nodes().take(depth_index(1)) {
            let octants = node.aabb.split();
            for (k, child) in node.children.iter().enumerate() {
                assert_eq!(pool[*child].aabb, octants[k]);
                assert_eq!(pool[*child].parent, Some(id));
            }
        }

        assert_eq!(pool.iter_active().count(), 0);
        assert!(pool.get(NodeId(73)).is_none());
    }
}
