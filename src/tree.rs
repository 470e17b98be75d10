use std::fmt;

use heapless::Vec as HVec;
use log::{debug, trace, warn};
use smallvec::SmallVec;

use crate::{
    bounding::{classify, Aabb, Containment, Float},
    config::OctreeConfig,
    node::Node,
    outline::{NoOutline, Outline, OutlineFactory},
    pool::{NodePool, MAX_DEPTH},
    BoundsProvider, NodeId, ObjectId, TreeError,
};

/// Id of the root node.
pub const ROOT: NodeId = NodeId(0);

/// Depth first reset visits at most 7 siblings per level plus the current node.
const RESET_STACK: usize = 64;
const _: () = assert!(RESET_STACK > 7 * MAX_DEPTH as usize + 1);

/// Octree over a fixed world volume.
///
/// All nodes are built by [`Octree::new`]. Objects are [`registered`](Octree::register)
/// once and the whole tree is rebuilt from them by [`Octree::update_index`].
pub struct Octree<F, O = NoOutline>
where
    F: Float,
{
    pub nodes: NodePool<F, O>,
    pub(crate) registry: Vec<ObjectId>,
    max_depth: u32,
    max_per_node: usize,
    dirty: bool,
    splits: usize,
}

/// Outcome of a rebuild.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RebuildReport {
    /// Objects placed in the tree.
    pub inserted: usize,
    /// Objects skipped for lying outside of the root.
    pub outside: usize,
    /// Registered ids the provider had no bounds for.
    pub missing: usize,
    /// Leaves promoted to branches.
    pub splits: usize,
}

impl<F: Float> Octree<F, NoOutline> {
    /// Builds a tree without debug outlines.
    pub fn from_config(config: OctreeConfig<F>) -> Result<Self, TreeError> {
        Self::new(config, &mut NoOutline)
    }
}

impl<F, O> Octree<F, O>
where
    F: Float,
    O: Outline,
{
    /// Builds every node down to `config.max_depth`.
    ///
    /// The factory is asked for one outline per node. Outlines stay hidden
    /// until their node is activated.
    pub fn new<A>(config: OctreeConfig<F>, factory: &mut A) -> Result<Self, TreeError>
    where
        A: OutlineFactory<F, Outline = O>,
    {
        config.validate()?;

        let nodes = NodePool::build(config.bounds, config.max_depth, factory);
        debug!(
            "octree built: {} nodes, max depth {}, {} per node",
            nodes.len(),
            config.max_depth,
            config.max_per_node
        );

        Ok(Octree {
            nodes,
            registry: Vec::new(),
            max_depth: config.max_depth,
            max_per_node: config.max_per_node,
            dirty: true,
            splits: 0,
        })
    }

    /// Adds an object to the set the tree is rebuilt from.
    ///
    /// The tree becomes dirty: queries fail until the next rebuild.
    pub fn register(&mut self, object: ObjectId) {
        self.registry.push(object);
        self.dirty = true;
    }

    /// Registered objects, in registration order.
    pub fn registry(&self) -> &[ObjectId] {
        &self.registry
    }

    /// Flags that registered objects moved and the tree needs a rebuild.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn max_per_node(&self) -> usize {
        self.max_per_node
    }

    /// World volume of the root.
    pub fn bounds(&self) -> Aabb<F> {
        self.nodes[ROOT].aabb
    }

    pub fn nodes(&self) -> &NodePool<F, O> {
        &self.nodes
    }

    pub fn node(&self, node: NodeId) -> Option<&Node<F, O>> {
        self.nodes.get(node)
    }

    /// Rebuilds the live tree if it is dirty.
    ///
    /// Every node is reset, the root is activated and every registered object is
    /// inserted again from the root. Objects the provider does not know and
    /// objects outside of the root are skipped and counted in the report.
    ///
    /// Returns `None` when the tree was clean.
    pub fn update_index<P>(&mut self, provider: &P) -> Option<RebuildReport>
    where
        P: BoundsProvider<F> + ?Sized,
    {
        if !self.dirty {
            return None;
        }

        self.reset();
        self.nodes[ROOT].activate();
        self.splits = 0;

        let mut report = RebuildReport::default();
        for slot in 0..self.registry.len() {
            let object = self.registry[slot];
            let Some(bounds) = provider.bounds(object) else {
                warn!("{object} is registered but has no bounds, skipping");
                report.missing += 1;
                continue;
            };

            match self.insert(provider, object, &bounds, ROOT) {
                Ok(_) => report.inserted += 1,
                Err(err) => {
                    warn!("{object} skipped: {err}");
                    report.outside += 1;
                }
            }
        }
        report.splits = self.splits;
        self.dirty = false;

        debug!(
            "octree rebuilt: {} inserted, {} outside, {} missing, {} splits",
            report.inserted, report.outside, report.missing, report.splits
        );
        Some(report)
    }

    /// Marks the tree dirty and rebuilds it.
    pub fn rebuild<P>(&mut self, provider: &P) -> RebuildReport
    where
        P: BoundsProvider<F> + ?Sized,
    {
        self.mark_dirty();
        self.update_index(provider).unwrap_or_default()
    }

    /// Deactivates every live node, depth first from the root.
    fn reset(&mut self) {
        let mut stack = HVec::<NodeId, RESET_STACK>::new();
        if stack.push(ROOT).is_err() {
            unreachable!("Reset stack has no capacity");
        }

        while let Some(node) = stack.pop() {
            let n = &mut self.nodes[node];
            if !n.active {
                continue;
            }
            n.deactivate();

            if n.has_children {
                for child in n.children {
                    if stack.push(child).is_err() {
                        unreachable!("Reset stack overflow at {child}");
                    }
                }
            }
        }
    }

    fn activate_children(&mut self, node: NodeId) {
        let n = &mut self.nodes[node];
        n.has_children = true;
        let children = n.children;
        for child in children {
            self.nodes[child].activate();
        }
    }

    /// Places `object` by walking from `start`.
    ///
    /// `start` is either the root or the first of eight siblings. Siblings are
    /// tried in order until one is close to the object. Objects close to but not
    /// inside a node go to the node's parent. A full leaf below `max_depth`
    /// splits and hands its objects down before the walk continues.
    ///
    /// Returns the node whose list received the object.
    fn insert<P>(
        &mut self,
        provider: &P,
        object: ObjectId,
        bounds: &Aabb<F>,
        start: NodeId,
    ) -> Result<NodeId, TreeError>
    where
        P: BoundsProvider<F> + ?Sized,
    {
        let mut first = start;
        let mut current = start;

        loop {
            if !self.in_sibling_range(first, current) {
                let parent = self.rejected(first, bounds)?;
                self.nodes[parent].objects.push(object);
                return Ok(parent);
            }

            let n = &self.nodes[current];
            let containment = classify(bounds, &n.aabb);
            match (containment, n.parent) {
                (Containment::None, _) => current = current.next(),

                (Containment::Partial, Some(parent)) => {
                    self.nodes[parent].objects.push(object);
                    return Ok(parent);
                }

                // Full, or partial at the root
                _ => {
                    if n.has_children {
                        first = n.first_child();
                        current = first;
                    } else if n.objects.len() >= self.max_per_node && n.depth < self.max_depth {
                        self.split(provider, current)?;
                        first = self.nodes[current].first_child();
                        current = first;
                    } else {
                        self.nodes[current].objects.push(object);
                        return Ok(current);
                    }
                }
            }
        }
    }

    /// Turns a full leaf into a branch and reinserts its objects below it.
    fn split<P>(&mut self, provider: &P, node: NodeId) -> Result<(), TreeError>
    where
        P: BoundsProvider<F> + ?Sized,
    {
        let held: SmallVec<[ObjectId; 8]> = self.nodes[node].objects.drain(..).collect();
        self.activate_children(node);
        self.splits += 1;
        trace!("split {node}, redistributing {} objects", held.len());

        let first = self.nodes[node].first_child();
        for object in held {
            match provider.bounds(object) {
                Some(bounds) => {
                    self.insert(provider, object, &bounds, first)?;
                }
                None => {
                    warn!("{object} lost its bounds during a split, keeping it in {node}");
                    self.nodes[node].objects.push(object);
                }
            }
        }
        Ok(())
    }

    /// Walks the live tree like an insertion without modifying it.
    ///
    /// Returns the node whose list the object would be placed in.
    pub fn locate(&self, bounds: &Aabb<F>) -> Result<NodeId, TreeError> {
        self.check_fresh()?;

        let mut first = ROOT;
        let mut current = ROOT;

        loop {
            if !self.in_sibling_range(first, current) {
                return self.rejected(first, bounds);
            }

            let n = &self.nodes[current];
            match (classify(bounds, &n.aabb), n.parent) {
                (Containment::None, _) => current = current.next(),
                (Containment::Partial, Some(parent)) => return Ok(parent),
                _ if n.has_children => {
                    first = n.first_child();
                    current = first;
                }
                _ => return Ok(current),
            }
        }
    }

    /// Objects sharing the bucket `bounds` falls in.
    ///
    /// The slice borrows the live node list and is only meaningful
    /// until the next rebuild.
    pub fn nearby(&self, bounds: &Aabb<F>) -> Result<&[ObjectId], TreeError> {
        let node = self.locate(bounds)?;
        Ok(&self.nodes[node].objects)
    }

    /// Objects sharing the bucket of `object`, `object` included
    /// when it was registered.
    pub fn get_nearby<P>(&self, object: ObjectId, provider: &P) -> Result<&[ObjectId], TreeError>
    where
        P: BoundsProvider<F> + ?Sized,
    {
        let bounds = provider
            .bounds(object)
            .ok_or_else(|| TreeError::ObjectNotFound(format!("no bounds for {object}")))?;
        self.nearby(&bounds)
    }

    /// Hides every live outline and releases all the nodes.
    pub fn teardown(mut self) {
        self.reset();
        debug!(
            "octree torn down: {} nodes, {} registered objects",
            self.nodes.len(),
            self.registry.len()
        );
    }

    fn check_fresh(&self) -> Result<(), TreeError> {
        if self.dirty {
            Err(TreeError::StaleQuery(format!(
                "{} registered objects are not indexed yet",
                self.registry.len()
            )))
        } else {
            Ok(())
        }
    }

    /// The root is scanned alone, any other walk covers eight siblings.
    #[inline]
    fn in_sibling_range(&self, first: NodeId, current: NodeId) -> bool {
        let width = if first == ROOT { 1 } else { 8 };
        current.0 - first.0 < width
    }

    /// Every node starting at `first` rejected the object.
    ///
    /// Siblings fall back to their parent, the root has nowhere to go.
    fn rejected(&self, first: NodeId, bounds: &Aabb<F>) -> Result<NodeId, TreeError> {
        self.nodes[first].parent.ok_or_else(|| {
            TreeError::OutOfTreeBounds(format!("{bounds} is outside of {}", self.bounds()))
        })
    }
}

impl<F: Float, O> fmt::Debug for Octree<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Octree")
            .field("nodes", &self.nodes)
            .field("registry", &self.registry.len())
            .field("max_depth", &self.max_depth)
            .field("max_per_node", &self.max_per_node)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
