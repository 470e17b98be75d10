//! [`OctreeManager`] - Init/Teardown lifecycle around a single [`Octree`].
//!
//! For callers that keep one index alive for a whole session and want
//! misuse (queries before init, double init) reported as errors.

use log::debug;

use crate::{
    bounding::Float,
    config::OctreeConfig,
    outline::{NoOutline, Outline, OutlineFactory},
    tree::{Octree, RebuildReport},
    BoundsProvider, ObjectId, TreeError,
};

/// Holds at most one [`Octree`].
///
/// Every operation but [`init`](OctreeManager::init) fails with
/// [`TreeError::UninitializedUse`] while no tree is held.
pub struct OctreeManager<F: Float, O = NoOutline> {
    tree: Option<Octree<F, O>>,
}

impl<F: Float, O> Default for OctreeManager<F, O> {
    fn default() -> Self {
        Self { tree: None }
    }
}

impl<F: Float, O: Outline> OctreeManager<F, O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the tree.
    pub fn init<A>(&mut self, config: OctreeConfig<F>, factory: &mut A) -> Result<(), TreeError>
    where
        A: OutlineFactory<F, Outline = O>,
    {
        if self.tree.is_some() {
            return Err(TreeError::AlreadyInitialized(
                "teardown the current tree first".into(),
            ));
        }
        self.tree = Some(Octree::new(config, factory)?);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.tree.is_some()
    }

    pub fn tree(&self) -> Result<&Octree<F, O>, TreeError> {
        self.tree
            .as_ref()
            .ok_or_else(|| TreeError::UninitializedUse("no tree to read".into()))
    }

    pub fn tree_mut(&mut self) -> Result<&mut Octree<F, O>, TreeError> {
        self.tree
            .as_mut()
            .ok_or_else(|| TreeError::UninitializedUse("no tree to modify".into()))
    }

    /// See [`Octree::register`].
    pub fn register(&mut self, object: ObjectId) -> Result<(), TreeError> {
        self.tree_mut()?.register(object);
        Ok(())
    }

    /// See [`Octree::mark_dirty`].
    pub fn mark_dirty(&mut self) -> Result<(), TreeError> {
        self.tree_mut()?.mark_dirty();
        Ok(())
    }

    /// See [`Octree::update_index`].
    pub fn update_index<P>(&mut self, provider: &P) -> Result<Option<RebuildReport>, TreeError>
    where
        P: BoundsProvider<F> + ?Sized,
    {
        Ok(self.tree_mut()?.update_index(provider))
    }

    /// See [`Octree::get_nearby`].
    pub fn get_nearby<P>(&self, object: ObjectId, provider: &P) -> Result<&[ObjectId], TreeError>
    where
        P: BoundsProvider<F> + ?Sized,
    {
        self.tree()?.get_nearby(object, provider)
    }

    /// Releases the tree. The manager can be initialized again afterwards.
    pub fn teardown(&mut self) -> Result<(), TreeError> {
        let tree = self
            .tree
            .take()
            .ok_or_else(|| TreeError::UninitializedUse("nothing to tear down".into()))?;
        tree.teardown();
        debug!("octree manager released its tree");
        Ok(())
    }
}

impl<F: Float> OctreeManager<F, NoOutline> {
    /// [`init`](OctreeManager::init) without debug outlines.
    pub fn init_with_config(&mut self, config: OctreeConfig<F>) -> Result<(), TreeError> {
        self.init(config, &mut NoOutline)
    }
}
