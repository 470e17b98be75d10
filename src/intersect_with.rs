//! Helper functions with a custom intersection closure.
//!
//! The closure is tested against node volumes to prune the walk and against
//! object bounds to pick the result. It must accept every box enclosing a box
//! it accepts, which holds for overlap and containment tests.

use heapless::Vec as HVec;

use crate::{
    bounding::{Aabb, Float},
    outline::Outline,
    tree::{Octree, ROOT},
    BoundsProvider, NodeId, ObjectId, TreeError,
};

/// Volume every object listed in a node's subtree lies in.
///
/// Straddlers handed up to a node reach at most one node size past its faces.
#[inline]
fn reach<F: Float>(aabb: &Aabb<F>) -> Aabb<F> {
    let size = aabb.size();
    Aabb::from_min_max(aabb.min - size, aabb.max + size)
}

impl<F, O> Octree<F, O>
where
    F: Float,
    O: Outline,
{
    /// Intersect [`Octree`] with a custom intersection closure.
    ///
    /// Returns the [`vector`](Vec) of [`objects`](ObjectId) of the live tree
    /// whose bounds are accepted by `what`.
    ///
    /// ```rust
    /// use static_octree::prelude::*;
    ///
    /// let config = OctreeConfig::from_faces(-10.0, 10.0, 10.0, -10.0, 10.0, -10.0, 2, 1);
    /// let mut tree = Octree::from_config(config).unwrap();
    ///
    /// let objects = vec![Aabb::new(TVec3::splat(1.0f32), TVec3::splat(0.5)).unwrap()];
    /// tree.register(ObjectId(0));
    /// tree.update_index(&objects);
    ///
    /// // Bounding box intersection
    /// let query = Aabb::new(TVec3::zero(), TVec3::splat(1.0)).unwrap();
    /// assert_eq!(
    ///     tree.intersect_with(|aabb| aabb.overlaps(&query), &objects),
    ///     Ok(vec![ObjectId(0)])
    /// );
    /// ```
    pub fn intersect_with<W, P>(&self, what: W, provider: &P) -> Result<Vec<ObjectId>, TreeError>
    where
        W: Fn(&Aabb<F>) -> bool,
        P: BoundsProvider<F> + ?Sized,
    {
        let mut objects = Vec::with_capacity(10);
        self.extend_intersect_with(what, provider, &mut objects)?;
        Ok(objects)
    }

    /// Intersect [`Octree`] with a custom intersection closure reusing a
    /// supplied [`vector`](Vec) rather than allocating a new one.
    pub fn extend_intersect_with<W, P>(
        &self,
        what: W,
        provider: &P,
        objects: &mut Vec<ObjectId>,
    ) -> Result<(), TreeError>
    where
        W: Fn(&Aabb<F>) -> bool,
        P: BoundsProvider<F> + ?Sized,
    {
        self.intersect_with_for_each(what, provider, |object, _| objects.push(object))
    }

    /// Intersect [`Octree`] with a custom intersection closure. Each object
    /// accepted by `what` is passed to `actor` together with its bounds.
    ///
    /// ```rust
    /// use static_octree::prelude::*;
    ///
    /// let config = OctreeConfig::from_faces(-10.0, 10.0, 10.0, -10.0, 10.0, -10.0, 2, 1);
    /// let mut tree = Octree::from_config(config).unwrap();
    ///
    /// let objects = vec![Aabb::new(TVec3::splat(1.0f32), TVec3::splat(0.5)).unwrap()];
    /// tree.register(ObjectId(0));
    /// tree.update_index(&objects);
    ///
    /// let mut centers = Vec::new();
    /// tree.intersect_with_for_each(|_| true, &objects, |_, aabb| centers.push(aabb.center()))
    ///     .unwrap();
    /// assert_eq!(centers, vec![TVec3::splat(1.0)]);
    /// ```
    pub fn intersect_with_for_each<W, P, A>(
        &self,
        what: W,
        provider: &P,
        mut actor: A,
    ) -> Result<(), TreeError>
    where
        W: Fn(&Aabb<F>) -> bool,
        P: BoundsProvider<F> + ?Sized,
        A: FnMut(ObjectId, &Aabb<F>),
    {
        if self.is_dirty() {
            return Err(TreeError::StaleQuery(
                "intersection over a tree that needs a rebuild".into(),
            ));
        }
        self.rintersect_with_for_each(ROOT, &what, provider, &mut actor);
        Ok(())
    }

    fn rintersect_with_for_each<W, P, A>(&self, node: NodeId, what: &W, provider: &P, actor: &mut A)
    where
        W: Fn(&Aabb<F>) -> bool,
        P: BoundsProvider<F> + ?Sized,
        A: FnMut(ObjectId, &Aabb<F>),
    {
        // We use a heapless stack to loop through the nodes until we complete the intersect however
        // if the stack becomes full then we fallback on recursive calls.
        let mut stack = HVec::<_, 32>::new();
        if stack.push(node).is_err() {
            unreachable!("Intersection stack has no capacity");
        }

        while let Some(node) = stack.pop() {
            let n = &self.nodes[node];
            if !n.active || !what(&reach(&n.aabb)) {
                continue;
            }

            for &object in n.objects.iter() {
                if let Some(aabb) = provider.bounds(object) {
                    if what(&aabb) {
                        actor(object, &aabb);
                    }
                }
            }

            if n.has_children {
                let mut iter = n.children.iter();
                while let Some(child) = iter.next() {
                    // If we can't push to the stack (to be processed on the next loop
                    // iteration) then we fallback to recursive calls.
                    if stack.push(*child).is_err() {
                        self.rintersect_with_for_each(*child, what, provider, actor);
                        for child in iter.by_ref() {
                            self.rintersect_with_for_each(*child, what, provider, actor);
                        }
                    }
                }
            }
        }
    }
}
