//! Debug outline capability.
//!
//! Every node owns one [`Outline`], created through an [`OutlineFactory`]
//! when the tree is built. The tree shows it when the node becomes part of the
//! live tree and hides it when the node is reset. Drawing is up to the caller.

use crate::bounding::{Float, TVec3};

/// Visual handle of a single node.
pub trait Outline {
    fn show(&mut self);

    fn hide(&mut self);
}

/// Builds the [`Outline`] of a node from its center and size.
pub trait OutlineFactory<F: Float> {
    type Outline: Outline;

    fn create(&mut self, center: TVec3<F>, size: TVec3<F>) -> Self::Outline;
}

/// Outline that does nothing. Default for trees without debug visuals.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoOutline;

impl Outline for NoOutline {
    #[inline(always)]
    fn show(&mut self) {}

    #[inline(always)]
    fn hide(&mut self) {}
}

impl<F: Float> OutlineFactory<F> for NoOutline {
    type Outline = NoOutline;

    #[inline(always)]
    fn create(&mut self, _center: TVec3<F>, _size: TVec3<F>) -> NoOutline {
        NoOutline
    }
}

/// Outline that only remembers its placement and visibility.
///
/// Handy for renderers that poll the tree once per frame
/// instead of reacting to show/hide calls.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct OutlineState<F: Float> {
    pub center: TVec3<F>,
    pub size: TVec3<F>,
    pub visible: bool,
}

impl<F: Float> Outline for OutlineState<F> {
    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }
}

/// Factory of [`OutlineState`] outlines.
#[derive(Default, Debug, Clone, Copy)]
pub struct OutlineStates;

impl<F: Float> OutlineFactory<F> for OutlineStates {
    type Outline = OutlineState<F>;

    fn create(&mut self, center: TVec3<F>, size: TVec3<F>) -> OutlineState<F> {
        OutlineState {
            center,
            size,
            visible: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bounding::Aabb, config::OctreeConfig, tree::Octree, ObjectId};

    /// Counts factory calls.
    #[derive(Default)]
    struct Counting {
        created: usize,
    }

    impl OutlineFactory<f64> for Counting {
        type Outline = OutlineState<f64>;

        fn create(&mut self, center: TVec3<f64>, size: TVec3<f64>) -> OutlineState<f64> {
            self.created += 1;
            OutlineStates.create(center, size)
        }
    }

    #[test]
    fn test_outlines_created_hidden() {
        let mut factory = Counting::default();
        let config = OctreeConfig::new(Aabb::from_faces(0.0, 8.0, 8.0, 0.0, 8.0, 0.0), 2, 1);
        let tree = Octree::new(config, &mut factory).unwrap();

        assert_eq!(factory.created, 73);
        assert!(tree.nodes().iter().all(|n| !n.outline.visible));

        let root = &tree.nodes().iter().next().unwrap().outline;
        assert_eq!(root.center, TVec3::splat(4.0));
        assert_eq!(root.size, TVec3::splat(8.0));
    }

    #[test]
    fn test_outlines_follow_activation() {
        let config = OctreeConfig::new(Aabb::from_faces(0.0, 8.0, 8.0, 0.0, 8.0, 0.0), 2, 1);
        let mut tree = Octree::new(config, &mut OutlineStates).unwrap();
        let objects = vec![
            Aabb::new_unchecked(TVec3::splat(1.0), TVec3::splat(0.5)),
            Aabb::new_unchecked(TVec3::splat(7.0), TVec3::splat(0.5)),
        ];
        tree.register(ObjectId(0));
        tree.register(ObjectId(1));
        tree.update_index(&objects);

        // Root and its eight children are live.
        let visible = tree.nodes().iter().filter(|n| n.outline.visible).count();
        assert_eq!(visible, 9);
        assert!(tree
            .nodes()
            .iter()
            .all(|n| n.outline.visible == n.active));

        // Everything collapses back into the root.
        tree.mark_dirty();
        tree.update_index(&objects[..0]);
        let visible = tree.nodes().iter().filter(|n| n.outline.visible).count();
        assert_eq!(visible, 1);
    }
}
