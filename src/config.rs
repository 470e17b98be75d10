//! OctreeConfig - world bounds and subdivision limits of a tree.

use crate::{
    bounding::{Aabb, Float},
    pool::{checked_depth_index, MAX_DEPTH},
    TreeError,
};

/// Parameters a tree is built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeConfig<F: Float> {
    /// World volume covered by the root node.
    pub bounds: Aabb<F>,

    /// Deepest subdivision, the root being depth 0. `1..=MAX_DEPTH`.
    pub max_depth: u32,

    /// Objects a leaf holds before it splits.
    pub max_per_node: usize,
}

impl<F: Float> OctreeConfig<F> {
    pub fn new(bounds: Aabb<F>, max_depth: u32, max_per_node: usize) -> Self {
        Self {
            bounds,
            max_depth,
            max_per_node,
        }
    }

    /// Configuration from the six world faces.
    ///
    /// `right > left`, `top > bottom` and `front > back` is expected.
    #[allow(clippy::too_many_arguments)]
    pub fn from_faces(
        left: F,
        right: F,
        top: F,
        bottom: F,
        front: F,
        back: F,
        max_depth: u32,
        max_per_node: usize,
    ) -> Self {
        Self::new(
            Aabb::from_faces(left, right, top, bottom, front, back),
            max_depth,
            max_per_node,
        )
    }

    /// Checks the bounds, depth and capacity.
    pub fn validate(&self) -> Result<(), TreeError> {
        if !self.bounds.is_positive() {
            return Err(TreeError::Configuration(format!(
                "{} must have finite, positive extents",
                self.bounds
            )));
        }
        if self.max_depth == 0 || self.max_depth > MAX_DEPTH {
            return Err(TreeError::Configuration(format!(
                "max depth {} is outside of 1..={MAX_DEPTH}",
                self.max_depth
            )));
        }
        if checked_depth_index(self.max_depth + 1).is_none() {
            return Err(TreeError::Configuration(format!(
                "max depth {} overflows the node store",
                self.max_depth
            )));
        }
        if self.max_per_node == 0 {
            return Err(TreeError::Configuration(
                "max per node should be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Number of nodes the tree preallocates.
    #[inline]
    pub fn node_count(&self) -> usize {
        checked_depth_index(self.max_depth).unwrap_or(usize::MAX)
    }
}

impl<F: Float> Default for OctreeConfig<F> {
    fn default() -> Self {
        Self {
            bounds: Aabb::default(),
            max_depth: 4,
            max_per_node: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> OctreeConfig<f32> {
        OctreeConfig::from_faces(-10.0, 10.0, 10.0, -10.0, 10.0, -10.0, 2, 1)
    }

    #[test]
    fn test_valid() {
        assert_eq!(valid().validate(), Ok(()));
        assert_eq!(valid().node_count(), 73);
        assert_eq!(OctreeConfig::<f64>::default().validate(), Ok(()));
        assert_eq!(OctreeConfig::<f64>::default().node_count(), 4681);
    }

    #[test]
    fn test_invalid_bounds() {
        // Right equals left.
        let mut config = valid();
        config.bounds = Aabb::from_faces(1.0, 1.0, 10.0, -10.0, 10.0, -10.0);
        assert!(matches!(config.validate(), Err(TreeError::Configuration(_))));

        // Top below bottom.
        config.bounds = Aabb::from_faces(-10.0, 10.0, -10.0, 10.0, 10.0, -10.0);
        assert!(matches!(config.validate(), Err(TreeError::Configuration(_))));

        config.bounds = Aabb::from_faces(-10.0, f32::INFINITY, 10.0, -10.0, 10.0, -10.0);
        assert!(matches!(config.validate(), Err(TreeError::Configuration(_))));
    }

    #[test]
    fn test_invalid_limits() {
        let mut config = valid();
        config.max_depth = 0;
        assert!(matches!(config.validate(), Err(TreeError::Configuration(_))));

        config.max_depth = MAX_DEPTH + 1;
        assert!(matches!(config.validate(), Err(TreeError::Configuration(_))));

        config.max_depth = MAX_DEPTH;
        assert_eq!(config.validate(), Ok(()));

        config.max_per_node = 0;
        assert!(matches!(config.validate(), Err(TreeError::Configuration(_))));
    }
}
