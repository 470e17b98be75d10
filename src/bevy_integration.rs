//! [Bevy](https://docs.rs/bevy/) game engine integrations.
//!
//! Adds the [Bevy](https://docs.rs/bevy/) game engine as a dependency.
//!
//! ### Conversions:
//! - [`Aabb`] <-> [`Aabb3d`], so a `Vec<Aabb3d>` is a [`BoundsProvider`]
//! - [`TVec3`] <-> [`Vec3`] / [`Vec3A`]
//!
//! ### Intersections:
//! - [ray](RayCast3d) [intersection](Octree::ray_cast)
//! - [`Aabb3d`] and [`BoundingSphere`] against the tree's world volume
//!
//! ```no_run
//! let ray = RayCast3d::new(Vec3A::new(2.5, 2.5, -9.0), Dir3A::Z, 20.0);
//! assert_eq!(
//!   tree.ray_cast(&ray, &objects),
//!   Ok(HitResult {
//!     object: Some(ObjectId(0)),
//!     distance: 11.0
//!   })
//! );
//! ```

use bevy::math::{
    bounding::{Aabb3d, BoundingSphere, IntersectsVolume, RayCast3d},
    Vec3, Vec3A,
};

use crate::{
    bounding::{Aabb, TVec3},
    outline::Outline,
    tree::{Octree, ROOT},
    BoundsProvider, NodeId, ObjectId, TreeError, Volume,
};

impl<O: Outline> Octree<f32, O> {
    /// Intersects the live tree with the [RayCast3d].
    ///
    /// Returns a [HitResult] with the closest [ObjectId] and the distance to
    /// the intersection if any.
    pub fn ray_cast<P>(&self, ray: &RayCast3d, provider: &P) -> Result<HitResult, TreeError>
    where
        P: BoundsProvider<f32> + ?Sized,
    {
        if self.is_dirty() {
            return Err(TreeError::StaleQuery(
                "ray cast over a tree that needs a rebuild".into(),
            ));
        }

        let mut hit = HitResult::default();
        self.recursive_ray_cast(ROOT, ray, provider, &mut hit);
        Ok(hit)
    }

    fn recursive_ray_cast<P>(&self, node: NodeId, ray: &RayCast3d, provider: &P, hit: &mut HitResult)
    where
        P: BoundsProvider<f32> + ?Sized,
    {
        let n = &self.nodes[node];
        if !n.active {
            return;
        }

        // Straddlers handed up to this node reach one node size past it.
        let size = n.aabb.size();
        let reach = Aabb::from_min_max(n.aabb.min - size, n.aabb.max + size);
        if !ray.intersects(&Aabb3d::from(reach)) {
            return;
        }

        for &object in n.objects.iter() {
            let Some(bounds) = provider.bounds(object) else {
                continue;
            };

            if let Some(dist) = ray.aabb_intersection_at(&bounds.into()) {
                match hit.object {
                    Some(_) => {
                        if hit.distance > dist {
                            hit.object = Some(object);
                            hit.distance = dist;
                        }
                    }
                    None => {
                        hit.object = Some(object);
                        hit.distance = dist;
                    }
                }
            }
        }

        if n.has_children {
            for child in n.children {
                self.recursive_ray_cast(child, ray, provider, hit);
            }
        }
    }
}

/// Intersection result.
///
/// Contains `Some(`[ObjectId]`)` in case of intersection,
/// [None] otherwise.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub object: Option<ObjectId>,
    pub distance: f32,
}

impl From<Aabb<f32>> for Aabb3d {
    fn from(value: Aabb<f32>) -> Self {
        Aabb3d {
            min: value.min.into(),
            max: value.max.into(),
        }
    }
}

impl From<Aabb3d> for Aabb<f32> {
    fn from(value: Aabb3d) -> Self {
        Aabb::from_min_max(value.min.into(), value.max.into())
    }
}

impl Volume for Aabb3d {
    type F = f32;

    fn volume(&self) -> Aabb<f32> {
        (*self).into()
    }
}

impl From<TVec3<f32>> for Vec3A {
    fn from(value: TVec3<f32>) -> Self {
        Vec3A::new(value.x, value.y, value.z)
    }
}

impl From<TVec3<f32>> for Vec3 {
    fn from(value: TVec3<f32>) -> Self {
        Vec3::new(value.x, value.y, value.z)
    }
}

impl From<Vec3A> for TVec3<f32> {
    fn from(value: Vec3A) -> Self {
        TVec3::new(value.x, value.y, value.z)
    }
}

impl From<Vec3> for TVec3<f32> {
    fn from(value: Vec3) -> Self {
        TVec3::new(value.x, value.y, value.z)
    }
}

impl<O: Outline> IntersectsVolume<Aabb3d> for Octree<f32, O> {
    /// Check if a [Aabb3d] volume intersects with the [Octree] root node.
    fn intersects(&self, volume: &Aabb3d) -> bool {
        let aabb: Aabb3d = self.bounds().into();
        volume.intersects(&aabb)
    }
}

impl<O: Outline> IntersectsVolume<BoundingSphere> for Octree<f32, O> {
    /// Check if a [BoundingSphere] volume intersects with the [Octree] root node.
    fn intersects(&self, volume: &BoundingSphere) -> bool {
        let aabb: Aabb3d = self.bounds().into();
        volume.intersects(&aabb)
    }
}
