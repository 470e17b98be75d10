//! Bounding primitives.
//!
//! [`TVec3`], [`BVec3`], [`Aabb`], [`Collider`] and the node
//! [`classification`](classify) used by the tree walk.

use std::{
    fmt::{Debug, Display},
    ops::{Add, AddAssign, Mul, Sub, SubAssign},
};

use crate::{TreeError, Volume};

/// Scalar type of the tree coordinates.
///
/// Implemented for `f32` and `f64`.
pub trait Float: num::Float + Default + Debug + Display {}
impl Float for f32 {}
impl Float for f64 {}

#[inline]
pub(crate) fn half<F: Float>() -> F {
    F::one() / (F::one() + F::one())
}

/// Tree Vec3
///
/// Inner type should be any [`Float`]: `f32` or `f64`.
#[derive(Default, Debug, PartialEq, PartialOrd, Clone, Copy)]
pub struct TVec3<F: Float> {
    pub x: F,
    pub y: F,
    pub z: F,
}

impl<F: Float> Add for TVec3<F> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        TVec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl<F: Float> Sub for TVec3<F> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        TVec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl<F: Float> Mul<F> for TVec3<F> {
    type Output = Self;

    fn mul(self, scale: F) -> Self {
        TVec3 {
            x: self.x * scale,
            y: self.y * scale,
            z: self.z * scale,
        }
    }
}

impl<F: Float> AddAssign for TVec3<F> {
    fn add_assign(&mut self, other: Self) {
        self.x = self.x + other.x;
        self.y = self.y + other.y;
        self.z = self.z + other.z;
    }
}

impl<F: Float> SubAssign for TVec3<F> {
    fn sub_assign(&mut self, other: Self) {
        self.x = self.x - other.x;
        self.y = self.y - other.y;
        self.z = self.z - other.z;
    }
}

impl<F: Float> Display for TVec3<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Vec3: x: {}, y: {}, z: {}", self.x, self.y, self.z)
    }
}

impl<F: Float> TVec3<F> {
    pub fn new(x: F, y: F, z: F) -> Self {
        TVec3 { x, y, z }
    }

    pub fn splat(value: F) -> Self {
        TVec3 {
            x: value,
            y: value,
            z: value,
        }
    }

    pub fn zero() -> Self {
        Self::splat(F::zero())
    }

    pub fn abs(&self) -> Self {
        TVec3::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn lt(&self, other: Self) -> BVec3 {
        BVec3::new(self.x < other.x, self.y < other.y, self.z < other.z)
    }

    pub fn gt(&self, other: Self) -> BVec3 {
        BVec3::new(self.x > other.x, self.y > other.y, self.z > other.z)
    }

    pub fn le(&self, other: Self) -> BVec3 {
        BVec3::new(self.x <= other.x, self.y <= other.y, self.z <= other.z)
    }

    pub fn ge(&self, other: Self) -> BVec3 {
        BVec3::new(self.x >= other.x, self.y >= other.y, self.z >= other.z)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Boolean Vec3 mask.
#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub struct BVec3 {
    x: bool,
    y: bool,
    z: bool,
}

impl BVec3 {
    fn new(x: bool, y: bool, z: bool) -> Self {
        BVec3 { x, y, z }
    }

    pub fn all(&self) -> bool {
        self.x && self.y && self.z
    }

    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    pub fn none(&self) -> bool {
        !self.x && !self.y && !self.z
    }
}

/// Axis Aligned Bounding Box
///
/// Face naming follows the world the tree lives in:
/// `left`/`right` are the x bounds, `bottom`/`top` the y bounds
/// and `back`/`front` the z bounds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Aabb<F: Float> {
    pub min: TVec3<F>,
    pub max: TVec3<F>,
}

impl<F: Float> Default for Aabb<F> {
    fn default() -> Self {
        Self {
            min: TVec3::splat(-F::one()),
            max: TVec3::splat(F::one()),
        }
    }
}

impl<F: Float> Display for Aabb<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Aabb(min: {}, max: {})", self.min, self.max)
    }
}

impl<F: Float> Aabb<F> {
    /// Creates a new [`Aabb`] from a center and half extents without any checks.
    pub fn new_unchecked(center: TVec3<F>, half_extents: TVec3<F>) -> Self {
        Aabb {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates a new [`Aabb`] from a center and half extents.
    ///
    /// Checks that the half extents are finite and not negative.
    pub fn new(center: TVec3<F>, half_extents: TVec3<F>) -> Result<Self, TreeError> {
        if !center.is_finite() || !half_extents.is_finite() {
            Err(TreeError::NotPositive(format!(
                "center: {center}, half extents: {half_extents} are not finite"
            )))
        } else if half_extents.lt(TVec3::zero()).any() {
            Err(TreeError::NotPositive(format!(
                "half extents: {half_extents}"
            )))
        } else {
            Ok(Self::new_unchecked(center, half_extents))
        }
    }

    /// Creates a new [`Aabb`] object from a min and max
    pub fn from_min_max(min: TVec3<F>, max: TVec3<F>) -> Self {
        Self { min, max }
    }

    /// Creates a new [`Aabb`] from its six faces.
    pub fn from_faces(left: F, right: F, top: F, bottom: F, front: F, back: F) -> Self {
        Self {
            min: TVec3::new(left, bottom, back),
            max: TVec3::new(right, top, front),
        }
    }

    #[inline]
    pub fn left(&self) -> F {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> F {
        self.max.x
    }

    #[inline]
    pub fn bottom(&self) -> F {
        self.min.y
    }

    #[inline]
    pub fn top(&self) -> F {
        self.max.y
    }

    #[inline]
    pub fn back(&self) -> F {
        self.min.z
    }

    #[inline]
    pub fn front(&self) -> F {
        self.max.z
    }

    pub fn center(&self) -> TVec3<F> {
        (self.min + self.max) * half()
    }

    /// Width, height and depth.
    pub fn size(&self) -> TVec3<F> {
        self.max - self.min
    }

    pub fn half_extents(&self) -> TVec3<F> {
        self.size() * half()
    }

    /// Every extent is finite and strictly positive.
    pub fn is_positive(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.lt(self.max).all()
    }

    /// Bisects the box on every axis.
    ///
    /// Octant `i` takes the upper half of x when bit 0 is set,
    /// of y for bit 1 and of z for bit 2.
    #[inline]
    pub fn split(&self) -> [Aabb<F>; 8] {
        let center = self.center();
        std::array::from_fn(|i| self.octant(i, center))
    }

    fn octant(&self, i: usize, center: TVec3<F>) -> Aabb<F> {
        let x_mask = (i & 0b1) != 0;
        let y_mask = (i & 0b10) != 0;
        let z_mask = (i & 0b100) != 0;

        Aabb {
            min: TVec3::new(
                if x_mask { center.x } else { self.min.x },
                if y_mask { center.y } else { self.min.y },
                if z_mask { center.z } else { self.min.z },
            ),
            max: TVec3::new(
                if x_mask { self.max.x } else { center.x },
                if y_mask { self.max.y } else { center.y },
                if z_mask { self.max.z } else { center.z },
            ),
        }
    }

    /// Checks if the aabb contains a point, faces included.
    pub fn contains(&self, position: TVec3<F>) -> bool {
        self.min.le(position).all() && self.max.ge(position).all()
    }

    /// Checks if this volume overlaps with another [`Aabb`].
    pub fn overlaps(&self, other: &Aabb<F>) -> bool {
        self.max.x.min(other.max.x) > self.min.x.max(other.min.x)
            && self.max.y.min(other.max.y) > self.min.y.max(other.min.y)
            && self.max.z.min(other.max.z) > self.min.z.max(other.min.z)
    }
}

impl<F: Float> Volume for Aabb<F> {
    type F = F;

    fn volume(&self) -> Aabb<F> {
        *self
    }
}

/// Extent of a bounded object: width/height/depth around an x/y/z anchor.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Collider<F: Float> {
    pub width: F,
    pub height: F,
    pub depth: F,
    pub x: F,
    pub y: F,
    pub z: F,
}

impl<F: Float> Collider<F> {
    pub fn new(anchor: TVec3<F>, size: TVec3<F>) -> Self {
        Collider {
            width: size.x,
            height: size.y,
            depth: size.z,
            x: anchor.x,
            y: anchor.y,
            z: anchor.z,
        }
    }
}

impl<F: Float> From<Collider<F>> for Aabb<F> {
    fn from(value: Collider<F>) -> Self {
        Aabb::new_unchecked(
            TVec3::new(value.x, value.y, value.z),
            TVec3::new(value.width, value.height, value.depth) * half(),
        )
    }
}

impl<F: Float> From<Aabb<F>> for Collider<F> {
    fn from(value: Aabb<F>) -> Self {
        Collider::new(value.center(), value.size())
    }
}

impl<F: Float> Volume for Collider<F> {
    type F = F;

    fn volume(&self) -> Aabb<F> {
        (*self).into()
    }
}

/// How an object's bounds relate to a node's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Containment {
    /// Neither close to nor inside the node.
    None,
    /// Every object face lies within one node extent of the matching node face.
    Partial,
    /// The node encloses the object on all six faces.
    Full,
}

/// Classifies `object` against `node`.
///
/// Face deltas are `node.max - object.max` and `node.min - object.min` per axis.
/// Enclosure is boundary inclusive. Proximity accepts any object whose faces
/// are each less than one node extent away from the node's faces.
/// Enclosure wins when both tests pass.
pub fn classify<F: Float>(object: &Aabb<F>, node: &Aabb<F>) -> Containment {
    let d_max = node.max - object.max;
    let d_min = node.min - object.min;
    let extent = node.size();

    let full = d_max.ge(TVec3::zero()).all() && d_min.le(TVec3::zero()).all();
    let near = d_max.abs().lt(extent).all() && d_min.abs().lt(extent).all();

    match (full, near) {
        (true, _) => Containment::Full,
        (false, true) => Containment::Partial,
        (false, false) => Containment::None,
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, Aabb, Collider, Containment, TVec3};

    fn node() -> Aabb<f32> {
        Aabb::from_faces(0.0, 10.0, 10.0, 0.0, 10.0, 0.0)
    }

    #[test]
    fn test_faces() {
        let aabb = Aabb::from_faces(-1.0f32, 2.0, 3.0, -4.0, 5.0, -6.0);
        assert_eq!(aabb.left(), -1.0);
        assert_eq!(aabb.right(), 2.0);
        assert_eq!(aabb.top(), 3.0);
        assert_eq!(aabb.bottom(), -4.0);
        assert_eq!(aabb.front(), 5.0);
        assert_eq!(aabb.back(), -6.0);
        assert_eq!(aabb.size(), TVec3::new(3.0, 7.0, 11.0));
        assert!(aabb.is_positive());

        assert!(!Aabb::from_faces(1.0f32, 1.0, 1.0, 0.0, 1.0, 0.0).is_positive());
    }

    #[test]
    fn test_aabb_contains() {
        let aabb = node();
        assert!(aabb.contains(TVec3::zero()));
        assert!(aabb.contains(TVec3::splat(5.0)));
        assert!(aabb.contains(TVec3::splat(10.0)));
        assert!(!aabb.contains(TVec3::new(0.0, 10.5, 5.0)));
    }

    #[test]
    fn test_aabb_constructor() {
        assert!(Aabb::new(TVec3::splat(2.0f32), TVec3::splat(1.0)).is_ok());
        assert!(Aabb::new(TVec3::splat(2.0f32), TVec3::zero()).is_ok());
        assert!(Aabb::new(TVec3::splat(2.0f32), TVec3::new(1.0, -1.0, 1.0)).is_err());
        assert!(Aabb::new(TVec3::splat(f32::NAN), TVec3::splat(1.0)).is_err());
    }

    #[test]
    fn test_split() {
        let octants = node().split();

        assert_eq!(octants[0], Aabb::from_faces(0.0, 5.0, 5.0, 0.0, 5.0, 0.0));
        assert_eq!(octants[1], Aabb::from_faces(5.0, 10.0, 5.0, 0.0, 5.0, 0.0));
        assert_eq!(octants[2], Aabb::from_faces(0.0, 5.0, 10.0, 5.0, 5.0, 0.0));
        assert_eq!(octants[7], Aabb::from_faces(5.0, 10.0, 10.0, 5.0, 10.0, 5.0));

        // Octants tile the parent without overlapping.
        for (i, a) in octants.iter().enumerate() {
            assert_eq!(a.size(), TVec3::splat(5.0));
            for b in octants.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn test_collider() {
        let collider = Collider::new(TVec3::splat(1.0f64), TVec3::new(2.0, 4.0, 6.0));
        let aabb: Aabb<f64> = collider.into();
        assert_eq!(aabb.min, TVec3::new(0.0, -1.0, -2.0));
        assert_eq!(aabb.max, TVec3::new(2.0, 3.0, 4.0));
        assert_eq!(Collider::from(aabb), collider);
    }

    #[test]
    fn test_classify_full() {
        let centered = Aabb::new_unchecked(TVec3::splat(5.0), TVec3::splat(4.9));
        assert_eq!(classify(&centered, &node()), Containment::Full);

        let tiny = Aabb::new_unchecked(TVec3::splat(1.0), TVec3::splat(0.1));
        assert_eq!(classify(&tiny, &node()), Containment::Full);

        // Equal bounds are enclosed.
        assert_eq!(classify(&node(), &node()), Containment::Full);

        // A flat object lying on the min face.
        let flat = Aabb::from_faces(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(classify(&flat, &node()), Containment::Full);
    }

    #[test]
    fn test_classify_partial() {
        let straddling = Aabb::new_unchecked(TVec3::new(10.0, 5.0, 5.0), TVec3::splat(1.0));
        assert_eq!(classify(&straddling, &node()), Containment::Partial);

        // Slightly larger than the node on every face.
        let larger = Aabb::from_faces(-1.0, 11.0, 11.0, -1.0, 11.0, -1.0);
        assert_eq!(classify(&larger, &node()), Containment::Partial);
    }

    #[test]
    fn test_classify_none() {
        let far = Aabb::new_unchecked(TVec3::splat(50.0), TVec3::splat(1.0));
        assert_eq!(classify(&far, &node()), Containment::None);

        // Inside a neighbouring cell of the same size.
        let neighbour = Aabb::new_unchecked(TVec3::new(15.0, 5.0, 5.0), TVec3::splat(1.0));
        assert_eq!(classify(&neighbour, &node()), Containment::None);

        // Touching the right face from outside.
        let touching = Aabb::from_faces(10.0, 11.0, 6.0, 4.0, 6.0, 4.0);
        assert_eq!(classify(&touching, &node()), Containment::None);

        // Much larger than the node.
        let huge = Aabb::new_unchecked(TVec3::splat(5.0), TVec3::splat(20.0));
        assert_eq!(classify(&huge, &node()), Containment::None);
    }
}
