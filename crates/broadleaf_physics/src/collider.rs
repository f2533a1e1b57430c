//! Collider component

use broadleaf_math::Vec3;

use crate::collision::{CollisionFilter, CollisionLayer};
use crate::dynamic_tree::ProxyId;
use crate::shapes::{Aabb, ColliderShape, Pose};

/// A shape attached to an entity, plus its filtering and broad-phase state
#[derive(Clone, Debug, PartialEq)]
pub struct Collider {
    /// Shape in collider-local space
    pub shape: ColliderShape,
    /// Translation from the owner's position to the shape's origin (not scaled)
    pub offset: Vec3,
    pub filter: CollisionFilter,
    /// Triggers report overlaps but never push or get pushed
    pub is_trigger: bool,
    proxy: Option<ProxyId>,
}

impl Collider {
    pub fn new(shape: impl Into<ColliderShape>) -> Self {
        Self {
            shape: shape.into(),
            offset: Vec3::ZERO,
            filter: CollisionFilter::default(),
            is_trigger: false,
            proxy: None,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Mark as a trigger volume detecting the given layers
    pub fn as_trigger(mut self, detects: CollisionLayer) -> Self {
        self.is_trigger = true;
        self.filter = CollisionFilter::trigger(detects);
        self
    }

    pub fn layer(&self) -> CollisionLayer {
        self.filter.layer
    }

    pub fn mask(&self) -> CollisionLayer {
        self.filter.mask
    }

    /// Broad-phase handle, `None` while not registered
    pub fn proxy(&self) -> Option<ProxyId> {
        self.proxy
    }

    pub fn set_proxy(&mut self, proxy: Option<ProxyId>) {
        self.proxy = proxy;
    }

    /// Whether this collider is currently indexed by a physics world
    pub fn is_registered(&self) -> bool {
        self.proxy.is_some()
    }

    /// Pose of the shape for an owner at `position` with `scale`
    pub fn pose(&self, position: Vec3, scale: Vec3) -> Pose {
        Pose::new(position + self.offset, scale)
    }

    /// World-space bounds for an owner at `position` with `scale`
    pub fn world_aabb(&self, position: Vec3, scale: Vec3) -> Aabb {
        self.shape.world_bounds(&self.pose(position, scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::BoundingSphere;

    #[test]
    fn test_new_collider_is_unregistered() {
        let collider = Collider::new(BoundingSphere::new(Vec3::ZERO, 1.0));
        assert!(!collider.is_registered());
        assert!(collider.proxy().is_none());
        assert!(!collider.is_trigger);
        assert_eq!(collider.layer(), CollisionLayer::DEFAULT);
    }

    #[test]
    fn test_world_aabb_applies_offset_and_scale() {
        let collider = Collider::new(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)))
            .with_offset(Vec3::new(0.0, 1.0, 0.0));
        let aabb = collider.world_aabb(Vec3::new(10.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));

        assert_eq!(aabb.min, Vec3::new(9.0, 0.5, -0.5));
        assert_eq!(aabb.max, Vec3::new(11.0, 1.5, 0.5));
    }

    #[test]
    fn test_trigger_builder() {
        let collider = Collider::new(BoundingSphere::new(Vec3::ZERO, 2.0)).as_trigger(CollisionLayer::PLAYER);
        assert!(collider.is_trigger);
        assert_eq!(collider.layer(), CollisionLayer::TRIGGER);
        assert_eq!(collider.mask(), CollisionLayer::PLAYER);
    }
}
