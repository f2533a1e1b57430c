//! The seam between the physics world and the layer that owns objects
//!
//! The physics world never owns colliders or rigidbodies. It refers to them
//! by an opaque handle and reaches them through a [`PhysicsHost`], which the
//! entity layer implements.

use std::fmt::Debug;
use std::hash::Hash;

use broadleaf_math::Vec3;

use crate::body::RigidBody;
use crate::collider::Collider;

/// Where an object's position lives
///
/// Resolved once when a collider is registered rather than rediscovered on
/// every step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// A full transform with position and scale
    #[default]
    Transform,
    /// A bare position (e.g. a camera), scale is always one
    Direct,
    /// Nothing to move; position corrections are dropped
    Detached,
}

/// Access to the colliders, rigidbodies and positions owned by the caller
pub trait PhysicsHost {
    /// Identifier for one object; ordered so pairs can be visited once
    type Handle: Copy + Eq + Ord + Hash + Debug;

    fn collider(&self, handle: Self::Handle) -> Option<&Collider>;

    fn collider_mut(&mut self, handle: Self::Handle) -> Option<&mut Collider>;

    fn rigidbody(&self, handle: Self::Handle) -> Option<&RigidBody>;

    fn rigidbody_mut(&mut self, handle: Self::Handle) -> Option<&mut RigidBody>;

    /// Classify how the object's position is stored
    fn anchor(&self, handle: Self::Handle) -> Anchor;

    /// World position through the given anchor, `None` when detached or gone
    fn world_position(&self, handle: Self::Handle, anchor: Anchor) -> Option<Vec3>;

    /// World scale through the given anchor
    fn world_scale(&self, handle: Self::Handle, anchor: Anchor) -> Vec3;

    /// Move the object by `delta`; returns false when nothing could be moved
    fn translate(&mut self, handle: Self::Handle, anchor: Anchor, delta: Vec3) -> bool;
}
