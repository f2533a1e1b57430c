//! Collision detection and rigid body response for Broadleaf
//!
//! This crate provides:
//! - Collision shapes (boxes, spheres, capsules, triangle meshes)
//! - Narrow-phase tests between every pair of shapes, with a dispatcher
//! - A dynamic AABB tree broad phase
//! - Rigid body state with grounded/wall contact classification
//! - A physics world that steps bodies owned by a [`PhysicsHost`]

pub mod body;
pub mod collider;
pub mod collision;
pub mod dispatch;
pub mod dynamic_tree;
pub mod error;
pub mod host;
pub mod shapes;
pub mod world;

// Re-export commonly used types
pub use body::{BodyType, RigidBody, DEFAULT_GRAVITY};
pub use collider::Collider;
pub use collision::{CollisionFilter, CollisionLayer, CollisionManifold, Contact};
pub use dispatch::test_collision;
pub use dynamic_tree::{DynamicTree, ProxyId};
pub use error::TreeError;
pub use host::{Anchor, PhysicsHost};
pub use shapes::{Aabb, BoundingCapsule, BoundingSphere, ColliderShape, Pose, Triangle, TriangleMesh};
pub use world::{CollisionEvent, PhysicsConfig, PhysicsWorld, SweepHit, RAYCAST_RADIUS};
