//! Core types for the Broadleaf engine
//!
//! This crate provides the entity layer the physics world runs against:
//!
//! - [`Transform3D`] - Position and scale in 3D space
//! - [`Entity`] - An object in the world with an optional transform, collider and rigidbody
//! - [`World`] - Container for all entities plus their physics world
//! - [`EntityKey`] - Generational key to an entity in the world
//! - [`ShapeTemplate`] / [`ColliderTemplate`] - Serializable collider descriptions
//! - [`EntityTemplate`] - Serializable entity template
//! - [`Scene`] - Loadable/saveable scene containing entities

mod transform;
mod entity;
mod world;
mod shapes;
mod scene;

pub use transform::Transform3D;
pub use entity::{BodyTemplate, DirtyFlags, Entity, EntityTemplate};
pub use world::{EntityKey, EntityStore, World};
pub use shapes::{ColliderTemplate, FilterTemplate, ShapeTemplate};
pub use scene::{Scene, SceneLoadError, SceneSaveError};

// Re-export commonly used types from broadleaf_math for convenience
pub use broadleaf_math::{Axis, Vec3};

// Re-export physics types for convenient access through broadleaf_core
pub use broadleaf_physics::{
    BodyType, Collider, CollisionEvent, CollisionFilter, CollisionLayer, PhysicsConfig, PhysicsWorld, RigidBody,
    SweepHit,
};
