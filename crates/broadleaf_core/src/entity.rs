//! Entity and template types
//!
//! An Entity is an object in the world: an optional transform (or a bare
//! camera position), an optional collider and an optional rigidbody.

use std::collections::HashSet;

use bitflags::bitflags;
use broadleaf_math::Vec3;
use broadleaf_physics::{Anchor, BodyType, Collider, PhysicsConfig, RigidBody};
use serde::{Deserialize, Serialize};

use crate::shapes::ColliderTemplate;
use crate::Transform3D;

bitflags! {
    /// Flags indicating which parts of an entity have changed since last cleared
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// No changes
        const NONE = 0;
        /// Position or scale has changed
        const TRANSFORM = 1 << 0;
        /// Collider was attached, replaced or removed
        const COLLIDER = 1 << 1;
        /// All flags set
        const ALL = Self::TRANSFORM.bits() | Self::COLLIDER.bits();
    }
}

/// An object in the world
///
/// Entities carry their own physics components; the world indexes the
/// collider in its broad phase but never takes ownership of it.
#[derive(Clone, Debug)]
pub struct Entity {
    /// Optional name for lookup
    pub name: Option<String>,
    /// Tags for categorization (e.g., "dynamic", "static", "player")
    pub tags: HashSet<String>,
    /// World transform, if the entity has one
    pub transform: Option<Transform3D>,
    /// Bare position for camera-like entities that have no transform
    pub camera: Option<Vec3>,
    pub collider: Option<Collider>,
    pub rigidbody: Option<RigidBody>,
    dirty: DirtyFlags,
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity {
    /// Create an entity at the origin
    pub fn new() -> Self {
        Self::with_transform(Transform3D::identity())
    }

    /// Create an entity with a specific transform
    pub fn with_transform(transform: Transform3D) -> Self {
        Self {
            name: None,
            tags: HashSet::new(),
            transform: Some(transform),
            camera: None,
            collider: None,
            rigidbody: None,
            dirty: DirtyFlags::ALL,
        }
    }

    /// Create an entity at `position` with unit scale
    pub fn at(position: Vec3) -> Self {
        Self::with_transform(Transform3D::from_position(position))
    }

    /// Create a camera-like entity that only has a position
    pub fn camera(position: Vec3) -> Self {
        Self {
            transform: None,
            camera: Some(position),
            ..Self::new()
        }
    }

    /// Create an entity with no position at all
    ///
    /// Its collider is indexed at the origin and never moved.
    pub fn detached() -> Self {
        Self {
            transform: None,
            ..Self::new()
        }
    }

    /// Set the name of this entity
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this entity
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add multiple tags to this entity
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for tag in tags {
            self.tags.insert(tag.into());
        }
        self
    }

    /// Check if this entity has a specific tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Attach a collider to this entity
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    /// Attach a rigidbody to this entity
    pub fn with_rigidbody(mut self, body: RigidBody) -> Self {
        self.rigidbody = Some(body);
        self
    }

    /// How this entity's position is stored
    pub fn anchor(&self) -> Anchor {
        match (self.transform, self.camera) {
            (Some(_), _) => Anchor::Transform,
            (None, Some(_)) => Anchor::Direct,
            (None, None) => Anchor::Detached,
        }
    }

    /// World position, if the entity has one
    pub fn position(&self) -> Option<Vec3> {
        match self.transform {
            Some(transform) => Some(transform.position),
            None => self.camera,
        }
    }

    /// World scale; entities without a transform are unscaled
    pub fn scale(&self) -> Vec3 {
        self.transform.map_or(Vec3::ONE, |t| t.scale)
    }

    /// Move the entity by `delta`; returns false if it has no position
    pub fn translate(&mut self, delta: Vec3) -> bool {
        if let Some(transform) = self.transform.as_mut() {
            transform.translate(delta);
        } else if let Some(camera) = self.camera.as_mut() {
            *camera += delta;
        } else {
            return false;
        }
        self.mark_dirty(DirtyFlags::TRANSFORM);
        true
    }

    // --- Dirty tracking methods ---

    /// Check if this entity has any dirty flags set
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Get the current dirty flags
    #[inline]
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    /// Mark this entity as dirty with the given flags
    #[inline]
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    /// Clear all dirty flags
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::NONE;
    }

    /// Set the position and mark the transform as dirty
    ///
    /// Camera entities move their bare position instead. Returns false for
    /// detached entities.
    pub fn set_position(&mut self, position: Vec3) -> bool {
        match self.position() {
            Some(current) => self.translate(position - current),
            None => false,
        }
    }

    /// Set the transform and mark it as dirty
    pub fn set_transform(&mut self, transform: Transform3D) {
        self.transform = Some(transform);
        self.mark_dirty(DirtyFlags::TRANSFORM);
    }
}

/// A serializable rigidbody description
///
/// Unset fields fall back to the physics configuration of the world the
/// entity is spawned into.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyTemplate {
    #[serde(default)]
    pub body_type: BodyType,
    #[serde(default)]
    pub velocity: Vec3,
    #[serde(default)]
    pub mass: Option<f32>,
    #[serde(default)]
    pub use_gravity: Option<bool>,
    #[serde(default)]
    pub terminal_velocity: Option<f32>,
}

impl BodyTemplate {
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            ..Self::default()
        }
    }

    pub fn dynamic() -> Self {
        Self::new(BodyType::Dynamic)
    }

    pub fn kinematic() -> Self {
        Self::new(BodyType::Kinematic)
    }

    pub fn fixed() -> Self {
        Self::new(BodyType::Static)
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Build the runtime body using `config` for gravity and terminal velocity
    pub fn to_rigidbody(&self, config: &PhysicsConfig) -> RigidBody {
        let mut body = RigidBody::new(self.body_type)
            .with_velocity(self.velocity)
            .with_gravity(config.gravity)
            .with_terminal_velocity(self.terminal_velocity.unwrap_or(config.terminal_velocity));
        if let Some(mass) = self.mass {
            body = body.with_mass(mass);
        }
        if let Some(use_gravity) = self.use_gravity {
            body = body.with_use_gravity(use_gravity);
        }
        body
    }
}

/// A serializable entity template
///
/// EntityTemplate is used for scene serialization. Unlike Entity, it stores
/// collider and body templates rather than runtime components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    /// Optional name for this entity (for lookup)
    #[serde(default)]
    pub name: Option<String>,
    /// Tags for categorization (e.g., "dynamic", "static")
    #[serde(default)]
    pub tags: Vec<String>,
    /// The entity's transform in world space
    #[serde(default)]
    pub transform: Option<Transform3D>,
    /// Bare position for camera-like entities (ignored when a transform is set)
    #[serde(default)]
    pub camera: Option<Vec3>,
    #[serde(default)]
    pub collider: Option<ColliderTemplate>,
    #[serde(default)]
    pub rigidbody: Option<BodyTemplate>,
}

impl EntityTemplate {
    /// Create a new entity template with a transform
    pub fn new(transform: Transform3D) -> Self {
        Self {
            transform: Some(transform),
            ..Self::default()
        }
    }

    /// Create a camera-like entity template
    pub fn camera(position: Vec3) -> Self {
        Self {
            camera: Some(position),
            ..Self::default()
        }
    }

    /// Set the name of this template
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a tag to this template
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_collider(mut self, collider: impl Into<ColliderTemplate>) -> Self {
        self.collider = Some(collider.into());
        self
    }

    pub fn with_rigidbody(mut self, body: BodyTemplate) -> Self {
        self.rigidbody = Some(body);
        self
    }

    /// Convert this template to an Entity
    pub fn to_entity(&self, config: &PhysicsConfig) -> Entity {
        let mut entity = match (self.transform, self.camera) {
            (Some(transform), _) => Entity::with_transform(transform),
            (None, Some(position)) => Entity::camera(position),
            (None, None) => Entity::detached(),
        };
        if let Some(ref name) = self.name {
            entity = entity.with_name(name.clone());
        }
        entity = entity.with_tags(self.tags.iter().cloned());
        entity.collider = self.collider.as_ref().map(ColliderTemplate::to_collider);
        entity.rigidbody = self.rigidbody.as_ref().map(|body| body.to_rigidbody(config));
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeTemplate;

    #[test]
    fn test_entity_defaults() {
        let entity = Entity::new();
        assert!(entity.name.is_none());
        assert!(entity.tags.is_empty());
        assert_eq!(entity.transform, Some(Transform3D::identity()));
        assert!(entity.collider.is_none());
        assert!(entity.rigidbody.is_none());
        assert_eq!(entity.anchor(), Anchor::Transform);
    }

    #[test]
    fn test_entity_name_and_tags() {
        let entity = Entity::new()
            .with_name("crate")
            .with_tag("dynamic")
            .with_tags(["pushable", "wooden"]);
        assert_eq!(entity.name.as_deref(), Some("crate"));
        assert!(entity.has_tag("dynamic"));
        assert!(entity.has_tag("wooden"));
        assert!(!entity.has_tag("static"));
    }

    #[test]
    fn test_anchor_classification() {
        assert_eq!(Entity::at(Vec3::ONE).anchor(), Anchor::Transform);
        assert_eq!(Entity::camera(Vec3::ONE).anchor(), Anchor::Direct);
        assert_eq!(Entity::detached().anchor(), Anchor::Detached);
    }

    #[test]
    fn test_translate_transform_entity() {
        let mut entity = Entity::at(Vec3::new(1.0, 2.0, 3.0));
        entity.clear_dirty();
        assert!(entity.translate(Vec3::new(0.0, -1.0, 0.0)));
        assert_eq!(entity.position(), Some(Vec3::new(1.0, 1.0, 3.0)));
        assert!(entity.dirty_flags().contains(DirtyFlags::TRANSFORM));
    }

    #[test]
    fn test_translate_camera_entity() {
        let mut entity = Entity::camera(Vec3::new(0.0, 1.7, 0.0));
        assert!(entity.translate(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(entity.camera, Some(Vec3::new(1.0, 1.7, 0.0)));
        assert_eq!(entity.scale(), Vec3::ONE);
    }

    #[test]
    fn test_translate_detached_entity() {
        let mut entity = Entity::detached();
        entity.clear_dirty();
        assert!(!entity.translate(Vec3::X));
        assert!(entity.position().is_none());
        assert!(!entity.is_dirty());
        assert!(!entity.set_position(Vec3::X));
    }

    #[test]
    fn test_set_position() {
        let mut entity = Entity::at(Vec3::new(5.0, 5.0, 5.0));
        assert!(entity.set_position(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(entity.position(), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_dirty_tracking() {
        let mut entity = Entity::new();
        assert!(entity.is_dirty());
        assert_eq!(entity.dirty_flags(), DirtyFlags::ALL);

        entity.clear_dirty();
        assert!(!entity.is_dirty());

        entity.set_transform(Transform3D::from_position(Vec3::X));
        assert_eq!(entity.dirty_flags(), DirtyFlags::TRANSFORM);

        entity.mark_dirty(DirtyFlags::COLLIDER);
        assert_eq!(entity.dirty_flags(), DirtyFlags::ALL);
    }

    #[test]
    fn test_scale_comes_from_transform() {
        let entity = Entity::with_transform(Transform3D::identity().with_uniform_scale(2.0));
        assert_eq!(entity.scale(), Vec3::splat(2.0));
    }

    #[test]
    fn test_body_template_uses_config() {
        let config = PhysicsConfig {
            gravity: Vec3::new(0.0, -20.0, 0.0),
            terminal_velocity: 30.0,
            ..PhysicsConfig::default()
        };
        let body = BodyTemplate::dynamic().to_rigidbody(&config);
        assert_eq!(body.gravity, Vec3::new(0.0, -20.0, 0.0));
        assert_eq!(body.terminal_velocity, 30.0);
        assert!(body.use_gravity);
    }

    #[test]
    fn test_body_template_overrides() {
        let template = BodyTemplate {
            body_type: BodyType::Dynamic,
            velocity: Vec3::new(1.0, 0.0, 0.0),
            mass: Some(4.0),
            use_gravity: Some(false),
            terminal_velocity: Some(12.0),
        };
        let body = template.to_rigidbody(&PhysicsConfig::default());
        assert_eq!(body.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(body.mass(), 4.0);
        assert!(!body.use_gravity);
        assert_eq!(body.terminal_velocity, 12.0);
    }

    #[test]
    fn test_static_template_ignores_gravity() {
        let body = BodyTemplate::fixed().to_rigidbody(&PhysicsConfig::default());
        assert!(body.is_static());
        assert!(!body.use_gravity);
    }

    #[test]
    fn test_template_to_entity() {
        let template = EntityTemplate::new(Transform3D::from_position(Vec3::new(0.0, 3.0, 0.0)))
            .with_name("ball")
            .with_tag("dynamic")
            .with_collider(ShapeTemplate::sphere(0.5))
            .with_rigidbody(BodyTemplate::dynamic());

        let entity = template.to_entity(&PhysicsConfig::default());
        assert_eq!(entity.name.as_deref(), Some("ball"));
        assert!(entity.has_tag("dynamic"));
        assert_eq!(entity.position(), Some(Vec3::new(0.0, 3.0, 0.0)));
        assert!(entity.collider.is_some());
        assert!(entity.rigidbody.is_some());
    }

    #[test]
    fn test_camera_template_to_entity() {
        let entity = EntityTemplate::camera(Vec3::new(0.0, 1.7, 5.0)).to_entity(&PhysicsConfig::default());
        assert_eq!(entity.anchor(), Anchor::Direct);
        assert_eq!(entity.position(), Some(Vec3::new(0.0, 1.7, 5.0)));
    }

    #[test]
    fn test_empty_template_is_detached() {
        let entity = EntityTemplate::default().to_entity(&PhysicsConfig::default());
        assert_eq!(entity.anchor(), Anchor::Detached);
    }
}
