//! World container for entities
//!
//! The World owns all entities and one physics world. Entities are stored
//! in a slotmap so handles stay valid (and stale handles are detectable)
//! across spawns and despawns; the physics world refers to them only by
//! [`EntityKey`].

use broadleaf_math::Vec3;
use broadleaf_physics::{
    Aabb, Anchor, Collider, CollisionEvent, CollisionLayer, PhysicsConfig, PhysicsHost, PhysicsWorld, RigidBody,
    SweepHit,
};
use slotmap::{new_key_type, SlotMap};

use crate::entity::DirtyFlags;
use crate::Entity;

new_key_type! {
    /// Generational key to an entity in the world
    pub struct EntityKey;
}

/// Entity storage, exposed to the physics world as its host
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    entities: SlotMap<EntityKey, Entity>,
}

impl EntityStore {
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }
}

impl PhysicsHost for EntityStore {
    type Handle = EntityKey;

    fn collider(&self, key: EntityKey) -> Option<&Collider> {
        self.entities.get(key)?.collider.as_ref()
    }

    fn collider_mut(&mut self, key: EntityKey) -> Option<&mut Collider> {
        self.entities.get_mut(key)?.collider.as_mut()
    }

    fn rigidbody(&self, key: EntityKey) -> Option<&RigidBody> {
        self.entities.get(key)?.rigidbody.as_ref()
    }

    fn rigidbody_mut(&mut self, key: EntityKey) -> Option<&mut RigidBody> {
        self.entities.get_mut(key)?.rigidbody.as_mut()
    }

    fn anchor(&self, key: EntityKey) -> Anchor {
        self.entities.get(key).map_or(Anchor::Detached, Entity::anchor)
    }

    fn world_position(&self, key: EntityKey, anchor: Anchor) -> Option<Vec3> {
        let entity = self.entities.get(key)?;
        match anchor {
            Anchor::Transform => entity.transform.map(|t| t.position),
            Anchor::Direct => entity.camera,
            Anchor::Detached => None,
        }
    }

    fn world_scale(&self, key: EntityKey, anchor: Anchor) -> Vec3 {
        match (anchor, self.entities.get(key)) {
            (Anchor::Transform, Some(entity)) => entity.scale(),
            _ => Vec3::ONE,
        }
    }

    fn translate(&mut self, key: EntityKey, anchor: Anchor, delta: Vec3) -> bool {
        let Some(entity) = self.entities.get_mut(key) else {
            return false;
        };
        let moved = match (anchor, entity.transform.as_mut(), entity.camera.as_mut()) {
            (Anchor::Transform, Some(transform), _) => {
                transform.translate(delta);
                true
            }
            (Anchor::Direct, _, Some(camera)) => {
                *camera += delta;
                true
            }
            _ => false,
        };
        if moved {
            entity.mark_dirty(DirtyFlags::TRANSFORM);
        }
        moved
    }
}

/// The world containing all entities
///
/// The World is the central container for all game objects. Every entity
/// with a collider is registered with the physics world while it is alive.
#[derive(Clone, Debug)]
pub struct World {
    entities: EntityStore,
    physics: PhysicsWorld<EntityKey>,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a new empty world with default physics
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new empty world with a custom physics configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            entities: EntityStore::default(),
            physics: PhysicsWorld::with_config(config),
        }
    }

    /// Get the physics world
    pub fn physics(&self) -> &PhysicsWorld<EntityKey> {
        &self.physics
    }

    pub fn physics_config(&self) -> &PhysicsConfig {
        self.physics.config()
    }

    /// The entity store, as seen by the physics world
    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    /// Add an entity, registering its collider
    pub fn spawn(&mut self, entity: Entity) -> EntityKey {
        let key = self.entities.entities.insert(entity);
        if self.entities.collider(key).is_some() {
            self.physics.register_collider(&mut self.entities, key);
        }
        key
    }

    /// Remove an entity, unregistering its collider first
    pub fn despawn(&mut self, key: EntityKey) -> Option<Entity> {
        self.physics.unregister_collider(&mut self.entities, key);
        self.entities.entities.remove(key)
    }

    /// Replace (or remove) an entity's collider, keeping the broad phase in sync
    ///
    /// Returns false if the entity does not exist.
    pub fn set_collider(&mut self, key: EntityKey, collider: Option<Collider>) -> bool {
        if !self.entities.entities.contains_key(key) {
            return false;
        }
        self.physics.unregister_collider(&mut self.entities, key);
        let has_collider = collider.is_some();
        if let Some(entity) = self.entities.get_mut(key) {
            entity.collider = collider;
            entity.mark_dirty(DirtyFlags::COLLIDER);
        }
        if has_collider {
            self.physics.register_collider(&mut self.entities, key);
        }
        true
    }

    /// Get a reference to an entity by key
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Get a mutable reference to an entity by key
    ///
    /// Use [`World::set_collider`] to swap colliders; editing the shape in
    /// place is picked up on the next update.
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Find the first entity with the given name
    pub fn get_by_name(&self, name: &str) -> Option<(EntityKey, &Entity)> {
        self.entities.iter().find(|(_, e)| e.name.as_deref() == Some(name))
    }

    /// Iterate over entities carrying a tag
    pub fn get_by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = (EntityKey, &'a Entity)> + 'a {
        self.entities.iter().filter(move |(_, e)| e.has_tag(tag))
    }

    /// Iterate over keys and entities
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    /// Get the number of entities
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Check if the world is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity
    pub fn clear(&mut self) {
        let keys: Vec<EntityKey> = self.entities.entities.keys().collect();
        for key in keys {
            self.despawn(key);
        }
    }

    /// Step the physics simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        self.physics.step(dt, &mut self.entities);
    }

    /// Collision events from the most recent update
    pub fn contacts(&self) -> &[CollisionEvent<EntityKey>] {
        self.physics.contacts()
    }

    /// Entities whose fat collider bounds overlap `region`
    pub fn overlap_aabb(&self, region: &Aabb, mask: CollisionLayer) -> Vec<EntityKey> {
        self.physics.overlap_aabb(&self.entities, region, mask)
    }

    /// Entities whose fat collider bounds overlap a sphere
    pub fn overlap_sphere(&self, center: Vec3, radius: f32, mask: CollisionLayer) -> Vec<EntityKey> {
        self.physics.overlap_sphere(&self.entities, center, radius, mask)
    }

    /// Sweep a sphere and report the closest hit
    pub fn sphere_sweep(
        &self,
        start: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
        mask: CollisionLayer,
    ) -> Option<SweepHit<EntityKey>> {
        self.physics
            .sphere_sweep(&self.entities, start, direction, radius, max_distance, mask)
    }

    /// Cast a ray and report the closest hit
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: CollisionLayer,
    ) -> Option<SweepHit<EntityKey>> {
        self.physics
            .raycast(&self.entities, origin, direction, max_distance, mask)
    }

    /// Clear the dirty flags on every entity
    pub fn clear_dirty(&mut self) {
        for entity in self.entities.entities.values_mut() {
            entity.clear_dirty();
        }
    }

    /// Keys of entities with any dirty flag set
    pub fn dirty_entities(&self) -> Vec<EntityKey> {
        self.entities
            .iter()
            .filter(|(_, e)| e.is_dirty())
            .map(|(key, _)| key)
            .collect()
    }
}
