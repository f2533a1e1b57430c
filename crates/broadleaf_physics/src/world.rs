//! Physics world and simulation
//!
//! [`PhysicsWorld`] owns the broad-phase tree and the list of registered
//! colliders. Colliders, rigidbodies and positions stay with the caller and
//! are reached through a [`PhysicsHost`] passed into every call.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use broadleaf_math::{Axis, Vec3};
use serde::{Deserialize, Serialize};

use crate::body::{
    DEFAULT_GRAVITY, DEFAULT_GROUNDED_STICK_VELOCITY, DEFAULT_GROUND_NORMAL_THRESHOLD, DEFAULT_TERMINAL_VELOCITY,
};
use crate::collision::{CollisionLayer, Contact};
use crate::dispatch::test_collision;
use crate::dynamic_tree::{DynamicTree, ProxyId, DEFAULT_DISPLACEMENT_MULTIPLIER, DEFAULT_MARGIN};
use crate::host::{Anchor, PhysicsHost};
use crate::shapes::{Aabb, BoundingSphere};

/// Sweep radius used by [`PhysicsWorld::raycast`]
pub const RAYCAST_RADIUS: f32 = 0.001;

/// Configuration for the physics simulation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity given to newly created rigidbodies
    pub gravity: Vec3,
    /// Inflation of every broad-phase box
    pub fat_margin: f32,
    /// Predictive extension of a moved box, as a multiple of its displacement
    pub displacement_multiplier: f32,
    /// Contacts with a normal Y above this count as ground
    pub ground_normal_threshold: f32,
    /// Downward bias kept on grounded bodies
    pub grounded_stick_velocity: f32,
    /// Terminal velocity given to newly created rigidbodies
    pub terminal_velocity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            fat_margin: DEFAULT_MARGIN,
            displacement_multiplier: DEFAULT_DISPLACEMENT_MULTIPLIER,
            ground_normal_threshold: DEFAULT_GROUND_NORMAL_THRESHOLD,
            grounded_stick_velocity: DEFAULT_GROUNDED_STICK_VELOCITY,
            terminal_velocity: DEFAULT_TERMINAL_VELOCITY,
        }
    }
}

impl PhysicsConfig {
    /// Create a new physics config with the given gravity
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }
}

/// A contact found during the last step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent<K> {
    pub a: K,
    pub b: K,
    /// Normal points from `a` toward `b`
    pub contact: Contact,
    /// At least one side is a trigger; no response was applied
    pub is_trigger: bool,
}

/// Closest hit of a sweep or ray query
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepHit<K> {
    pub handle: K,
    /// Distance travelled along the normalized direction
    pub distance: f32,
    /// Sweep center at the moment of impact
    pub point: Vec3,
    /// Approximate face normal of the target box
    pub normal: Vec3,
}

#[derive(Clone, Copy, Debug)]
struct Registration<K> {
    handle: K,
    anchor: Anchor,
    proxy: ProxyId,
}

/// The physics world: broad phase, pair discovery and collision response
#[derive(Clone, Debug)]
pub struct PhysicsWorld<K> {
    config: PhysicsConfig,
    tree: DynamicTree<K>,
    /// Registration order drives pair discovery order
    registered: Vec<Registration<K>>,
    anchors: HashMap<K, Anchor>,
    contacts: Vec<CollisionEvent<K>>,
}

impl<K> Default for PhysicsWorld<K>
where
    K: Copy + Eq + Ord + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> PhysicsWorld<K>
where
    K: Copy + Eq + Ord + Hash + Debug,
{
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let tree = DynamicTree::with_parameters(config.fat_margin, config.displacement_multiplier);
        Self {
            config,
            tree,
            registered: Vec::new(),
            anchors: HashMap::new(),
            contacts: Vec::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Broad-phase tree, for diagnostics
    pub fn tree(&self) -> &DynamicTree<K> {
        &self.tree
    }

    /// Events produced by the most recent `step`
    pub fn contacts(&self) -> &[CollisionEvent<K>] {
        &self.contacts
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    pub fn is_registered(&self, handle: K) -> bool {
        self.anchors.contains_key(&handle)
    }

    /// Registered handles in registration order
    pub fn registered_handles(&self) -> impl Iterator<Item = K> + '_ {
        self.registered.iter().map(|reg| reg.handle)
    }

    /// Add an object's collider to the broad phase
    ///
    /// Returns false if it was already registered or has no collider.
    pub fn register_collider<H>(&mut self, host: &mut H, handle: K) -> bool
    where
        H: PhysicsHost<Handle = K>,
    {
        if self.is_registered(handle) {
            return false;
        }

        let anchor = host.anchor(handle);
        let Some(aabb) = world_aabb(host, handle, anchor) else {
            log::warn!("Cannot register {:?}: it has no collider", handle);
            return false;
        };

        let proxy = self.tree.insert(aabb, handle);
        if let Some(collider) = host.collider_mut(handle) {
            collider.set_proxy(Some(proxy));
        }
        self.registered.push(Registration { handle, anchor, proxy });
        self.anchors.insert(handle, anchor);
        log::debug!("Registered collider {:?} as proxy {} ({:?})", handle, proxy, anchor);
        true
    }

    /// Remove an object's collider from the broad phase
    ///
    /// Returns false if it was not registered. Must be called before the
    /// collider is destroyed.
    pub fn unregister_collider<H>(&mut self, host: &mut H, handle: K) -> bool
    where
        H: PhysicsHost<Handle = K>,
    {
        let Some(index) = self.registered.iter().position(|reg| reg.handle == handle) else {
            return false;
        };

        let reg = self.registered.remove(index);
        self.anchors.remove(&handle);
        if let Err(err) = self.tree.remove(reg.proxy) {
            log::warn!("Unregistering {:?}: {}", handle, err);
        }
        if let Some(collider) = host.collider_mut(handle) {
            collider.set_proxy(None);
        }
        log::debug!("Unregistered collider {:?}", handle);
        true
    }

    /// Advance the simulation by `dt` seconds
    ///
    /// Phases run in a fixed order: reset contact flags (remembering who was
    /// grounded), integrate velocities, integrate positions, refresh the
    /// broad phase, then find and resolve colliding pairs.
    pub fn step<H>(&mut self, dt: f32, host: &mut H)
    where
        H: PhysicsHost<Handle = K>,
    {
        self.contacts.clear();

        // Grounded state must be read before the reset
        let was_grounded: Vec<bool> = self
            .registered
            .iter()
            .map(|reg| match host.rigidbody_mut(reg.handle) {
                Some(body) => {
                    let was = body.is_grounded();
                    body.clear_collision_state();
                    was
                }
                None => false,
            })
            .collect();

        let stick = self.config.grounded_stick_velocity;
        for (reg, &was) in self.registered.iter().zip(&was_grounded) {
            if let Some(body) = host.rigidbody_mut(reg.handle) {
                body.integrate_velocity(dt, was, stick);
            }
        }

        let displacements: Vec<Vec3> = self
            .registered
            .iter()
            .map(|reg| {
                let velocity = match host.rigidbody(reg.handle) {
                    Some(body) if body.is_movable() => body.velocity,
                    _ => return Vec3::ZERO,
                };
                let delta = velocity * dt;
                if delta != Vec3::ZERO && host.translate(reg.handle, reg.anchor, delta) {
                    delta
                } else {
                    Vec3::ZERO
                }
            })
            .collect();

        for (reg, &displacement) in self.registered.iter().zip(&displacements) {
            let Some(aabb) = world_aabb(host, reg.handle, reg.anchor) else {
                continue;
            };
            if let Err(err) = self.tree.move_proxy(reg.proxy, aabb, displacement) {
                log::warn!("Broad-phase update for {:?} failed: {}", reg.handle, err);
            }
        }

        let mut candidates: Vec<ProxyId> = Vec::new();
        for i in 0..self.registered.len() {
            let a = self.registered[i];
            let Some(aabb_a) = world_aabb(host, a.handle, a.anchor) else {
                continue;
            };

            candidates.clear();
            self.tree.query(&aabb_a, |proxy| {
                candidates.push(proxy);
                true
            });

            for &proxy in &candidates {
                let b = match self.tree.user_data(proxy) {
                    Ok(handle) => handle,
                    Err(err) => {
                        log::warn!("Pair query for {:?} hit {}", a.handle, err);
                        continue;
                    }
                };
                // Each unordered pair once, never self
                if b <= a.handle {
                    continue;
                }
                let anchor_b = self.anchors.get(&b).copied().unwrap_or_default();
                self.process_pair(host, (a.handle, a.anchor), (b, anchor_b));
            }
        }

        log::trace!(
            "Physics step: {} colliders, {} contacts",
            self.registered.len(),
            self.contacts.len()
        );
    }

    fn process_pair<H>(&mut self, host: &mut H, (a, anchor_a): (K, Anchor), (b, anchor_b): (K, Anchor))
    where
        H: PhysicsHost<Handle = K>,
    {
        let (contact, is_trigger) = {
            let (Some(collider_a), Some(collider_b)) = (host.collider(a), host.collider(b)) else {
                return;
            };
            if !collider_a.filter.collides_with(&collider_b.filter) {
                return;
            }
            let pose_a = collider_a.pose(
                host.world_position(a, anchor_a).unwrap_or(Vec3::ZERO),
                host.world_scale(a, anchor_a),
            );
            let pose_b = collider_b.pose(
                host.world_position(b, anchor_b).unwrap_or(Vec3::ZERO),
                host.world_scale(b, anchor_b),
            );
            let Some(contact) = test_collision(&collider_a.shape, &pose_a, &collider_b.shape, &pose_b) else {
                return;
            };
            (contact, collider_a.is_trigger || collider_b.is_trigger)
        };

        self.contacts.push(CollisionEvent {
            a,
            b,
            contact,
            is_trigger,
        });
        if is_trigger {
            return;
        }

        self.respond(host, a, anchor_a, -contact.normal, contact.penetration);
        self.respond(host, b, anchor_b, contact.normal, contact.penetration);
    }

    fn respond<H>(&self, host: &mut H, handle: K, anchor: Anchor, normal: Vec3, penetration: f32)
    where
        H: PhysicsHost<Handle = K>,
    {
        let threshold = self.config.ground_normal_threshold;
        let correction = host
            .rigidbody_mut(handle)
            .and_then(|body| body.resolve_collision_with_threshold(normal, penetration, threshold));
        if let Some(correction) = correction {
            host.translate(handle, anchor, correction);
        }
    }

    /// Every registered collider whose fat box overlaps `region` and whose layer is in `mask`
    pub fn overlap_aabb<H>(&self, host: &H, region: &Aabb, mask: CollisionLayer) -> Vec<K>
    where
        H: PhysicsHost<Handle = K>,
    {
        let mut hits = Vec::new();
        self.tree.query(region, |proxy| {
            match self.tree.user_data(proxy) {
                Ok(handle) => {
                    if host.collider(handle).is_some_and(|c| c.filter.matches_query(mask)) {
                        hits.push(handle);
                    }
                }
                Err(err) => log::warn!("Overlap query hit {}", err),
            }
            true
        });
        hits
    }

    /// Every registered collider whose fat box overlaps the sphere's bounds
    pub fn overlap_sphere<H>(&self, host: &H, center: Vec3, radius: f32, mask: CollisionLayer) -> Vec<K>
    where
        H: PhysicsHost<Handle = K>,
    {
        self.overlap_aabb(host, &BoundingSphere::new(center, radius).bounds(), mask)
    }

    /// Sweep a sphere along `direction` and report the closest hit
    ///
    /// Each candidate's box is grown by `radius` and ray-tested, so corners
    /// are treated as square. The hit normal is the box axis along which the
    /// hit point lies furthest from the center, relative to the half extent.
    pub fn sphere_sweep<H>(
        &self,
        host: &H,
        start: Vec3,
        direction: Vec3,
        radius: f32,
        max_distance: f32,
        mask: CollisionLayer,
    ) -> Option<SweepHit<K>>
    where
        H: PhysicsHost<Handle = K>,
    {
        let dir = direction.normalized();
        if dir == Vec3::ZERO || max_distance < 0.0 {
            return None;
        }
        let radius = radius.max(0.0);

        let mut candidates: Vec<ProxyId> = Vec::new();
        self.tree.sphere_cast(start, dir, radius, max_distance, |proxy| {
            candidates.push(proxy);
            true
        });

        let mut best: Option<SweepHit<K>> = None;
        for proxy in candidates {
            let handle = match self.tree.user_data(proxy) {
                Ok(handle) => handle,
                Err(err) => {
                    log::warn!("Sweep query hit {}", err);
                    continue;
                }
            };
            let Some(collider) = host.collider(handle) else {
                continue;
            };
            if !collider.filter.matches_query(mask) {
                continue;
            }

            let anchor = self.anchors.get(&handle).copied().unwrap_or_default();
            let position = host.world_position(handle, anchor).unwrap_or(Vec3::ZERO);
            let target = collider
                .world_aabb(position, host.world_scale(handle, anchor))
                .fattened(radius);
            let Some(distance) = target.ray_intersection(start, dir, max_distance) else {
                continue;
            };
            if best.is_some_and(|hit| distance >= hit.distance) {
                continue;
            }

            let point = start + dir * distance;
            best = Some(SweepHit {
                handle,
                distance,
                point,
                normal: approximate_face_normal(&target, point),
            });
        }
        best
    }

    /// Cast a ray and report the closest hit
    pub fn raycast<H>(
        &self,
        host: &H,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: CollisionLayer,
    ) -> Option<SweepHit<K>>
    where
        H: PhysicsHost<Handle = K>,
    {
        self.sphere_sweep(host, origin, direction, RAYCAST_RADIUS, max_distance, mask)
    }
}

fn world_aabb<H: PhysicsHost>(host: &H, handle: H::Handle, anchor: Anchor) -> Option<Aabb> {
    let collider = host.collider(handle)?;
    let position = host.world_position(handle, anchor).unwrap_or(Vec3::ZERO);
    Some(collider.world_aabb(position, host.world_scale(handle, anchor)))
}

fn approximate_face_normal(target: &Aabb, point: Vec3) -> Vec3 {
    let center = target.center();
    let half = target.half_extents();

    let mut normal = Vec3::Y;
    let mut best = f32::NEG_INFINITY;
    for axis in Axis::ALL {
        let extent = half.get(axis);
        if extent <= 0.0 {
            continue;
        }
        let ratio = (point.get(axis) - center.get(axis)) / extent;
        if ratio.abs() > best {
            best = ratio.abs();
            normal = if ratio < 0.0 { -axis.unit() } else { axis.unit() };
        }
    }
    normal
}
