//! Headless simulation system
//!
//! Drives a [`World`] with a fixed physics timestep:
//! - Frame time is capped and accumulated
//! - Physics steps in fixed increments
//! - Contacts and moved entities are tallied per frame

use broadleaf_core::{EntityKey, Scene, SceneLoadError, World};

use crate::config::AppConfig;

/// Result of a simulation update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationResult {
    /// Fixed steps taken this frame
    pub steps: u32,
    /// Solid contacts resolved across those steps
    pub contacts: usize,
    /// Trigger overlaps reported across those steps
    pub triggers: usize,
    /// Entities whose position changed
    pub moved: usize,
}

/// Manages the fixed-timestep simulation loop
pub struct SimulationSystem {
    timestep: f32,
    max_frame_time: f32,
    accumulator: f32,
    log_contacts: bool,
}

impl SimulationSystem {
    /// Create a new simulation system
    ///
    /// Non-positive timesteps fall back to 1/60 s.
    pub fn new(timestep: f32, max_frame_time: f32) -> Self {
        let timestep = if timestep > 0.0 { timestep } else { 1.0 / 60.0 };
        Self {
            timestep,
            max_frame_time: max_frame_time.max(timestep),
            accumulator: 0.0,
            log_contacts: false,
        }
    }

    /// Create a simulation system from application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let mut system = Self::new(config.simulation.timestep, config.simulation.max_frame_time);
        system.log_contacts = config.debug.log_contacts;
        system
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Time carried over to the next frame
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Run one frame of `frame_time` seconds
    pub fn update(&mut self, world: &mut World, frame_time: f32) -> SimulationResult {
        // Cap frame time so a long stall does not queue a burst of steps
        self.accumulator += frame_time.clamp(0.0, self.max_frame_time);
        world.clear_dirty();

        let mut result = SimulationResult::default();
        while self.accumulator >= self.timestep {
            world.update(self.timestep);
            self.accumulator -= self.timestep;
            result.steps += 1;

            for event in world.contacts() {
                if event.is_trigger {
                    result.triggers += 1;
                } else {
                    result.contacts += 1;
                }
                if self.log_contacts {
                    log::debug!(
                        "{} {} <-> {} (depth {:.4})",
                        if event.is_trigger { "Trigger" } else { "Contact" },
                        entity_label(world, event.a),
                        entity_label(world, event.b),
                        event.contact.penetration
                    );
                }
            }
        }

        result.moved = world.dirty_entities().len();
        result
    }
}

impl Default for SimulationSystem {
    fn default() -> Self {
        Self::new(1.0 / 60.0, 0.25)
    }
}

/// Name of an entity for logs, falling back to its key
pub fn entity_label(world: &World, key: EntityKey) -> String {
    match world.get(key).and_then(|e| e.name.as_deref()) {
        Some(name) => name.to_string(),
        None => format!("{:?}", key),
    }
}

/// Load the configured scene and simulate it for the configured duration
pub fn run(config: &AppConfig) -> Result<World, SceneLoadError> {
    let scene = Scene::load(&config.simulation.scene)?;
    let mut world = scene.instantiate(config.physics.to_physics_config());
    let mut system = SimulationSystem::from_config(config);

    let frames = (config.simulation.duration / system.timestep()).round().max(0.0) as u64;
    let report_every = ((config.simulation.report_interval / system.timestep()).round() as u64).max(1);
    let mut totals = SimulationResult::default();

    for frame in 1..=frames {
        let result = system.update(&mut world, system.timestep());
        totals.steps += result.steps;
        totals.contacts += result.contacts;
        totals.triggers += result.triggers;

        if frame % report_every == 0 {
            report(&world, frame as f32 * system.timestep());
        }
    }

    log::info!(
        "Simulated {} steps of '{}': {} contacts, {} trigger overlaps",
        totals.steps,
        scene.name,
        totals.contacts,
        totals.triggers
    );
    Ok(world)
}

fn report(world: &World, time: f32) {
    let tree = world.physics().tree();
    log::info!(
        "t={:.2}s: {} entities, tree height {}, {} nodes",
        time,
        world.entity_count(),
        tree.height(),
        tree.node_count()
    );
    for (key, entity) in world.iter() {
        let (Some(position), Some(body)) = (entity.position(), entity.rigidbody.as_ref()) else {
            continue;
        };
        if body.is_static() {
            continue;
        }
        log::info!(
            "  {}: ({:.3}, {:.3}, {:.3}){}",
            entity_label(world, key),
            position.x,
            position.y,
            position.z,
            if body.is_grounded() { " grounded" } else { "" }
        );
    }
}
