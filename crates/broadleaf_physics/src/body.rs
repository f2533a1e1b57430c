//! Rigid body state and collision response
//!
//! A [`RigidBody`] holds velocity and contact classification for one
//! collider. It does not store a position: the owning entity's transform is
//! the single source of truth, and the physics world moves it through the
//! host. Collision response therefore returns the positional correction for
//! the caller to apply.

use broadleaf_math::Vec3;
use serde::{Deserialize, Serialize};

/// Default gravity acceleration
pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);
/// Fastest allowed fall speed
pub const DEFAULT_TERMINAL_VELOCITY: f32 = 50.0;
/// Contacts whose normal has a larger Y component count as ground (about 45 degrees)
pub const DEFAULT_GROUND_NORMAL_THRESHOLD: f32 = 0.7;
/// Downward speed kept while grounded so the ground contact is found again next step
pub const DEFAULT_GROUNDED_STICK_VELOCITY: f32 = 0.5;

/// How a body takes part in the simulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyType {
    /// Never moves and never receives a response
    Static,
    /// Moves by its own velocity, ignores gravity, receives position correction only
    Kinematic,
    /// Fully simulated: gravity, position correction and velocity response
    #[default]
    Dynamic,
}

/// Per-object velocity and contact state
#[derive(Clone, Debug, PartialEq)]
pub struct RigidBody {
    pub body_type: BodyType,
    /// Velocity in units per second
    pub velocity: Vec3,
    /// Gravity acceleration applied while airborne
    pub gravity: Vec3,
    pub use_gravity: bool,
    mass: f32,
    /// Fall speed is clamped to this value
    pub terminal_velocity: f32,
    grounded: bool,
    had_collision: bool,
    last_collision_normal: Vec3,
    had_ground_collision: bool,
    ground_normal: Vec3,
    had_wall_collision: bool,
    wall_normal: Vec3,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(BodyType::Dynamic)
    }
}

impl RigidBody {
    /// Create a body at rest with default gravity
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            velocity: Vec3::ZERO,
            gravity: DEFAULT_GRAVITY,
            use_gravity: body_type == BodyType::Dynamic,
            mass: 1.0,
            terminal_velocity: DEFAULT_TERMINAL_VELOCITY,
            grounded: false,
            had_collision: false,
            last_collision_normal: Vec3::ZERO,
            had_ground_collision: false,
            ground_normal: Vec3::Y,
            had_wall_collision: false,
            wall_normal: Vec3::ZERO,
        }
    }

    pub fn dynamic() -> Self {
        Self::new(BodyType::Dynamic)
    }

    pub fn kinematic() -> Self {
        Self::new(BodyType::Kinematic)
    }

    /// A body that never moves
    pub fn fixed() -> Self {
        Self::new(BodyType::Static)
    }

    /// Set the velocity of this body
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the mass of this body (values at or below zero are ignored)
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.set_mass(mass);
        self
    }

    /// Set the gravity vector of this body
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set whether this body is affected by gravity
    pub fn with_use_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    pub fn with_terminal_velocity(mut self, terminal_velocity: f32) -> Self {
        self.terminal_velocity = terminal_velocity.abs();
        self
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f32) {
        if mass > 0.0 {
            self.mass = mass;
        }
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// Whether the body may be moved by velocity integration
    pub fn is_movable(&self) -> bool {
        self.body_type != BodyType::Static
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn set_grounded(&mut self, grounded: bool) {
        self.grounded = grounded;
    }

    /// Check if the body is currently in the air (not grounded)
    pub fn is_airborne(&self) -> bool {
        !self.grounded
    }

    pub fn had_collision(&self) -> bool {
        self.had_collision
    }

    pub fn last_collision_normal(&self) -> Vec3 {
        self.last_collision_normal
    }

    pub fn had_ground_collision(&self) -> bool {
        self.had_ground_collision
    }

    /// Last ground normal seen; survives `clear_collision_state`
    pub fn ground_normal(&self) -> Vec3 {
        self.ground_normal
    }

    pub fn had_wall_collision(&self) -> bool {
        self.had_wall_collision
    }

    pub fn wall_normal(&self) -> Vec3 {
        self.wall_normal
    }

    /// Reset the per-step contact flags
    pub fn clear_collision_state(&mut self) {
        self.grounded = false;
        self.had_collision = false;
        self.last_collision_normal = Vec3::ZERO;
        self.had_ground_collision = false;
        self.had_wall_collision = false;
        self.wall_normal = Vec3::ZERO;
    }

    /// Apply gravity and the grounded bias for one step
    ///
    /// `was_grounded` is the grounded state from before this step's reset.
    /// Only dynamic bodies are affected.
    pub fn integrate_velocity(&mut self, dt: f32, was_grounded: bool, stick_velocity: f32) {
        if self.body_type != BodyType::Dynamic {
            return;
        }

        if self.use_gravity {
            if was_grounded {
                // Jumps keep their upward speed
                if self.velocity.y <= 0.0 {
                    self.velocity.y = -stick_velocity;
                }
            } else {
                self.velocity += self.gravity * dt;
            }
        }

        if self.velocity.y < -self.terminal_velocity {
            self.velocity.y = -self.terminal_velocity;
        }
    }

    /// Respond to a contact using the default ground threshold
    pub fn resolve_collision(&mut self, normal: Vec3, penetration: f32) -> Option<Vec3> {
        self.resolve_collision_with_threshold(normal, penetration, DEFAULT_GROUND_NORMAL_THRESHOLD)
    }

    /// Respond to a contact whose normal points away from the other shape
    ///
    /// Returns the positional correction `normal * penetration` for the
    /// caller to apply, or `None` for static bodies. Dynamic bodies also
    /// classify the contact: a normal with `y > ground_threshold` grounds the
    /// body and removes downward velocity, anything else is a wall and
    /// removes the velocity component into the wall.
    pub fn resolve_collision_with_threshold(
        &mut self,
        normal: Vec3,
        penetration: f32,
        ground_threshold: f32,
    ) -> Option<Vec3> {
        if self.is_static() {
            return None;
        }

        self.had_collision = true;
        self.last_collision_normal = normal;
        let correction = normal * penetration;

        if self.body_type == BodyType::Dynamic {
            if normal.y > ground_threshold {
                self.had_ground_collision = true;
                self.ground_normal = normal;
                self.grounded = true;
                if self.velocity.y < 0.0 {
                    self.velocity.y = 0.0;
                }
            } else {
                self.had_wall_collision = true;
                self.wall_normal = normal;
                let into_wall = self.velocity.dot(normal);
                if into_wall < 0.0 {
                    self.velocity -= normal * into_wall;
                }
            }
        }

        Some(correction)
    }

    /// Apply horizontal movement input to velocity (XZ plane only)
    ///
    /// The Y component of `movement` is ignored to prevent flying via movement input.
    pub fn apply_movement(&mut self, movement: Vec3) {
        self.velocity.x = movement.x;
        self.velocity.z = movement.z;
    }

    /// Attempt to jump if grounded
    ///
    /// Returns whether the jump happened.
    pub fn jump(&mut self, speed: f32) -> bool {
        if self.grounded && self.body_type == BodyType::Dynamic {
            self.velocity.y = speed;
            self.grounded = false;
            true
        } else {
            false
        }
    }
}
