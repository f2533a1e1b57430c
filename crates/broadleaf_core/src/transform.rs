//! 3D Transform (position and scale)
//!
//! A Transform3D places an entity in world space. Colliders read their
//! world position and scale from it; rotation is not modelled since every
//! collider shape is axis-aligned.

use broadleaf_math::Vec3;
use serde::{Deserialize, Serialize};

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

/// A 3D transform with position and per-axis scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    /// Position in world space
    pub position: Vec3,
    /// Per-axis scale factor
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Create an identity transform (origin, unit scale)
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            scale: Vec3::ONE,
        }
    }

    /// Create a transform with position and scale
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    /// Replace the scale
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Replace the scale with a uniform factor
    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }

    /// Transform a point from local space to world space
    ///
    /// Applies scale, then translation.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        p.component_mul(self.scale) + self.position
    }

    /// Transform a direction from local space to world space (scale only)
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        d.component_mul(self.scale)
    }

    /// Move the transform by `delta`
    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }
}
