//! Serializable collider templates
//!
//! ShapeTemplate provides a serializable representation of collider shapes.
//! Each variant stores the parameters needed to construct a
//! [`ColliderShape`] and is tagged with a `type` field in scene files.
//!
//! All shapes are created in **local space**. The entity transform (and the
//! collider offset) place them in world space.

use broadleaf_math::{Axis, Vec3};
use broadleaf_physics::{
    Aabb, BoundingCapsule, BoundingSphere, Collider, ColliderShape, CollisionFilter, CollisionLayer, TriangleMesh,
};
use serde::{Deserialize, Serialize};

/// Serializable shape template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeTemplate {
    /// An axis-aligned box centered at the origin
    Box {
        /// Half of the box size along each axis
        half_extents: Vec3,
    },
    /// A sphere centered at the origin
    Sphere { radius: f32 },
    /// A capsule centered at the origin
    Capsule {
        radius: f32,
        /// Distance from the center to each hemisphere center
        half_height: f32,
        #[serde(default, with = "axis_name")]
        axis: Axis,
    },
    /// A square floor on the XZ plane, facing +Y
    Floor {
        /// Local height of the floor surface
        y: f32,
        /// Half-extent in X and Z (total size is 2*half_size)
        half_size: f32,
    },
    /// An arbitrary triangle soup
    Mesh { vertices: Vec<Vec3>, indices: Vec<u32> },
}

impl ShapeTemplate {
    /// Create the actual shape from this template
    pub fn create_shape(&self) -> ColliderShape {
        match self {
            ShapeTemplate::Box { half_extents } => Aabb::from_center_half_extents(Vec3::ZERO, *half_extents).into(),
            ShapeTemplate::Sphere { radius } => BoundingSphere::new(Vec3::ZERO, *radius).into(),
            ShapeTemplate::Capsule {
                radius,
                half_height,
                axis,
            } => BoundingCapsule::new(Vec3::ZERO, *radius, *half_height, *axis).into(),
            ShapeTemplate::Floor { y, half_size } => TriangleMesh::quad_xz(*y, *half_size).into(),
            ShapeTemplate::Mesh { vertices, indices } => TriangleMesh::new(vertices.clone(), indices.clone()).into(),
        }
    }

    /// Create a box template from its full size
    pub fn cube(size: f32) -> Self {
        ShapeTemplate::Box {
            half_extents: Vec3::splat(size * 0.5),
        }
    }

    /// Create a sphere template
    pub fn sphere(radius: f32) -> Self {
        ShapeTemplate::Sphere { radius }
    }

    /// Create an upright capsule template
    pub fn capsule(radius: f32, half_height: f32) -> Self {
        ShapeTemplate::Capsule {
            radius,
            half_height,
            axis: Axis::Y,
        }
    }

    /// Create a floor template
    pub fn floor(y: f32, half_size: f32) -> Self {
        ShapeTemplate::Floor { y, half_size }
    }
}

/// Axes are written as "x", "y" or "z"; bare identifiers do not survive the
/// buffering an internally tagged enum goes through.
mod axis_name {
    use broadleaf_math::Axis;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(axis: &Axis, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match axis {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Axis, D::Error> {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            other => Err(D::Error::unknown_variant(other, &["x", "y", "z"])),
        }
    }
}

/// Named collision filter presets, with an escape hatch for raw bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterTemplate {
    #[default]
    Default,
    Player,
    Enemy,
    StaticWorld,
    PlayerProjectile,
    /// Trigger zone detecting the given layer bits
    Trigger { detects: u32 },
    Custom { layer: u32, mask: u32 },
}

impl FilterTemplate {
    /// Resolve to a concrete filter; unknown bits are dropped
    pub fn to_filter(self) -> CollisionFilter {
        match self {
            FilterTemplate::Default => CollisionFilter::default(),
            FilterTemplate::Player => CollisionFilter::player(),
            FilterTemplate::Enemy => CollisionFilter::enemy(),
            FilterTemplate::StaticWorld => CollisionFilter::static_world(),
            FilterTemplate::PlayerProjectile => CollisionFilter::player_projectile(),
            FilterTemplate::Trigger { detects } => CollisionFilter::trigger(CollisionLayer::from_bits_truncate(detects)),
            FilterTemplate::Custom { layer, mask } => CollisionFilter::new(
                CollisionLayer::from_bits_truncate(layer),
                CollisionLayer::from_bits_truncate(mask),
            ),
        }
    }
}

/// A serializable collider: shape plus offset, filter and trigger flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColliderTemplate {
    pub shape: ShapeTemplate,
    /// Translation from the entity position, not scaled
    #[serde(default)]
    pub offset: Vec3,
    #[serde(default)]
    pub filter: FilterTemplate,
    #[serde(default)]
    pub trigger: bool,
}

impl ColliderTemplate {
    pub fn new(shape: ShapeTemplate) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
            filter: FilterTemplate::Default,
            trigger: false,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_filter(mut self, filter: FilterTemplate) -> Self {
        self.filter = filter;
        self
    }

    pub fn as_trigger(mut self) -> Self {
        self.trigger = true;
        self
    }

    /// Build the runtime collider (not yet registered with any world)
    pub fn to_collider(&self) -> Collider {
        let mut collider = Collider::new(self.shape.create_shape())
            .with_offset(self.offset)
            .with_filter(self.filter.to_filter());
        collider.is_trigger = self.trigger;
        collider
    }
}

impl From<ShapeTemplate> for ColliderTemplate {
    fn from(shape: ShapeTemplate) -> Self {
        Self::new(shape)
    }
}
