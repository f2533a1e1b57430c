//! Scene serialization
//!
//! Provides Scene struct for loading/saving scenes from RON files.
//! Scenes contain entity templates and an optional gravity override.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use broadleaf_math::Vec3;
use broadleaf_physics::PhysicsConfig;

use crate::entity::EntityTemplate;
use crate::World;

/// A serializable scene containing entity templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name (for display/debugging)
    pub name: String,
    /// Entity templates in this scene
    pub entities: Vec<EntityTemplate>,
    /// Gravity override for this scene's physics
    #[serde(default)]
    pub gravity: Option<Vec3>,
}

impl Scene {
    /// Create a new empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
            gravity: None,
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a scene from RON text
    pub fn from_ron_str(contents: &str) -> Result<Self, SceneLoadError> {
        Ok(ron::from_str(contents)?)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let contents = self.to_ron_string()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Serialize this scene as pretty-printed RON
    pub fn to_ron_string(&self) -> Result<String, SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Add an entity template to this scene
    pub fn add_entity(&mut self, entity: EntityTemplate) {
        self.entities.push(entity);
    }

    /// Set the gravity for this scene
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Physics configuration for this scene, starting from `base`
    pub fn physics_config(&self, base: PhysicsConfig) -> PhysicsConfig {
        match self.gravity {
            Some(gravity) => PhysicsConfig { gravity, ..base },
            None => base,
        }
    }

    /// Build a world containing every entity of this scene
    ///
    /// Colliders are registered in template order, which fixes the order
    /// contact pairs are resolved in.
    pub fn instantiate(&self, base: PhysicsConfig) -> World {
        let mut world = World::with_config(self.physics_config(base));
        for template in &self.entities {
            let entity = template.to_entity(world.physics_config());
            world.spawn(entity);
        }
        log::info!(
            "Instantiated scene '{}': {} entities, {} colliders",
            self.name,
            world.entity_count(),
            world.physics().registered_count()
        );
        world
    }
}

/// Error loading a scene
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneLoadError::Io(e) => Some(e),
            SceneLoadError::Parse(e) => Some(e),
        }
    }
}

/// Error saving a scene
#[derive(Debug)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl std::fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BodyTemplate;
    use crate::shapes::{ColliderTemplate, FilterTemplate, ShapeTemplate};
    use crate::Transform3D;

    fn demo_scene() -> Scene {
        let mut scene = Scene::new("Test Scene").with_gravity(Vec3::new(0.0, -20.0, 0.0));
        scene.add_entity(
            EntityTemplate::new(Transform3D::from_position(Vec3::new(0.0, -1.0, 0.0)))
                .with_name("floor")
                .with_tag("static")
                .with_collider(
                    ColliderTemplate::new(ShapeTemplate::Box {
                        half_extents: Vec3::new(10.0, 1.0, 10.0),
                    })
                    .with_filter(FilterTemplate::StaticWorld),
                ),
        );
        scene.add_entity(
            EntityTemplate::new(Transform3D::from_position(Vec3::new(0.0, 3.0, 0.0)))
                .with_name("ball")
                .with_tag("dynamic")
                .with_collider(ShapeTemplate::sphere(0.5))
                .with_rigidbody(BodyTemplate::dynamic()),
        );
        scene
    }

    #[test]
    fn test_scene_new() {
        let scene = Scene::new("Test Scene");
        assert_eq!(scene.name, "Test Scene");
        assert!(scene.entities.is_empty());
        assert!(scene.gravity.is_none());
    }

    #[test]
    fn test_scene_gravity_overrides_config() {
        let scene = Scene::new("Test").with_gravity(Vec3::new(0.0, -20.0, 0.0));
        let config = scene.physics_config(PhysicsConfig::default());
        assert_eq!(config.gravity, Vec3::new(0.0, -20.0, 0.0));
        assert_eq!(config.fat_margin, PhysicsConfig::default().fat_margin);

        let plain = Scene::new("Plain").physics_config(PhysicsConfig::default());
        assert_eq!(plain.gravity, PhysicsConfig::default().gravity);
    }

    #[test]
    fn test_scene_serialization() {
        let scene = demo_scene();
        let serialized = scene.to_ron_string().unwrap();

        assert!(serialized.contains("Test Scene"));
        assert!(serialized.contains("ball"));
        assert!(serialized.contains("Sphere"));

        let deserialized = Scene::from_ron_str(&serialized).unwrap();
        assert_eq!(deserialized, scene);
    }

    #[test]
    fn test_parse_scene_file_format() {
        let scene_ron = r#"
Scene(
    name: "Test Scene",
    gravity: Some((x: 0.0, y: -20.0, z: 0.0)),
    entities: [
        EntityTemplate(
            name: Some("floor"),
            tags: ["static"],
            transform: Some(Transform3D(
                position: Vec3(x: 0.0, y: 0.0, z: 0.0),
            )),
            collider: Some(ColliderTemplate(
                shape: ShapeTemplate(
                    type: "Floor",
                    y: 0.0,
                    half_size: 10.0,
                ),
                filter: StaticWorld,
            )),
        ),
        EntityTemplate(
            name: Some("player"),
            tags: ["player"],
            camera: Some((x: 0.0, y: 1.7, z: 0.0)),
            collider: Some(ColliderTemplate(
                shape: ShapeTemplate(
                    type: "Capsule",
                    radius: 0.4,
                    half_height: 0.5,
                ),
                filter: Player,
            )),
            rigidbody: Some(BodyTemplate(
                body_type: Kinematic,
            )),
        ),
        EntityTemplate(
            name: Some("zone"),
            transform: Some(Transform3D(
                position: (x: 5.0, y: 1.0, z: 0.0),
                scale: (x: 2.0, y: 2.0, z: 2.0),
            )),
            collider: Some(ColliderTemplate(
                shape: ShapeTemplate(type: "Sphere", radius: 1.0),
                filter: Trigger(detects: 2),
                trigger: true,
            )),
        ),
    ],
)
"#;
        let scene = Scene::from_ron_str(scene_ron).unwrap();
        assert_eq!(scene.name, "Test Scene");
        assert_eq!(scene.gravity, Some(Vec3::new(0.0, -20.0, 0.0)));
        assert_eq!(scene.entities.len(), 3);

        let floor = &scene.entities[0];
        assert_eq!(floor.name, Some("floor".to_string()));
        assert_eq!(floor.tags, vec!["static"]);
        match &floor.collider.as_ref().unwrap().shape {
            ShapeTemplate::Floor { y, half_size } => {
                assert_eq!(*y, 0.0);
                assert_eq!(*half_size, 10.0);
            }
            other => panic!("Expected Floor shape, got {:?}", other),
        }

        let player = &scene.entities[1];
        assert!(player.transform.is_none());
        assert_eq!(player.camera, Some(Vec3::new(0.0, 1.7, 0.0)));
        assert_eq!(player.rigidbody.as_ref().unwrap().body_type, broadleaf_physics::BodyType::Kinematic);

        let zone = &scene.entities[2];
        assert_eq!(zone.transform.unwrap().scale, Vec3::splat(2.0));
        assert!(zone.collider.as_ref().unwrap().trigger);
    }

    #[test]
    fn test_parse_error() {
        let result = Scene::from_ron_str("Scene(name: \"broken\", entities: [");
        match result {
            Err(SceneLoadError::Parse(_)) => {}
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = Scene::load("/nonexistent/path/to/scene.ron");
        assert!(matches!(result, Err(SceneLoadError::Io(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("broadleaf_scene_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.ron");

        let scene = demo_scene();
        scene.save(&path).unwrap();
        let loaded = Scene::load(&path).unwrap();
        assert_eq!(loaded, scene);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_instantiate_registers_colliders() {
        let world = demo_scene().instantiate(PhysicsConfig::default());
        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.physics().registered_count(), 2);
        assert_eq!(world.physics_config().gravity, Vec3::new(0.0, -20.0, 0.0));

        let (_, ball) = world.get_by_name("ball").unwrap();
        assert_eq!(ball.rigidbody.as_ref().unwrap().gravity, Vec3::new(0.0, -20.0, 0.0));
    }

    #[test]
    fn test_instantiated_world_steps() {
        let mut world = demo_scene().instantiate(PhysicsConfig::default());
        world.update(1.0 / 60.0);

        let (_, ball) = world.get_by_name("ball").unwrap();
        assert!(ball.position().unwrap().y < 3.0);
    }
}
