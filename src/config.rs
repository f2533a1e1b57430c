//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`BLF_SECTION__KEY`)

use broadleaf_core::Vec3;
use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Simulation loop configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`BLF_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // BLF_SIMULATION__DURATION=10 -> simulation.duration = 10.0
        figment = figment.merge(Env::prefixed("BLF_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration [x, y, z]
    pub gravity: [f32; 3],
    /// Broad-phase box inflation
    pub fat_margin: f32,
    /// Predictive box extension, as a multiple of displacement
    pub displacement_multiplier: f32,
    /// Minimum normal Y for a contact to count as ground
    pub ground_normal_threshold: f32,
    /// Downward bias kept on grounded bodies
    pub grounded_stick_velocity: f32,
    /// Maximum fall speed
    pub terminal_velocity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let defaults = broadleaf_core::PhysicsConfig::default();
        Self {
            gravity: defaults.gravity.to_array(),
            fat_margin: defaults.fat_margin,
            displacement_multiplier: defaults.displacement_multiplier,
            ground_normal_threshold: defaults.ground_normal_threshold,
            grounded_stick_velocity: defaults.grounded_stick_velocity,
            terminal_velocity: defaults.terminal_velocity,
        }
    }
}

impl PhysicsConfig {
    /// Convert to the physics crate's configuration
    pub fn to_physics_config(&self) -> broadleaf_core::PhysicsConfig {
        broadleaf_core::PhysicsConfig {
            gravity: Vec3::from_array(self.gravity),
            fat_margin: self.fat_margin,
            displacement_multiplier: self.displacement_multiplier,
            ground_normal_threshold: self.ground_normal_threshold,
            grounded_stick_velocity: self.grounded_stick_velocity,
            terminal_velocity: self.terminal_velocity,
        }
    }
}

/// Simulation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Scene file to load
    pub scene: PathBuf,
    /// Fixed physics timestep in seconds
    pub timestep: f32,
    /// Longest frame fed to the accumulator, in seconds
    pub max_frame_time: f32,
    /// Simulated time to run for, in seconds
    pub duration: f32,
    /// Seconds between progress reports
    pub report_interval: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scene: PathBuf::from("scenes/demo.ron"),
            timestep: 1.0 / 60.0,
            max_frame_time: 0.25,
            duration: 5.0,
            report_interval: 1.0,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Log every collision event at debug level
    pub log_contacts: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_contacts: false,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
