//! Broadleaf - headless physics runner
//!
//! Loads the configured scene, steps it with a fixed timestep and logs the
//! state of every moving body.

use broadleaf::config::AppConfig;
use broadleaf::simulation;

fn main() {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.debug.log_level.as_str())).init();
    log::info!("Starting Broadleaf");
    log::debug!("Configuration: {:?}", config);

    match simulation::run(&config) {
        Ok(world) => {
            log::info!(
                "Finished with {} entities and {} registered colliders",
                world.entity_count(),
                world.physics().registered_count()
            );
        }
        Err(e) => {
            log::error!("Failed to load scene {}: {}", config.simulation.scene.display(), e);
            std::process::exit(1);
        }
    }
}
