//! The `orrery` binary: an animated sun, earth and moon.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags, e.g. `orrery --resolution 64 --time-scale 4 --wireframe`.

use clap::Parser;
use orrery_app::{load_config, prepare_scene, run_with_config};
use orrery_config::{CliArgs, default_config_dir};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = match load_config(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Refusing to start: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    orrery_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));
    info!("Config directory: {}", config_dir.display());

    let (scene, sphere) = match prepare_scene(&config) {
        Ok(prepared) => prepared,
        Err(e) => {
            error!("Invalid scene: {e}");
            std::process::exit(1);
        }
    };
    info!(
        "Sphere resolution {} ({} triangles), {} bodies",
        sphere.stacks(),
        sphere.triangle_count(),
        scene.len()
    );

    if let Err(e) = run_with_config(config, config_dir, scene, sphere) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
