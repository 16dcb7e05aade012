//! Orrery application: simulation clock, scene, keyboard actions, the
//! solar-system renderer and the winit event loop that ties them together.

pub mod clock;
pub mod input;
pub mod renderer;
pub mod scene;
pub mod window;

pub use clock::{FrameRate, SimulationClock};
pub use input::ViewerAction;
pub use renderer::{RenderTarget, RendererError, SolarSystemRenderer};
pub use scene::{BodyAppearance, Scene, SceneError};
pub use window::{AppState, run_with_config};

use std::path::Path;

use orrery_config::{Config, ConfigError};
use orrery_mesh::SphereMesh;

/// Load `config.ron` from `config_dir`, creating it when missing.
///
/// I/O failures fall back to the defaults so a read-only or absent config
/// directory still starts the viewer. A file that exists but does not parse
/// is an error: its resolution or bodies cannot be trusted.
pub fn load_config(config_dir: &Path) -> Result<Config, ConfigError> {
    match Config::load_or_create(config_dir) {
        Ok(config) => Ok(config),
        Err(e @ ConfigError::Parse { .. }) => Err(e),
        Err(e) => {
            // Logging is not up yet; it needs the config for its filter.
            eprintln!("Failed to load config: {e}, using defaults");
            Ok(Config::default())
        }
    }
}

/// Validate the configured scene and generate the shared sphere.
///
/// Runs before any window exists so a bad resolution or body fails fast.
pub fn prepare_scene(config: &Config) -> Result<(Scene, SphereMesh), SceneError> {
    let sphere = SphereMesh::generate(config.render.sphere_resolution)?;
    let scene = Scene::from_config(&config.scene)?;
    Ok((scene, sphere))
}
