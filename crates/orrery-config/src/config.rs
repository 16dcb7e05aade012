//! Configuration structs with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub camera: CameraConfig,
    pub scene: SceneConfig,
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Stacks and sectors of the shared sphere mesh.
    pub sphere_resolution: u32,
    /// Start with polygon-mode line instead of fill.
    pub wireframe: bool,
    /// Linear RGB background colour.
    pub clear_color: [f32; 3],
    pub ambient_color: [f32; 3],
    pub light_color: [f32; 3],
    /// Blinn-Phong specular exponent.
    pub shininess: f32,
    /// Directory that body texture paths are resolved against.
    pub texture_dir: PathBuf,
    /// Directory holding `planet.wgsl`; when set the shader is read from disk
    /// and can be reloaded at runtime.
    pub shader_dir: Option<PathBuf>,
}

/// Camera placement and projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

/// Simulation and scene content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Simulation seconds per wall-clock second.
    pub time_scale: f64,
    pub start_paused: bool,
    /// Bodies in registration order; a parent must precede its children.
    pub bodies: Vec<BodyConfig>,
}

/// One celestial body as written in the config file.
///
/// Periods are seconds of simulation time. Zero disables the motion. A
/// positive orbit period orbits clockwise seen from above and a negative one
/// counter-clockwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    pub name: String,
    /// Name of the body this one orbits; `None` orbits the origin.
    pub parent: Option<String>,
    pub size: f64,
    pub orbit_radius: f64,
    pub orbit_period: f64,
    pub spin_period: f64,
    pub axial_tilt_deg: f64,
    /// Spin clockwise seen from above the north pole.
    pub retrograde: bool,
    /// Keep one face towards the parent; `spin_period` and `retrograde` are
    /// ignored.
    pub tidally_locked: bool,
    /// Linear RGB base colour, used when no texture is set or it fails to load.
    pub color: [f32; 3],
    /// Albedo texture relative to `render.texture_dir`.
    pub texture: Option<PathBuf>,
    /// Rendered unlit at full brightness and used as the light position.
    pub emissive: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log frames per second once a second.
    pub show_fps: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            fullscreen: false,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sphere_resolution: 32,
            wireframe: false,
            clear_color: [0.7, 0.7, 0.7],
            ambient_color: [0.4, 0.4, 0.4],
            light_color: [1.0, 1.0, 1.0],
            shininess: 32.0,
            texture_dir: PathBuf::from("assets/textures"),
            shader_dir: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 5.0, 20.0],
            target: [0.0, 0.0, 0.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 80.1,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            start_paused: false,
            bodies: default_bodies(),
        }
    }
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent: None,
            size: 1.0,
            orbit_radius: 0.0,
            orbit_period: 0.0,
            spin_period: 0.0,
            axial_tilt_deg: 0.0,
            retrograde: false,
            tidally_locked: false,
            color: [1.0, 1.0, 1.0],
            texture: None,
            emissive: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_fps: false,
            log_level: "info".to_string(),
        }
    }
}

fn default_bodies() -> Vec<BodyConfig> {
    vec![
        BodyConfig {
            name: "sun".into(),
            color: [1.0, 1.0, 0.0],
            emissive: true,
            ..Default::default()
        },
        BodyConfig {
            name: "earth".into(),
            parent: Some("sun".into()),
            size: 0.5,
            orbit_radius: 10.0,
            orbit_period: 20.0,
            spin_period: 10.0,
            axial_tilt_deg: 23.5,
            color: [0.2, 0.4, 0.9],
            texture: Some(PathBuf::from("earth.jpg")),
            ..Default::default()
        },
        BodyConfig {
            name: "moon".into(),
            parent: Some("earth".into()),
            size: 0.25,
            orbit_radius: 2.0,
            orbit_period: 5.0,
            tidally_locked: true,
            color: [0.6, 0.6, 0.6],
            texture: Some(PathBuf::from("moon.jpg")),
            ..Default::default()
        },
        BodyConfig {
            name: "venus".into(),
            parent: Some("sun".into()),
            size: 0.45,
            orbit_radius: 7.0,
            orbit_period: 12.0,
            spin_period: 40.0,
            axial_tilt_deg: 2.6,
            retrograde: true,
            color: [0.9, 0.75, 0.45],
            ..Default::default()
        },
        BodyConfig {
            name: "mars".into(),
            parent: Some("sun".into()),
            size: 0.3,
            orbit_radius: 15.0,
            orbit_period: 38.0,
            spin_period: 10.3,
            axial_tilt_deg: 25.2,
            color: [0.8, 0.35, 0.2],
            ..Default::default()
        },
    ]
}

/// Platform config directory for the viewer, e.g. `~/.config/orrery`.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("orrery")
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(false)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        let path = config_dir.join(CONFIG_FILE);
        std::fs::write(&path, serialized).map_err(|source| ConfigError::Write { path, source })
    }

    /// Re-read the file; `Some` only when its contents differ from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("width: 1024"));
        assert!(ron_str.contains("sphere_resolution: 32"));
        assert!(ron_str.contains("\"earth\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(window: (), render: ())").unwrap();
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.scene.bodies.len(), 5);
    }

    #[test]
    fn test_partial_body_uses_field_defaults() {
        let ron_str = r#"(scene: (bodies: [(name: "lonely", size: 2.0)]))"#;
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.scene.bodies.len(), 1);
        let body = &config.scene.bodies[0];
        assert_eq!(body.size, 2.0);
        assert_eq!(body.orbit_radius, 0.0);
        assert_eq!(body.parent, None);
        assert!(!body.emissive);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_scene_matches_classic_layout() {
        let scene = SceneConfig::default();
        let names: Vec<&str> = scene.bodies.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["sun", "earth", "moon", "venus", "mars"]);
        assert!(scene.bodies[0].emissive);
        assert!(scene.bodies[2].tidally_locked);
        assert!(scene.bodies[3].retrograde);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.render.wireframe = true;
        config.scene.bodies.truncate(3);

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("orrery");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(nested.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.scene.time_scale = 4.0;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.map(|c| c.scene.time_scale), Some(4.0));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_ron_comments_accepted() {
        let ron_str = "// orrery settings\n(\n  // nothing overridden\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
