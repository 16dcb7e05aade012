//! Configuration for the orrery viewer.
//!
//! Settings persist to disk as `config.ron`, may be overridden from the
//! command line via clap, and tolerate missing or unknown fields so older and
//! newer files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BodyConfig, CameraConfig, Config, DebugConfig, RenderConfig, SceneConfig, WindowConfig,
    default_config_dir,
};
pub use error::ConfigError;
