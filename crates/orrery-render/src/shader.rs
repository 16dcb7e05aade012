//! Named shader module cache with file-backed reload.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("shader file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read shader file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("shader '{name}' was not loaded from a file")]
    NotFileBacked { name: String },

    #[error("no shader directory configured for file-based loading")]
    NoShaderDir,

    /// The device rejected the module or a pipeline built from it.
    #[error("shader '{name}' failed validation: {message}")]
    Validation { name: String, message: String },
}

/// Compiled shader modules keyed by name.
#[derive(Default)]
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
    /// Source file per file-backed shader, for [`reload`](Self::reload).
    files: HashMap<String, PathBuf>,
    shader_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that [`load_from_file`](Self::load_from_file) resolves against.
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    /// Compile WGSL source and cache it under `name`, replacing any previous module.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Arc<wgpu::ShaderModule> {
        debug!("Compiling shader '{name}'");
        let module = Arc::new(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        }));

        if self
            .modules
            .insert(name.to_string(), Arc::clone(&module))
            .is_some()
        {
            info!("Replaced shader '{name}'");
        } else {
            info!("Loaded shader '{name}'");
        }
        module
    }

    /// Read `filename` from the shader directory and compile it.
    pub fn load_from_file(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        filename: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let shader_dir = self.shader_dir.as_ref().ok_or(ShaderError::NoShaderDir)?;
        let path = shader_dir.join(filename);
        let source = read_source(&path)?;
        self.files.insert(name.to_string(), path);
        Ok(self.load_from_source(device, name, &source))
    }

    /// Load `filename` from the shader directory when one is configured and
    /// the file exists, otherwise compile the embedded `fallback` source.
    pub fn load_or_embedded(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        filename: &str,
        fallback: &str,
    ) -> Arc<wgpu::ShaderModule> {
        match self.load_from_file(device, name, filename) {
            Ok(module) => module,
            Err(err) => {
                debug!("Using embedded source for shader '{name}': {err}");
                self.load_from_source(device, name, fallback)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }

    /// Re-read a file-backed shader from disk and recompile it.
    pub fn reload(
        &mut self,
        device: &wgpu::Device,
        name: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let path = self
            .files
            .get(name)
            .cloned()
            .ok_or_else(|| ShaderError::NotFileBacked {
                name: name.to_string(),
            })?;
        info!("Reloading shader '{name}' from {}", path.display());
        let source = read_source(&path)?;
        Ok(self.load_from_source(device, name, &source))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn read_source(path: &std::path::Path) -> Result<String, ShaderError> {
    if !path.exists() {
        return Err(ShaderError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}
