//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: the window and GPU
//! are created on `resumed`, each redraw advances the clock, updates the
//! scene once and renders it, and another redraw is requested right away.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use orrery_config::{CameraConfig, Config};
use orrery_mesh::SphereMesh;
use orrery_render::{
    Camera, PolygonMode, RenderContext, RenderContextError, SurfaceError,
    init_render_context_blocking,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::clock::{FrameRate, SimulationClock};
use crate::input::ViewerAction;
use crate::renderer::{RenderTarget, RendererError, SolarSystemRenderer};
use crate::scene::Scene;

#[derive(Debug, thiserror::Error)]
enum InitError {
    #[error("GPU initialization failed: {0}")]
    Gpu(#[from] RenderContextError),

    #[error("renderer initialization failed: {0}")]
    Renderer(#[from] RendererError),

    #[error("sphere geometry was already handed to a renderer")]
    SphereConsumed,
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
        .with_fullscreen(
            config
                .window
                .fullscreen
                .then_some(Fullscreen::Borderless(None)),
        )
}

/// Camera described by `config`, with the aspect ratio of the window.
pub fn camera_from_config(config: &CameraConfig, width: u32, height: u32) -> Camera {
    let mut camera = Camera::look_at(Vec3::from(config.position), Vec3::from(config.target));
    camera.fov_y = config.fov_degrees.to_radians();
    camera.near = config.near;
    camera.far = config.far;
    camera.set_aspect_ratio(width as f32, height as f32);
    camera
}

/// Everything the running viewer owns.
pub struct AppState {
    pub config: Config,
    /// Directory of `config.ron`, for [`ViewerAction::ReloadConfig`].
    config_dir: Option<PathBuf>,
    pub scene: Scene,
    /// Generated geometry waiting for the GPU; moved into the renderer on
    /// `resumed`.
    sphere: Option<SphereMesh>,
    pub window: Option<Arc<Window>>,
    pub gpu: Option<RenderContext>,
    pub renderer: Option<SolarSystemRenderer>,
    pub camera: Camera,
    pub clock: SimulationClock,
    pub polygon_mode: PolygonMode,
    frame_rate: FrameRate,
    last_frame: Instant,
}

impl AppState {
    /// Build the state from a validated scene and its sphere geometry.
    pub fn new(config: Config, scene: Scene, sphere: SphereMesh) -> Self {
        let camera = camera_from_config(&config.camera, config.window.width, config.window.height);
        let clock = SimulationClock::new(config.scene.time_scale, config.scene.start_paused);
        let polygon_mode = if config.render.wireframe {
            PolygonMode::Line
        } else {
            PolygonMode::Fill
        };

        Self {
            config,
            config_dir: None,
            scene,
            sphere: Some(sphere),
            window: None,
            gpu: None,
            renderer: None,
            camera,
            clock,
            polygon_mode,
            frame_rate: FrameRate::default(),
            last_frame: Instant::now(),
        }
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Re-read `config.ron` and apply what can change while running: time
    /// scale, background and lighting, FPS logging. Window, resolution and
    /// body changes are kept for the next start.
    fn reload_config(&mut self) {
        let Some(dir) = &self.config_dir else {
            warn!("No config directory to reload from");
            return;
        };
        let new_config = match self.config.reload(dir) {
            Ok(Some(config)) => config,
            Ok(None) => {
                info!("Config unchanged");
                return;
            }
            Err(err) => {
                warn!("Config reload failed: {err}");
                return;
            }
        };

        if new_config.scene.time_scale != self.config.scene.time_scale {
            self.clock.set_time_scale(new_config.scene.time_scale);
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.apply_lighting(&new_config.render);
        }
        if new_config.window != self.config.window
            || new_config.scene.bodies != self.config.scene.bodies
            || new_config.render.sphere_resolution != self.config.render.sphere_resolution
        {
            info!("Window, resolution and body changes apply on the next start");
        }
        self.config = new_config;
    }

    /// Apply a keyboard action. Returns `true` when the viewer should exit.
    pub fn apply_action(&mut self, action: ViewerAction) -> bool {
        match action {
            ViewerAction::Quit => {
                info!("Quit requested");
                return true;
            }
            ViewerAction::Wireframe => self.set_polygon_mode(PolygonMode::Line),
            ViewerAction::Fill => self.set_polygon_mode(PolygonMode::Fill),
            ViewerAction::TogglePause => {
                let paused = self.clock.toggle_pause();
                info!(
                    "Simulation {} at t={:.2}s",
                    if paused { "paused" } else { "resumed" },
                    self.clock.elapsed()
                );
            }
            ViewerAction::SpeedUp => {
                info!("Time scale {}", self.clock.scale_time(2.0));
            }
            ViewerAction::SlowDown => {
                info!("Time scale {}", self.clock.scale_time(0.5));
            }
            ViewerAction::ReloadShaders => {
                if let (Some(gpu), Some(renderer)) = (&self.gpu, &mut self.renderer)
                    && let Err(err) = renderer.reload_shaders(&gpu.device)
                {
                    warn!("Shader reload failed: {err}");
                }
            }
            ViewerAction::ReloadConfig => self.reload_config(),
        }
        false
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        let supported = mode == PolygonMode::Fill
            || self
                .renderer
                .as_ref()
                .is_some_and(SolarSystemRenderer::supports_wireframe);
        if supported {
            self.polygon_mode = mode;
            info!("Polygon mode {mode:?}");
        } else {
            warn!("Wireframe is not supported by this GPU");
        }
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width as f32, height as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width, height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, width.max(1), height.max(1));
            }
        }
        debug!("Window resized to {width}x{height}");
    }

    fn initialize_rendering(&mut self, window: Arc<Window>) -> Result<(), InitError> {
        let gpu = init_render_context_blocking(Arc::clone(&window), self.config.window.vsync)?;
        let sphere = self.sphere.take().ok_or(InitError::SphereConsumed)?;
        let renderer = SolarSystemRenderer::new(
            &gpu.device,
            &gpu.queue,
            RenderTarget::from_context(&gpu),
            &self.config.render,
            &self.scene,
            sphere,
        )?;

        if self.polygon_mode == PolygonMode::Line && !renderer.supports_wireframe() {
            warn!("Wireframe is not supported by this GPU, starting in fill mode");
            self.polygon_mode = PolygonMode::Fill;
        }

        let (width, height) = gpu.size();
        self.camera.set_aspect_ratio(width as f32, height as f32);
        self.renderer = Some(renderer);
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    /// Advance the clock, update the scene once and draw it. Returns `true`
    /// when the GPU is in a state the viewer cannot recover from.
    fn redraw(&mut self) -> bool {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        if self.config.debug.show_fps
            && let Some(fps) = self.frame_rate.record(frame_time)
        {
            info!("{fps:.1} fps, t={:.2}s", self.clock.elapsed());
        }

        let time = self.clock.tick();
        self.scene.update(time);
        let light = self.scene.light_position();

        let (Some(gpu), Some(renderer)) = (&self.gpu, &self.renderer) else {
            return false;
        };
        let transforms = match self.scene.transforms() {
            Ok(transforms) => transforms,
            Err(err) => {
                error!("{err}");
                return false;
            }
        };

        match renderer.render(gpu, transforms, &self.camera, light, self.polygon_mode) {
            Ok(()) => false,
            Err(RendererError::Surface(SurfaceError::OutOfMemory)) => {
                error!("GPU out of memory");
                true
            }
            Err(RendererError::Surface(SurfaceError::Timeout)) => {
                debug!("Surface timeout, skipping frame");
                false
            }
            Err(err) => {
                warn!("Frame skipped: {err}");
                false
            }
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Err(e) = self.initialize_rendering(Arc::clone(&window)) {
            error!("{e}");
            event_loop.exit();
            return;
        }

        info!(
            "Window ready: {}x{} (scale: {:.2})",
            window.inner_size().width,
            window.inner_size().height,
            window.scale_factor()
        );
        self.last_frame = Instant::now();
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.handle_resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
                    self.handle_resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(action) = ViewerAction::from_key_event(&event)
                    && self.apply_action(action)
                {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                if self.redraw() {
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer until the window closes.
///
/// `config_dir` is where [`ViewerAction::ReloadConfig`] re-reads the config.
#[instrument(skip_all)]
pub fn run_with_config(
    config: Config,
    config_dir: PathBuf,
    scene: Scene,
    sphere: SphereMesh,
) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, scene, sphere).with_config_dir(config_dir);
    event_loop.run_app(&mut app)
}
