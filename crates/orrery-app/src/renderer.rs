//! Draws every body of the scene with the one shared sphere.
//!
//! Per frame the scene uniform (camera, light) and one body uniform per body
//! are written, then the sphere is drawn once per body with that body's
//! uniform and albedo bind groups.

use std::path::Path;
use std::sync::Arc;

use bytemuck::Zeroable;
use glam::Vec3;
use orrery_config::RenderConfig;
use orrery_kinematics::BodyTransforms;
use orrery_mesh::{MeshError, SphereMesh};
use orrery_render::{
    BodyUniform, Camera, DepthBuffer, FrameEncoder, ManagedTexture, PLANET_SHADER_SOURCE,
    PlanetPipeline, PolygonMode, RenderContext, RenderPassBuilder, SceneUniform, ShaderError,
    ShaderLibrary, SurfaceError, TextureError, TextureManager,
};
use tracing::{debug, info, warn};

use crate::scene::{BodyAppearance, Scene};

const PLANET_SHADER: &str = "planet";
const PLANET_SHADER_FILE: &str = "planet.wgsl";

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Colour target the renderer draws into.
#[derive(Debug, Clone, Copy)]
pub struct RenderTarget {
    pub format: wgpu::TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Build the line pipeline; requires `POLYGON_MODE_LINE`.
    pub line_mode: bool,
}

impl RenderTarget {
    pub fn from_context(gpu: &RenderContext) -> Self {
        let (width, height) = gpu.size();
        Self {
            format: gpu.surface_format,
            width,
            height,
            line_mode: gpu.supports_wireframe,
        }
    }
}

struct BodyBinding {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    albedo: Arc<ManagedTexture>,
    color: [f32; 3],
    emissive: bool,
    textured: bool,
}

pub struct SolarSystemRenderer {
    pipeline: PlanetPipeline,
    target: RenderTarget,
    depth: DepthBuffer,
    shaders: ShaderLibrary,
    textures: TextureManager,
    sphere: SphereMesh,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    bodies: Vec<BodyBinding>,
    clear_color: [f32; 3],
    ambient_color: [f32; 3],
    light_color: [f32; 3],
    shininess: f32,
}

impl SolarSystemRenderer {
    /// Upload `sphere`, compile the planet shader and create per-body
    /// bindings for every body of `scene`.
    ///
    /// A body texture that fails to load is logged and replaced by the
    /// body's flat colour.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: RenderTarget,
        config: &RenderConfig,
        scene: &Scene,
        mut sphere: SphereMesh,
    ) -> Result<Self, RendererError> {
        sphere.init(device)?;
        info!(
            "Uploaded sphere: {} vertices, {} triangles",
            sphere.vertex_count(),
            sphere.triangle_count()
        );

        let mut shaders = match &config.shader_dir {
            Some(dir) => ShaderLibrary::new().with_shader_dir(dir),
            None => ShaderLibrary::new(),
        };
        let module = shaders.load_or_embedded(
            device,
            PLANET_SHADER,
            PLANET_SHADER_FILE,
            PLANET_SHADER_SOURCE,
        );

        let mut textures = TextureManager::new(device);
        let pipeline = PlanetPipeline::new(
            device,
            &module,
            target.format,
            textures.bind_group_layout(),
            target.line_mode,
        );
        let (scene_buffer, scene_bind_group) =
            pipeline.create_scene_binding(device, &SceneUniform::zeroed());

        let white = textures.solid_color(device, queue, [255, 255, 255, 255])?;
        let bodies = scene
            .kinematics()
            .bodies()
            .iter()
            .zip(scene.appearances())
            .map(|(body, appearance)| {
                let (albedo, textured) = match &appearance.texture {
                    Some(relative) => load_albedo(
                        &mut textures,
                        device,
                        queue,
                        &config.texture_dir.join(relative),
                    )
                    .map_or_else(|| (Arc::clone(&white), false), |t| (t, true)),
                    None => (Arc::clone(&white), false),
                };
                body_binding(device, &pipeline, &body.name, appearance, albedo, textured)
            })
            .collect();

        Ok(Self {
            pipeline,
            target,
            depth: DepthBuffer::new(device, target.width, target.height),
            shaders,
            textures,
            sphere,
            scene_buffer,
            scene_bind_group,
            bodies,
            clear_color: config.clear_color,
            ambient_color: config.ambient_color,
            light_color: config.light_color,
            shininess: config.shininess,
        })
    }

    pub fn supports_wireframe(&self) -> bool {
        self.pipeline.supports_line_mode()
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn sphere(&self) -> &SphereMesh {
        &self.sphere
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Take over the background and lighting settings of `config`. They are
    /// read again on the next [`prepare`](Self::prepare).
    pub fn apply_lighting(&mut self, config: &RenderConfig) {
        self.clear_color = config.clear_color;
        self.ambient_color = config.ambient_color;
        self.light_color = config.light_color;
        self.shininess = config.shininess;
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.target.width = width;
        self.target.height = height;
        self.depth.resize(device, width, height);
    }

    /// Write the scene and body uniforms for this frame.
    pub fn prepare(
        &self,
        queue: &wgpu::Queue,
        transforms: &BodyTransforms,
        camera: &Camera,
        light_position: Vec3,
    ) {
        let scene = SceneUniform::new(
            camera,
            light_position,
            self.ambient_color,
            self.shininess,
            self.light_color,
        );
        queue.write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&scene));

        for (id, transform) in transforms.iter() {
            let Some(body) = self.bodies.get(id.index()) else {
                continue;
            };
            let uniform = BodyUniform::new(transform.model, body.color, body.emissive, body.textured);
            queue.write_buffer(&body.buffer, 0, bytemuck::bytes_of(&uniform));
        }
    }

    /// Pass description: clear to the background colour and the reverse-Z
    /// far depth.
    pub fn pass_builder(&self) -> RenderPassBuilder {
        RenderPassBuilder::new()
            .clear_rgb(self.clear_color)
            .with_depth()
            .label("solar-system-pass")
    }

    /// Record one draw of the shared sphere per body into `pass`.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, mode: PolygonMode) -> Result<(), MeshError> {
        pass.set_pipeline(self.pipeline.pipeline(mode));
        pass.set_bind_group(0, &self.scene_bind_group, &[]);
        for body in &self.bodies {
            pass.set_bind_group(1, &body.bind_group, &[]);
            pass.set_bind_group(2, &body.albedo.bind_group, &[]);
            self.sphere.render(pass)?;
        }
        Ok(())
    }

    /// Prepare, draw and present one frame to the window surface.
    pub fn render(
        &self,
        gpu: &RenderContext,
        transforms: &BodyTransforms,
        camera: &Camera,
        light_position: Vec3,
        mode: PolygonMode,
    ) -> Result<(), RendererError> {
        self.prepare(&gpu.queue, transforms, camera, light_position);

        let surface_texture = gpu.get_current_texture()?;
        let mut frame = FrameEncoder::new(&gpu.device, Arc::clone(&gpu.queue), surface_texture);
        {
            let mut pass = frame.begin_render_pass(&self.pass_builder(), Some(&self.depth));
            self.draw(&mut pass, mode)?;
        }
        frame.submit();
        Ok(())
    }

    /// Re-read the planet shader from disk and rebuild the pipeline.
    ///
    /// Only works when a shader directory is configured and the file was
    /// found at startup. A shader the device rejects is reported as
    /// [`ShaderError::Validation`] and the running pipeline stays in place.
    pub fn reload_shaders(&mut self, device: &wgpu::Device) -> Result<(), ShaderError> {
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let rebuilt = self.shaders.reload(device, PLANET_SHADER).map(|module| {
            PlanetPipeline::new(
                device,
                &module,
                self.target.format,
                self.textures.bind_group_layout(),
                self.target.line_mode,
            )
        });
        let validation = pollster::block_on(scope.pop());

        let pipeline = rebuilt?;
        if let Some(err) = validation {
            warn!("Keeping the previous planet pipeline");
            return Err(ShaderError::Validation {
                name: PLANET_SHADER.to_string(),
                message: err.to_string(),
            });
        }
        self.pipeline = pipeline;

        let (scene_buffer, scene_bind_group) =
            self.pipeline.create_scene_binding(device, &SceneUniform::zeroed());
        self.scene_buffer = scene_buffer;
        self.scene_bind_group = scene_bind_group;
        for (i, body) in self.bodies.iter_mut().enumerate() {
            let (buffer, bind_group) = self.pipeline.create_body_binding(
                device,
                &format!("body-{i}"),
                &BodyUniform::zeroed(),
            );
            body.buffer = buffer;
            body.bind_group = bind_group;
        }
        info!("Planet pipeline rebuilt");
        Ok(())
    }
}

fn load_albedo(
    textures: &mut TextureManager,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
) -> Option<Arc<ManagedTexture>> {
    match textures.load_file(device, queue, path) {
        Ok(texture) => {
            debug!("Loaded albedo {}", path.display());
            Some(texture)
        }
        Err(err) => {
            warn!("Could not load texture {}: {err}; using flat colour", path.display());
            None
        }
    }
}

fn body_binding(
    device: &wgpu::Device,
    pipeline: &PlanetPipeline,
    name: &str,
    appearance: &BodyAppearance,
    albedo: Arc<ManagedTexture>,
    textured: bool,
) -> BodyBinding {
    let (buffer, bind_group) =
        pipeline.create_body_binding(device, &format!("body-{name}"), &BodyUniform::zeroed());
    BodyBinding {
        buffer,
        bind_group,
        albedo,
        color: appearance.color,
        emissive: appearance.emissive,
        textured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_config::{BodyConfig, SceneConfig};

    fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions::default())
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    const TARGET: RenderTarget = RenderTarget {
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        width: 64,
        height: 48,
        line_mode: false,
    };

    fn untextured_scene() -> Scene {
        let mut config = SceneConfig::default();
        for body in &mut config.bodies {
            body.texture = None;
        }
        Scene::from_config(&config).unwrap()
    }

    #[test]
    fn test_renderer_uploads_sphere_once_for_all_bodies() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let scene = untextured_scene();
        let renderer = SolarSystemRenderer::new(
            &device,
            &queue,
            TARGET,
            &RenderConfig::default(),
            &scene,
            SphereMesh::generate(8).unwrap(),
        )
        .unwrap();
        assert!(renderer.sphere().is_initialized());
        assert_eq!(renderer.body_count(), scene.len());
        // Only the shared white fallback.
        assert_eq!(renderer.texture_count(), 1);
    }

    #[test]
    fn test_already_uploaded_sphere_is_rejected() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut sphere = SphereMesh::generate(4).unwrap();
        sphere.init(&device).unwrap();
        let result = SolarSystemRenderer::new(
            &device,
            &queue,
            TARGET,
            &RenderConfig::default(),
            &untextured_scene(),
            sphere,
        );
        assert!(matches!(
            result,
            Err(RendererError::Mesh(MeshError::AlreadyInitialized))
        ));
    }

    #[test]
    fn test_missing_texture_falls_back_to_colour() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let config = RenderConfig {
            texture_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let scene = Scene::from_config(&SceneConfig {
            bodies: vec![BodyConfig {
                name: "rock".into(),
                texture: Some("missing.png".into()),
                ..Default::default()
            }],
            ..Default::default()
        })
        .unwrap();

        let renderer = SolarSystemRenderer::new(
            &device,
            &queue,
            TARGET,
            &config,
            &scene,
            SphereMesh::generate(4).unwrap(),
        )
        .unwrap();
        assert!(!renderer.bodies[0].textured);
    }

    /// Prepare and draw one frame of `scene` into an offscreen target.
    fn draw_offscreen(
        renderer: &SolarSystemRenderer,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &mut Scene,
    ) {
        let transforms = scene.update(2.0).clone();
        let camera = Camera::look_at(Vec3::new(0.0, 5.0, 20.0), Vec3::ZERO);
        renderer.prepare(queue, &transforms, &camera, scene.light_position());

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("offscreen"),
            size: wgpu::Extent3d {
                width: TARGET.width,
                height: TARGET.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());
        {
            let mut pass =
                renderer
                    .pass_builder()
                    .begin(&mut encoder, &view, Some(&renderer.depth().view));
            renderer.draw(&mut pass, PolygonMode::Fill).unwrap();
        }
        queue.submit([encoder.finish()]);
    }

    #[test]
    fn test_frame_draws_offscreen() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut scene = untextured_scene();
        let renderer = SolarSystemRenderer::new(
            &device,
            &queue,
            TARGET,
            &RenderConfig::default(),
            &scene,
            SphereMesh::generate(8).unwrap(),
        )
        .unwrap();
        draw_offscreen(&renderer, &device, &queue, &mut scene);
    }

    #[test]
    fn test_reload_without_shader_dir_fails() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let mut renderer = SolarSystemRenderer::new(
            &device,
            &queue,
            TARGET,
            &RenderConfig::default(),
            &untextured_scene(),
            SphereMesh::generate(4).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            renderer.reload_shaders(&device),
            Err(ShaderError::NotFileBacked { .. })
        ));
    }

    #[test]
    fn test_reload_rebuilds_from_disk() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PLANET_SHADER_FILE), PLANET_SHADER_SOURCE).unwrap();
        let config = RenderConfig {
            shader_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut renderer = SolarSystemRenderer::new(
            &device,
            &queue,
            TARGET,
            &config,
            &untextured_scene(),
            SphereMesh::generate(4).unwrap(),
        )
        .unwrap();
        renderer.reload_shaders(&device).unwrap();
        assert_eq!(renderer.body_count(), 5);
    }

    #[test]
    fn test_broken_shader_keeps_previous_pipeline() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let shader_path = dir.path().join(PLANET_SHADER_FILE);
        std::fs::write(&shader_path, PLANET_SHADER_SOURCE).unwrap();
        let config = RenderConfig {
            shader_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut scene = untextured_scene();
        let mut renderer = SolarSystemRenderer::new(
            &device,
            &queue,
            TARGET,
            &config,
            &scene,
            SphereMesh::generate(4).unwrap(),
        )
        .unwrap();

        std::fs::write(&shader_path, "fn vs_main( {").unwrap();
        assert!(matches!(
            renderer.reload_shaders(&device),
            Err(ShaderError::Validation { .. })
        ));

        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        draw_offscreen(&renderer, &device, &queue, &mut scene);
        assert!(pollster::block_on(scope.pop()).is_none());
    }
}
