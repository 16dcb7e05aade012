//! Lit, textured pipeline for drawing the shared sphere once per body.
//!
//! | Group | Binding | Contents                        |
//! |-------|---------|---------------------------------|
//! | 0     | 0       | [`SceneUniform`] (per frame)    |
//! | 1     | 0       | [`BodyUniform`] (per body)      |
//! | 2     | 0, 1    | albedo texture + sampler        |

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use orrery_mesh::SPHERE_VERTEX_LAYOUT;
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::depth::DepthBuffer;

pub const PLANET_SHADER_SOURCE: &str = include_str!("planet.wgsl");

/// Per-frame camera and lighting state.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub light_pos: [f32; 4],
    /// RGB ambient colour, specular exponent in `w`.
    pub ambient: [f32; 4],
    pub light_color: [f32; 4],
}

impl SceneUniform {
    pub fn new(
        camera: &Camera,
        light_pos: Vec3,
        ambient: [f32; 3],
        shininess: f32,
        light_color: [f32; 3],
    ) -> Self {
        let [ar, ag, ab] = ambient;
        let [lr, lg, lb] = light_color;
        Self {
            view_proj: camera.view_projection_matrix().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            light_pos: light_pos.extend(1.0).to_array(),
            ambient: [ar, ag, ab, shininess],
            light_color: [lr, lg, lb, 1.0],
        }
    }
}

/// Per-body transform and material flags.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`, for non-uniformly scaled normals.
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// `x`: emissive, `y`: textured.
    pub flags: [f32; 4],
}

impl BodyUniform {
    pub fn new(model: Mat4, color: [f32; 3], emissive: bool, textured: bool) -> Self {
        let [r, g, b] = color;
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            color: [r, g, b, 1.0],
            flags: [f32::from(u8::from(emissive)), f32::from(u8::from(textured)), 0.0, 0.0],
        }
    }

    pub fn is_emissive(&self) -> bool {
        self.flags[0] > 0.5
    }

    pub fn is_textured(&self) -> bool {
        self.flags[1] > 0.5
    }
}

const _: () = assert!(std::mem::size_of::<SceneUniform>() == 128);
const _: () = assert!(std::mem::size_of::<BodyUniform>() == 160);

/// Rasterization mode toggled at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

pub struct PlanetPipeline {
    fill: wgpu::RenderPipeline,
    /// Present only when the device supports `POLYGON_MODE_LINE`.
    line: Option<wgpu::RenderPipeline>,
    pub scene_bind_group_layout: wgpu::BindGroupLayout,
    pub body_bind_group_layout: wgpu::BindGroupLayout,
}

impl PlanetPipeline {
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
        with_line_mode: bool,
    ) -> Self {
        let scene_bind_group_layout = uniform_layout(
            device,
            "planet-scene-bgl",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            std::mem::size_of::<SceneUniform>() as u64,
        );
        let body_bind_group_layout = uniform_layout(
            device,
            "planet-body-bgl",
            wgpu::ShaderStages::VERTEX_FRAGMENT,
            std::mem::size_of::<BodyUniform>() as u64,
        );

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("planet-pipeline-layout"),
            bind_group_layouts: &[
                &scene_bind_group_layout,
                &body_bind_group_layout,
                texture_layout,
            ],
            immediate_size: 0,
        });

        let build = |label: &str, polygon_mode: wgpu::PolygonMode| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[SPHERE_VERTEX_LAYOUT],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    unclipped_depth: false,
                    polygon_mode,
                    conservative: false,
                },
                depth_stencil: Some(DepthBuffer::stencil_state()),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        };

        let fill = build("planet-pipeline-fill", wgpu::PolygonMode::Fill);
        let line = with_line_mode.then(|| build("planet-pipeline-line", wgpu::PolygonMode::Line));

        Self {
            fill,
            line,
            scene_bind_group_layout,
            body_bind_group_layout,
        }
    }

    /// Pipeline for `mode`, falling back to fill when lines are unsupported.
    pub fn pipeline(&self, mode: PolygonMode) -> &wgpu::RenderPipeline {
        match (mode, &self.line) {
            (PolygonMode::Line, Some(line)) => line,
            _ => &self.fill,
        }
    }

    pub fn supports_line_mode(&self) -> bool {
        self.line.is_some()
    }

    /// Uniform buffer and bind group for [`SceneUniform`].
    pub fn create_scene_binding(
        &self,
        device: &wgpu::Device,
        initial: &SceneUniform,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        uniform_binding(device, "planet-scene", &self.scene_bind_group_layout, initial)
    }

    /// Uniform buffer and bind group for one body's [`BodyUniform`].
    pub fn create_body_binding(
        &self,
        device: &wgpu::Device,
        label: &str,
        initial: &BodyUniform,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        uniform_binding(device, label, &self.body_bind_group_layout, initial)
    }
}

fn uniform_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
    size: u64,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(size),
            },
            count: None,
        }],
    })
}

fn uniform_binding<T: Pod>(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    initial: &T,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(initial),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    (buffer, bind_group)
}
