//! GPU-resident sphere buffers.

use wgpu::util::DeviceExt;

use crate::sphere::SphereMesh;

/// Vertex and index buffers holding an uploaded [`SphereMesh`].
///
/// Immutable after upload; every body draw borrows the same buffers.
#[derive(Debug)]
pub struct GpuSphere {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    vertex_count: u32,
}

impl GpuSphere {
    pub(crate) fn upload(device: &wgpu::Device, mesh: &SphereMesh) -> Self {
        let vertices = mesh.vertices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_index_buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        tracing::info!(
            vertices = vertices.len(),
            indices = mesh.indices.len(),
            "uploaded sphere mesh"
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            vertex_count: vertices.len() as u32,
        }
    }

    /// Number of indices passed to `draw_indexed`.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Total size of both buffers in bytes.
    pub fn total_gpu_bytes(&self) -> u64 {
        self.vertex_buffer.size() + self.index_buffer.size()
    }

    pub(crate) fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MeshError, SPHERE_VERTEX_LAYOUT};

    fn test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })
                .await
                .ok()?;
            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    const TEST_SHADER: &str = r#"
        @vertex
        fn vs_main(
            @location(0) position: vec3<f32>,
            @location(1) normal: vec3<f32>,
            @location(2) uv: vec2<f32>,
        ) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position * 0.5, 1.0);
        }

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return vec4<f32>(1.0, 1.0, 1.0, 1.0);
        }
    "#;

    fn test_target(device: &wgpu::Device) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sphere_test_target"),
            size: wgpu::Extent3d {
                width: 16,
                height: 16,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    fn test_pipeline(device: &wgpu::Device) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sphere_test_shader"),
            source: wgpu::ShaderSource::Wgsl(TEST_SHADER.into()),
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sphere_test_pipeline"),
            layout: None,
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[SPHERE_VERTEX_LAYOUT],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: wgpu::TextureFormat::Rgba8Unorm,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        })
    }

    fn render_once(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &SphereMesh,
    ) -> Result<(), MeshError> {
        let target = test_target(device);
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let pipeline = test_pipeline(device);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sphere_test_encoder"),
        });
        let result = {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("sphere_test_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&pipeline);
            mesh.render(&mut pass)
        };
        queue.submit(std::iter::once(encoder.finish()));
        result
    }

    #[test]
    fn test_init_uploads_buffers() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let mut mesh = SphereMesh::generate(8).unwrap();
        mesh.init(&device).unwrap();

        let gpu = mesh.gpu().unwrap();
        assert_eq!(gpu.vertex_count(), 81);
        assert_eq!(gpu.index_count(), 2 * 8 * 7 * 3);
        assert_eq!(gpu.total_gpu_bytes(), 81 * 32 + 2 * 8 * 7 * 3 * 4);
    }

    #[test]
    fn test_second_init_is_rejected() {
        let Some((device, _queue)) = test_device() else {
            return;
        };
        let mut mesh = SphereMesh::generate(4).unwrap();
        mesh.init(&device).unwrap();
        assert_eq!(mesh.init(&device), Err(MeshError::AlreadyInitialized));
        assert!(mesh.is_initialized());
    }

    #[test]
    fn test_render_requires_init() {
        let Some((device, queue)) = test_device() else {
            return;
        };
        let mut mesh = SphereMesh::generate(6).unwrap();
        assert_eq!(
            render_once(&device, &queue, &mesh),
            Err(MeshError::NotInitialized)
        );

        mesh.init(&device).unwrap();
        assert_eq!(render_once(&device, &queue, &mesh), Ok(()));
    }
}
