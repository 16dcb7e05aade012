//! Render pass configuration and per-frame command encoding.

use std::sync::Arc;

use crate::depth::DepthBuffer;

/// Declarative description of the frame's single colour + depth pass.
#[derive(Debug, Clone)]
pub struct RenderPassBuilder {
    clear_color: wgpu::Color,
    depth_clear: Option<f32>,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    /// Black clear colour, no depth attachment.
    pub fn new() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            depth_clear: None,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Clear colour from linear RGB floats, fully opaque.
    pub fn clear_rgb(self, [r, g, b]: [f32; 3]) -> Self {
        self.clear_color(wgpu::Color {
            r: f64::from(r),
            g: f64::from(g),
            b: f64::from(b),
            a: 1.0,
        })
    }

    /// Attach a depth buffer cleared to the reverse-Z far value.
    pub fn with_depth(mut self) -> Self {
        self.depth_clear = Some(DepthBuffer::CLEAR_VALUE);
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Begin the pass on `encoder`. `depth` is used only when
    /// [`with_depth`](Self::with_depth) was requested.
    pub fn begin<'encoder>(
        &self,
        encoder: &'encoder mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth: Option<&wgpu::TextureView>,
    ) -> wgpu::RenderPass<'encoder> {
        let depth_stencil_attachment = self.depth_clear.zip(depth).map(|(clear, view)| {
            wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }
        });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Command encoder plus the acquired surface texture for one frame.
///
/// [`submit`](Self::submit) finishes the encoder and presents. Dropping the
/// encoder without submitting discards the frame.
pub struct FrameEncoder {
    encoder: wgpu::CommandEncoder,
    queue: Arc<wgpu::Queue>,
    surface_texture: wgpu::SurfaceTexture,
    surface_view: wgpu::TextureView,
}

impl FrameEncoder {
    pub fn new(
        device: &wgpu::Device,
        queue: Arc<wgpu::Queue>,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder,
            queue,
            surface_texture,
            surface_view,
        }
    }

    /// Begin a pass that targets the surface texture.
    pub fn begin_render_pass<'a>(
        &'a mut self,
        builder: &RenderPassBuilder,
        depth: Option<&DepthBuffer>,
    ) -> wgpu::RenderPass<'a> {
        builder.begin(
            &mut self.encoder,
            &self.surface_view,
            depth.map(|d| &d.view),
        )
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Submit the command buffer and present the surface texture.
    pub fn submit(self) {
        self.queue.submit([self.encoder.finish()]);
        self.surface_texture.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::create_test_device;

    #[test]
    fn test_default_clear_is_black_without_depth() {
        let builder = RenderPassBuilder::new();
        assert_eq!(builder.clear_color, wgpu::Color::BLACK);
        assert!(builder.depth_clear.is_none());
        assert!(builder.label.is_none());
    }

    #[test]
    fn test_clear_rgb_is_opaque() {
        let builder = RenderPassBuilder::new().clear_rgb([0.7, 0.7, 0.7]);
        assert!((builder.clear_color.r - 0.7).abs() < 1e-6);
        assert!((builder.clear_color.b - 0.7).abs() < 1e-6);
        assert_eq!(builder.clear_color.a, 1.0);
    }

    #[test]
    fn test_with_depth_uses_reverse_z_clear() {
        let builder = RenderPassBuilder::new().with_depth().label("scene");
        assert_eq!(builder.depth_clear, Some(0.0));
        assert_eq!(builder.label, Some("scene"));
    }

    #[test]
    fn test_begin_on_offscreen_target() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pass-test-target"),
            size: wgpu::Extent3d {
                width: 8,
                height: 8,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = DepthBuffer::new(&device, 8, 8);
        let builder = RenderPassBuilder::new().with_depth().label("pass-test");

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        drop(builder.begin(&mut encoder, &view, Some(&depth.view)));
        queue.submit([encoder.finish()]);
    }
}
