//! wgpu plumbing for the orrery: surface management, depth, camera, render
//! passes, shader and texture loading, and the lit planet pipeline.

pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod planet_pipeline;
pub mod shader;
pub mod texture;

pub use camera::Camera;
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use planet_pipeline::{
    BodyUniform, PLANET_SHADER_SOURCE, PlanetPipeline, PolygonMode, SceneUniform,
};
pub use shader::{ShaderError, ShaderLibrary};
pub use texture::{ManagedTexture, TextureError, TextureManager};
