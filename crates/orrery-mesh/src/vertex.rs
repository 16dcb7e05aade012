//! Interleaved vertex format shared by the sphere mesh and the planet pipeline.
//!
//! | Location | Offset | Format    | Field    |
//! |----------|--------|-----------|----------|
//! | 0        | 0      | Float32x3 | position |
//! | 1        | 12     | Float32x3 | normal   |
//! | 2        | 24     | Float32x2 | uv       |

use std::mem;

use bytemuck::{Pod, Zeroable};
use wgpu::{VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

/// One interleaved sphere vertex as laid out in the GPU vertex buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    /// Position on the unit sphere.
    pub position: [f32; 3],
    /// Outward normal, equal to `position`.
    pub normal: [f32; 3],
    /// Texture coordinate, `(sector / sectors, stack / stacks)`.
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(SphereVertex, [u8; 32]);

pub const SPHERE_VERTEX_ATTRIBUTES: [VertexAttribute; 3] = [
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    VertexAttribute {
        format: VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
    VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 24,
        shader_location: 2,
    },
];

/// Vertex buffer layout every pipeline drawing a [`SphereVertex`] buffer must use.
pub const SPHERE_VERTEX_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: mem::size_of::<SphereVertex>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &SPHERE_VERTEX_ATTRIBUTES,
};

const _: () = assert!(SPHERE_VERTEX_ATTRIBUTES[1].offset == mem::offset_of!(SphereVertex, normal) as u64);
const _: () = assert!(SPHERE_VERTEX_ATTRIBUTES[2].offset == mem::offset_of!(SphereVertex, uv) as u64);
const _: () = assert!(
    SPHERE_VERTEX_ATTRIBUTES[2].offset + 8 <= mem::size_of::<SphereVertex>() as u64,
    "uv attribute exceeds vertex stride"
);
