//! UV-sphere tessellation.
//!
//! Vertices are laid out row-major by (stack, sector). Stack `i` runs from the
//! north pole (`i = 0`) to the south pole (`i = stacks`); sector `j` runs east
//! around the full turn, with the last column duplicating the first so the
//! texture seam has its own `u = 1` vertices.
//!
//! ## Pole policy
//!
//! The first and last rows collapse to a single point, so the quads touching
//! them degenerate into one real triangle each. Those degenerate halves are
//! skipped rather than emitted with zero area, which gives an exact triangle
//! count of `sectors * (2 * stacks - 2)`.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec3;

use crate::error::MeshError;
use crate::gpu::GpuSphere;
use crate::vertex::SphereVertex;

/// Smallest resolution that still yields a closed sphere with at least one
/// non-degenerate triangle.
pub const MIN_RESOLUTION: u32 = 2;

/// Largest stack or sector count accepted. Keeps both buffers under the
/// default 256 MiB `max_buffer_size` of a wgpu device.
pub const MAX_RESOLUTION: u32 = 2048;

/// A unit sphere centred at the origin, plus its GPU buffers once uploaded.
pub struct SphereMesh {
    stacks: u32,
    sectors: u32,
    /// Vertex positions on the unit sphere.
    pub positions: Vec<Vec3>,
    /// Outward normals, identical to `positions`.
    pub normals: Vec<Vec3>,
    /// Texture coordinates in `[0, 1]^2`.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indices, counter-clockwise seen from outside.
    pub indices: Vec<u32>,
    gpu: Option<GpuSphere>,
}

impl std::fmt::Debug for SphereMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SphereMesh")
            .field("stacks", &self.stacks)
            .field("sectors", &self.sectors)
            .field("vertices", &self.positions.len())
            .field("triangles", &self.triangle_count())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl SphereMesh {
    /// Generate a sphere with `resolution` stacks and `resolution` sectors.
    ///
    /// Produces `(resolution + 1)^2` vertices and `2 * resolution * (resolution - 1)`
    /// triangles. Fails with [`MeshError::InvalidParameter`] when `resolution` is
    /// below [`MIN_RESOLUTION`] or above [`MAX_RESOLUTION`].
    pub fn generate(resolution: u32) -> Result<Self, MeshError> {
        Self::with_segments(resolution, resolution)
    }

    /// Generate a sphere with independent latitude and longitude subdivision.
    pub fn with_segments(stacks: u32, sectors: u32) -> Result<Self, MeshError> {
        validate_segments("stacks", stacks)?;
        validate_segments("sectors", sectors)?;

        let vertex_count = ((stacks + 1) * (sectors + 1)) as usize;
        let mut positions = Vec::with_capacity(vertex_count);
        let mut uvs = Vec::with_capacity(vertex_count);

        let stack_step = PI / stacks as f32;
        let sector_step = TAU / sectors as f32;

        for i in 0..=stacks {
            let latitude = FRAC_PI_2 - i as f32 * stack_step;
            let (sin_lat, cos_lat) = latitude.sin_cos();
            for j in 0..=sectors {
                let longitude = j as f32 * sector_step;
                let (sin_lon, cos_lon) = longitude.sin_cos();
                positions.push(Vec3::new(cos_lat * cos_lon, sin_lat, -cos_lat * sin_lon));
                uvs.push([j as f32 / sectors as f32, i as f32 / stacks as f32]);
            }
        }

        let normals = positions.clone();
        let indices = build_indices(stacks, sectors);

        tracing::debug!(
            stacks,
            sectors,
            vertices = positions.len(),
            triangles = indices.len() / 3,
            "generated sphere mesh"
        );

        Ok(Self {
            stacks,
            sectors,
            positions,
            normals,
            uvs,
            indices,
            gpu: None,
        })
    }

    /// Number of latitude subdivisions.
    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    /// Number of longitude subdivisions.
    pub fn sectors(&self) -> u32 {
        self.sectors
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Expected triangle count for the given segment counts under the
    /// skip-pole policy.
    pub fn expected_triangle_count(stacks: u32, sectors: u32) -> usize {
        sectors as usize * (2 * stacks as usize - 2)
    }

    /// Iterate the index buffer as triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Interleave positions, normals and texture coordinates for upload.
    pub fn vertices(&self) -> Vec<SphereVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| SphereVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: *uv,
            })
            .collect()
    }

    /// Upload the geometry into GPU vertex and index buffers.
    ///
    /// Must be called exactly once. A second call returns
    /// [`MeshError::AlreadyInitialized`] and leaves the existing buffers alone.
    pub fn init(&mut self, device: &wgpu::Device) -> Result<(), MeshError> {
        if self.gpu.is_some() {
            return Err(MeshError::AlreadyInitialized);
        }
        self.gpu = Some(GpuSphere::upload(device, self));
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.gpu.is_some()
    }

    /// The GPU-resident buffers, if [`init`](Self::init) has run.
    pub fn gpu(&self) -> Option<&GpuSphere> {
        self.gpu.as_ref()
    }

    /// Bind the sphere buffers and issue one indexed triangle-list draw.
    ///
    /// Pipeline and bind groups (transform, texture) must already be set on
    /// `pass`; the mesh knows nothing about them.
    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) -> Result<(), MeshError> {
        let gpu = self.gpu.as_ref().ok_or(MeshError::NotInitialized)?;
        gpu.bind(pass);
        gpu.draw(pass);
        Ok(())
    }
}

fn validate_segments(name: &str, value: u32) -> Result<(), MeshError> {
    if value < MIN_RESOLUTION {
        return Err(MeshError::InvalidParameter(format!(
            "{name} must be at least {MIN_RESOLUTION}, got {value}"
        )));
    }
    if value > MAX_RESOLUTION {
        return Err(MeshError::InvalidParameter(format!(
            "{name} must be at most {MAX_RESOLUTION}, got {value}"
        )));
    }
    Ok(())
}

/// Two triangles per quad between rows `i` and `i + 1`:
///
/// ```text
///  k1 -- k1+1      row i
///  |  \   |
///  |   \  |
///  k2 -- k2+1      row i + 1
/// ```
///
/// `(k1, k2, k1+1)` is dropped on the north cap and `(k1+1, k2, k2+1)` on the
/// south cap.
fn build_indices(stacks: u32, sectors: u32) -> Vec<u32> {
    let mut indices =
        Vec::with_capacity(SphereMesh::expected_triangle_count(stacks, sectors) * 3);

    for i in 0..stacks {
        let mut k1 = i * (sectors + 1);
        let mut k2 = k1 + sectors + 1;
        for _ in 0..sectors {
            if i != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
            k1 += 1;
            k2 += 1;
        }
    }

    indices
}
