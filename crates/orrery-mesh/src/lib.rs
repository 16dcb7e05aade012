//! Procedural sphere geometry for the orrery.
//!
//! A single [`SphereMesh`] is generated once at startup, uploaded once with
//! [`SphereMesh::init`], and then drawn for every celestial body with a
//! different model transform. The geometry is a UV sphere of radius 1 centred
//! at the origin, so vertex normals are identical to vertex positions.

mod error;
mod gpu;
mod sphere;
mod vertex;

pub use error::MeshError;
pub use gpu::GpuSphere;
pub use sphere::{MAX_RESOLUTION, MIN_RESOLUTION, SphereMesh};
pub use vertex::{SPHERE_VERTEX_ATTRIBUTES, SPHERE_VERTEX_LAYOUT, SphereVertex};
