//! Mesh error types.

/// Errors produced while generating, uploading, or drawing a sphere mesh.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// A tessellation parameter is out of the supported range.
    #[error("invalid mesh parameter: {0}")]
    InvalidParameter(String),

    /// A draw was requested before the mesh was uploaded with `init`.
    #[error("sphere mesh has not been uploaded to the GPU")]
    NotInitialized,

    /// `init` was called on a mesh that already owns GPU buffers.
    #[error("sphere mesh is already uploaded to the GPU")]
    AlreadyInitialized,
}
