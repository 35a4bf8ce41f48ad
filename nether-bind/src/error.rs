//! Error types for the import pipeline

use crate::gpu::BackendError;

/// Error type for import failures
///
/// Any error discards all work done so far. Recoverable data problems
/// (malformed bone references, degenerate normals, unweighted vertices)
/// are never reported here; they are counted in [`crate::ImportStats`].
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The source scene contains no mesh records at all
    #[error("scene contains no geometry")]
    NoGeometry,

    /// A CPU array or GPU buffer could not be allocated
    #[error("failed to allocate {label}: {source}")]
    BufferAllocation {
        label: String,
        #[source]
        source: BackendError,
    },

    /// A face references a vertex outside its own mesh
    #[error("mesh {mesh}: face index {index} out of range (mesh has {vertex_count} vertices)")]
    InvalidFaceIndex {
        mesh: usize,
        index: u32,
        vertex_count: usize,
    },
}

impl ImportError {
    pub(crate) fn allocation(label: impl Into<String>, source: BackendError) -> Self {
        ImportError::BufferAllocation {
            label: label.into(),
            source,
        }
    }
}
