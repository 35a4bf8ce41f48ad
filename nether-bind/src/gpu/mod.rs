//! GPU buffer materialization
//!
//! The finished CPU vertex/index arrays are uploaded exactly once, after the
//! bone weights are final. Backends are plugged in through [`GpuBackend`]:
//!
//! - [`CpuBackend`] - in-memory buffers for headless tools and tests
//! - `WgpuBackend` - real device buffers (feature `wgpu`)

mod cpu;
#[cfg(feature = "wgpu")]
mod wgpu_backend;

pub use cpu::{CpuBackend, CpuBuffer};
#[cfg(feature = "wgpu")]
pub use wgpu_backend::WgpuBackend;

use crate::error::ImportError;
use crate::vertex::{VERTEX_STRIDE, Vertex};

/// Which binding a buffer is created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Buffer creation request
#[derive(Debug, Clone, Copy)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub kind: BufferKind,
    pub contents: &'a [u8],
}

/// Error reported by a graphics backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// Buffer exceeds what the backend is willing to allocate
    #[error("requested {requested} bytes, limit is {limit}")]
    SizeLimit { requested: u64, limit: u64 },

    /// Device or host ran out of memory
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Backend rejected the request
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Graphics backend capable of creating immutable buffers
pub trait GpuBackend {
    /// Opaque buffer handle
    type Buffer;

    /// Create a buffer initialized with `desc.contents`
    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<Self::Buffer, BackendError>;
}

/// Vertex + index buffer pair for one model
#[derive(Debug, Clone)]
pub struct GpuBuffers<B> {
    pub vertex: B,
    pub index: B,
    pub vertex_stride: u32,
    pub index_count: u32,
}

/// Upload vertices and indices, failing as a unit
///
/// If the index buffer fails the vertex buffer is dropped before returning,
/// so no half-built pair ever escapes.
pub fn materialize<G: GpuBackend>(
    backend: &G,
    vertices: &[Vertex],
    indices: &[u32],
    vertex_label: &str,
    index_label: &str,
) -> Result<GpuBuffers<G::Buffer>, ImportError> {
    let vertex = backend
        .create_buffer(&BufferDesc {
            label: vertex_label,
            kind: BufferKind::Vertex,
            contents: bytemuck::cast_slice(vertices),
        })
        .map_err(|e| ImportError::allocation(vertex_label, e))?;

    let index = backend
        .create_buffer(&BufferDesc {
            label: index_label,
            kind: BufferKind::Index,
            contents: bytemuck::cast_slice(indices),
        })
        .map_err(|e| ImportError::allocation(index_label, e))?;

    tracing::debug!(
        "Materialized buffers: {} vertices ({} bytes), {} indices",
        vertices.len(),
        vertices.len() * VERTEX_STRIDE as usize,
        indices.len()
    );

    Ok(GpuBuffers {
        vertex,
        index,
        vertex_stride: VERTEX_STRIDE,
        index_count: indices.len() as u32,
    })
}
