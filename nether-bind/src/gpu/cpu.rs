//! In-memory backend

use super::{BackendError, BufferDesc, BufferKind, GpuBackend};

/// Backend that keeps buffer contents in host memory
///
/// Used by headless tools and tests. An optional per-buffer size limit
/// stands in for a device refusing an allocation.
#[derive(Debug, Clone, Default)]
pub struct CpuBackend {
    max_buffer_size: Option<u64>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any buffer larger than `limit` bytes
    pub fn with_max_buffer_size(limit: u64) -> Self {
        Self {
            max_buffer_size: Some(limit),
        }
    }
}

/// Host-memory buffer
#[derive(Debug, Clone, PartialEq)]
pub struct CpuBuffer {
    label: String,
    kind: BufferKind,
    data: Vec<u8>,
}

impl CpuBuffer {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl GpuBackend for CpuBackend {
    type Buffer = CpuBuffer;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<CpuBuffer, BackendError> {
        let requested = desc.contents.len() as u64;
        if let Some(limit) = self.max_buffer_size {
            if requested > limit {
                return Err(BackendError::SizeLimit { requested, limit });
            }
        }

        let mut data = Vec::new();
        data.try_reserve_exact(desc.contents.len())
            .map_err(|e| BackendError::OutOfMemory(e.to_string()))?;
        data.extend_from_slice(desc.contents);

        Ok(CpuBuffer {
            label: desc.label.to_string(),
            kind: desc.kind,
            data,
        })
    }
}
