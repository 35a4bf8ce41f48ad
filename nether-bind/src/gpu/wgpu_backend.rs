//! wgpu backend
//!
//! `create_buffer_init` never returns an error directly; allocation and
//! validation failures are captured with error scopes around the call.

use wgpu::util::DeviceExt;

use super::{BackendError, BufferDesc, BufferKind, GpuBackend};

/// Backend creating real device buffers
pub struct WgpuBackend {
    device: wgpu::Device,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }
}

impl GpuBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<wgpu::Buffer, BackendError> {
        let usage = match desc.kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(desc.label),
                contents: desc.contents,
                usage: usage | wgpu::BufferUsages::COPY_DST,
            });

        // Scopes pop in reverse push order
        let validation = pollster::block_on(self.device.pop_error_scope());
        let out_of_memory = pollster::block_on(self.device.pop_error_scope());

        if let Some(err) = out_of_memory {
            tracing::warn!("Buffer '{}' allocation failed: {}", desc.label, err);
            return Err(BackendError::OutOfMemory(err.to_string()));
        }
        if let Some(err) = validation {
            tracing::warn!("Buffer '{}' rejected: {}", desc.label, err);
            return Err(BackendError::Validation(err.to_string()));
        }

        Ok(buffer)
    }
}
