//! GPU vertex layout
//!
//! # Layout
//! ```text
//! 0x00: position      f32x3
//! 0x0C: normal        f32x3
//! 0x18: smooth_normal f32x3  (outline/silhouette shading only)
//! 0x24: tangent       f32x3
//! 0x30: bitangent     f32x3
//! 0x3C: uv            f32x2
//! 0x44: color         f32x4
//! 0x54: bone_indices  u32x4
//! 0x64: bone_weights  f32x4
//! ```
//! Stride: 116 bytes.

use bytemuck::{Pod, Zeroable};

/// Maximum bone influences per vertex
pub const MAX_INFLUENCES: usize = 4;

/// Vertex stride in bytes
pub const VERTEX_STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
pub const DEFAULT_TANGENT: [f32; 3] = [1.0, 0.0, 0.0];
pub const DEFAULT_BITANGENT: [f32; 3] = [0.0, 1.0, 0.0];
pub const DEFAULT_UV: [f32; 2] = [0.0, 0.0];
pub const DEFAULT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// One flattened vertex
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub smooth_normal: [f32; 3],
    pub tangent: [f32; 3],
    pub bitangent: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub bone_indices: [u32; MAX_INFLUENCES],
    pub bone_weights: [f32; MAX_INFLUENCES],
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: DEFAULT_NORMAL,
            smooth_normal: DEFAULT_NORMAL,
            tangent: DEFAULT_TANGENT,
            bitangent: DEFAULT_BITANGENT,
            uv: DEFAULT_UV,
            color: DEFAULT_COLOR,
            bone_indices: [0; MAX_INFLUENCES],
            bone_weights: [0.0; MAX_INFLUENCES],
        }
    }
}

impl Vertex {
    /// Bind the vertex fully to one bone
    #[inline]
    pub fn bind_rigid(&mut self, bone: u32) {
        self.bone_indices = [bone, 0, 0, 0];
        self.bone_weights = [1.0, 0.0, 0.0, 0.0];
    }

    /// Sum of the four influence weights
    #[inline]
    pub fn weight_sum(&self) -> f32 {
        self.bone_weights.iter().sum()
    }
}
