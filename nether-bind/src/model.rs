//! Imported model and its CPU-side metadata

use glam::Vec3;
use serde::Serialize;

use crate::bones::BoneSet;
use crate::classify::AnimationRepresentation;
use crate::error::ImportError;
use crate::gpu::{GpuBackend, GpuBuffers, materialize};
use crate::skeleton::Skeleton;
use crate::vertex::Vertex;

/// A contiguous index range drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Submesh {
    pub start_index: u32,
    pub index_count: u32,
    pub material_index: u32,
}

impl Submesh {
    /// One past the last index of this range
    #[inline]
    pub fn end_index(&self) -> u32 {
        self.start_index + self.index_count
    }
}

/// Local-space axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Bounds of all vertex positions, or a zero box when there are none
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        let mut positions = vertices.iter().map(|v| Vec3::from_array(v.position));
        let Some(first) = positions.next() else {
            return Self::default();
        };

        let (min, max) = positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Counters gathered while importing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub meshes: usize,
    pub vertices: usize,
    pub indices: usize,
    pub submeshes: usize,
    pub skeleton_nodes: usize,
    pub bones: usize,
    /// Distinct position groups found by smooth normal synthesis (0 when disabled)
    pub smooth_normal_groups: usize,
    /// Bone weights skipped because they pointed outside their mesh
    pub malformed_bone_references: usize,
    /// Influences lost to the four-slot limit
    pub dropped_influences: usize,
    /// Vertices bound to bone 0 because nothing else applied
    pub fallback_vertices: usize,
}

/// A fully bound model ready for rendering
///
/// `B` is the buffer handle type of the backend it was uploaded to.
#[derive(Debug)]
pub struct ImportedModel<B> {
    pub(crate) buffers: GpuBuffers<B>,
    pub(crate) vertex_label: String,
    pub(crate) index_label: String,
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) indices: Vec<u32>,
    pub(crate) submeshes: Vec<Submesh>,
    pub(crate) skeleton: Skeleton,
    pub(crate) bones: BoneSet,
    pub(crate) representation: AnimationRepresentation,
    pub(crate) bounds: Aabb,
    pub(crate) stats: ImportStats,
}

impl<B> ImportedModel<B> {
    pub fn vertex_buffer(&self) -> &B {
        &self.buffers.vertex
    }

    pub fn vertex_stride(&self) -> u32 {
        self.buffers.vertex_stride
    }

    pub fn index_buffer(&self) -> &B {
        &self.buffers.index
    }

    pub fn index_count(&self) -> u32 {
        self.buffers.index_count
    }

    pub fn buffers(&self) -> &GpuBuffers<B> {
        &self.buffers
    }

    /// Material ranges in flattening order; they partition the index buffer
    pub fn submeshes(&self) -> &[Submesh] {
        &self.submeshes
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn root_index(&self) -> u32 {
        self.skeleton.root_index()
    }

    pub fn bones(&self) -> &BoneSet {
        &self.bones
    }

    pub fn bone_names(&self) -> &[String] {
        self.bones.names()
    }

    /// Bind-pose inverse offsets, indexed like [`Self::bone_names`]
    pub fn bone_offsets(&self) -> &[glam::Mat4] {
        self.bones.offsets()
    }

    pub fn representation(&self) -> AnimationRepresentation {
        self.representation
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn stats(&self) -> &ImportStats {
        &self.stats
    }

    /// Re-upload the CPU arrays to `backend`
    ///
    /// The current buffers are replaced only once both new buffers exist. On
    /// error the model is left exactly as it was.
    pub fn rebuild_gpu_buffers<G>(&mut self, backend: &G) -> Result<(), ImportError>
    where
        G: GpuBackend<Buffer = B>,
    {
        let buffers = materialize(
            backend,
            &self.vertices,
            &self.indices,
            &self.vertex_label,
            &self.index_label,
        )?;
        self.buffers = buffers;
        tracing::debug!("Rebuilt GPU buffers for {} vertices", self.vertices.len());
        Ok(())
    }
}
