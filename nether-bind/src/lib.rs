//! Mesh & skeleton import binder
//!
//! Converts a third-party scene graph (nodes owning meshes, bones and
//! animation tracks) into:
//!
//! - one flattened vertex/index buffer with per-submesh material ranges
//! - a breadth-first skeleton with a name lookup
//! - up to four normalized bone influences per vertex
//! - the [`AnimationRepresentation`] the renderer needs
//!
//! # Modules
//!
//! - [`source`] - Plain-data source scene description (plus the glTF adapter)
//! - [`flatten`] - Scene graph flattening
//! - [`normals`] - Smooth normal synthesis
//! - [`skeleton`] - Skeleton indexing
//! - [`bones`] - Bone collection
//! - [`classify`] - Animation representation classification
//! - [`rigid`] - Rigid per-node bones
//! - [`skin`] - Skin weight assignment
//! - [`gpu`] - Buffer materialization and backends
//!
//! Most callers only need [`import_scene`].

pub mod bones;
pub mod classify;
pub mod config;
pub mod error;
pub mod flatten;
pub mod gpu;
pub mod import;
pub mod model;
pub mod normals;
pub mod rigid;
pub mod skeleton;
pub mod skin;
pub mod source;
pub mod vertex;

pub use bones::BoneSet;
pub use classify::AnimationRepresentation;
pub use config::ImportConfig;
pub use error::ImportError;
pub use gpu::{BackendError, CpuBackend, CpuBuffer, GpuBackend, GpuBuffers};
pub use import::import_scene;
pub use model::{Aabb, ImportStats, ImportedModel, Submesh};
pub use skeleton::{Skeleton, SkeletonNode};
pub use source::{SourceAnimation, SourceBone, SourceMesh, SourceNode, SourceScene};
pub use vertex::{MAX_INFLUENCES, VERTEX_STRIDE, Vertex};

#[cfg(feature = "wgpu")]
pub use gpu::WgpuBackend;

#[cfg(feature = "gltf")]
pub use source::gltf::{load_gltf, scene_from_gltf};
