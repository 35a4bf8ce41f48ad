//! Bone collection
//!
//! Deduplicates bone records from every mesh by name. The first record seen
//! for a name wins: its offset matrix is kept and later records with the
//! same name are folded into the same slot without reconciliation.

use glam::Mat4;
use hashbrown::HashMap;

use crate::skeleton::Skeleton;
use crate::source::{SourceMesh, to_engine_matrix};

/// Deduplicated bone list
///
/// `names` and `offsets` are parallel and indexed by bone index, the value
/// stored in [`crate::Vertex::bone_indices`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneSet {
    names: Vec<String>,
    offsets: Vec<Mat4>,
    lookup: HashMap<String, u32>,
}

impl BoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a bone unless the name is already known. Returns its index.
    pub fn insert(&mut self, name: &str, offset: Mat4) -> u32 {
        if let Some(&index) = self.lookup.get(name) {
            return index;
        }
        let index = self.names.len() as u32;
        self.names.push(name.to_string());
        self.offsets.push(offset);
        self.lookup.insert(name.to_string(), index);
        index
    }

    /// Append a bone even if the name repeats; lookup keeps the first index.
    /// Used for synthetic per-node bones, where bone i must stay node i.
    pub(crate) fn push_synthetic(&mut self, name: &str, offset: Mat4) -> u32 {
        let index = self.names.len() as u32;
        self.names.push(name.to_string());
        self.offsets.push(offset);
        self.lookup.entry(name.to_string()).or_insert(index);
        index
    }

    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.lookup.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Bind-pose inverse offsets, column-major
    pub fn offsets(&self) -> &[Mat4] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Collect bones from `meshes` (flattening order) and flag matching skeleton nodes
pub fn collect_bones(meshes: &[&SourceMesh], skeleton: &mut Skeleton) -> BoneSet {
    let mut bones = BoneSet::new();

    for mesh in meshes {
        for bone in &mesh.bones {
            if bones.index_of(&bone.name).is_some() {
                continue;
            }
            bones.insert(&bone.name, to_engine_matrix(&bone.offset));
            if !skeleton.mark_bone(&bone.name) {
                tracing::debug!("Bone '{}' has no matching node", bone.name);
            }
        }
    }

    if !bones.is_empty() {
        tracing::debug!(
            "Collected {} bones ({} matched skeleton nodes)",
            bones.len(),
            skeleton.bone_node_count()
        );
    }

    bones
}
