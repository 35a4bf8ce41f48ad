//! Rigid bone synthesis
//!
//! A keyed hierarchy without bone records is animated through the same
//! skinning path as a real rig: every skeleton node gets an identity-offset
//! bone (bone i drives node i) and every vertex is bound 100% to the bone of
//! the node that owns its mesh.

use glam::Mat4;

use crate::bones::BoneSet;
use crate::flatten::SourceNodeInfo;
use crate::skeleton::Skeleton;
use crate::vertex::Vertex;

/// Result of rigid binding
#[derive(Debug, Clone)]
pub struct RigidBinding {
    pub bones: BoneSet,
    /// Vertices whose owner chain never resolved and were bound to bone 0
    pub fallback_vertices: usize,
}

/// Build per-node bones and bind each vertex to its owning node
///
/// `vertex_owners` holds a source traversal id per vertex. An owner resolves
/// to the skeleton node with the same pre-order id when the names agree.
/// Owners with no such match fall back to a name lookup walking up their
/// source parents; if nothing resolves the vertex lands on bone 0.
pub fn bind_rigid(
    skeleton: &mut Skeleton,
    source_nodes: &[SourceNodeInfo],
    vertex_owners: &[u32],
    vertices: &mut [Vertex],
) -> RigidBinding {
    let mut bones = BoneSet::new();
    for node in skeleton.nodes() {
        bones.push_synthetic(&node.name, Mat4::IDENTITY);
    }
    skeleton.mark_all_bones();

    // Resolve each source node once
    let lookup: &Skeleton = skeleton;
    let resolved: Vec<Option<u32>> = (0..source_nodes.len() as u32)
        .map(|id| resolve_owner(lookup, source_nodes, id))
        .collect();

    let mut fallback_vertices = 0;
    for (vertex, &owner) in vertices.iter_mut().zip(vertex_owners) {
        let bone = match resolved.get(owner as usize).copied().flatten() {
            Some(bone) => bone,
            None => {
                fallback_vertices += 1;
                0
            }
        };
        vertex.bind_rigid(bone);
    }

    if fallback_vertices > 0 {
        tracing::warn!(
            "{} vertices had no resolvable owning node, bound to bone 0",
            fallback_vertices
        );
    }
    tracing::debug!("Rigid binding: {} synthetic bones", bones.len());

    RigidBinding {
        bones,
        fallback_vertices,
    }
}

fn resolve_owner(skeleton: &Skeleton, source_nodes: &[SourceNodeInfo], id: u32) -> Option<u32> {
    let info = source_nodes.get(id as usize)?;
    if let Some(index) = skeleton.preorder_node(id) {
        if skeleton.node(index).is_some_and(|node| node.name == info.name) {
            return Some(index);
        }
    }

    let mut current = Some(id);
    while let Some(id) = current {
        let info = source_nodes.get(id as usize)?;
        if !info.name.is_empty() {
            if let Some(index) = skeleton.find(&info.name) {
                return Some(index);
            }
        }
        current = info.parent;
    }
    None
}
