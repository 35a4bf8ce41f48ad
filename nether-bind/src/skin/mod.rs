//! Skin weight assignment
//!
//! Bone records carry scattered (bone, vertex, weight) triples. They are
//! folded into a fixed four-slot table per vertex and renormalized.
//!
//! # Slot selection
//!
//! Triples are visited in a fixed order: meshes in flattening order, then
//! bone records, then each bone's weight list. A triple takes the first free
//! slot; once all four are occupied it replaces the smallest slot only if it
//! is strictly heavier. Among equally small slots the lowest slot index is
//! replaced. Equal weights therefore never displace each other and the
//! first-visited influence is kept.
//!
//! # Normalization
//!
//! Each vertex's slots are divided by their sum. A vertex whose sum is at or
//! below the epsilon (usually one no bone referenced) gets full weight on
//! bone 0 instead of collapsing to the origin.
//!
//! Negative and non-finite weights never reach the table; they are skipped
//! and counted with the out-of-range references.

use crate::bones::BoneSet;
use crate::flatten::MeshRange;
use crate::source::SourceMesh;
use crate::vertex::{MAX_INFLUENCES, Vertex};


/// One (bone, weight) slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Influence {
    pub bone: u32,
    pub weight: f32,
}

type Slots = [Option<Influence>; MAX_INFLUENCES];

/// Four influence slots per vertex
#[derive(Debug, Clone)]
pub struct InfluenceTable {
    slots: Vec<Slots>,
    dropped: usize,
}

impl InfluenceTable {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            slots: vec![[None; MAX_INFLUENCES]; vertex_count],
            dropped: 0,
        }
    }

    /// Offer an influence to `vertex`. Returns true if it now occupies a slot.
    pub fn add(&mut self, vertex: usize, bone: u32, weight: f32) -> bool {
        let slots = &mut self.slots[vertex];
        let candidate = Influence { bone, weight };

        if let Some(free) = slots.iter_mut().find(|slot| slot.is_none()) {
            *free = Some(candidate);
            return true;
        }

        // Smallest occupied slot, lowest index on ties
        let (smallest, smallest_weight) = slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|s| (i, s.weight)))
            .fold((0, f32::INFINITY), |best, (i, w)| if w < best.1 { (i, w) } else { best });

        // Either the old occupant or the candidate is lost
        self.dropped += 1;
        if weight > smallest_weight {
            slots[smallest] = Some(candidate);
            true
        } else {
            false
        }
    }

    pub fn slots(&self, vertex: usize) -> &[Option<Influence>; MAX_INFLUENCES] {
        &self.slots[vertex]
    }

    /// Influences that did not survive the four-slot limit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Normalize and write the slots into `vertices`
    ///
    /// A negative or NaN `epsilon` is treated as zero. Returns the number of
    /// vertices that fell back to bone 0.
    pub fn write_into(&self, vertices: &mut [Vertex], epsilon: f32) -> usize {
        let epsilon = epsilon.max(0.0);
        let mut unweighted = 0;

        for (vertex, slots) in vertices.iter_mut().zip(&self.slots) {
            let sum: f32 = slots.iter().flatten().map(|s| s.weight).sum();
            if !sum.is_finite() || sum <= epsilon {
                vertex.bind_rigid(0);
                unweighted += 1;
                continue;
            }

            for (k, slot) in slots.iter().enumerate() {
                let (bone, weight) = slot.map_or((0, 0.0), |s| (s.bone, s.weight / sum));
                vertex.bone_indices[k] = bone;
                vertex.bone_weights[k] = weight;
            }
        }

        unweighted
    }
}

/// Counters from [`assign_skin_weights`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkinStats {
    /// Weights pointing past their mesh's vertex range, or negative or
    /// non-finite (skipped)
    pub malformed_references: usize,
    /// Influences lost to the four-slot limit
    pub dropped_influences: usize,
    /// Vertices with no usable weight, bound to bone 0
    pub unweighted_vertices: usize,
}

/// Fold every mesh's bone records into `vertices`
///
/// `meshes` and `ranges` are the parallel outputs of the flattener; each
/// mesh-local vertex id is rebased by its range's vertex offset.
pub fn assign_skin_weights(
    meshes: &[&SourceMesh],
    ranges: &[MeshRange],
    bones: &BoneSet,
    vertices: &mut [Vertex],
    epsilon: f32,
) -> SkinStats {
    let mut table = InfluenceTable::new(vertices.len());
    let mut stats = SkinStats::default();

    for (mesh_index, (mesh, range)) in meshes.iter().zip(ranges).enumerate() {
        let mut malformed = 0;
        let mut invalid = 0;

        for bone in &mesh.bones {
            let Some(bone_index) = bones.index_of(&bone.name) else {
                tracing::debug!("Bone '{}' missing from bone set, skipped", bone.name);
                continue;
            };

            for w in &bone.weights {
                if w.vertex_id >= range.vertex_count {
                    malformed += 1;
                    continue;
                }
                if !w.weight.is_finite() || w.weight < 0.0 {
                    invalid += 1;
                    continue;
                }
                let global = (range.vertex_offset + w.vertex_id) as usize;
                table.add(global, bone_index, w.weight);
            }
        }

        if malformed > 0 {
            tracing::warn!(
                "Mesh {} ('{}'): skipped {} bone weights referencing vertices past {}",
                mesh_index,
                mesh.name,
                malformed,
                range.vertex_count
            );
        }
        if invalid > 0 {
            tracing::warn!(
                "Mesh {} ('{}'): skipped {} negative or non-finite bone weights",
                mesh_index,
                mesh.name,
                invalid
            );
        }
        stats.malformed_references += malformed + invalid;
    }

    stats.dropped_influences = table.dropped();
    stats.unweighted_vertices = table.write_into(vertices, epsilon);

    tracing::debug!(
        "Skin weights: {} vertices, {} influences dropped, {} unweighted",
        vertices.len(),
        stats.dropped_influences,
        stats.unweighted_vertices
    );

    stats
}
