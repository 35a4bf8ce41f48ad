//! Import pipeline
//!
//! Runs every stage in dependency order and hands back one bound model:
//!
//! ```text
//! flatten -> smooth normals -> skeleton -> bones -> classify
//!         -> { static | rigid | skinned } -> bounds -> upload
//! ```
//!
//! Nothing is uploaded until the vertex array is final, and any error drops
//! every intermediate array.

use crate::bones::collect_bones;
use crate::classify::AnimationRepresentation;
use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::flatten::{FlattenedScene, flatten_scene};
use crate::gpu::{GpuBackend, materialize};
use crate::model::{Aabb, ImportStats, ImportedModel};
use crate::normals::{copy_normals, synthesize_smooth_normals};
use crate::rigid::bind_rigid;
use crate::skeleton::Skeleton;
use crate::skin::assign_skin_weights;
use crate::source::SourceScene;

/// Import `scene` and upload it to `backend`
pub fn import_scene<G: GpuBackend>(
    scene: &SourceScene,
    backend: &G,
    config: &ImportConfig,
) -> Result<ImportedModel<G::Buffer>, ImportError> {
    let FlattenedScene {
        mut vertices,
        indices,
        submeshes,
        meshes,
        mesh_ranges,
        source_nodes,
        vertex_owners,
    } = flatten_scene(scene, config.parallel)?;

    let smooth_normal_groups = if config.smooth_normals {
        synthesize_smooth_normals(&mut vertices, config.normal_weld_epsilon)
    } else {
        copy_normals(&mut vertices);
        0
    };

    let mut skeleton = Skeleton::build(&scene.root);
    let collected = collect_bones(&meshes, &mut skeleton);
    let representation = AnimationRepresentation::classify(collected.len(), scene.animations.len());

    let mut stats = ImportStats {
        meshes: meshes.len(),
        vertices: vertices.len(),
        indices: indices.len(),
        submeshes: submeshes.len(),
        smooth_normal_groups,
        ..ImportStats::default()
    };

    let bones = match representation {
        AnimationRepresentation::Static => {
            for vertex in &mut vertices {
                vertex.bind_rigid(0);
            }
            collected
        }
        AnimationRepresentation::Rigid => {
            let binding = bind_rigid(&mut skeleton, &source_nodes, &vertex_owners, &mut vertices);
            stats.fallback_vertices = binding.fallback_vertices;
            binding.bones
        }
        AnimationRepresentation::Skinned => {
            let skin = assign_skin_weights(
                &meshes,
                &mesh_ranges,
                &collected,
                &mut vertices,
                config.weight_epsilon,
            );
            stats.malformed_bone_references = skin.malformed_references;
            stats.dropped_influences = skin.dropped_influences;
            stats.fallback_vertices = skin.unweighted_vertices;
            collected
        }
    };

    stats.skeleton_nodes = skeleton.len();
    stats.bones = bones.len();

    let bounds = Aabb::from_vertices(&vertices);

    let buffers = materialize(
        backend,
        &vertices,
        &indices,
        &config.vertex_buffer_label,
        &config.index_buffer_label,
    )?;

    tracing::info!(
        "Imported {} model: {} meshes, {} vertices, {} indices, {} nodes, {} bones",
        representation,
        stats.meshes,
        stats.vertices,
        stats.indices,
        stats.skeleton_nodes,
        stats.bones
    );
    if stats.malformed_bone_references > 0 || stats.dropped_influences > 0 {
        tracing::info!(
            "  skipped {} malformed bone references, dropped {} influences",
            stats.malformed_bone_references,
            stats.dropped_influences
        );
    }

    Ok(ImportedModel {
        buffers,
        vertex_label: config.vertex_buffer_label.clone(),
        index_label: config.index_buffer_label.clone(),
        vertices,
        indices,
        submeshes,
        skeleton,
        bones,
        representation,
        bounds,
        stats,
    })
}
