//! Integration tests for the import pipeline.
//!
//! Each test builds a source scene by hand, imports it against the CPU
//! backend and checks the bound model.

use nether_bind::{
    AnimationRepresentation, BackendError, CpuBackend, CpuBuffer, ImportConfig, ImportError,
    ImportedModel, SourceAnimation, SourceBone, SourceMesh, SourceNode, SourceScene,
    VERTEX_STRIDE, Vertex, import_scene,
};

const EPSILON: f32 = 1e-4;

fn import(scene: &SourceScene) -> ImportedModel<CpuBuffer> {
    import_scene(scene, &CpuBackend::new(), &ImportConfig::default()).expect("import failed")
}

fn triangle() -> SourceMesh {
    SourceMesh::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        vec![[0, 1, 2]],
    )
}

fn quad(z: f32) -> SourceMesh {
    SourceMesh::new(
        vec![[0.0, 0.0, z], [1.0, 0.0, z], [1.0, 1.0, z], [0.0, 1.0, z]],
        vec![[0, 1, 2], [2, 3, 0]],
    )
}

fn assert_weights_normalized(vertices: &[Vertex]) {
    for (i, v) in vertices.iter().enumerate() {
        assert!(
            (v.weight_sum() - 1.0).abs() < EPSILON,
            "vertex {i} weights sum to {}",
            v.weight_sum()
        );
    }
}

/// A skinned character spread over several nodes
fn character() -> SourceScene {
    let body = quad(0.0)
        .with_material(0)
        .with_bone(
            SourceBone::new("Hips")
                .with_weight(0, 1.0)
                .with_weight(1, 0.5)
                .with_weight(2, 0.5),
        )
        .with_bone(
            SourceBone::new("Spine")
                .with_weight(1, 0.5)
                .with_weight(2, 0.5)
                .with_weight(3, 1.0),
        );
    let head = triangle()
        .with_material(1)
        .with_bone(SourceBone::new("Head").with_weight(0, 1.0).with_weight(1, 1.0))
        .with_bone(SourceBone::new("Spine").with_weight(2, 1.0));

    let root = SourceNode::new("Armature")
        .with_child(
            SourceNode::new("Hips").with_child(
                SourceNode::new("Spine").with_child(SourceNode::new("Head")),
            ),
        )
        .with_child(SourceNode::new("BodyMesh").with_mesh(body))
        .with_child(SourceNode::new("HeadMesh").with_mesh(head));

    SourceScene::new(root).with_animation(SourceAnimation::new("Walk").with_channel("Hips"))
}

// ============================================================================
// Classification scenarios
// ============================================================================

#[test]
fn test_static_single_triangle() {
    let scene = SourceScene::new(SourceNode::new("root").with_mesh(triangle()));
    let model = import(&scene);

    assert_eq!(model.representation(), AnimationRepresentation::Static);
    assert!(model.bone_names().is_empty());
    assert_eq!(model.vertices().len(), 3);
    for v in model.vertices() {
        assert_eq!(v.bone_indices, [0, 0, 0, 0]);
        assert_eq!(v.bone_weights, [1.0, 0.0, 0.0, 0.0]);
    }
}

#[test]
fn test_rigid_parent_child() {
    let root = SourceNode::new("Parent")
        .with_mesh(triangle())
        .with_child(SourceNode::new("Child").with_mesh(quad(1.0)));
    let scene =
        SourceScene::new(root).with_animation(SourceAnimation::new("Wave").with_channel("Child"));
    let model = import(&scene);

    assert_eq!(model.representation(), AnimationRepresentation::Rigid);
    assert_eq!(model.bone_names(), &["Parent", "Child"]);
    assert!(model.skeleton().nodes().iter().all(|n| n.is_bone));

    let parent_bone = model.bones().index_of("Parent").unwrap();
    let child_bone = model.bones().index_of("Child").unwrap();
    for v in &model.vertices()[..3] {
        assert_eq!(v.bone_indices, [parent_bone, 0, 0, 0]);
        assert_eq!(v.bone_weights, [1.0, 0.0, 0.0, 0.0]);
    }
    for v in &model.vertices()[3..] {
        assert_eq!(v.bone_indices, [child_bone, 0, 0, 0]);
        assert_eq!(v.bone_weights, [1.0, 0.0, 0.0, 0.0]);
    }
}

#[test]
fn test_rigid_duplicate_names_bind_own_bones() {
    let root = SourceNode::new("root")
        .with_child(SourceNode::new("Wheel").with_mesh(triangle()))
        .with_child(SourceNode::new("Wheel").with_mesh(triangle()));
    let scene =
        SourceScene::new(root).with_animation(SourceAnimation::new("Drive").with_channel("Wheel"));
    let model = import(&scene);

    assert_eq!(model.representation(), AnimationRepresentation::Rigid);
    assert_eq!(model.bone_names(), &["root", "Wheel", "Wheel"]);
    assert!(model.vertices()[..3].iter().all(|v| v.bone_indices[0] == 1));
    assert!(model.vertices()[3..].iter().all(|v| v.bone_indices[0] == 2));
    assert_eq!(model.stats().fallback_vertices, 0);
}

#[test]
fn test_skinned_single_bone() {
    let mut bone = SourceBone::new("Root");
    for vertex in 0..5 {
        bone = bone.with_weight(vertex, 1.0);
    }
    let mesh = SourceMesh::new(
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.5, 2.0, 0.0],
        ],
        vec![[0, 1, 2], [2, 3, 0], [3, 2, 4]],
    )
    .with_bone(bone);
    let scene = SourceScene::new(SourceNode::new("Root").with_mesh(mesh));
    let model = import(&scene);

    assert_eq!(model.representation(), AnimationRepresentation::Skinned);
    assert_eq!(model.bone_names(), &["Root"]);
    assert!(model.skeleton().nodes()[0].is_bone);
    for v in model.vertices() {
        assert_eq!(v.bone_indices[0], 0);
        assert_eq!(v.bone_weights[0], 1.0);
    }
}

#[test]
fn test_skinned_overflow_keeps_heaviest_four() {
    let mesh = [0.1, 0.2, 0.3, 0.15, 0.25]
        .into_iter()
        .enumerate()
        .fold(triangle(), |mesh, (i, w)| {
            mesh.with_bone(SourceBone::new(format!("b{i}")).with_weight(0, w))
        });
    let scene = SourceScene::new(SourceNode::new("root").with_mesh(mesh));
    let model = import(&scene);

    let v = &model.vertices()[0];
    let weight_of = |bone: u32| {
        v.bone_indices
            .iter()
            .zip(&v.bone_weights)
            .find(|(b, _)| **b == bone)
            .map(|(_, w)| *w)
    };
    assert_eq!(weight_of(0), None);
    assert!((weight_of(1).unwrap() - 0.2 / 0.9).abs() < EPSILON);
    assert!((weight_of(2).unwrap() - 0.3 / 0.9).abs() < EPSILON);
    assert!((weight_of(3).unwrap() - 0.15 / 0.9).abs() < EPSILON);
    assert!((weight_of(4).unwrap() - 0.25 / 0.9).abs() < EPSILON);
    assert_eq!(model.stats().dropped_influences, 1);
}

#[test]
fn test_bind_pose_only_rig_is_skinned() {
    let mesh = triangle().with_bone(SourceBone::new("root").with_weight(0, 1.0));
    let scene = SourceScene::new(SourceNode::new("root").with_mesh(mesh));
    assert_eq!(import(&scene).representation(), AnimationRepresentation::Skinned);
}

// ============================================================================
// Structural properties
// ============================================================================

#[test]
fn test_character_weights_normalized() {
    let model = import(&character());

    assert_eq!(model.representation(), AnimationRepresentation::Skinned);
    assert_eq!(model.bone_names(), &["Hips", "Spine", "Head"]);
    assert_weights_normalized(model.vertices());

    let bone_count = model.bone_names().len() as u32;
    for v in model.vertices() {
        assert!(v.bone_indices.iter().all(|&b| b < bone_count));
    }
}

#[test]
fn test_shared_bone_resolves_across_meshes() {
    let model = import(&character());
    let spine = model.bones().index_of("Spine").unwrap();

    // Body vertex 3 and head vertex 2 (global 6) both belong to Spine
    assert_eq!(model.vertices()[3].bone_indices[0], spine);
    assert_eq!(model.vertices()[6].bone_indices[0], spine);
    assert_eq!(model.vertices()[6].bone_weights[0], 1.0);
}

#[test]
fn test_submeshes_partition_index_buffer() {
    let model = import(&character());
    let submeshes = model.submeshes();

    assert_eq!(submeshes.len(), 2);
    assert_eq!(submeshes[0].start_index, 0);
    for pair in submeshes.windows(2) {
        assert_eq!(pair[0].start_index + pair[0].index_count, pair[1].start_index);
    }
    let last = submeshes.last().unwrap();
    assert_eq!(last.start_index + last.index_count, model.index_count());
    assert_eq!(submeshes[1].material_index, 1);
}

#[test]
fn test_skeleton_parent_precedes_child() {
    let model = import(&character());
    let skeleton = model.skeleton();

    assert_eq!(model.root_index(), 0);
    assert_eq!(skeleton.nodes()[0].name, "Armature");
    for (i, node) in skeleton.nodes().iter().enumerate().skip(1) {
        let parent = node.parent.expect("non-root node without parent");
        assert!((parent as usize) < i);
    }
    let hips = skeleton.find("Hips").unwrap();
    let head = skeleton.find("Head").unwrap();
    assert_eq!(skeleton.ancestors(head).next(), skeleton.find("Spine"));
    assert!(skeleton.ancestors(head).any(|a| a == hips));
}

#[test]
fn test_import_is_deterministic() {
    let scene = character();
    let first = import(&scene);
    let second = import_scene(&scene, &CpuBackend::new(), &ImportConfig::sequential()).unwrap();

    assert_eq!(first.vertices(), second.vertices());
    assert_eq!(first.indices(), second.indices());
    assert_eq!(first.submeshes(), second.submeshes());
    assert_eq!(first.vertex_buffer().data(), second.vertex_buffer().data());
    assert_eq!(first.stats(), second.stats());
}

#[test]
fn test_gpu_buffers_match_cpu_arrays() {
    let model = import(&character());

    assert_eq!(model.vertex_stride(), VERTEX_STRIDE);
    assert_eq!(
        model.vertex_buffer().data(),
        bytemuck::cast_slice::<Vertex, u8>(model.vertices())
    );
    assert_eq!(model.index_buffer().len(), model.indices().len() * 4);
    assert_eq!(model.index_count() as usize, model.indices().len());
    assert_eq!(model.vertex_buffer().label(), "Imported Vertex Buffer");
}

#[test]
fn test_bounds_cover_positions() {
    let root = SourceNode::new("root")
        .with_mesh(triangle())
        .with_child(SourceNode::new("far").with_mesh(quad(-3.0)));
    let model = import(&SourceScene::new(root));

    let bounds = model.bounds();
    assert_eq!(bounds.min.to_array(), [0.0, 0.0, -3.0]);
    assert_eq!(bounds.max.to_array(), [1.0, 1.0, 0.0]);
}

#[test]
fn test_mesh_without_vertices_has_zero_bounds() {
    let scene = SourceScene::new(SourceNode::new("root").with_mesh(SourceMesh::default()));
    let model = import(&scene);

    assert_eq!(model.submeshes().len(), 1);
    assert_eq!(model.submeshes()[0].index_count, 0);
    assert_eq!(model.bounds().min.to_array(), [0.0; 3]);
    assert_eq!(model.bounds().max.to_array(), [0.0; 3]);
}

// ============================================================================
// Smooth normals
// ============================================================================

#[test]
fn test_smooth_normals_weld_seam() {
    // Two faces meeting at a hard edge, vertices duplicated along the seam
    let left = SourceMesh::new(
        vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]],
        vec![[0, 1, 2]],
    )
    .with_normals(vec![[0.0, 0.0, 1.0]; 3]);
    let right = SourceMesh::new(
        vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, -1.0]],
        vec![[0, 1, 2]],
    )
    .with_normals(vec![[1.0, 0.0, 0.0]; 3]);
    let scene = SourceScene::new(SourceNode::new("root").with_mesh(left).with_mesh(right));
    let model = import(&scene);

    let expected = std::f32::consts::FRAC_1_SQRT_2;
    let seam = &model.vertices()[0];
    assert!((seam.smooth_normal[0] - expected).abs() < EPSILON);
    assert!((seam.smooth_normal[2] - expected).abs() < EPSILON);
    assert_eq!(seam.normal, [0.0, 0.0, 1.0]);
    assert_eq!(model.vertices()[2].smooth_normal, [0.0, 0.0, 1.0]);
    assert_eq!(model.stats().smooth_normal_groups, 4);
}

#[test]
fn test_smooth_normals_disabled_copies_normal() {
    let mesh = triangle().with_normals(vec![[0.0, 0.0, 1.0]; 3]);
    let config = ImportConfig {
        smooth_normals: false,
        ..ImportConfig::default()
    };
    let scene = SourceScene::new(SourceNode::new("root").with_mesh(mesh));
    let model = import_scene(&scene, &CpuBackend::new(), &config).unwrap();

    assert!(model.vertices().iter().all(|v| v.smooth_normal == v.normal));
    assert_eq!(model.stats().smooth_normal_groups, 0);
}

// ============================================================================
// Failures and recoverable data problems
// ============================================================================

#[test]
fn test_no_meshes_fails() {
    let scene = SourceScene::new(SourceNode::new("root").with_child(SourceNode::new("empty")));
    let result = import_scene(&scene, &CpuBackend::new(), &ImportConfig::default());
    assert!(matches!(result, Err(ImportError::NoGeometry)));
}

#[test]
fn test_malformed_bone_reference_is_skipped() {
    let mesh = triangle().with_bone(
        SourceBone::new("root")
            .with_weight(0, 1.0)
            .with_weight(1, 1.0)
            .with_weight(2, 1.0)
            .with_weight(3, 1.0)
            .with_weight(99, 1.0),
    );
    let scene = SourceScene::new(SourceNode::new("root").with_mesh(mesh));
    let model = import(&scene);

    assert_eq!(model.stats().malformed_bone_references, 2);
    assert_weights_normalized(model.vertices());
}

#[test]
fn test_invalid_weights_are_skipped() {
    let mesh = triangle()
        .with_bone(
            SourceBone::new("a")
                .with_weight(0, 1.0)
                .with_weight(1, 1.0)
                .with_weight(2, 1.0),
        )
        .with_bone(
            SourceBone::new("b")
                .with_weight(0, f32::NAN)
                .with_weight(1, -0.5)
                .with_weight(2, f32::INFINITY),
        );
    let scene = SourceScene::new(SourceNode::new("root").with_mesh(mesh));
    let model = import(&scene);

    assert_eq!(model.stats().malformed_bone_references, 3);
    assert_weights_normalized(model.vertices());
    for v in model.vertices() {
        assert_eq!(v.bone_weights, [1.0, 0.0, 0.0, 0.0]);
        assert!(v.bone_weights.iter().all(|w| (0.0..=1.0).contains(w)));
    }
}

#[test]
fn test_unweighted_vertex_falls_back_to_bone_zero() {
    let mesh = triangle()
        .with_bone(SourceBone::new("a").with_weight(0, 1.0))
        .with_bone(SourceBone::new("b").with_weight(1, 1.0));
    let scene = SourceScene::new(SourceNode::new("root").with_mesh(mesh));
    let model = import(&scene);

    assert_eq!(model.stats().fallback_vertices, 1);
    assert_eq!(model.vertices()[2].bone_indices, [0; 4]);
    assert_eq!(model.vertices()[2].bone_weights, [1.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_backend_failure_is_buffer_allocation() {
    let scene = character();
    let backend = CpuBackend::with_max_buffer_size(16);
    let err = import_scene(&scene, &backend, &ImportConfig::default()).unwrap_err();

    match err {
        ImportError::BufferAllocation { label, source } => {
            assert_eq!(label, "Imported Vertex Buffer");
            assert!(matches!(source, BackendError::SizeLimit { limit: 16, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_rebuild_failure_keeps_old_buffers() {
    let mut model = import(&character());
    let before = model.vertex_buffer().clone();

    let result = model.rebuild_gpu_buffers(&CpuBackend::with_max_buffer_size(16));
    assert!(matches!(result, Err(ImportError::BufferAllocation { .. })));
    assert_eq!(model.vertex_buffer(), &before);

    model.rebuild_gpu_buffers(&CpuBackend::new()).unwrap();
    assert_eq!(model.vertex_buffer(), &before);
}

#[test]
fn test_stats_reflect_model() {
    let model = import(&character());
    let stats = model.stats();

    assert_eq!(stats.meshes, 2);
    assert_eq!(stats.vertices, 7);
    assert_eq!(stats.indices, 9);
    assert_eq!(stats.submeshes, 2);
    assert_eq!(stats.skeleton_nodes, 6);
    assert_eq!(stats.bones, 3);
    assert_eq!(stats.malformed_bone_references, 0);
}
