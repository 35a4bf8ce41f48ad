//! glTF/GLB source adapter
//!
//! Builds a [`SourceScene`] from a glTF 2.0 document:
//!
//! - The default scene (or the first one) is used. Several root nodes are
//!   parented under a synthetic root named after the scene.
//! - Unnamed nodes are named `node_<index>` so bones and skeleton nodes
//!   still match by name.
//! - Every triangle-list primitive becomes one [`SourceMesh`]. Other
//!   primitive modes are skipped.
//! - Per-vertex `JOINTS_0`/`WEIGHTS_0` are regrouped into one [`SourceBone`]
//!   per joint, carrying the skin's inverse bind matrix.
//! - Each animation becomes one [`SourceAnimation`] listing its target nodes.

use std::path::Path;

use ::gltf::mesh::Mode;
use anyhow::{Context, Result};
use glam::{Mat4, Vec3};

use super::{
    SOURCE_IDENTITY, SourceAnimation, SourceBone, SourceMatrix, SourceMesh, SourceNode,
    SourceScene, VertexWeight, to_source_matrix,
};

/// Load a glTF or GLB file from disk
pub fn load_gltf(path: &Path) -> Result<SourceScene> {
    let (document, buffers, _images) =
        ::gltf::import(path).with_context(|| format!("Failed to load glTF: {:?}", path))?;

    let scene = scene_from_gltf(&document, &buffers)
        .with_context(|| format!("Failed to convert glTF: {:?}", path))?;

    tracing::info!(
        "Loaded {:?}: {} meshes, {} bone records, {} animations",
        path,
        scene.mesh_count(),
        scene.bone_record_count(),
        scene.animations.len()
    );

    Ok(scene)
}

/// Convert an already-imported glTF document
pub fn scene_from_gltf(
    document: &::gltf::Document,
    buffers: &[::gltf::buffer::Data],
) -> Result<SourceScene> {
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("No scenes found in glTF")?;

    let mut roots = gltf_scene
        .nodes()
        .map(|node| convert_node(node, buffers))
        .collect::<Result<Vec<_>>>()?;

    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        let name = gltf_scene
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("scene_{}", gltf_scene.index()));
        SourceNode {
            name,
            children: roots,
            ..SourceNode::default()
        }
    };

    let mut scene = SourceScene::new(root);
    for animation in document.animations() {
        let name = animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("animation_{}", animation.index()));
        let mut channels: Vec<String> = animation
            .channels()
            .map(|channel| node_name(&channel.target().node()))
            .collect();
        channels.dedup();
        scene.animations.push(SourceAnimation { name, channels });
    }

    Ok(scene)
}

/// Name used for a glTF node on both the skeleton and bone side
fn node_name(node: &::gltf::Node<'_>) -> String {
    match node.name() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("node_{}", node.index()),
    }
}

/// glTF matrices are column-major
fn to_row_major(columns: [[f32; 4]; 4]) -> SourceMatrix {
    to_source_matrix(&Mat4::from_cols_array_2d(&columns))
}

fn convert_node(node: ::gltf::Node<'_>, buffers: &[::gltf::buffer::Data]) -> Result<SourceNode> {
    let mut out =
        SourceNode::new(node_name(&node)).with_transform(to_row_major(node.transform().matrix()));

    if let Some(mesh) = node.mesh() {
        let skin = node.skin().map(|skin| read_skin(&skin, buffers));
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));

        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                tracing::warn!(
                    "Mesh '{}' primitive {}: mode {:?} is not a triangle list, skipped",
                    mesh_name,
                    primitive.index(),
                    primitive.mode()
                );
                continue;
            }

            let converted = convert_primitive(&primitive, buffers, skin.as_ref())
                .with_context(|| format!("Mesh '{}' primitive {}", mesh_name, primitive.index()))?;
            out.meshes
                .push(converted.with_name(format!("{}.{}", mesh_name, primitive.index())));
        }
    }

    for child in node.children() {
        out.children.push(convert_node(child, buffers)?);
    }

    Ok(out)
}

/// Joint names and inverse bind matrices of one skin
struct SkinJoints {
    names: Vec<String>,
    offsets: Vec<SourceMatrix>,
}

fn read_skin(skin: &::gltf::Skin<'_>, buffers: &[::gltf::buffer::Data]) -> SkinJoints {
    let names: Vec<String> = skin.joints().map(|joint| node_name(&joint)).collect();

    let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
    let mut offsets: Vec<SourceMatrix> = reader
        .read_inverse_bind_matrices()
        .map(|iter| iter.map(to_row_major).collect())
        .unwrap_or_default();

    // Missing matrices are identity
    offsets.resize(names.len(), SOURCE_IDENTITY);

    SkinJoints { names, offsets }
}

fn convert_primitive(
    primitive: &::gltf::Primitive<'_>,
    buffers: &[::gltf::buffer::Data],
    skin: Option<&SkinJoints>,
) -> Result<SourceMesh> {
    let reader =
        primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .context("No positions in primitive")?
        .collect();
    let vertex_count = positions.len();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(iter) => iter.into_u32().collect(),
        None => (0..vertex_count as u32).collect(),
    };
    if indices.len() % 3 != 0 {
        tracing::warn!(
            "Index count {} is not a multiple of 3, trailing indices dropped",
            indices.len()
        );
    }
    let faces = indices
        .chunks_exact(3)
        .map(|tri| [tri[0], tri[1], tri[2]])
        .collect();

    let mut mesh = SourceMesh::new(positions, faces);
    mesh.material_index = primitive.material().index().map_or(0, |i| i as u32);
    mesh.normals = reader.read_normals().map(|iter| iter.collect());
    mesh.uvs = reader.read_tex_coords(0).map(|iter| iter.into_f32().collect());
    mesh.colors = reader.read_colors(0).map(|iter| iter.into_rgba_f32().collect());

    // Tangents are vec4 with handedness in w; the bitangent needs the normal
    if let (Some(tangents), Some(normals)) = (reader.read_tangents(), mesh.normals.as_ref()) {
        let tangents: Vec<[f32; 4]> = tangents.collect();
        let bitangents = tangents
            .iter()
            .zip(normals)
            .map(|(t, n)| {
                let tangent = Vec3::new(t[0], t[1], t[2]);
                (Vec3::from_array(*n).cross(tangent) * t[3]).to_array()
            })
            .collect();
        mesh.tangents = Some(tangents.iter().map(|t| [t[0], t[1], t[2]]).collect());
        mesh.bitangents = Some(bitangents);
    }

    let joints = reader.read_joints(0).map(|iter| iter.into_u16().collect::<Vec<_>>());
    let weights = reader.read_weights(0).map(|iter| iter.into_f32().collect::<Vec<_>>());

    match (joints, weights, skin) {
        (Some(joints), Some(weights), Some(skin)) => {
            mesh.bones = regroup_weights(&joints, &weights, skin);
        }
        (Some(_), Some(_), None) => {
            tracing::warn!("Primitive has joints but its node has no skin, ignoring skinning");
        }
        (Some(_), None, _) | (None, Some(_), _) => {
            tracing::warn!(
                "Primitive has partial skinning data (joints or weights missing), ignoring skinning"
            );
        }
        (None, None, _) => {}
    }

    Ok(mesh)
}

/// Turn per-vertex joint/weight quads into per-joint weight lists
fn regroup_weights(joints: &[[u16; 4]], weights: &[[f32; 4]], skin: &SkinJoints) -> Vec<SourceBone> {
    let mut bones: Vec<Option<SourceBone>> = vec![None; skin.names.len()];
    let mut out_of_range = 0usize;

    for (vertex, (joint_set, weight_set)) in joints.iter().zip(weights).enumerate() {
        for (&joint, &weight) in joint_set.iter().zip(weight_set) {
            if !weight.is_finite() || weight <= 0.0 {
                continue;
            }
            let Some(slot) = bones.get_mut(joint as usize) else {
                out_of_range += 1;
                continue;
            };
            slot.get_or_insert_with(|| {
                SourceBone::new(skin.names[joint as usize].clone())
                    .with_offset(skin.offsets[joint as usize])
            })
            .weights
            .push(VertexWeight {
                vertex_id: vertex as u32,
                weight,
            });
        }
    }

    if out_of_range > 0 {
        tracing::warn!(
            "{} influences reference joints past the skin's {} joints, skipped",
            out_of_range,
            skin.names.len()
        );
    }

    bones.into_iter().flatten().collect()
}
