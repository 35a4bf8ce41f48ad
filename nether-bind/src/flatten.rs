//! Scene graph flattening
//!
//! Merges every mesh owned by every node of the source hierarchy into one
//! vertex array and one index array.
//!
//! 1. One depth-first pre-order walk enumerates each (node, mesh) pair and
//!    prefix-sums vertex/index counts into per-mesh offsets.
//! 2. The output arrays are allocated once, at their final size.
//! 3. Each mesh is copied into its own disjoint slice, on the rayon pool
//!    when enabled. Indices are rebased by the mesh's vertex offset.
//! 4. One [`Submesh`] is emitted per mesh, including meshes with no faces,
//!    so subset counts stay stable across reimports.

use rayon::prelude::*;

use crate::error::ImportError;
use crate::gpu::BackendError;
use crate::model::Submesh;
use crate::source::{SourceMesh, SourceNode, SourceScene};
use crate::vertex::{DEFAULT_BITANGENT, DEFAULT_COLOR, DEFAULT_NORMAL, DEFAULT_TANGENT, DEFAULT_UV, Vertex};

/// Where one mesh landed in the flattened arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRange {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
    /// Owning source node (traversal id)
    pub node: u32,
}

/// A source node as seen by the flattening walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNodeInfo {
    pub name: String,
    /// Traversal id of the parent, `None` for the root
    pub parent: Option<u32>,
}

/// Output of [`flatten_scene`]
#[derive(Debug)]
pub struct FlattenedScene<'a> {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub submeshes: Vec<Submesh>,
    /// Mesh records in flattening order, parallel to `mesh_ranges`
    pub meshes: Vec<&'a SourceMesh>,
    pub mesh_ranges: Vec<MeshRange>,
    /// Every source node in pre-order, indexed by traversal id
    pub source_nodes: Vec<SourceNodeInfo>,
    /// Owning source node for each vertex
    pub vertex_owners: Vec<u32>,
}

/// One unit of parallel work: a mesh and the slices it owns
struct MeshJob<'a> {
    mesh_index: usize,
    mesh: &'a SourceMesh,
    vertex_offset: u32,
    vertices: &'a mut [Vertex],
    indices: &'a mut [u32],
}

/// Flatten the whole hierarchy into contiguous arrays
pub fn flatten_scene(scene: &SourceScene, parallel: bool) -> Result<FlattenedScene<'_>, ImportError> {
    let mut source_nodes = Vec::new();
    let mut meshes: Vec<&SourceMesh> = Vec::new();
    let mut mesh_ranges = Vec::new();
    let mut total_vertices: u64 = 0;
    let mut total_indices: u64 = 0;

    // Pre-order walk: children pushed in reverse so they pop in declaration order
    let mut stack: Vec<(&SourceNode, Option<u32>)> = vec![(&scene.root, None)];
    while let Some((node, parent)) = stack.pop() {
        let id = source_nodes.len() as u32;
        source_nodes.push(SourceNodeInfo {
            name: node.name.clone(),
            parent,
        });

        for mesh in &node.meshes {
            mesh_ranges.push(MeshRange {
                vertex_offset: checked_u32(total_vertices, "vertex array")?,
                vertex_count: checked_u32(mesh.vertex_count() as u64, "vertex array")?,
                index_offset: checked_u32(total_indices, "index array")?,
                index_count: checked_u32(mesh.index_count() as u64, "index array")?,
                node: id,
            });
            meshes.push(mesh);
            total_vertices += mesh.vertex_count() as u64;
            total_indices += mesh.index_count() as u64;
        }

        for child in node.children.iter().rev() {
            stack.push((child, Some(id)));
        }
    }

    if meshes.is_empty() {
        return Err(ImportError::NoGeometry);
    }

    let total_vertices = checked_u32(total_vertices, "vertex array")? as usize;
    let total_indices = checked_u32(total_indices, "index array")? as usize;

    tracing::debug!(
        "Flattening {} meshes from {} nodes: {} vertices, {} indices",
        meshes.len(),
        source_nodes.len(),
        total_vertices,
        total_indices
    );

    let mut vertices = allocate(total_vertices, Vertex::default(), "vertex array")?;
    let mut indices = allocate(total_indices, 0u32, "index array")?;
    let mut vertex_owners = allocate(total_vertices, 0u32, "vertex owner table")?;

    let submeshes = mesh_ranges
        .iter()
        .zip(&meshes)
        .map(|(range, mesh)| Submesh {
            start_index: range.index_offset,
            index_count: range.index_count,
            material_index: mesh.material_index,
        })
        .collect();

    for range in &mesh_ranges {
        let start = range.vertex_offset as usize;
        vertex_owners[start..start + range.vertex_count as usize].fill(range.node);
    }

    // Carve the output arrays into one disjoint slice pair per mesh
    let mut jobs = Vec::with_capacity(meshes.len());
    let mut rest_vertices: &mut [Vertex] = &mut vertices;
    let mut rest_indices: &mut [u32] = &mut indices;
    for (mesh_index, (range, &mesh)) in mesh_ranges.iter().zip(&meshes).enumerate() {
        let (job_vertices, tail) =
            std::mem::take(&mut rest_vertices).split_at_mut(range.vertex_count as usize);
        rest_vertices = tail;
        let (job_indices, tail) =
            std::mem::take(&mut rest_indices).split_at_mut(range.index_count as usize);
        rest_indices = tail;

        jobs.push(MeshJob {
            mesh_index,
            mesh,
            vertex_offset: range.vertex_offset,
            vertices: job_vertices,
            indices: job_indices,
        });
    }

    if parallel {
        jobs.into_par_iter().try_for_each(copy_mesh)?;
    } else {
        jobs.into_iter().try_for_each(copy_mesh)?;
    }

    Ok(FlattenedScene {
        vertices,
        indices,
        submeshes,
        meshes,
        mesh_ranges,
        source_nodes,
        vertex_owners,
    })
}

fn copy_mesh(job: MeshJob<'_>) -> Result<(), ImportError> {
    let mesh = job.mesh;
    let count = mesh.vertex_count();

    let normals = matching(&mesh.normals, count, "normal", job.mesh_index);
    let tangents = matching(&mesh.tangents, count, "tangent", job.mesh_index);
    let bitangents = matching(&mesh.bitangents, count, "bitangent", job.mesh_index);
    let uvs = matching(&mesh.uvs, count, "uv", job.mesh_index);
    let colors = matching(&mesh.colors, count, "color", job.mesh_index);

    for (i, (dst, &position)) in job.vertices.iter_mut().zip(&mesh.positions).enumerate() {
        let normal = normals.map_or(DEFAULT_NORMAL, |n| n[i]);
        *dst = Vertex {
            position,
            normal,
            smooth_normal: normal,
            tangent: tangents.map_or(DEFAULT_TANGENT, |t| t[i]),
            bitangent: bitangents.map_or(DEFAULT_BITANGENT, |b| b[i]),
            uv: uvs.map_or(DEFAULT_UV, |u| u[i]),
            color: colors.map_or(DEFAULT_COLOR, |c| c[i]),
            ..Vertex::default()
        };
    }

    for (dst, &index) in job.indices.iter_mut().zip(mesh.faces.iter().flatten()) {
        if index as usize >= count {
            return Err(ImportError::InvalidFaceIndex {
                mesh: job.mesh_index,
                index,
                vertex_count: count,
            });
        }
        *dst = job.vertex_offset + index;
    }

    Ok(())
}

/// Attribute array if its length matches the vertex count
fn matching<'a, T>(
    attribute: &'a Option<Vec<T>>,
    vertex_count: usize,
    what: &str,
    mesh_index: usize,
) -> Option<&'a [T]> {
    match attribute {
        Some(values) if values.len() == vertex_count => Some(values.as_slice()),
        Some(values) => {
            tracing::warn!(
                "Mesh {} has mismatched {} count ({} vs {} vertices), using defaults",
                mesh_index,
                what,
                values.len(),
                vertex_count
            );
            None
        }
        None => None,
    }
}

fn allocate<T: Clone>(len: usize, fill: T, label: &str) -> Result<Vec<T>, ImportError> {
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|e| ImportError::allocation(label, BackendError::OutOfMemory(e.to_string())))?;
    values.resize(len, fill);
    Ok(values)
}

fn checked_u32(value: u64, label: &str) -> Result<u32, ImportError> {
    u32::try_from(value).map_err(|_| {
        ImportError::allocation(
            label,
            BackendError::SizeLimit {
                requested: value,
                limit: u32::MAX as u64,
            },
        )
    })
}
