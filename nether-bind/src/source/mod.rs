//! Source scene description
//!
//! Plain-data view of a third-party scene graph, as produced by an asset
//! import library. The binder only reads these records.
//!
//! Matrices are stored row-major (`m[row][col]`), the way the common import
//! libraries hand them out. [`to_engine_matrix`] converts them to the
//! column-major `glam::Mat4` used everywhere else in this crate.

#[cfg(feature = "gltf")]
pub mod gltf;

use glam::Mat4;

/// Row-major 4x4 matrix as authored by the source library
pub type SourceMatrix = [[f32; 4]; 4];

/// Row-major identity
pub const SOURCE_IDENTITY: SourceMatrix = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Convert a row-major source matrix to the engine's column-major convention
#[inline]
pub fn to_engine_matrix(m: &SourceMatrix) -> Mat4 {
    // Reading rows as columns yields the transpose, so flip it back
    Mat4::from_cols_array_2d(m).transpose()
}

/// Convert an engine matrix back to the row-major source convention
#[inline]
pub fn to_source_matrix(m: &Mat4) -> SourceMatrix {
    m.transpose().to_cols_array_2d()
}

/// A whole imported scene
#[derive(Debug, Clone, Default)]
pub struct SourceScene {
    /// Root of the node hierarchy
    pub root: SourceNode,
    /// Animation tracks; only their presence matters to the binder
    pub animations: Vec<SourceAnimation>,
}

impl SourceScene {
    pub fn new(root: SourceNode) -> Self {
        Self {
            root,
            animations: Vec::new(),
        }
    }

    pub fn with_animation(mut self, animation: SourceAnimation) -> Self {
        self.animations.push(animation);
        self
    }

    /// Total mesh records in the hierarchy
    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += node.meshes.len();
            stack.extend(node.children.iter());
        }
        count
    }

    /// Total bone records across all meshes (duplicates included)
    pub fn bone_record_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += node.meshes.iter().map(|m| m.bones.len()).sum::<usize>();
            stack.extend(node.children.iter());
        }
        count
    }
}

/// A node of the source hierarchy
#[derive(Debug, Clone)]
pub struct SourceNode {
    pub name: String,
    /// Bind-pose local transform (row-major)
    pub transform: SourceMatrix,
    pub meshes: Vec<SourceMesh>,
    pub children: Vec<SourceNode>,
}

impl Default for SourceNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: SOURCE_IDENTITY,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }
}

impl SourceNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_transform(mut self, transform: SourceMatrix) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: SourceMesh) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A mesh record: fixed vertex attributes, triangles, one material
///
/// `positions` defines the vertex count. Optional attribute arrays must match
/// it in length; mismatched arrays are ignored and defaults are used.
#[derive(Debug, Clone, Default)]
pub struct SourceMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub tangents: Option<Vec<[f32; 3]>>,
    pub bitangents: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub colors: Option<Vec<[f32; 4]>>,
    /// Pre-triangulated faces, mesh-local vertex indices
    pub faces: Vec<[u32; 3]>,
    pub material_index: u32,
    pub bones: Vec<SourceBone>,
}

impl SourceMesh {
    pub fn new(positions: Vec<[f32; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            faces,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn with_material(mut self, material_index: u32) -> Self {
        self.material_index = material_index;
        self
    }

    pub fn with_bone(mut self, bone: SourceBone) -> Self {
        self.bones.push(bone);
        self
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.faces.len() * 3
    }
}

/// One bone's influence list within a single mesh
#[derive(Debug, Clone)]
pub struct SourceBone {
    pub name: String,
    /// Bind-pose inverse offset (row-major)
    pub offset: SourceMatrix,
    pub weights: Vec<VertexWeight>,
}

impl SourceBone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            offset: SOURCE_IDENTITY,
            weights: Vec::new(),
        }
    }

    pub fn with_offset(mut self, offset: SourceMatrix) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_weight(mut self, vertex_id: u32, weight: f32) -> Self {
        self.weights.push(VertexWeight { vertex_id, weight });
        self
    }
}

/// A (mesh-local vertex, weight) pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

/// An animation track record
#[derive(Debug, Clone, Default)]
pub struct SourceAnimation {
    pub name: String,
    /// Names of the nodes this animation targets
    pub channels: Vec<String>,
}

impl SourceAnimation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, node_name: impl Into<String>) -> Self {
        self.channels.push(node_name.into());
        self
    }
}
