//! Import configuration
//!
//! All import policy is passed in explicitly; the binder keeps no state
//! between calls. Every field has a default so partial TOML files work:
//!
//! ```toml
//! smooth_normals = true
//! normal_weld_epsilon = 0.0001
//! parallel = false
//! ```

use serde::{Deserialize, Serialize};

/// Default weld grid cell size for smooth normal grouping
pub const DEFAULT_NORMAL_WELD_EPSILON: f32 = 1.0e-4;

/// Default weight sum under which a vertex counts as unweighted
pub const DEFAULT_WEIGHT_EPSILON: f32 = 1.0e-6;

/// Options for [`crate::import_scene`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Synthesize position-welded smooth normals for outline rendering.
    /// When disabled the smooth normal is a copy of the vertex normal.
    pub smooth_normals: bool,

    /// Quantization step (per axis) used to group coincident positions
    pub normal_weld_epsilon: f32,

    /// Vertices whose influence sum is at or below this get full weight on bone 0.
    /// Negative values are treated as zero.
    pub weight_epsilon: f32,

    /// Copy per-mesh attributes on the rayon pool. Output is identical either way.
    pub parallel: bool,

    /// Debug label for the vertex buffer
    pub vertex_buffer_label: String,

    /// Debug label for the index buffer
    pub index_buffer_label: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            smooth_normals: true,
            normal_weld_epsilon: DEFAULT_NORMAL_WELD_EPSILON,
            weight_epsilon: DEFAULT_WEIGHT_EPSILON,
            parallel: true,
            vertex_buffer_label: "Imported Vertex Buffer".to_string(),
            index_buffer_label: "Imported Index Buffer".to_string(),
        }
    }
}

impl ImportConfig {
    /// Sequential variant of the default config
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }
}
