//! Config loading and JSON import reports

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use nether_bind::{
    AnimationRepresentation, CpuBuffer, ImportConfig, ImportStats, ImportedModel, Submesh,
};

/// Load an [`ImportConfig`] from a TOML file
pub fn load_config(path: &Path) -> Result<ImportConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&content)
}

/// Parse an [`ImportConfig`] from TOML text
pub fn parse_config(content: &str) -> Result<ImportConfig> {
    toml::from_str(content).context("Failed to parse import config")
}

/// One skeleton row in the report
#[derive(Debug, Serialize)]
pub struct NodeReport {
    pub index: u32,
    pub name: String,
    pub parent: Option<u32>,
    pub is_bone: bool,
}

/// Everything `import --report` writes
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub source: String,
    pub representation: AnimationRepresentation,
    pub vertex_stride: u32,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub submeshes: Vec<Submesh>,
    pub bones: Vec<String>,
    pub skeleton: Vec<NodeReport>,
    pub stats: ImportStats,
}

impl ImportReport {
    pub fn new(source: &Path, model: &ImportedModel<CpuBuffer>) -> Self {
        let bounds = model.bounds();
        Self {
            source: source.display().to_string(),
            representation: model.representation(),
            vertex_stride: model.vertex_stride(),
            bounds_min: bounds.min.to_array(),
            bounds_max: bounds.max.to_array(),
            submeshes: model.submeshes().to_vec(),
            bones: model.bone_names().to_vec(),
            skeleton: skeleton_rows(model),
            stats: *model.stats(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))
    }
}

pub fn skeleton_rows(model: &ImportedModel<CpuBuffer>) -> Vec<NodeReport> {
    model
        .skeleton()
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| NodeReport {
            index: index as u32,
            name: node.name.clone(),
            parent: node.parent,
            is_bone: node.is_bone,
        })
        .collect()
}
