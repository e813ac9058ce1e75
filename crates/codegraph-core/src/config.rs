use crate::span::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotStorage {
    InMemory,
    Relational { url: String },
}

impl Default for SnapshotStorage {
    fn default() -> Self {
        SnapshotStorage::InMemory
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CyclePolicy {
    Error,
    Warn,
    Ignore,
}

impl Default for CyclePolicy {
    fn default() -> Self {
        CyclePolicy::Warn
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkKindConfig {
    File,
    Module,
    Class,
    Function,
    Block,
}

/// Typed configuration consumed by the orchestrator. Loading this from a
/// file or environment is an external-collaborator concern; the pipeline
/// only ever receives an already-built value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub workspace_root: PathBuf,
    pub languages: Vec<Language>,
    pub parallelism: usize,
    pub enable_external_type_analyzer: bool,
    pub type_analyzer_project_root: Option<PathBuf>,
    pub incremental: bool,
    pub chunk_kinds_enabled: HashSet<ChunkKindConfig>,
    pub snapshot_storage: SnapshotStorage,
    pub cycle_policy: CyclePolicy,
}

impl PipelineConfig {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            ..Self::default()
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let default_parallelism = ((num_cpus::get() as f64) * 0.75).round().max(1.0) as usize;
        Self {
            workspace_root: PathBuf::from("."),
            languages: vec![Language::Python],
            parallelism: default_parallelism,
            enable_external_type_analyzer: false,
            type_analyzer_project_root: None,
            incremental: false,
            chunk_kinds_enabled: [
                ChunkKindConfig::File,
                ChunkKindConfig::Module,
                ChunkKindConfig::Class,
                ChunkKindConfig::Function,
                ChunkKindConfig::Block,
            ]
            .into_iter()
            .collect(),
            snapshot_storage: SnapshotStorage::default(),
            cycle_policy: CyclePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_parallelism_is_three_quarters_of_cores() {
        let cfg = PipelineConfig::default();
        let expected = ((num_cpus::get() as f64) * 0.75).round().max(1.0) as usize;
        assert_eq!(cfg.parallelism, expected);
    }
}
