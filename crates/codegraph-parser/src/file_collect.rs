use crate::language::LanguageRegistry;
use codegraph_core::{PipelineError, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DEFAULT_EXCLUDES: &[&str] = &[
    "**/target/**",
    "**/.git/**",
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/__pycache__/**",
    "**/.pytest_cache/**",
    "**/.mypy_cache/**",
];

/// Walk `root` and return every file whose extension matches a supported
/// language, respecting `.gitignore`/`.ignore` and the default excludes
/// above.
pub fn collect_source_files(root: &Path, registry: &LanguageRegistry) -> Result<Vec<PathBuf>> {
    info!(root = %root.display(), "collecting source files");

    let exclude_set = {
        let mut builder = globset::GlobSetBuilder::new();
        for pattern in DEFAULT_EXCLUDES {
            builder
                .add(globset::Glob::new(pattern).map_err(|e| PipelineError::IrBuild {
                    file: root.display().to_string(),
                    reason: format!("invalid exclude glob {pattern}: {e}"),
                })?);
        }
        builder
            .build()
            .map_err(|e| PipelineError::IrBuild {
                file: root.display().to_string(),
                reason: e.to_string(),
            })?
    };

    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).hidden(false).build() {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if exclude_set.is_match(path) {
            continue;
        }
        let Some(path_str) = path.to_str() else {
            continue;
        };
        if registry.detect_language(path_str).is_some() {
            files.push(path.to_path_buf());
        }
    }

    debug!(count = files.len(), "source file collection complete");
    Ok(files)
}
