use crate::symbol::Symbol;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The outcome of resolving one `ImportRef` against the project symbol
/// table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedImport {
    pub imported_fqn: String,
    pub resolved_fqn: Option<String>,
    pub source_file: Option<String>,
    pub is_external: bool,
}

/// Diagnostics the resolver surfaces without failing the build. Non-fatal
/// by construction: a `Vec` the caller may ignore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolverDiagnostic {
    AmbiguousFqn {
        fqn: String,
        candidates: Vec<String>,
    },
    DependencyCycle {
        scc: Vec<String>,
    },
}

/// `{symbol_table, file_imports, dependency_graph, strongly_connected_components,
/// topological_order, diagnostics}`. Immutable once the build finishes;
/// shared by downstream consumers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalContext {
    pub symbol_table: HashMap<String, Symbol>,
    pub file_imports: HashMap<String, Vec<ResolvedImport>>,
    /// `file -> file` edges: `f -> g` means `f` imports a symbol defined in `g`.
    pub dependency_edges: Vec<(String, String)>,
    pub strongly_connected_components: Vec<Vec<String>>,
    pub topological_order: Vec<String>,
    pub diagnostics: Vec<ResolverDiagnostic>,
}

/// `{snapshot_id, project_id, files[], typing_info, signature_info,
/// timestamp}` — produced jointly by the type server adapter and the
/// Semantic IR builder, persistable and reusable across incremental runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SemanticSnapshot {
    pub snapshot_id: String,
    pub project_id: String,
    pub files: Vec<String>,
    /// Keyed by `"file_path:start_byte:end_byte"` (see `span_key`).
    pub typing_info: HashMap<String, String>,
    pub signature_info: HashMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

impl SemanticSnapshot {
    pub fn span_key(file_path: &str, span: &crate::span::Span) -> String {
        format!("{}:{}:{}", file_path, span.start_byte, span.end_byte)
    }
}
