use codegraph_concurrent::ConcurrentMap;
use codegraph_core::{IrDocument, NodeKind, ResolverDiagnostic, Symbol};
use rayon::prelude::*;
use std::collections::HashMap;

/// Output of the Symbol Collection phase: the global `fqn -> Symbol` table,
/// a `file -> [fqn]` index used to remove a file's symbols on incremental
/// update, and any FQN collisions hit along the way.
pub struct CollectionResult {
    pub symbols: HashMap<String, Symbol>,
    pub file_symbols: HashMap<String, Vec<String>>,
    pub diagnostics: Vec<ResolverDiagnostic>,
}

/// Insert every non-Import node with a non-empty FQN into a concurrent map.
/// Import nodes are skipped: otherwise an import reference would shadow a
/// real definition whose FQN happens to coincide with it.
///
/// Per-file extraction runs in parallel (`rayon`); the merge into the
/// shared map happens afterward in file-path order so that a genuine FQN
/// collision resolves the same way on every run regardless of how the
/// parallel work was scheduled.
pub fn collect_symbols(documents: &[IrDocument], repo_id: &str, snapshot_id: &str) -> CollectionResult {
    let mut per_file: Vec<(String, Vec<Symbol>)> = documents
        .par_iter()
        .map(|doc| {
            let symbols: Vec<Symbol> = doc
                .nodes
                .iter()
                .filter(|n| n.kind != NodeKind::Import && !n.fqn.is_empty())
                .map(|n| Symbol {
                    id: n.id,
                    kind: n.kind,
                    fqn: n.fqn.clone(),
                    name: n.name.clone(),
                    repo_id: repo_id.to_string(),
                    snapshot_id: snapshot_id.to_string(),
                    span: Some(n.span.clone()),
                    parent_id: n.parent_id,
                    signature_id: n.signature_id,
                    type_id: n.declared_type_id,
                })
                .collect();
            (doc.file_path.clone(), symbols)
        })
        .collect();
    per_file.sort_by(|a, b| a.0.cmp(&b.0));

    let table: ConcurrentMap<String, Symbol> = ConcurrentMap::new();
    let mut file_symbols = HashMap::with_capacity(per_file.len());
    let mut diagnostics = Vec::new();

    for (file, symbols) in &per_file {
        let mut fqns = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            fqns.push(symbol.fqn.clone());
            if let Some(previous) = table.insert(symbol.fqn.clone(), symbol.clone()) {
                if previous.id != symbol.id {
                    diagnostics.push(ResolverDiagnostic::AmbiguousFqn {
                        fqn: symbol.fqn.clone(),
                        candidates: vec![previous.id.to_string(), symbol.id.to_string()],
                    });
                }
            }
        }
        file_symbols.insert(file.clone(), fqns);
    }

    let symbols = table.iter().map(|(fqn, sym)| (fqn, (*sym).clone())).collect();

    CollectionResult {
        symbols,
        file_symbols,
        diagnostics,
    }
}

/// The FQN of the file's own `Module` node, used as the base for relative
/// import resolution. Falls back to the file path when no module node is
/// present (should not happen for a well-formed IR Document).
pub fn module_fqn_of(doc: &IrDocument) -> String {
    doc.nodes
        .iter()
        .find(|n| n.kind == NodeKind::Module)
        .map(|n| n.fqn.clone())
        .unwrap_or_else(|| doc.file_path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{IrNode, Language, Span};

    fn span(file: &str) -> Span {
        Span::new(file, 0, 0, 0, 1, 0, 1)
    }

    fn doc_with(file: &str, fqn: &str) -> IrDocument {
        let mut doc = IrDocument::new(file, Language::Python);
        doc.nodes.push(IrNode::new(
            NodeKind::Function,
            "f",
            fqn,
            span(file),
            file,
            Language::Python,
        ));
        doc
    }

    #[test]
    fn skips_import_nodes() {
        let mut doc = IrDocument::new("a.py", Language::Python);
        doc.nodes.push(IrNode::new(
            NodeKind::Import,
            "os",
            "os",
            span("a.py"),
            "a.py",
            Language::Python,
        ));
        let result = collect_symbols(&[doc], "repo", "snap");
        assert!(result.symbols.is_empty());
    }

    #[test]
    fn collision_is_recorded_as_diagnostic() {
        let a = doc_with("a.py", "pkg.thing");
        let b = doc_with("b.py", "pkg.thing");
        let result = collect_symbols(&[a, b], "repo", "snap");
        assert_eq!(result.symbols.len(), 1);
        assert_eq!(result.diagnostics.len(), 1);
    }
}
