use crate::collect::{collect_symbols, module_fqn_of};
use crate::depgraph::build_dependency_graph;
use crate::imports::resolve_document_imports;
use codegraph_core::{GlobalContext, IrDocument};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Build a fresh `GlobalContext` from a full set of IR Documents: symbol
/// collection, import resolution, then the dependency graph — the three
/// phases run in that fixed order, matching the per-file phase ordering
/// every other component in this pipeline follows.
pub fn build_global_context(documents: &[IrDocument], repo_id: &str, snapshot_id: &str) -> GlobalContext {
    let collected = collect_symbols(documents, repo_id, snapshot_id);

    let mut file_imports = HashMap::with_capacity(documents.len());
    for doc in documents {
        let module_fqn = module_fqn_of(doc);
        let resolved = resolve_document_imports(doc, &module_fqn, &collected.symbols);
        file_imports.insert(doc.file_path.clone(), resolved);
    }

    let (dependency_edges, strongly_connected_components, topological_order) = build_dependency_graph(&file_imports);

    info!(
        files = documents.len(),
        symbols = collected.symbols.len(),
        dependency_edges = dependency_edges.len(),
        "global context built"
    );

    GlobalContext {
        symbol_table: collected.symbols,
        file_imports,
        dependency_edges,
        strongly_connected_components,
        topological_order,
        diagnostics: collected.diagnostics,
    }
}

/// Apply a set of changed/deleted files to an existing `GlobalContext`
/// in place, following the five-step procedure: drop the changed/deleted
/// files' prior symbols, reinsert symbols from the new IR, recompute those
/// files' imports, reresolve every file that transitively imported from a
/// changed file, then rebuild the dependency graph from scratch.
///
/// `all_documents` must contain the current (post-change) IR Document for
/// every file still in the project, keyed by file path — needed to
/// reresolve affected files that did not themselves change.
pub fn incremental_update(
    context: &mut GlobalContext,
    changed_documents: &[IrDocument],
    deleted_files: &[String],
    all_documents: &HashMap<String, IrDocument>,
    repo_id: &str,
    snapshot_id: &str,
) {
    let changed_files: HashSet<String> = changed_documents
        .iter()
        .map(|d| d.file_path.clone())
        .chain(deleted_files.iter().cloned())
        .collect();

    context
        .symbol_table
        .retain(|_, sym| sym.span.as_ref().map(|s| !changed_files.contains(&s.file_path)).unwrap_or(true));
    for file in &changed_files {
        context.file_imports.remove(file);
    }

    let collected = collect_symbols(changed_documents, repo_id, snapshot_id);
    for (fqn, sym) in collected.symbols {
        context.symbol_table.insert(fqn, sym);
    }
    context.diagnostics.extend(collected.diagnostics);

    for doc in changed_documents {
        let module_fqn = module_fqn_of(doc);
        let resolved = resolve_document_imports(doc, &module_fqn, &context.symbol_table);
        context.file_imports.insert(doc.file_path.clone(), resolved);
    }

    let affected = transitive_importers(&context.dependency_edges, &changed_files);
    for file in affected {
        if changed_files.contains(&file) {
            continue;
        }
        if let Some(doc) = all_documents.get(&file) {
            let module_fqn = module_fqn_of(doc);
            let resolved = resolve_document_imports(doc, &module_fqn, &context.symbol_table);
            context.file_imports.insert(file, resolved);
        }
    }

    let (edges, sccs, topo) = build_dependency_graph(&context.file_imports);
    context.dependency_edges = edges;
    context.strongly_connected_components = sccs;
    context.topological_order = topo;

    debug!(
        changed = changed_documents.len(),
        deleted = deleted_files.len(),
        symbols = context.symbol_table.len(),
        "global context updated incrementally"
    );
}

/// Every file reachable by walking dependency edges backward from the
/// changed set: files that import (directly or transitively) from a
/// changed file.
fn transitive_importers(dependency_edges: &[(String, String)], changed: &HashSet<String>) -> HashSet<String> {
    let mut reverse: HashMap<&str, Vec<&str>> = HashMap::new();
    for (importer, dependency) in dependency_edges {
        reverse.entry(dependency.as_str()).or_default().push(importer.as_str());
    }

    let mut affected = HashSet::new();
    let mut stack: Vec<&str> = changed.iter().map(String::as_str).collect();
    while let Some(node) = stack.pop() {
        if let Some(importers) = reverse.get(node) {
            for &importer in importers {
                if affected.insert(importer.to_string()) {
                    stack.push(importer);
                }
            }
        }
    }
    affected
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{IrNode, Language, NodeKind, Span};

    fn span(file: &str) -> Span {
        Span::new(file, 0, 0, 0, 1, 0, 1)
    }

    fn module_doc(file: &str, fqn: &str) -> IrDocument {
        let mut doc = IrDocument::new(file, Language::Python);
        doc.nodes.push(IrNode::new(NodeKind::Module, fqn, fqn, span(file), file, Language::Python));
        doc.nodes.push(IrNode::new(
            NodeKind::Function,
            "helper",
            format!("{fqn}.helper"),
            span(file),
            file,
            Language::Python,
        ));
        doc
    }

    #[test]
    fn builds_context_with_no_imports() {
        let doc = module_doc("a.py", "a");
        let context = build_global_context(&[doc], "repo", "snap");
        assert!(context.symbol_table.contains_key("a.helper"));
        assert!(context.dependency_edges.is_empty());
    }

    #[test]
    fn incremental_update_drops_and_reinserts_symbols() {
        let a = module_doc("a.py", "a");
        let mut context = build_global_context(&[a], "repo", "snap");
        assert!(context.symbol_table.contains_key("a.helper"));

        let renamed = {
            let mut doc = IrDocument::new("a.py", Language::Python);
            doc.nodes.push(IrNode::new(NodeKind::Module, "a", "a", span("a.py"), "a.py", Language::Python));
            doc.nodes.push(IrNode::new(
                NodeKind::Function,
                "renamed",
                "a.renamed",
                span("a.py"),
                "a.py",
                Language::Python,
            ));
            doc
        };

        let mut all_docs = HashMap::new();
        all_docs.insert("a.py".to_string(), renamed.clone());
        incremental_update(&mut context, &[renamed], &[], &all_docs, "repo", "snap");

        assert!(!context.symbol_table.contains_key("a.helper"));
        assert!(context.symbol_table.contains_key("a.renamed"));
    }
}
