use codegraph_core::{ImportRef, IrDocument, ResolvedImport, Symbol};
use std::collections::HashMap;

/// Resolve every import in a file against the global symbol table. Tried in
/// order: exact FQN match, module-level `from M import N` match, relative
/// (leading-dot) resolution. Anything left over is `is_external=True`.
pub fn resolve_document_imports(
    doc: &IrDocument,
    current_module_fqn: &str,
    symbols: &HashMap<String, Symbol>,
) -> Vec<ResolvedImport> {
    doc.imports
        .iter()
        .flat_map(|import| resolve_import(import, current_module_fqn, symbols))
        .collect()
}

/// A `from X import A, B` import resolves each named symbol independently,
/// since they may come from different definitions with different
/// resolution outcomes.
fn resolve_import(import: &ImportRef, current_module_fqn: &str, symbols: &HashMap<String, Symbol>) -> Vec<ResolvedImport> {
    match &import.imported_name {
        Some(names) if names.contains(',') => names
            .split(',')
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .map(|name| resolve_one(import, Some(name), current_module_fqn, symbols))
            .collect(),
        Some(name) => vec![resolve_one(import, Some(name.as_str()), current_module_fqn, symbols)],
        None => vec![resolve_one(import, None, current_module_fqn, symbols)],
    }
}

fn resolve_one(
    import: &ImportRef,
    name: Option<&str>,
    current_module_fqn: &str,
    symbols: &HashMap<String, Symbol>,
) -> ResolvedImport {
    let candidates = candidate_fqns(import, name, current_module_fqn);
    let imported_fqn = candidates.first().cloned().unwrap_or_else(|| import.module_path.clone());

    for candidate in &candidates {
        if let Some(symbol) = symbols.get(candidate) {
            return ResolvedImport {
                imported_fqn,
                resolved_fqn: Some(candidate.clone()),
                source_file: symbol.span.as_ref().map(|s| s.file_path.clone()),
                is_external: false,
            };
        }
    }

    ResolvedImport {
        imported_fqn,
        resolved_fqn: None,
        source_file: None,
        is_external: true,
    }
}

fn candidate_fqns(import: &ImportRef, name: Option<&str>, current_module_fqn: &str) -> Vec<String> {
    let module = if import.relative_level > 0 {
        relative_module(current_module_fqn, import.relative_level, &import.module_path)
    } else {
        import.module_path.clone()
    };

    let mut out = Vec::new();
    if let Some(name) = name {
        if !module.is_empty() {
            out.push(format!("{module}.{name}"));
        } else {
            out.push(name.to_string());
        }
    }
    if !module.is_empty() {
        out.push(module);
    }
    out
}

/// Resolve a leading-dot relative module path against the importing
/// file's own module FQN: each dot climbs one package level before
/// appending `module_path`.
fn relative_module(current_module_fqn: &str, relative_level: u32, module_path: &str) -> String {
    let mut parts: Vec<&str> = current_module_fqn.split('.').collect();
    for _ in 0..relative_level {
        parts.pop();
    }
    let base = parts.join(".");
    match (base.is_empty(), module_path.is_empty()) {
        (true, true) => String::new(),
        (true, false) => module_path.to_string(),
        (false, true) => base,
        (false, false) => format!("{base}.{module_path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Language, NodeKind, Span};

    fn symbol(fqn: &str, file: &str) -> Symbol {
        Symbol {
            id: codegraph_core::Id::derive("Symbol", &[fqn]),
            kind: NodeKind::Function,
            fqn: fqn.to_string(),
            name: fqn.rsplit('.').next().unwrap_or(fqn).to_string(),
            repo_id: "repo".to_string(),
            snapshot_id: "snap".to_string(),
            span: Some(Span::new(file, 0, 0, 0, 1, 0, 1)),
            parent_id: None,
            signature_id: None,
            type_id: None,
        }
    }

    fn import_ref(module_path: &str, imported_name: Option<&str>, relative_level: u32) -> ImportRef {
        ImportRef {
            node_id: codegraph_core::Id::derive("Import", &[module_path]),
            module_path: module_path.to_string(),
            imported_name: imported_name.map(str::to_string),
            alias: None,
            relative_level,
            span: Span::new("a.py", 0, 0, 0, 1, 0, 1),
        }
    }

    #[test]
    fn resolves_exact_from_import() {
        let mut symbols = HashMap::new();
        symbols.insert("pkg.util.helper".to_string(), symbol("pkg.util.helper", "pkg/util.py"));

        let import = import_ref("pkg.util", Some("helper"), 0);
        let resolved = resolve_one(&import, Some("helper"), "pkg.main", &symbols);
        assert_eq!(resolved.resolved_fqn.as_deref(), Some("pkg.util.helper"));
        assert!(!resolved.is_external);
        assert_eq!(resolved.source_file.as_deref(), Some("pkg/util.py"));
    }

    #[test]
    fn resolves_relative_import() {
        let mut symbols = HashMap::new();
        symbols.insert("pkg.sibling.thing".to_string(), symbol("pkg.sibling.thing", "pkg/sibling.py"));

        let import = import_ref("sibling", Some("thing"), 1);
        let resolved = resolve_one(&import, Some("thing"), "pkg.mod", &symbols);
        assert_eq!(resolved.resolved_fqn.as_deref(), Some("pkg.sibling.thing"));
    }

    #[test]
    fn unresolved_import_is_external() {
        let symbols = HashMap::new();
        let import = import_ref("nope", Some("thing"), 0);
        let resolved = resolve_one(&import, Some("thing"), "pkg.mod", &symbols);
        assert!(resolved.is_external);
        assert!(resolved.resolved_fqn.is_none());
    }
}
