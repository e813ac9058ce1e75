use crate::document::GraphDocument;
use codegraph_core::{EdgeKind, Relation, RelationKind, Symbol, SymbolId};
use std::collections::HashMap;
use tracing::debug;

/// Projects a `GraphDocument` onto the minimal runtime graph downstream
/// consumers actually query: plain `Symbol`s (no attrs bag) and only the
/// `Relation` kinds `codegraph-core::symbol` enumerates. Everything else a
/// `GraphDocument` carries (parameters, imports, literal expressions, the
/// `Reads`/`Writes`/`Raises`/`Catches`/`Implements` edge kinds) is dropped,
/// which is what keeps this smaller than the `GraphDocument` it came from.
#[derive(Debug, Default)]
pub struct SymbolGraph {
    symbols: HashMap<SymbolId, Symbol>,
    relations: Vec<Relation>,
    children_idx: HashMap<SymbolId, Vec<SymbolId>>,
    callers_idx: HashMap<SymbolId, Vec<SymbolId>>,
    callees_idx: HashMap<SymbolId, Vec<SymbolId>>,
    file_idx: HashMap<String, Vec<SymbolId>>,
}

impl SymbolGraph {
    pub fn project(graph: &GraphDocument, symbol_table: &HashMap<String, Symbol>) -> Self {
        let symbols: HashMap<SymbolId, Symbol> = symbol_table.values().map(|s| (s.id, s.clone())).collect();

        let relations: Vec<Relation> = graph
            .edges
            .iter()
            .filter_map(|edge| {
                relation_kind(edge.kind).map(|kind| Relation {
                    kind,
                    source_id: edge.source_id,
                    target_id: edge.target_id,
                    span: edge.span.clone(),
                })
            })
            .collect();

        let mut children_idx: HashMap<SymbolId, Vec<SymbolId>> = HashMap::new();
        let mut callers_idx: HashMap<SymbolId, Vec<SymbolId>> = HashMap::new();
        let mut callees_idx: HashMap<SymbolId, Vec<SymbolId>> = HashMap::new();
        for relation in &relations {
            match relation.kind {
                RelationKind::Contains => {
                    children_idx.entry(relation.source_id).or_default().push(relation.target_id);
                }
                RelationKind::Calls => {
                    callees_idx.entry(relation.source_id).or_default().push(relation.target_id);
                    callers_idx.entry(relation.target_id).or_default().push(relation.source_id);
                }
                _ => {}
            }
        }

        let mut file_idx: HashMap<String, Vec<SymbolId>> = HashMap::new();
        for symbol in symbols.values() {
            if let Some(span) = &symbol.span {
                file_idx.entry(span.file_path.clone()).or_default().push(symbol.id);
            }
        }

        debug!(symbols = symbols.len(), relations = relations.len(), "symbol graph projected");

        Self {
            symbols,
            relations,
            children_idx,
            callers_idx,
            callees_idx,
            file_idx,
        }
    }

    pub fn get_symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    pub fn children(&self, id: SymbolId) -> &[SymbolId] {
        self.children_idx.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn callers(&self, id: SymbolId) -> &[SymbolId] {
        self.callers_idx.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn callees(&self, id: SymbolId) -> &[SymbolId] {
        self.callees_idx.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn symbols_in_file(&self, file_path: &str) -> &[SymbolId] {
        self.file_idx.get(file_path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

fn relation_kind(kind: EdgeKind) -> Option<RelationKind> {
    match kind {
        EdgeKind::Contains => Some(RelationKind::Contains),
        EdgeKind::Calls => Some(RelationKind::Calls),
        EdgeKind::Imports => Some(RelationKind::Imports),
        EdgeKind::Inherits => Some(RelationKind::Inherits),
        EdgeKind::References => Some(RelationKind::References),
        EdgeKind::Implements | EdgeKind::Reads | EdgeKind::Writes | EdgeKind::Raises | EdgeKind::Catches => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{IrDocument, IrEdge, IrNode, Language, NodeKind, Span};

    fn span() -> Span {
        Span::new("a.py", 0, 0, 0, 1, 0, 1)
    }

    #[test]
    fn projects_calls_into_caller_callee_indices() {
        let caller = IrNode::new(NodeKind::Function, "caller", "pkg.caller", span(), "a.py", Language::Python);
        let callee = IrNode::new(NodeKind::Function, "callee", "pkg.callee", span(), "a.py", Language::Python);
        let (caller_id, callee_id) = (caller.id, callee.id);

        let mut doc = IrDocument::new("a.py", Language::Python);
        doc.edges.push(IrEdge::new(EdgeKind::Calls, caller_id, callee_id));
        doc.nodes.push(caller);
        doc.nodes.push(callee);
        let graph = GraphDocument::build(&[doc]);

        let mut table = HashMap::new();
        table.insert(
            "pkg.caller".to_string(),
            Symbol {
                id: caller_id,
                kind: NodeKind::Function,
                fqn: "pkg.caller".to_string(),
                name: "caller".to_string(),
                repo_id: "repo".to_string(),
                snapshot_id: "snap".to_string(),
                span: Some(span()),
                parent_id: None,
                signature_id: None,
                type_id: None,
            },
        );

        let symbol_graph = SymbolGraph::project(&graph, &table);
        assert_eq!(symbol_graph.callees(caller_id), &[callee_id]);
        assert_eq!(symbol_graph.callers(callee_id), &[caller_id]);
        assert_eq!(symbol_graph.symbols_in_file("a.py"), &[caller_id]);
    }

    #[test]
    fn repeated_calls_to_the_same_callee_keep_every_edge_endpoint_resolvable() {
        let caller = IrNode::new(NodeKind::Function, "caller", "pkg.caller", span(), "a.py", Language::Python);
        let caller_id = caller.id;
        let callee_id = codegraph_core::Id::derive("External", &["helper"]);

        let mut doc = IrDocument::new("a.py", Language::Python);
        doc.nodes.push(caller);
        doc.edges.push(IrEdge::new(EdgeKind::Calls, caller_id, callee_id));
        doc.edges.push(IrEdge::new(EdgeKind::Calls, caller_id, callee_id));
        let graph = GraphDocument::build(&[doc]);

        let mut table = HashMap::new();
        table.insert(
            "pkg.caller".to_string(),
            Symbol {
                id: caller_id,
                kind: NodeKind::Function,
                fqn: "pkg.caller".to_string(),
                name: "caller".to_string(),
                repo_id: "repo".to_string(),
                snapshot_id: "snap".to_string(),
                span: Some(span()),
                parent_id: None,
                signature_id: None,
                type_id: None,
            },
        );
        table.insert(
            "helper".to_string(),
            Symbol {
                id: callee_id,
                kind: NodeKind::External,
                fqn: "helper".to_string(),
                name: "helper".to_string(),
                repo_id: "repo".to_string(),
                snapshot_id: "snap".to_string(),
                span: Some(span()),
                parent_id: None,
                signature_id: None,
                type_id: None,
            },
        );

        let symbol_graph = SymbolGraph::project(&graph, &table);
        assert_eq!(symbol_graph.callees(caller_id), &[callee_id, callee_id]);
        for relation in symbol_graph.relations() {
            assert!(symbol_graph.get_symbol(relation.source_id).is_some());
            assert!(symbol_graph.get_symbol(relation.target_id).is_some());
        }
    }
}
