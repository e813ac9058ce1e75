use codegraph_core::{EdgeKind, IrDocument, IrEdge, IrNode, NodeId, NodeKind};
use std::collections::HashMap;
use tracing::debug;

/// The composed view over one or more (already semantically enriched) IR
/// Documents: every node, every edge, and four reverse indices built in a
/// single pass. Built once per build/refresh and treated as read-only by
/// every downstream consumer (Symbol Graph projection, chunk linking).
#[derive(Debug, Default)]
pub struct GraphDocument {
    pub nodes: Vec<IrNode>,
    pub edges: Vec<IrEdge>,
    callee_to_callers: HashMap<NodeId, Vec<NodeId>>,
    parent_to_children: HashMap<NodeId, Vec<NodeId>>,
    name_to_nodes: HashMap<String, Vec<NodeId>>,
    nodes_by_kind: HashMap<NodeKind, Vec<NodeId>>,
}

impl GraphDocument {
    /// Compose a `GraphDocument` from a batch of per-file IR Documents. Does
    /// not touch the type server or any semantic-phase structure directly:
    /// by the time a document reaches here its nodes already carry whatever
    /// `declared_type_id`/`signature_id` the Semantic IR Builder attached.
    pub fn build(documents: &[IrDocument]) -> Self {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        for doc in documents {
            nodes.extend(doc.nodes.iter().cloned());
            edges.extend(doc.edges.iter().cloned());
        }

        let mut callee_to_callers: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut parent_to_children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut name_to_nodes: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut nodes_by_kind: HashMap<NodeKind, Vec<NodeId>> = HashMap::new();

        for node in &nodes {
            name_to_nodes.entry(node.name.clone()).or_default().push(node.id);
            nodes_by_kind.entry(node.kind).or_default().push(node.id);
            if let Some(parent) = node.parent_id {
                parent_to_children.entry(parent).or_default().push(node.id);
            }
        }
        for edge in &edges {
            if edge.kind == EdgeKind::Calls {
                callee_to_callers.entry(edge.target_id).or_default().push(edge.source_id);
            }
        }

        debug!(files = documents.len(), nodes = nodes.len(), edges = edges.len(), "graph document composed");

        Self {
            nodes,
            edges,
            callee_to_callers,
            parent_to_children,
            name_to_nodes,
            nodes_by_kind,
        }
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&IrNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn callers_of(&self, callee: NodeId) -> &[NodeId] {
        self.callee_to_callers.get(&callee).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_of(&self, parent: NodeId) -> &[NodeId] {
        self.parent_to_children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nodes_named(&self, name: &str) -> &[NodeId] {
        self.name_to_nodes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> &[NodeId] {
        self.nodes_by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{EdgeKind, Language, Span};

    fn span() -> Span {
        Span::new("a.py", 0, 0, 0, 1, 0, 1)
    }

    #[test]
    fn builds_reverse_indices_in_one_pass() {
        let caller = IrNode::new(NodeKind::Function, "caller", "pkg.caller", span(), "a.py", Language::Python);
        let callee = IrNode::new(NodeKind::Function, "callee", "pkg.callee", span(), "a.py", Language::Python);
        let mut doc = IrDocument::new("a.py", Language::Python);
        doc.edges.push(IrEdge::new(EdgeKind::Calls, caller.id, callee.id));
        let (caller_id, callee_id) = (caller.id, callee.id);
        doc.nodes.push(caller);
        doc.nodes.push(callee);

        let graph = GraphDocument::build(&[doc]);
        assert_eq!(graph.callers_of(callee_id), &[caller_id]);
        assert_eq!(graph.nodes_of_kind(NodeKind::Function).len(), 2);
    }
}
