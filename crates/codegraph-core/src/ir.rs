use crate::ids::Id;
use crate::span::{Language, Span};
use crate::types::{SignatureId, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type NodeId = Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Module,
    Class,
    Function,
    Method,
    Variable,
    Parameter,
    Import,
    Expression,
    /// A symbol referenced but not defined anywhere in the current project
    /// snapshot. Every edge endpoint either exists in the IR or is
    /// explicitly marked External — never a dangling id.
    External,
}

/// `{id, kind, name, fqn, span, file_path, language, declared_type_id?,
/// signature_id?, parent_id?, attrs}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub fqn: String,
    pub span: Span,
    pub file_path: String,
    pub language: Language,
    pub declared_type_id: Option<TypeId>,
    pub signature_id: Option<SignatureId>,
    pub parent_id: Option<NodeId>,
    pub attrs: HashMap<String, String>,
}

impl IrNode {
    /// Build a node with a deterministic id derived from `(kind, fqn,
    /// normalized span)`, so rebuilding from byte-identical input always
    /// reproduces the same id.
    pub fn new(
        kind: NodeKind,
        name: impl Into<String>,
        fqn: impl Into<String>,
        span: Span,
        file_path: impl Into<String>,
        language: Language,
    ) -> Self {
        let fqn = fqn.into();
        let (fqn, _deviated) = crate::ids::normalize_fqn(&fqn);
        let id = Id::derive(
            &format!("{kind:?}"),
            &[fqn.as_str(), span.normalized_key().as_str()],
        );
        Self {
            id,
            kind,
            name: name.into(),
            fqn,
            span,
            file_path: file_path.into(),
            language,
            declared_type_id: None,
            signature_id: None,
            parent_id: None,
            attrs: HashMap::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Contains,
    Calls,
    Imports,
    Inherits,
    Implements,
    References,
    Reads,
    Writes,
    Raises,
    Catches,
}

/// `{kind, source_id, target_id, span?, attrs}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrEdge {
    pub kind: EdgeKind,
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub span: Option<Span>,
    pub attrs: HashMap<String, String>,
}

impl IrEdge {
    pub fn new(kind: EdgeKind, source_id: NodeId, target_id: NodeId) -> Self {
        Self {
            kind,
            source_id,
            target_id,
            span: None,
            attrs: HashMap::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// A raw (unresolved) import reference as recorded by the IR Generator.
/// Resolution into a `ResolvedImport` is the Cross-File Resolver's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRef {
    pub node_id: NodeId,
    pub module_path: String,
    pub imported_name: Option<String>,
    pub alias: Option<String>,
    pub relative_level: u32,
    pub span: Span,
}

/// A per-file aggregate of IR nodes, edges, and the file's import list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrDocument {
    pub file_path: String,
    pub language: Option<Language>,
    pub nodes: Vec<IrNode>,
    pub edges: Vec<IrEdge>,
    pub imports: Vec<ImportRef>,
}

impl IrDocument {
    pub fn new(file_path: impl Into<String>, language: Language) -> Self {
        Self {
            file_path: file_path.into(),
            language: Some(language),
            nodes: Vec::new(),
            edges: Vec::new(),
            imports: Vec::new(),
        }
    }

    pub fn node_by_id(&self, id: NodeId) -> Option<&IrNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
