use crate::ids::Id;
use crate::ir::NodeKind;
use crate::span::Span;
use crate::types::{SignatureId, TypeId};
use serde::{Deserialize, Serialize};

pub type SymbolId = Id;

/// Lightweight runtime symbol: ~200 bytes, no open attribute bag. This
/// is what `codegraph-graph`'s `SymbolGraph` and `codegraph-chunks`
/// reference by id — never the full `IrNode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub kind: NodeKind,
    pub fqn: String,
    pub name: String,
    pub repo_id: String,
    pub snapshot_id: String,
    pub span: Option<Span>,
    pub parent_id: Option<SymbolId>,
    pub signature_id: Option<SignatureId>,
    pub type_id: Option<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Calls,
    Imports,
    Contains,
    Inherits,
    References,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    pub source_id: SymbolId,
    pub target_id: SymbolId,
    pub span: Option<Span>,
}
