use crate::ids::Id;
use crate::span::Span;
use crate::types::TypeId;
use serde::{Deserialize, Serialize};

pub type ExprId = Id;
pub type BlockId = Id;

/// The 14 expression kinds the Semantic IR builder recognizes, mapped from
/// grammar constructs by its fixed lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprKind {
    NameLoad,
    Attribute,
    Subscript,
    BinOp,
    UnaryOp,
    Compare,
    BoolOp,
    Call,
    Instantiate,
    Literal,
    Collection,
    Assign,
    Lambda,
    Comprehension,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub id: ExprId,
    pub kind: ExprKind,
    pub span: Span,
    pub function_fqn: Option<String>,
    pub block_id: Option<BlockId>,
    pub reads_vars: Vec<String>,
    pub defines_var: Option<String>,
    pub inferred_type: Option<String>,
    pub inferred_type_id: Option<TypeId>,
    pub parent_expr_id: Option<ExprId>,
    pub child_expr_ids: Vec<ExprId>,
}

impl Expression {
    pub fn new(kind: ExprKind, span: Span, function_fqn: Option<String>) -> Self {
        let id = Id::derive(
            "Expression",
            &[
                &format!("{kind:?}"),
                span.normalized_key().as_str(),
                function_fqn.as_deref().unwrap_or(""),
            ],
        );
        Self {
            id,
            kind,
            span,
            function_fqn,
            block_id: None,
            reads_vars: Vec::new(),
            defines_var: None,
            inferred_type: None,
            inferred_type_id: None,
            parent_expr_id: None,
            child_expr_ids: Vec::new(),
        }
    }
}

/// A straight-line sequence of statements — one node of the Basic Flow
/// Graph (BFG). `order` is the block's position within its function in
/// program order, used by the DFG phase to decide "subsequent" reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub function_fqn: String,
    pub statement_spans: Vec<Span>,
    pub order: usize,
}

impl BasicBlock {
    pub fn new(function_fqn: impl Into<String>, order: usize) -> Self {
        let function_fqn = function_fqn.into();
        let id = Id::derive("BasicBlock", &[function_fqn.as_str(), order.to_string().as_str()]);
        Self {
            id,
            function_fqn,
            statement_spans: Vec::new(),
            order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CfgEdgeKind {
    Fallthrough,
    TrueBranch,
    FalseBranch,
    LoopBack,
    ExceptionEdge,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfgEdge {
    pub from: BlockId,
    pub to: BlockId,
    pub kind: CfgEdgeKind,
}

/// Per-function control-flow summary computed in a single iterative pass
/// over the function body during IR generation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FunctionFlowSummary {
    pub cyclomatic_complexity: u32,
    pub branch_count: u32,
    pub has_loop: bool,
    pub has_try: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarOp {
    Read,
    Write,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableEvent {
    pub id: Id,
    pub variable_id: String,
    pub block_id: BlockId,
    pub op: VarOp,
    pub source_expr_id: ExprId,
}

impl VariableEvent {
    pub fn new(variable_id: impl Into<String>, block_id: BlockId, op: VarOp, source_expr_id: ExprId) -> Self {
        let variable_id = variable_id.into();
        let id = Id::derive(
            "VariableEvent",
            &[
                variable_id.as_str(),
                &block_id.to_string(),
                &format!("{op:?}"),
                &source_expr_id.to_string(),
            ],
        );
        Self {
            id,
            variable_id,
            block_id,
            op,
            source_expr_id,
        }
    }
}

/// A def-use edge from a write event to a subsequent read of the same
/// variable (same or successor block, in BFG order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFlowEdge {
    pub from_event: Id,
    pub to_event: Id,
}
