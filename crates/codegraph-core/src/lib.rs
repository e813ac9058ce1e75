//! Shared data model, error types, and configuration for the code-analysis
//! pipeline core. Every downstream crate (`codegraph-ir`,
//! `codegraph-semantic`, `codegraph-resolver`, `codegraph-graph`,
//! `codegraph-chunks`, `codegraph-orchestrator`) builds on the types defined
//! here rather than inventing its own node/edge/id shapes.

pub mod chunk;
pub mod config;
pub mod context;
pub mod error;
pub mod expr;
pub mod ids;
pub mod ir;
pub mod span;
pub mod symbol;
pub mod telemetry;
pub mod types;

pub use chunk::{Chunk, ChunkId, ChunkKind};
pub use config::{ChunkKindConfig, CyclePolicy, PipelineConfig, SnapshotStorage};
pub use context::{GlobalContext, ResolvedImport, ResolverDiagnostic, SemanticSnapshot};
pub use error::{PipelineError, Result};
pub use expr::{
    BasicBlock, BlockId, CfgEdge, CfgEdgeKind, DataFlowEdge, Expression, ExprId, ExprKind,
    FunctionFlowSummary, VarOp, VariableEvent,
};
pub use ids::Id;
pub use ir::{EdgeKind, ImportRef, IrDocument, IrEdge, IrNode, NodeId, NodeKind};
pub use span::{Language, Span};
pub use symbol::{Relation, RelationKind, Symbol, SymbolId};
pub use types::{SignatureEntity, SignatureId, TypeEntity, TypeFlavor, TypeId};
