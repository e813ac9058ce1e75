use codegraph_core::{BasicBlock, CfgEdge, DataFlowEdge, Expression, SignatureEntity, TypeEntity, VariableEvent};

/// Everything the four semantic phases produce for one file: types and
/// signatures (phase 1), basic blocks and control-flow edges (phase 2),
/// expressions (phase 3), and variable events plus data-flow edges
/// (phase 4). Kept separate from `IrDocument` since these are derived,
/// per-function artifacts rather than graph nodes/edges.
#[derive(Debug, Default)]
pub struct SemanticDocument {
    pub types: Vec<TypeEntity>,
    pub signatures: Vec<SignatureEntity>,
    pub blocks: Vec<BasicBlock>,
    pub cfg_edges: Vec<CfgEdge>,
    pub expressions: Vec<Expression>,
    pub variable_events: Vec<VariableEvent>,
    pub dataflow_edges: Vec<DataFlowEdge>,
}
