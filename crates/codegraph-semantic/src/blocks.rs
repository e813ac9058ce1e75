use codegraph_core::{BasicBlock, CfgEdge, CfgEdgeKind, Span};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use tree_sitter::Node;

static BRANCH_KINDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["if_statement", "match_statement"].into_iter().collect());
static LOOP_KINDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["for_statement", "while_statement"].into_iter().collect());
static TRY_KINDS: Lazy<HashSet<&'static str>> = Lazy::new(|| ["try_statement"].into_iter().collect());

/// Partition a function body into basic blocks (BFG) and classify the
/// control-flow edges between them (CFG). A new block starts right after
/// any branch/loop/try statement, since that statement is itself the last
/// thing in its block and what follows depends on which edge was taken.
pub fn build_bfg_cfg(function_fqn: &str, body: Node<'_>) -> (Vec<BasicBlock>, Vec<CfgEdge>, Vec<Vec<Span>>) {
    let mut blocks = Vec::new();
    let mut spans_per_block: Vec<Vec<Span>> = Vec::new();
    let mut edges = Vec::new();

    let mut current = BasicBlock::new(function_fqn, 0);
    let mut current_spans = Vec::new();

    let mut cursor = body.walk();
    for stmt in body.named_children(&mut cursor) {
        let span = byte_span(stmt);
        current_spans.push(span);

        let kind = stmt.kind();
        let is_branching = BRANCH_KINDS.contains(kind) || LOOP_KINDS.contains(kind) || TRY_KINDS.contains(kind);
        if is_branching {
            let from_id = current.id;
            blocks.push(current);
            spans_per_block.push(std::mem::take(&mut current_spans));

            let next_order = blocks.len();
            let next = BasicBlock::new(function_fqn, next_order);

            let edge_kind = if LOOP_KINDS.contains(kind) {
                CfgEdgeKind::LoopBack
            } else if TRY_KINDS.contains(kind) {
                CfgEdgeKind::ExceptionEdge
            } else {
                CfgEdgeKind::TrueBranch
            };
            edges.push(CfgEdge {
                from: from_id,
                to: next.id,
                kind: edge_kind,
            });
            if BRANCH_KINDS.contains(kind) {
                edges.push(CfgEdge {
                    from: from_id,
                    to: next.id,
                    kind: CfgEdgeKind::FalseBranch,
                });
            }
            current = next;
        }
    }
    if !current_spans.is_empty() || blocks.is_empty() {
        blocks.push(current);
        spans_per_block.push(current_spans);
    }

    for window in blocks.windows(2) {
        edges.push(CfgEdge {
            from: window[0].id,
            to: window[1].id,
            kind: CfgEdgeKind::Fallthrough,
        });
    }

    (blocks, edges, spans_per_block)
}

fn byte_span(node: Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span::new(
        String::new(),
        start.row as u32,
        start.column as u32,
        end.row as u32,
        end.column as u32,
        node.start_byte() as u32,
        node.end_byte() as u32,
    )
}
