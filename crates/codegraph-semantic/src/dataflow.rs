use codegraph_core::{BasicBlock, DataFlowEdge, Expression, VarOp, VariableEvent};
use std::collections::HashMap;

/// Phase 4: consume only the Expression list plus BFG blocks. Emit a
/// `VariableEvent` per read/write, then a `DataFlowEdge` from each write to
/// every subsequent read of the same variable in the same or a successor
/// block (successor determined by BFG `order`).
pub fn build_dfg(expressions: &[Expression], blocks: &[BasicBlock]) -> (Vec<VariableEvent>, Vec<DataFlowEdge>) {
    let block_order: HashMap<_, _> = blocks.iter().map(|b| (b.id, b.order)).collect();

    let mut events = Vec::new();
    for expr in expressions {
        let Some(block_id) = expr.block_id else { continue };
        for var in &expr.reads_vars {
            events.push(VariableEvent::new(var.clone(), block_id, VarOp::Read, expr.id));
        }
        if let Some(var) = &expr.defines_var {
            events.push(VariableEvent::new(var.clone(), block_id, VarOp::Write, expr.id));
        }
    }

    let mut edges = Vec::new();
    for (write_idx, write) in events.iter().enumerate() {
        if write.op != VarOp::Write {
            continue;
        }
        let Some(&write_order) = block_order.get(&write.block_id) else { continue };
        for read in events.iter().skip(write_idx + 1) {
            if read.op != VarOp::Read || read.variable_id != write.variable_id {
                continue;
            }
            let Some(&read_order) = block_order.get(&read.block_id) else { continue };
            if read_order >= write_order {
                edges.push(DataFlowEdge {
                    from_event: write.id,
                    to_event: read.id,
                });
            }
        }
    }

    (events, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{ExprKind, Span};

    fn span() -> Span {
        Span::new("a.py", 0, 0, 0, 1, 0, 1)
    }

    #[test]
    fn links_write_to_subsequent_read_in_successor_block() {
        let b0 = BasicBlock::new("pkg.f", 0);
        let b1 = BasicBlock::new("pkg.f", 1);

        let mut write_expr = Expression::new(ExprKind::Assign, span(), Some("pkg.f".into()));
        write_expr.block_id = Some(b0.id);
        write_expr.defines_var = Some("x".into());

        let mut read_expr = Expression::new(ExprKind::NameLoad, span(), Some("pkg.f".into()));
        read_expr.block_id = Some(b1.id);
        read_expr.reads_vars.push("x".into());

        let (events, edges) = build_dfg(&[write_expr, read_expr], &[b0, b1]);
        assert_eq!(events.len(), 2);
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn does_not_link_unrelated_variables() {
        let b0 = BasicBlock::new("pkg.f", 0);
        let mut write_expr = Expression::new(ExprKind::Assign, span(), Some("pkg.f".into()));
        write_expr.block_id = Some(b0.id);
        write_expr.defines_var = Some("x".into());

        let mut read_expr = Expression::new(ExprKind::NameLoad, span(), Some("pkg.f".into()));
        read_expr.block_id = Some(b0.id);
        read_expr.reads_vars.push("y".into());

        let (_, edges) = build_dfg(&[write_expr, read_expr], &[b0]);
        assert!(edges.is_empty());
    }
}
