use crate::blocks::build_bfg_cfg;
use crate::document::SemanticDocument;
use crate::expressions::ExpressionBuilder;
use crate::signatures::{build_declared_type, build_signature};
use crate::type_table::TypeTable;
use codegraph_core::{BasicBlock, BlockId, IrDocument, NodeKind, Span};
use codegraph_parser::SyntaxTree;
use codegraph_typeserver::{Present, TypeServerHandle};
use tracing::debug;
use tree_sitter::Node;

/// Runs the four semantic phases, in order, over one file's syntax tree and
/// IR document: types and signatures, then basic blocks and control flow,
/// then expressions, then data flow. Each later phase consumes only the
/// structures the earlier phases produced, never re-walking the tree on
/// its own.
pub struct SemanticIrBuilder;

impl SemanticIrBuilder {
    pub async fn build(
        tree: &SyntaxTree,
        ir_doc: &mut IrDocument,
        type_handle: &TypeServerHandle<Present>,
    ) -> SemanticDocument {
        let mut type_table = TypeTable::new();
        let mut out = SemanticDocument::default();

        let node_ids: Vec<_> = ir_doc.nodes.iter().map(|n| n.id).collect();
        for id in &node_ids {
            let kind = ir_doc.node_by_id(*id).map(|n| n.kind);
            match kind {
                Some(NodeKind::Parameter) | Some(NodeKind::Variable) => {
                    let node = ir_doc.node_by_id(*id).unwrap().clone();
                    if let Some(type_id) = build_declared_type(&node, &mut type_table, type_handle).await {
                        if let Some(node) = ir_doc.nodes.iter_mut().find(|n| n.id == *id) {
                            node.declared_type_id = Some(type_id);
                        }
                    }
                }
                Some(NodeKind::Function) | Some(NodeKind::Method) => {
                    let node = ir_doc.node_by_id(*id).unwrap().clone();
                    let Some(func_node) = find_node_by_span(tree.root_node(), &node.span) else {
                        continue;
                    };

                    let docstring = extract_docstring(&tree.source, func_node);
                    let result = build_signature(&node, docstring.as_deref(), &mut type_table, type_handle).await;
                    let signature_id = result.primary.id;
                    if !result.overloads.is_empty() {
                        let joined = result
                            .overloads
                            .iter()
                            .map(|s| s.id.to_string())
                            .collect::<Vec<_>>()
                            .join(",");
                        if let Some(node) = ir_doc.nodes.iter_mut().find(|n| n.id == *id) {
                            node.attrs.insert("overload_signature_ids".to_string(), joined);
                        }
                    }
                    out.signatures.push(result.primary);
                    out.signatures.extend(result.overloads);
                    if let Some(node) = ir_doc.nodes.iter_mut().find(|n| n.id == *id) {
                        node.signature_id = Some(signature_id);
                    }

                    if let Some(body) = func_node.child_by_field_name("body") {
                        Self::build_function_flow(
                            &node.fqn,
                            &tree.source,
                            &tree.file_path,
                            body,
                            &mut type_table,
                            type_handle,
                            &mut out,
                        )
                        .await;
                    }
                }
                _ => {}
            }
        }

        out.types = type_table.into_entities();

        debug!(
            file = %tree.file_path,
            signatures = out.signatures.len(),
            blocks = out.blocks.len(),
            expressions = out.expressions.len(),
            "semantic document built"
        );

        out
    }

    async fn build_function_flow(
        function_fqn: &str,
        source: &str,
        file_path: &str,
        body: Node<'_>,
        type_table: &mut TypeTable,
        type_handle: &TypeServerHandle<Present>,
        out: &mut SemanticDocument,
    ) {
        let (blocks, cfg_edges, spans_per_block) = build_bfg_cfg(function_fqn, body);
        let assignment = block_assignment(&blocks, &spans_per_block);

        let mut cursor = body.walk();
        let stmt_nodes: Vec<Node> = body.named_children(&mut cursor).collect();

        let expr_builder = ExpressionBuilder::new(source, file_path, function_fqn);
        let mut expressions = Vec::new();
        for (idx, stmt) in stmt_nodes.iter().enumerate() {
            let Some(&block_id) = assignment.get(idx) else { continue };
            expressions.extend(expr_builder.build_for_statement(*stmt, block_id, type_table, type_handle).await);
        }

        let (events, dataflow_edges) = crate::dataflow::build_dfg(&expressions, &blocks);

        out.blocks.extend(blocks);
        out.cfg_edges.extend(cfg_edges);
        out.expressions.extend(expressions);
        out.variable_events.extend(events);
        out.dataflow_edges.extend(dataflow_edges);
    }
}

/// Flatten `spans_per_block` (one entry per block, each a list of
/// statement spans in that block) into a per-statement `BlockId` list in
/// the same order the statements were iterated in `build_bfg_cfg`.
fn block_assignment(blocks: &[BasicBlock], spans_per_block: &[Vec<Span>]) -> Vec<BlockId> {
    let mut out = Vec::new();
    for (block, spans) in blocks.iter().zip(spans_per_block.iter()) {
        for _ in spans {
            out.push(block.id);
        }
    }
    out
}

fn find_node_by_span<'a>(root: Node<'a>, span: &Span) -> Option<Node<'a>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.start_byte() as u32 == span.start_byte && node.end_byte() as u32 == span.end_byte {
            return Some(node);
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            stack.push(child);
        }
    }
    None
}

/// A function's docstring is its body's first statement when that
/// statement is a bare string expression. Best-effort: no docstring is
/// not an error, just an absence of param docs for that function.
fn extract_docstring(source: &str, func_node: Node<'_>) -> Option<String> {
    let body = func_node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string_node = first.named_child(0)?;
    if string_node.kind() != "string" {
        return None;
    }
    let raw = &source[string_node.start_byte()..string_node.end_byte()];
    Some(raw.trim_matches(['"', '\'', 'r', 'u', 'b']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_ir::IrBuilder;
    use codegraph_parser::TreeSitterParser;
    use std::io::Write;

    fn parse(dir: &tempfile::TempDir, content: &str) -> std::sync::Arc<SyntaxTree> {
        let path = dir.path().join("a.py");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        TreeSitterParser::new().parse(&path).unwrap()
    }

    #[tokio::test]
    async fn builds_semantic_document_without_type_server() {
        let dir = tempfile::tempdir().unwrap();
        let tree = parse(
            &dir,
            "def f(x):\n    \"\"\"Summary.\n\n    Args:\n        x: the input\n    \"\"\"\n    if x:\n        y = x\n    return y\n",
        );
        let (mut ir_doc, _flows) = IrBuilder::build(&tree, "pkg").unwrap();
        let handle: TypeServerHandle<Present> = TypeServerHandle::new(None);

        let semantic = SemanticIrBuilder::build(&tree, &mut ir_doc, &handle).await;

        assert!(!semantic.blocks.is_empty());
        assert!(!semantic.signatures.is_empty());
        let func = ir_doc.nodes.iter().find(|n| n.kind == NodeKind::Function).unwrap();
        assert!(func.signature_id.is_some());
    }
}
