use crate::type_table::TypeTable;
use codegraph_core::{Expression, ExprKind, Span};
use codegraph_typeserver::{Present, TypeServerHandle};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tree_sitter::Node;

/// The fixed 14-rule grammar-kind-to-`ExprKind` mapping table.
/// `Instantiate` is distinguished from `Call` post-hoc: a call
/// whose callee text starts with an uppercase letter is treated as a
/// constructor invocation.
static EXPR_KIND_TABLE: Lazy<HashMap<&'static str, ExprKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("identifier", ExprKind::NameLoad);
    m.insert("attribute", ExprKind::Attribute);
    m.insert("subscript", ExprKind::Subscript);
    m.insert("binary_operator", ExprKind::BinOp);
    m.insert("unary_operator", ExprKind::UnaryOp);
    m.insert("comparison_operator", ExprKind::Compare);
    m.insert("boolean_operator", ExprKind::BoolOp);
    m.insert("call", ExprKind::Call);
    m.insert("string", ExprKind::Literal);
    m.insert("integer", ExprKind::Literal);
    m.insert("float", ExprKind::Literal);
    m.insert("true", ExprKind::Literal);
    m.insert("false", ExprKind::Literal);
    m.insert("none", ExprKind::Literal);
    m.insert("list", ExprKind::Collection);
    m.insert("dictionary", ExprKind::Collection);
    m.insert("set", ExprKind::Collection);
    m.insert("tuple", ExprKind::Collection);
    m.insert("assignment", ExprKind::Assign);
    m.insert("lambda", ExprKind::Lambda);
    m.insert("list_comprehension", ExprKind::Comprehension);
    m.insert("dictionary_comprehension", ExprKind::Comprehension);
    m.insert("set_comprehension", ExprKind::Comprehension);
    m.insert("generator_expression", ExprKind::Comprehension);
    m
});

pub struct ExpressionBuilder<'a> {
    source: &'a str,
    file_path: &'a str,
    function_fqn: String,
}

impl<'a> ExpressionBuilder<'a> {
    pub fn new(source: &'a str, file_path: &'a str, function_fqn: impl Into<String>) -> Self {
        Self {
            source,
            file_path,
            function_fqn: function_fqn.into(),
        }
    }

    /// Walk every grammar construct under `stmt` and emit an `Expression`
    /// for each one the mapping table recognizes, enriching each with a
    /// type-server hover when `type_handle` is available.
    pub async fn build_for_statement(
        &self,
        stmt: Node<'_>,
        block_id: codegraph_core::BlockId,
        type_table: &mut TypeTable,
        type_handle: &TypeServerHandle<Present>,
    ) -> Vec<Expression> {
        let mut out = Vec::new();
        let mut stack = vec![stmt];
        while let Some(node) = stack.pop() {
            if let Some(expr) = self.classify(node).await {
                let mut expr = expr;
                expr.block_id = Some(block_id);
                self.populate_var_usage(&mut expr, node);

                let start = node.start_position();
                if let Some(hover) = type_handle
                    .hover(self.file_path, start.row as u32, start.column as u32)
                    .await
                {
                    expr.inferred_type_id = Some(type_table.intern(&hover.type_text));
                    expr.inferred_type = Some(hover.type_text);
                }
                out.push(expr);
            }
            if node.kind() == "assignment" {
                // The left-hand target was already consumed as
                // `defines_var`; descending into it too would wrongly
                // also classify it as a `NameLoad`.
                if let Some(rhs) = node.child_by_field_name("right") {
                    stack.push(rhs);
                }
            } else {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    stack.push(child);
                }
            }
        }
        out
    }

    async fn classify(&self, node: Node<'_>) -> Option<Expression> {
        let mut kind = *EXPR_KIND_TABLE.get(node.kind())?;
        if kind == ExprKind::Call {
            if let Some(target) = node.child_by_field_name("function") {
                let text = self.text_of(target);
                if text.chars().next().is_some_and(|c| c.is_uppercase()) {
                    kind = ExprKind::Instantiate;
                }
            }
        }
        let span = self.span_of(node);
        Some(Expression::new(kind, span, Some(self.function_fqn.clone())))
    }

    /// Populate `reads_vars`/`defines_var`: an identifier load reads; an
    /// assignment target writes.
    fn populate_var_usage(&self, expr: &mut Expression, node: Node<'_>) {
        match expr.kind {
            ExprKind::NameLoad => {
                expr.reads_vars.push(self.text_of(node));
            }
            ExprKind::Assign => {
                if let Some(target) = node.child_by_field_name("left") {
                    if target.kind() == "identifier" {
                        expr.defines_var = Some(self.text_of(target));
                    }
                }
            }
            _ => {}
        }
    }

    fn text_of(&self, node: Node<'_>) -> String {
        self.source[node.start_byte()..node.end_byte()].to_string()
    }

    fn span_of(&self, node: Node<'_>) -> Span {
        let start = node.start_position();
        let end = node.end_position();
        Span::new(
            self.file_path.to_string(),
            start.row as u32,
            start.column as u32,
            end.row as u32,
            end.column as u32,
            node.start_byte() as u32,
            node.end_byte() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::BlockId;
    use codegraph_parser::TreeSitterParser;
    use std::io::Write;

    fn parse(dir: &tempfile::TempDir, content: &str) -> std::sync::Arc<codegraph_parser::SyntaxTree> {
        let path = dir.path().join("a.py");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        TreeSitterParser::new().parse(&path).unwrap()
    }

    #[tokio::test]
    async fn assignment_emits_assign_and_call_expressions() {
        let dir = tempfile::tempdir().unwrap();
        let tree = parse(&dir, "def f(x):\n    y = compute(x)\n");
        let root = tree.root_node();
        let func = root.named_child(0).unwrap();
        let body = func.child_by_field_name("body").unwrap();
        let stmt = body.named_child(0).unwrap();

        let builder = ExpressionBuilder::new(&tree.source, &tree.file_path, "pkg.f");
        let handle: TypeServerHandle<Present> = TypeServerHandle::new(None);
        let mut type_table = TypeTable::new();
        let block_id: BlockId = codegraph_core::Id::derive("BasicBlock", &["pkg.f", "0"]);
        let exprs = builder.build_for_statement(stmt, block_id, &mut type_table, &handle).await;

        assert!(exprs.iter().any(|e| e.kind == ExprKind::Assign && e.defines_var.as_deref() == Some("y")));
        assert!(exprs.iter().any(|e| e.kind == ExprKind::Call));
        assert!(exprs.iter().any(|e| e.kind == ExprKind::NameLoad && e.reads_vars == vec!["x".to_string()]));
    }

    #[tokio::test]
    async fn uppercase_call_target_is_instantiate() {
        let dir = tempfile::tempdir().unwrap();
        let tree = parse(&dir, "def f():\n    Widget()\n");
        let root = tree.root_node();
        let func = root.named_child(0).unwrap();
        let body = func.child_by_field_name("body").unwrap();
        let stmt = body.named_child(0).unwrap();

        let builder = ExpressionBuilder::new(&tree.source, &tree.file_path, "pkg.f");
        let handle: TypeServerHandle<Present> = TypeServerHandle::new(None);
        let mut type_table = TypeTable::new();
        let block_id: BlockId = codegraph_core::Id::derive("BasicBlock", &["pkg.f", "0"]);
        let exprs = builder.build_for_statement(stmt, block_id, &mut type_table, &handle).await;

        assert!(exprs.iter().any(|e| e.kind == ExprKind::Instantiate));
    }
}
