use crate::dispatch::{dispatch_for, NodeAction, BRANCH_KINDS, LOOP_KINDS, RESERVED_PARAM_NAMES, TRY_KINDS};
use crate::scope::ScopeStack;
use codegraph_core::{
    EdgeKind, FunctionFlowSummary, Id, ImportRef, IrDocument, IrEdge, IrNode, NodeId, NodeKind,
    PipelineError, Result,
};
use codegraph_parser::SyntaxTree;
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;
use tracing::debug;

/// One level of the explicit walk stack: the node being visited, the index
/// of the next child to push, and bookkeeping popped on the way back out.
struct WalkFrame<'a> {
    node: Node<'a>,
    next_child: usize,
    scope_pushed: bool,
    container_id: Option<NodeId>,
}

/// Builds an `IrDocument` (plus per-function control-flow summaries) from
/// a parsed syntax tree. The walk is iterative: an explicit `Vec<WalkFrame>`
/// stands in for the call stack, and node handling is a dispatch-table
/// lookup keyed on grammar node kind rather than an if/else ladder.
pub struct IrBuilder;

impl IrBuilder {
    pub fn build(
        tree: &SyntaxTree,
        module_fqn: &str,
    ) -> Result<(IrDocument, HashMap<NodeId, FunctionFlowSummary>)> {
        let mut doc = IrDocument::new(tree.file_path.clone(), tree.language);
        let mut flow_summaries = HashMap::new();
        let mut scopes = ScopeStack::new(module_fqn);
        let mut seen_external_ids: HashSet<NodeId> = HashSet::new();

        debug!(file = %tree.file_path, %module_fqn, "building ir document");

        let root = tree.root_node();
        let module_span = tree.node_span(&root);
        let module_node = IrNode::new(
            NodeKind::Module,
            module_fqn,
            module_fqn,
            module_span,
            tree.file_path.clone(),
            tree.language,
        );
        let module_id = module_node.id;
        doc.nodes.push(module_node);

        let mut stack: Vec<WalkFrame> = vec![WalkFrame {
            node: root,
            next_child: 0,
            scope_pushed: false,
            container_id: Some(module_id),
        }];

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            let child_count = node.named_child_count();

            if frame.next_child == 0 && node.id() != root.id() {
                // First visit: handle this node per the dispatch table.
                let action = dispatch_for(tree.language, node.kind());
                let (new_container, pushed_scope) = Self::handle_enter(
                    tree,
                    &mut doc,
                    &mut scopes,
                    &mut flow_summaries,
                    &mut seen_external_ids,
                    node,
                    frame.container_id,
                )?;
                frame.scope_pushed = pushed_scope;
                if let Some(id) = new_container {
                    frame.container_id = Some(id);
                }
                if matches!(action, NodeAction::Parameter) {
                    // Parameters are leaves for our purposes; skip descending
                    // into their sub-expressions (default values, etc.) to
                    // avoid emitting spurious identifier nodes for them.
                    frame.next_child = child_count;
                }
            }

            if frame.next_child < child_count {
                let child = node.named_child(frame.next_child).unwrap();
                frame.next_child += 1;
                let container_id = frame.container_id;
                stack.push(WalkFrame {
                    node: child,
                    next_child: 0,
                    scope_pushed: false,
                    container_id,
                });
            } else {
                if frame.scope_pushed {
                    scopes.pop();
                }
                stack.pop();
            }
        }

        debug!(
            file = %tree.file_path,
            nodes = doc.nodes.len(),
            edges = doc.edges.len(),
            functions_with_flow = flow_summaries.len(),
            "ir document built"
        );

        Ok((doc, flow_summaries))
    }

    fn handle_enter(
        tree: &SyntaxTree,
        doc: &mut IrDocument,
        scopes: &mut ScopeStack,
        flow_summaries: &mut HashMap<NodeId, FunctionFlowSummary>,
        seen_external_ids: &mut HashSet<NodeId>,
        node: Node<'_>,
        container_id: Option<NodeId>,
    ) -> Result<(Option<NodeId>, bool)> {
        let action = dispatch_for(tree.language, node.kind());
        match action {
            NodeAction::Class => {
                let Some(name) = Self::identifier_child_text(tree, node) else {
                    return Ok((None, false));
                };
                let fqn = scopes.current().child_fqn(&name);
                let span = tree.node_span(&node);
                let mut ir_node =
                    IrNode::new(NodeKind::Class, name, fqn.clone(), span, tree.file_path.clone(), tree.language);
                if let Some(parent) = container_id {
                    ir_node = ir_node.with_parent(parent);
                }
                let id = ir_node.id;
                doc.nodes.push(ir_node);
                if let Some(parent) = container_id {
                    doc.edges.push(IrEdge::new(EdgeKind::Contains, parent, id));
                }
                scopes.push(scopes.current().enter_class(fqn));
                Ok((Some(id), true))
            }
            NodeAction::Function => {
                let Some(name) = Self::identifier_child_text(tree, node) else {
                    return Ok((None, false));
                };
                let is_method = scopes.current().enclosing_class.is_some()
                    && scopes.current().enclosing_function.is_none();
                let kind = if is_method { NodeKind::Method } else { NodeKind::Function };
                let fqn = scopes.current().child_fqn(&name);
                let span = tree.node_span(&node);
                let mut ir_node = IrNode::new(kind, name, fqn.clone(), span, tree.file_path.clone(), tree.language);
                if let Some(parent) = container_id {
                    ir_node = ir_node.with_parent(parent);
                }
                let id = ir_node.id;
                doc.nodes.push(ir_node);
                if let Some(parent) = container_id {
                    doc.edges.push(IrEdge::new(EdgeKind::Contains, parent, id));
                }

                let summary = Self::compute_flow_summary(node);
                flow_summaries.insert(id, summary);

                Self::collect_parameters(tree, doc, node, id);

                scopes.push(scopes.current().enter_function(fqn));
                Ok((Some(id), true))
            }
            NodeAction::ImportStatement | NodeAction::ImportFromStatement => {
                Self::record_import(tree, doc, node, action == NodeAction::ImportFromStatement, container_id);
                Ok((None, false))
            }
            NodeAction::Call => {
                if let (Some(caller), Some(callee_name)) = (container_id, Self::call_target_text(tree, node)) {
                    let external_span = tree.node_span(&node);
                    let mut external = IrNode::new(
                        NodeKind::External,
                        callee_name.clone(),
                        callee_name,
                        external_span.clone(),
                        tree.file_path.clone(),
                        tree.language,
                    );
                    // Every call site naming the same symbol must resolve to the
                    // same node id, not one per call-site span, so that the id a
                    // symbol table retains for this fqn matches every Calls edge
                    // that targets it.
                    external.id = Id::derive("External", &[external.fqn.as_str()]);
                    let callee_id = external.id;
                    if seen_external_ids.insert(callee_id) {
                        doc.nodes.push(external);
                    }
                    doc.edges.push(
                        IrEdge::new(EdgeKind::Calls, caller, callee_id).with_span(external_span),
                    );
                }
                Ok((None, false))
            }
            _ => Ok((None, false)),
        }
    }

    fn identifier_child_text(tree: &SyntaxTree, node: Node<'_>) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| tree.node_text(&n).to_string())
    }

    fn call_target_text(tree: &SyntaxTree, node: Node<'_>) -> Option<String> {
        node.child_by_field_name("function")
            .map(|n| tree.node_text(&n).to_string())
    }

    fn collect_parameters(tree: &SyntaxTree, doc: &mut IrDocument, func_node: Node<'_>, func_id: NodeId) {
        let Some(params) = func_node.child_by_field_name("parameters") else {
            return;
        };
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            let name_node = match param.kind() {
                "identifier" => Some(param),
                "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                    param.child_by_field_name("name").or_else(|| param.named_child(0))
                }
                _ => None,
            };
            let Some(name_node) = name_node else { continue };
            let name = tree.node_text(&name_node);
            if RESERVED_PARAM_NAMES.contains(name) {
                continue;
            }
            let span = tree.node_span(&param);
            let fqn = format!("{}.{}", doc.node_by_id(func_id).map(|n| n.fqn.clone()).unwrap_or_default(), name);
            let mut ir_node = IrNode::new(
                NodeKind::Parameter,
                name,
                fqn,
                span,
                tree.file_path.clone(),
                tree.language,
            )
            .with_parent(func_id);
            ir_node.attrs.insert("declared_in".to_string(), func_id.to_string());
            doc.nodes.push(ir_node);
        }
    }

    fn record_import(
        tree: &SyntaxTree,
        doc: &mut IrDocument,
        node: Node<'_>,
        is_from: bool,
        container_id: Option<NodeId>,
    ) {
        let span = tree.node_span(&node);
        let text = tree.node_text(&node).to_string();
        let ir_node = IrNode::new(
            NodeKind::Import,
            text.clone(),
            text.clone(),
            span.clone(),
            tree.file_path.clone(),
            tree.language,
        );
        let node_id = ir_node.id;
        if let Some(parent) = container_id {
            doc.edges.push(IrEdge::new(EdgeKind::Imports, parent, node_id));
        }
        doc.nodes.push(ir_node);

        let (module_path, imported_name, relative_level) = Self::parse_import_text(&text, is_from);
        doc.imports.push(ImportRef {
            node_id,
            module_path,
            imported_name,
            alias: None,
            relative_level,
            span,
        });
    }

    /// Best-effort textual parse of an import statement's source text. A
    /// grammar-field-based version would be more precise, but the
    /// `import_from_statement`/`import_statement` fields differ enough
    /// between tree-sitter-python versions that splitting the rendered
    /// text is the more stable approach here.
    fn parse_import_text(text: &str, is_from: bool) -> (String, Option<String>, u32) {
        let text = text.trim();
        if is_from {
            let rest = text.strip_prefix("from").unwrap_or(text).trim();
            let mut parts = rest.splitn(2, "import");
            let module_part = parts.next().unwrap_or("").trim();
            let name_part = parts.next().map(|s| s.trim().to_string());
            let relative_level = module_part.chars().take_while(|c| *c == '.').count() as u32;
            let module_path = module_part.trim_start_matches('.').to_string();
            (module_path, name_part, relative_level)
        } else {
            let rest = text.strip_prefix("import").unwrap_or(text).trim();
            (rest.to_string(), None, 0)
        }
    }

    fn compute_flow_summary(func_node: Node<'_>) -> FunctionFlowSummary {
        let Some(body) = func_node.child_by_field_name("body") else {
            return FunctionFlowSummary {
                cyclomatic_complexity: 1,
                branch_count: 0,
                has_loop: false,
                has_try: false,
            };
        };

        let mut branch_count = 0u32;
        let mut has_loop = false;
        let mut has_try = false;
        let mut stack = vec![body];
        while let Some(node) = stack.pop() {
            let kind = node.kind();
            if BRANCH_KINDS.contains(kind) {
                branch_count += 1;
            }
            if LOOP_KINDS.contains(kind) {
                has_loop = true;
            }
            if TRY_KINDS.contains(kind) {
                has_try = true;
            }
            // Don't descend into nested function/class bodies: their own
            // summaries are computed independently when the walker visits
            // them as their own `Function` node.
            if kind == "function_definition" || kind == "class_definition" {
                continue;
            }
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                stack.push(child);
            }
        }

        FunctionFlowSummary {
            cyclomatic_complexity: branch_count + 1,
            branch_count,
            has_loop,
            has_try,
        }
    }
}

pub fn build_error(file: impl Into<String>, reason: impl Into<String>) -> PipelineError {
    PipelineError::IrBuild {
        file: file.into(),
        reason: reason.into(),
    }
}
