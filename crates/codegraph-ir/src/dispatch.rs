use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// What a grammar node kind means to the IR builder. The dispatch table
/// maps tree-sitter node kind strings to one of these instead of an
/// if/else ladder, per the node-kind-keyed dispatch requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    Module,
    Class,
    Function,
    Parameter,
    ImportStatement,
    ImportFromStatement,
    Call,
    Assignment,
    Identifier,
    /// Node carries no IR meaning of its own but its children must still
    /// be visited (e.g. a block or suite).
    Transparent,
}

pub static PYTHON_DISPATCH: Lazy<HashMap<&'static str, NodeAction>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("module", NodeAction::Module);
    m.insert("class_definition", NodeAction::Class);
    m.insert("function_definition", NodeAction::Function);
    m.insert("identifier", NodeAction::Parameter);
    m.insert("typed_parameter", NodeAction::Parameter);
    m.insert("default_parameter", NodeAction::Parameter);
    m.insert("typed_default_parameter", NodeAction::Parameter);
    m.insert("import_statement", NodeAction::ImportStatement);
    m.insert("import_from_statement", NodeAction::ImportFromStatement);
    m.insert("call", NodeAction::Call);
    m.insert("assignment", NodeAction::Assignment);
    m
});

/// Reserved parameter names skipped when materializing `Parameter` IR
/// nodes for a function/method, checked via O(1) set lookup.
pub static RESERVED_PARAM_NAMES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["self", "cls"].into_iter().collect());

pub static BRANCH_KINDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "if_statement",
        "elif_clause",
        "conditional_expression",
        "case_clause",
        "except_clause",
        "match_statement",
    ]
    .into_iter()
    .collect()
});

pub static LOOP_KINDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["for_statement", "while_statement"].into_iter().collect());

pub static TRY_KINDS: Lazy<HashSet<&'static str>> = Lazy::new(|| ["try_statement"].into_iter().collect());

pub fn dispatch_for(language: codegraph_core::Language, kind: &str) -> NodeAction {
    match language {
        codegraph_core::Language::Python => PYTHON_DISPATCH
            .get(kind)
            .copied()
            .unwrap_or(NodeAction::Transparent),
        // Other grammars reuse the same node-action vocabulary; kinds not
        // present in PYTHON_DISPATCH fall through to Transparent so the
        // walker still descends into their children without producing a
        // node for them. Per-language tables can be added without
        // touching the walker itself.
        _ => PYTHON_DISPATCH
            .get(kind)
            .copied()
            .unwrap_or(NodeAction::Transparent),
    }
}
