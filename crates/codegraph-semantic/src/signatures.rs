use crate::docstring::parse_param_docs;
use crate::type_table::TypeTable;
use codegraph_core::{IrNode, NodeKind, SignatureEntity};
use codegraph_typeserver::{Present, TypeServerHandle};

/// Phase 1 result for a single function/method node: the primary
/// signature plus any additional overloads the type server reported.
pub struct SignatureResult {
    pub primary: SignatureEntity,
    pub overloads: Vec<SignatureEntity>,
}

/// Build Type + Signature entities for one function node, enriching from
/// the type server when available. Docstring parameter docs (Google and
/// Sphinx styles) are attached to the primary signature.
pub async fn build_signature(
    node: &IrNode,
    docstring: Option<&str>,
    type_table: &mut TypeTable,
    type_handle: &TypeServerHandle<Present>,
) -> SignatureResult {
    let hover = type_handle
        .hover(&node.file_path, node.span.start_line, node.span.start_col)
        .await;

    let mut primary = SignatureEntity::new(&node.fqn, 0);
    let mut overloads = Vec::new();

    if let Some(hover) = hover {
        let signature_texts: Vec<&str> = hover.type_text.lines().filter(|l| !l.trim().is_empty()).collect();
        for (i, text) in signature_texts.iter().enumerate() {
            let mut sig = SignatureEntity::new(&node.fqn, i);
            sig.external_signature_text = Some(text.to_string());
            if let Some((params, ret)) = split_signature_text(text) {
                sig.parameter_type_ids = params.iter().map(|p| type_table.intern(p)).collect();
                sig.return_type_id = Some(type_table.intern(&ret));
            }
            if i == 0 {
                primary = sig;
            } else {
                overloads.push(sig);
            }
        }
    }

    if let Some(doc) = docstring {
        primary.external_param_docs = Some(parse_param_docs(doc));
    }

    SignatureResult { primary, overloads }
}

/// Build a `TypeEntity` for a declared-type span (a parameter or variable
/// annotation), returning its id.
pub async fn build_declared_type(
    node: &IrNode,
    type_table: &mut TypeTable,
    type_handle: &TypeServerHandle<Present>,
) -> Option<codegraph_core::TypeId> {
    if !matches!(node.kind, NodeKind::Parameter | NodeKind::Variable) {
        return None;
    }
    let hover = type_handle
        .hover(&node.file_path, node.span.start_line, node.span.start_col)
        .await?;
    Some(type_table.intern(&hover.type_text))
}

/// Parse `(T1, T2) -> R` style signature text into parameter and return
/// type texts. Returns `None` if the text doesn't match that shape.
fn split_signature_text(text: &str) -> Option<(Vec<String>, String)> {
    let (params_part, ret_part) = text.split_once("->")?;
    let params_part = params_part.trim().trim_start_matches('(').trim_end_matches(')');
    let params = if params_part.is_empty() {
        Vec::new()
    } else {
        params_part.split(',').map(|p| p.trim().to_string()).collect()
    };
    Some((params, ret_part.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_simple_signature_text() {
        let (params, ret) = split_signature_text("(x: int, y: str) -> bool").unwrap();
        assert_eq!(params, vec!["x: int".to_string(), "y: str".to_string()]);
        assert_eq!(ret, "bool");
    }

    #[test]
    fn non_signature_text_yields_none() {
        assert!(split_signature_text("int").is_none());
    }
}
