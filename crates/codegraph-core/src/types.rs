use crate::ids::Id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type TypeId = Id;
pub type SignatureId = Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeFlavor {
    Primitive,
    Builtin,
    User,
    Generic,
    Union,
    Callable,
}

/// `{id, raw_text, flavor, is_nullable, is_type_alias, generic_param_ids[],
/// external_type_text?}` — deduplicated project-wide by canonical text (the
/// `raw_text` field after normalization).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntity {
    pub id: TypeId,
    pub raw_text: String,
    pub flavor: TypeFlavor,
    pub is_nullable: bool,
    pub is_type_alias: bool,
    pub generic_param_ids: Vec<TypeId>,
    pub external_type_text: Option<String>,
}

impl TypeEntity {
    pub fn new(raw_text: impl Into<String>, flavor: TypeFlavor) -> Self {
        let raw_text = raw_text.into();
        let id = Id::derive("TypeEntity", &[raw_text.as_str()]);
        Self {
            id,
            raw_text,
            flavor,
            is_nullable: false,
            is_type_alias: false,
            generic_param_ids: Vec::new(),
            external_type_text: None,
        }
    }
}

/// `{id, parameter_type_ids[], return_type_id?, external_signature_text?,
/// external_param_docs?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureEntity {
    pub id: SignatureId,
    pub parameter_type_ids: Vec<TypeId>,
    pub return_type_id: Option<TypeId>,
    pub external_signature_text: Option<String>,
    pub external_param_docs: Option<HashMap<String, String>>,
}

impl SignatureEntity {
    pub fn new(function_fqn: &str, overload_index: usize) -> Self {
        let id = Id::derive(
            "SignatureEntity",
            &[function_fqn, overload_index.to_string().as_str()],
        );
        Self {
            id,
            parameter_type_ids: Vec::new(),
            return_type_id: None,
            external_signature_text: None,
            external_param_docs: None,
        }
    }
}
