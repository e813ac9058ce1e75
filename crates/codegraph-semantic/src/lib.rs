pub mod blocks;
pub mod dataflow;
pub mod docstring;
pub mod document;
pub mod expressions;
pub mod semantic_builder;
pub mod signatures;
pub mod type_normalize;
pub mod type_table;

pub use blocks::build_bfg_cfg;
pub use dataflow::build_dfg;
pub use docstring::parse_param_docs;
pub use document::SemanticDocument;
pub use expressions::ExpressionBuilder;
pub use semantic_builder::SemanticIrBuilder;
pub use signatures::{build_declared_type, build_signature, SignatureResult};
pub use type_normalize::{normalize_type_text, NormalizedType};
pub use type_table::TypeTable;
