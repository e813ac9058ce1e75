pub mod collect;
pub mod depgraph;
pub mod imports;
pub mod resolver;

pub use collect::{collect_symbols, module_fqn_of, CollectionResult};
pub use depgraph::build_dependency_graph;
pub use imports::resolve_document_imports;
pub use resolver::{build_global_context, incremental_update};
