pub mod document;
pub mod error;
pub mod interchange;
pub mod storage;
pub mod symbol_graph;

pub use document::GraphDocument;
pub use error::{GraphError, Result};
pub use interchange::{decode_relations, encode_relations};
pub use storage::SqliteSymbolStore;
pub use symbol_graph::SymbolGraph;
