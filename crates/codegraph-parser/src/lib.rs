//! Tree-sitter-backed incremental parser: source discovery, full and
//! incremental parsing, and per-path tree caching.

mod cache;
mod file_collect;
mod language;
mod parser;
mod tree;
mod unified_diff;

pub use file_collect::collect_source_files;
pub use language::LanguageRegistry;
pub use parser::{TreeSitterParser, DEFAULT_CACHE_CAPACITY};
pub use tree::SyntaxTree;
pub use unified_diff::{parse_unified_diff, DiffParseError, Hunk, HunkLine, LineByteTable};
