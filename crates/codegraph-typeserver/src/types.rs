/// A 0-based `(line, column)` position within a file, matching LSP's
/// coordinate convention (distinct from `codegraph_core::Span`'s 1-based
/// IR-facing coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file_path: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverResult {
    pub type_text: String,
    pub docs: Option<String>,
}
