use serde::{Deserialize, Serialize};

/// A source location: a file path plus start/end (line, column) and byte
/// offset. All downstream entities carry a `Span`; spans survive edits via
/// the incremental reparser's byte-offset edit application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub file_path: String,
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
    pub start_byte: u32,
    pub end_byte: u32,
}

impl Span {
    pub fn new(
        file_path: impl Into<String>,
        start_line: u32,
        start_col: u32,
        end_line: u32,
        end_col: u32,
        start_byte: u32,
        end_byte: u32,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            start_line,
            start_col,
            end_line,
            end_col,
            start_byte,
            end_byte,
        }
    }

    /// Normalized string form used as part of the deterministic id hash
    /// input. Stable across platforms (no `\r\n` vs `\n` drift, since byte
    /// offsets are the canonical coordinate).
    pub fn normalized_key(&self) -> String {
        format!(
            "{}:{}:{}-{}:{}",
            self.file_path, self.start_byte, self.start_line, self.end_byte, self.end_line
        )
    }

    pub fn contains_byte(&self, byte: u32) -> bool {
        byte >= self.start_byte && byte < self.end_byte
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.file_path == other.file_path
            && !(self.end_byte <= other.start_byte || other.end_byte <= self.start_byte)
    }
}

/// The set of languages the pipeline can parse. Language-parametric design:
/// adding a grammar means adding a variant plus a `codegraph-parser`
/// registry entry and a `codegraph-ir` extractor, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    Rust,
    JavaScript,
    TypeScript,
    Go,
    Java,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" | "pyi" => Some(Language::Python),
            "rs" => Some(Language::Rust),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "go" => Some(Language::Go),
            "java" => Some(Language::Java),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Java => "java",
        }
    }
}
