use crate::cache::ParseCache;
use crate::language::LanguageRegistry;
use crate::tree::SyntaxTree;
use crate::unified_diff::{self, LineByteTable};
use codegraph_core::{Language, PipelineError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default bound on the number of cached parse trees kept resident.
/// Unbounded caching of every touched file's tree is not viable for large
/// repositories, so the cache evicts by recency past this many entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// The Tree-sitter-backed parser. One instance is shared across a
/// build; `parse`/`parse_incremental` are safe to call from multiple
/// threads concurrently (the cache is lock-free on the read path, and a
/// fresh `tree_sitter::Parser` is constructed per call since `Parser` is
/// not `Sync`).
pub struct TreeSitterParser {
    registry: LanguageRegistry,
    cache: ParseCache,
}

impl TreeSitterParser {
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            registry: LanguageRegistry::new(),
            cache: ParseCache::new(capacity),
        }
    }

    fn language_for(&self, source_file: &Path) -> Result<Language> {
        let path_str = source_file.to_string_lossy();
        self.registry
            .detect_language(&path_str)
            .ok_or_else(|| PipelineError::Parse {
                file: path_str.to_string(),
                details: "unsupported file extension".to_string(),
            })
    }

    /// Full parse of `source_file`'s current on-disk content.
    pub fn parse(&self, source_file: &Path) -> Result<Arc<SyntaxTree>> {
        let content = std::fs::read_to_string(source_file).map_err(|e| PipelineError::Parse {
            file: source_file.display().to_string(),
            details: e.to_string(),
        })?;
        self.parse_content(source_file, content, None)
    }

    fn parse_content(
        &self,
        source_file: &Path,
        content: String,
        old_tree_hint: Option<tree_sitter::Tree>,
    ) -> Result<Arc<SyntaxTree>> {
        let path_str = source_file.display().to_string();
        let language = self.language_for(source_file)?;

        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&self.registry.grammar(language))
            .map_err(|e| PipelineError::Parse {
                file: path_str.clone(),
                details: format!("grammar load failed: {e}"),
            })?;

        let tree = parser
            .parse(&content, old_tree_hint.as_ref())
            .ok_or_else(|| PipelineError::Parse {
                file: path_str.clone(),
                details: "tree-sitter returned no tree (cancelled or timed out)".to_string(),
            })?;

        if tree.root_node().has_error() {
            debug!(file = %path_str, "parsed with error nodes; IR generator will treat affected subtrees as opaque");
        }

        let syntax_tree = Arc::new(SyntaxTree {
            file_path: path_str.clone(),
            language,
            source: content,
            tree,
        });
        self.cache.put(path_str, syntax_tree.clone());
        Ok(syntax_tree)
    }

    /// Edit-aware reparse. Requires a cached tree for `source_file`'s path;
    /// on cache miss, or on a malformed `unified_diff_text`, falls back to
    /// a full parse and logs a warning rather than failing the file.
    pub fn parse_incremental(
        &self,
        source_file: &Path,
        old_content: &str,
        unified_diff_text: &str,
    ) -> Result<Arc<SyntaxTree>> {
        let path_str = source_file.display().to_string();

        let Some(cached) = self.cache.get(&path_str) else {
            warn!(file = %path_str, "no cached tree for incremental parse, falling back to full parse");
            return self.parse(source_file);
        };

        let hunks = match unified_diff::parse_unified_diff(unified_diff_text) {
            Ok(h) => h,
            Err(e) => {
                warn!(file = %path_str, error = %e, "malformed diff, falling back to full parse");
                return self.parse(source_file);
            }
        };

        let new_content = match std::fs::read_to_string(source_file) {
            Ok(c) => c,
            Err(_) => unified_diff::apply_hunks(old_content, &hunks),
        };

        let old_table = LineByteTable::new(old_content);
        let new_table = LineByteTable::new(&new_content);

        let mut tree = cached.tree.clone();
        for hunk in &hunks {
            let old_start_row = hunk.old_start_line.saturating_sub(1);
            let old_end_row = old_start_row + hunk.old_len;
            let new_start_row = hunk.new_start_line.saturating_sub(1);
            let new_end_row = new_start_row + hunk.new_len;

            let start_byte = old_table.line_start_byte(old_start_row);
            let old_end_byte = old_table.line_start_byte(old_end_row);
            let new_end_byte = new_table.line_start_byte(new_end_row);

            let edit = tree_sitter::InputEdit {
                start_byte: start_byte as usize,
                old_end_byte: old_end_byte as usize,
                new_end_byte: new_end_byte as usize,
                start_position: tree_sitter::Point {
                    row: old_start_row as usize,
                    column: 0,
                },
                old_end_position: tree_sitter::Point {
                    row: old_end_row as usize,
                    column: 0,
                },
                new_end_position: tree_sitter::Point {
                    row: new_end_row as usize,
                    column: 0,
                },
            };
            tree.edit(&edit);
        }

        self.parse_content(source_file, new_content, Some(tree))
    }

    pub fn cache_get(&self, path: &str) -> Option<Arc<SyntaxTree>> {
        self.cache.get(path)
    }

    pub fn cache_clear(&self, path: &str) {
        self.cache.clear(path);
    }

    pub fn cache_clear_all(&self) {
        self.cache.clear_all();
    }
}

impl Default for TreeSitterParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_python_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.py", "def f():\n    return 1\n");
        let parser = TreeSitterParser::new();
        let tree = parser.parse(&path).unwrap();
        assert!(!tree.has_error());
        assert_eq!(tree.language, Language::Python);
    }

    #[test]
    fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.txt", "hello");
        let parser = TreeSitterParser::new();
        assert!(parser.parse(&path).is_err());
    }

    #[test]
    fn incremental_parse_falls_back_without_cached_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.py", "x = 1\n");
        let parser = TreeSitterParser::new();
        let diff = "@@ -1,1 +1,1 @@\n-x = 1\n+x = 2\n";
        let tree = parser.parse_incremental(&path, "x = 1\n", diff).unwrap();
        assert!(!tree.has_error());
    }

    #[test]
    fn incremental_parse_reuses_cached_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.py", "x = 1\n");
        let parser = TreeSitterParser::new();
        let _ = parser.parse(&path).unwrap();

        write_temp(&dir, "a.py", "x = 2\ny = 3\n");
        let diff = "@@ -1,1 +1,2 @@\n-x = 1\n+x = 2\n+y = 3\n";
        let tree = parser.parse_incremental(&path, "x = 1\n", diff).unwrap();
        assert!(!tree.has_error());
        assert_eq!(tree.source, "x = 2\ny = 3\n");
    }

    #[test]
    fn malformed_diff_falls_back_to_full_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "a.py", "x = 1\n");
        let parser = TreeSitterParser::new();
        let _ = parser.parse(&path).unwrap();
        let tree = parser
            .parse_incremental(&path, "x = 1\n", "not a diff at all")
            .unwrap();
        assert!(!tree.has_error());
    }
}
