use codegraph_core::{Language, Span};

/// A parsed file: the Tree-sitter tree plus the source text it was parsed
/// from (tree-sitter nodes borrow byte ranges, not text, so the source must
/// travel with the tree for anything downstream to read node text).
pub struct SyntaxTree {
    pub file_path: String,
    pub language: Language,
    pub source: String,
    pub tree: tree_sitter::Tree,
}

impl SyntaxTree {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    pub fn node_text<'a>(&'a self, node: &tree_sitter::Node<'a>) -> &'a str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    pub fn node_span(&self, node: &tree_sitter::Node<'_>) -> Span {
        let start = node.start_position();
        let end = node.end_position();
        Span::new(
            self.file_path.clone(),
            start.row as u32,
            start.column as u32,
            end.row as u32,
            end.column as u32,
            node.start_byte() as u32,
            node.end_byte() as u32,
        )
    }

    pub fn has_error(&self) -> bool {
        self.tree.root_node().has_error()
    }
}
