use codegraph_core::Language;
use std::path::Path;

/// Maps `Language` to its tree-sitter grammar and back to file extensions.
/// Adding a language means adding one match arm here plus a
/// `codegraph-ir` extractor — nothing else in the pipeline needs to know.
pub struct LanguageRegistry;

impl LanguageRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn detect_language(&self, file_path: &str) -> Option<Language> {
        let ext = Path::new(file_path).extension()?.to_str()?;
        Language::from_extension(ext)
    }

    pub fn grammar(&self, language: Language) -> tree_sitter::Language {
        match language {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
        }
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_language_by_extension() {
        let reg = LanguageRegistry::new();
        assert_eq!(reg.detect_language("a/b.py"), Some(Language::Python));
        assert_eq!(reg.detect_language("a/b.rs"), Some(Language::Rust));
        assert_eq!(reg.detect_language("a/b.ts"), Some(Language::TypeScript));
        assert_eq!(reg.detect_language("a/b.txt"), None);
    }
}
