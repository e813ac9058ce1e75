use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static GOOGLE_ARGS_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*Args:\s*$").unwrap());
static GOOGLE_PARAM_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s{2,}(\w+)\s*(?:\([^)]*\))?:\s*(.+)$").unwrap());
static SPHINX_PARAM_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*:param\s+(\w+):\s*(.+)$").unwrap());

/// Parse Google- and Sphinx-style `:param:`/`Args:` docstring sections into
/// a `name -> description` map. Best-effort: a docstring matching neither
/// convention yields an empty map rather than an error.
pub fn parse_param_docs(docstring: &str) -> HashMap<String, String> {
    let mut docs = HashMap::new();

    if let Some(header) = GOOGLE_ARGS_HEADER.find(docstring) {
        let body = &docstring[header.end()..];
        let section_end = body.find("\n\n").unwrap_or(body.len());
        for cap in GOOGLE_PARAM_LINE.captures_iter(&body[..section_end]) {
            docs.insert(cap[1].to_string(), cap[2].trim().to_string());
        }
    }

    for cap in SPHINX_PARAM_LINE.captures_iter(docstring) {
        docs.entry(cap[1].to_string()).or_insert_with(|| cap[2].trim().to_string());
    }

    docs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_google_style_args() {
        let doc = "Summary.\n\nArgs:\n    x: the input value\n    y (int): a count\n\nReturns:\n    None\n";
        let docs = parse_param_docs(doc);
        assert_eq!(docs.get("x").map(String::as_str), Some("the input value"));
        assert_eq!(docs.get("y").map(String::as_str), Some("a count"));
    }

    #[test]
    fn parses_sphinx_style_params() {
        let doc = "Summary.\n\n:param x: the input value\n:param y: a count\n";
        let docs = parse_param_docs(doc);
        assert_eq!(docs.get("x").map(String::as_str), Some("the input value"));
        assert_eq!(docs.get("y").map(String::as_str), Some("a count"));
    }

    #[test]
    fn unmatched_docstring_yields_empty_map() {
        let docs = parse_param_docs("Just a plain summary.");
        assert!(docs.is_empty());
    }
}
