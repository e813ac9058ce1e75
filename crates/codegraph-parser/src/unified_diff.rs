//! A minimal unified-diff parser: enough to drive `parse_incremental`'s
//! edit application without pulling in a full patch-apply crate. Applying
//! an incremental reparse means turning a unified diff's hunk headers into
//! Tree-sitter edit events; `similar::TextDiff` only diffs two in-memory
//! strings, so producing/consuming an actual unified-diff *text* needs its
//! own small parser.

/// One `@@ -old_start,old_len +new_start,new_len @@` hunk plus its body
/// lines (context ` `, removed `-`, added `+`), 1-based line numbers as in
/// the unified diff format itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub old_start_line: u32,
    pub old_len: u32,
    pub new_start_line: u32,
    pub new_len: u32,
    pub lines: Vec<HunkLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HunkLine {
    Context(String),
    Removed(String),
    Added(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DiffParseError {
    #[error("malformed hunk header: {0}")]
    MalformedHeader(String),
}

/// Parse a unified diff body (no `---`/`+++` file headers required — only
/// `@@ ... @@` hunks and their lines) into hunks.
pub fn parse_unified_diff(diff_text: &str) -> Result<Vec<Hunk>, DiffParseError> {
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;

    for line in diff_text.lines() {
        if line.starts_with("@@ ") || (line.starts_with("@@") && line.len() > 2) {
            if let Some(h) = current.take() {
                hunks.push(h);
            }
            current = Some(parse_hunk_header(line)?);
        } else if let Some(h) = current.as_mut() {
            if let Some(rest) = line.strip_prefix('+') {
                h.lines.push(HunkLine::Added(rest.to_string()));
            } else if let Some(rest) = line.strip_prefix('-') {
                h.lines.push(HunkLine::Removed(rest.to_string()));
            } else if let Some(rest) = line.strip_prefix(' ') {
                h.lines.push(HunkLine::Context(rest.to_string()));
            } else if line.starts_with("---") || line.starts_with("+++") {
                // file header line inside the body; ignore
            } else if !line.is_empty() {
                h.lines.push(HunkLine::Context(line.to_string()));
            }
        }
        // lines before the first hunk header (file headers) are ignored
    }
    if let Some(h) = current.take() {
        hunks.push(h);
    }
    Ok(hunks)
}

fn parse_hunk_header(line: &str) -> Result<Hunk, DiffParseError> {
    // "@@ -l,s +l,s @@" optionally followed by a section heading
    let body = line
        .trim_start_matches("@@")
        .split("@@")
        .next()
        .ok_or_else(|| DiffParseError::MalformedHeader(line.to_string()))?
        .trim();
    let mut parts = body.split_whitespace();
    let old_part = parts
        .next()
        .ok_or_else(|| DiffParseError::MalformedHeader(line.to_string()))?;
    let new_part = parts
        .next()
        .ok_or_else(|| DiffParseError::MalformedHeader(line.to_string()))?;

    let (old_start, old_len) = parse_range(old_part, '-')?;
    let (new_start, new_len) = parse_range(new_part, '+')?;

    Ok(Hunk {
        old_start_line: old_start,
        old_len,
        new_start_line: new_start,
        new_len,
        lines: Vec::new(),
    })
}

fn parse_range(part: &str, prefix: char) -> Result<(u32, u32), DiffParseError> {
    let part = part
        .strip_prefix(prefix)
        .ok_or_else(|| DiffParseError::MalformedHeader(part.to_string()))?;
    let mut pieces = part.splitn(2, ',');
    let start: u32 = pieces
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DiffParseError::MalformedHeader(part.to_string()))?;
    let len: u32 = match pieces.next() {
        Some(s) => s.parse().unwrap_or(1),
        None => 1,
    };
    Ok((start, len))
}

/// Reconstruct the new file content by applying hunks (in order) over
/// `old_content`. Unchanged regions between/around hunks are copied
/// verbatim from `old_content`.
pub fn apply_hunks(old_content: &str, hunks: &[Hunk]) -> String {
    let old_lines: Vec<&str> = split_keep_newlines(old_content);
    let mut out = String::with_capacity(old_content.len());
    let mut old_idx: usize = 0; // 0-based index into old_lines

    for hunk in hunks {
        let hunk_old_start = (hunk.old_start_line.saturating_sub(1)) as usize;
        while old_idx < hunk_old_start && old_idx < old_lines.len() {
            out.push_str(old_lines[old_idx]);
            old_idx += 1;
        }
        for hunk_line in &hunk.lines {
            match hunk_line {
                HunkLine::Context(text) => {
                    out.push_str(text);
                    out.push('\n');
                    old_idx += 1;
                }
                HunkLine::Removed(_) => {
                    old_idx += 1;
                }
                HunkLine::Added(text) => {
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
    }
    while old_idx < old_lines.len() {
        out.push_str(old_lines[old_idx]);
        old_idx += 1;
    }
    out
}

fn split_keep_newlines(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for (i, b) in text.as_bytes().iter().enumerate() {
        if *b == b'\n' {
            out.push(&text[start..=i]);
            start = i + 1;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Cumulative byte offset of the start of each line (0-based line index).
/// Built once per content string and reused for every hunk's `(line, col)`
/// -> byte-offset conversions, UTF-8 aware since offsets are measured in
/// bytes throughout.
pub struct LineByteTable {
    line_starts: Vec<u32>,
    total_len: u32,
}

impl LineByteTable {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in content.as_bytes().iter().enumerate() {
            if *b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            line_starts,
            total_len: content.len() as u32,
        }
    }

    /// Byte offset of the start of 0-based `line`.
    pub fn line_start_byte(&self, line: u32) -> u32 {
        self.line_starts
            .get(line as usize)
            .copied()
            .unwrap_or(self.total_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_hunk() {
        let diff = "@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n";
        let hunks = parse_unified_diff(diff).unwrap();
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].old_start_line, 1);
        assert_eq!(hunks[0].old_len, 3);
        assert_eq!(hunks[0].new_start_line, 1);
        assert_eq!(hunks[0].new_len, 3);
        assert_eq!(hunks[0].lines.len(), 4);
    }

    #[test]
    fn applies_hunk_to_reconstruct_new_content() {
        let old = "a\nb\nc\n";
        let diff = "@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n";
        let hunks = parse_unified_diff(diff).unwrap();
        let new_content = apply_hunks(old, &hunks);
        assert_eq!(new_content, "a\nB\nc\n");
    }

    #[test]
    fn line_byte_table_handles_multibyte_lines() {
        let content = "a🙂b\nsecond\n";
        let table = LineByteTable::new(content);
        assert_eq!(table.line_start_byte(0), 0);
        // "a🙂b\n" is 1 + 4 + 1 + 1 = 7 bytes
        assert_eq!(table.line_start_byte(1), 7);
    }
}
