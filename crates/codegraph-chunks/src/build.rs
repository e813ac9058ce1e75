use crate::error::{ChunksError, Result};
use codegraph_core::{Chunk, ChunkId, ChunkKind, ChunkKindConfig, IrDocument, IrNode, NodeId, NodeKind, Span};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Function/method bodies longer than this many lines get split into Block
/// chunks of `BLOCK_SIZE_LINES` each.
const BLOCK_LINE_THRESHOLD: usize = 40;
const BLOCK_SIZE_LINES: usize = 30;

/// Build the full chunk hierarchy for one file: File -> Module -> Class ->
/// Function/Method -> (optional) Block. One pass over `doc.nodes`, ordered
/// by parent depth so every child is built after its parent chunk exists.
pub fn build_file_chunks(
    doc: &IrDocument,
    source: &str,
    repo_id: &str,
    snapshot_id: &str,
    enabled: &HashSet<ChunkKindConfig>,
) -> Result<Vec<Chunk>> {
    let by_id: HashMap<NodeId, &IrNode> = doc.nodes.iter().map(|n| (n.id, n)).collect();
    let line_starts = line_start_offsets(source);

    let mut chunks = Vec::new();
    let mut node_chunk_id: HashMap<NodeId, ChunkId> = HashMap::new();

    let file_chunk = if enabled.contains(&ChunkKindConfig::File) {
        let len = source.len() as u32;
        let last_line = line_starts.len().saturating_sub(1) as u32;
        let span = Span::new(doc.file_path.clone(), 0, 0, last_line, 0, 0, len);
        let chunk = build_chunk(
            repo_id,
            snapshot_id,
            ChunkKind::File,
            &doc.file_path,
            span,
            None,
            None,
            source,
            &doc.file_path,
        )?;
        let id = chunk.chunk_id;
        chunks.push(chunk);
        Some(id)
    } else {
        None
    };

    let mut nested: Vec<&IrNode> = doc
        .nodes
        .iter()
        .filter(|n| matches!(n.kind, NodeKind::Module | NodeKind::Class | NodeKind::Function | NodeKind::Method))
        .filter(|n| node_kind_enabled(n.kind, enabled))
        .collect();
    nested.sort_by_key(|n| node_depth(n, &by_id));

    for node in &nested {
        let parent_chunk_id = match node.kind {
            NodeKind::Module => file_chunk,
            _ => nearest_ancestor_chunk(node, &by_id, &node_chunk_id).or(file_chunk),
        };
        let kind = chunk_kind_for(node.kind);
        let chunk = build_chunk(
            repo_id,
            snapshot_id,
            kind,
            &doc.file_path,
            node.span.clone(),
            parent_chunk_id,
            Some(node.id),
            source,
            &node.fqn,
        )?;
        let chunk_id = chunk.chunk_id;
        node_chunk_id.insert(node.id, chunk_id);
        chunks.push(chunk);

        if matches!(node.kind, NodeKind::Function | NodeKind::Method) && enabled.contains(&ChunkKindConfig::Block) {
            let blocks = build_blocks(repo_id, snapshot_id, &doc.file_path, &node.span, chunk_id, source, &line_starts)?;
            chunks.extend(blocks);
        }
    }

    link_children(&mut chunks);

    debug!(file = %doc.file_path, chunks = chunks.len(), "file chunks built");

    Ok(chunks)
}

fn node_kind_enabled(kind: NodeKind, enabled: &HashSet<ChunkKindConfig>) -> bool {
    match kind {
        NodeKind::Module => enabled.contains(&ChunkKindConfig::Module),
        NodeKind::Class => enabled.contains(&ChunkKindConfig::Class),
        NodeKind::Function | NodeKind::Method => enabled.contains(&ChunkKindConfig::Function),
        _ => false,
    }
}

fn chunk_kind_for(kind: NodeKind) -> ChunkKind {
    match kind {
        NodeKind::Module => ChunkKind::Module,
        NodeKind::Class => ChunkKind::Class,
        _ => ChunkKind::Function,
    }
}

fn node_depth(node: &IrNode, by_id: &HashMap<NodeId, &IrNode>) -> usize {
    let mut depth = 0;
    let mut current_parent = node.parent_id;
    while let Some(parent_id) = current_parent {
        match by_id.get(&parent_id) {
            Some(parent) => {
                depth += 1;
                current_parent = parent.parent_id;
            }
            None => break,
        }
    }
    depth
}

fn nearest_ancestor_chunk(
    node: &IrNode,
    by_id: &HashMap<NodeId, &IrNode>,
    node_chunk_id: &HashMap<NodeId, ChunkId>,
) -> Option<ChunkId> {
    let mut current_parent = node.parent_id;
    while let Some(parent_id) = current_parent {
        if let Some(chunk_id) = node_chunk_id.get(&parent_id) {
            return Some(*chunk_id);
        }
        current_parent = by_id.get(&parent_id).and_then(|p| p.parent_id);
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn build_chunk(
    repo_id: &str,
    snapshot_id: &str,
    kind: ChunkKind,
    file_path: &str,
    span: Span,
    parent_chunk_id: Option<ChunkId>,
    symbol_node_id: Option<NodeId>,
    source: &str,
    stable_key: &str,
) -> Result<Chunk> {
    let start = span.start_byte as usize;
    let end = span.end_byte as usize;
    let slice = source.get(start..end).ok_or_else(|| ChunksError::SpanOutOfBounds {
        file_path: file_path.to_string(),
        start,
        end,
        len: source.len(),
    })?;
    let content_hash = hash_content(slice);
    let chunk_id = Chunk::derive_id(repo_id, file_path, kind, stable_key);
    Ok(Chunk {
        chunk_id,
        repo_id: repo_id.to_string(),
        snapshot_id: snapshot_id.to_string(),
        kind,
        file_path: file_path.to_string(),
        span,
        parent_chunk_id,
        child_chunk_ids: Vec::new(),
        symbol_id: symbol_node_id,
        content_hash,
    })
}

fn build_blocks(
    repo_id: &str,
    snapshot_id: &str,
    file_path: &str,
    function_span: &Span,
    parent_chunk_id: ChunkId,
    source: &str,
    line_starts: &[u32],
) -> Result<Vec<Chunk>> {
    let total_lines = (function_span.end_line - function_span.start_line + 1) as usize;
    if total_lines <= BLOCK_LINE_THRESHOLD {
        return Ok(Vec::new());
    }

    let mut blocks = Vec::new();
    let mut start_line = function_span.start_line;
    while start_line <= function_span.end_line {
        let end_line = (start_line + BLOCK_SIZE_LINES as u32 - 1).min(function_span.end_line);
        let start_byte = line_byte_offset(line_starts, start_line).max(function_span.start_byte);
        let end_byte = if end_line >= function_span.end_line {
            function_span.end_byte
        } else {
            line_byte_offset(line_starts, end_line + 1).min(function_span.end_byte)
        };
        let span = Span::new(file_path.to_string(), start_line, 0, end_line, 0, start_byte, end_byte);
        let stable_key = format!("{start_line}-{end_line}");
        let chunk = build_chunk(
            repo_id,
            snapshot_id,
            ChunkKind::Block,
            file_path,
            span,
            Some(parent_chunk_id),
            None,
            source,
            &stable_key,
        )?;
        blocks.push(chunk);
        start_line = end_line + 1;
    }
    Ok(blocks)
}

fn line_start_offsets(source: &str) -> Vec<u32> {
    let mut offsets = vec![0u32];
    for (i, b) in source.bytes().enumerate() {
        if b == b'\n' {
            offsets.push((i + 1) as u32);
        }
    }
    offsets
}

fn line_byte_offset(line_starts: &[u32], line: u32) -> u32 {
    line_starts.get(line as usize).copied().unwrap_or_else(|| *line_starts.last().unwrap_or(&0))
}

/// Hash the chunk's exact textual content. Line endings are normalized
/// first so a file saved with `\r\n` hashes the same as its `\n` twin.
fn hash_content(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}

fn link_children(chunks: &mut [Chunk]) {
    let mut children: HashMap<ChunkId, Vec<ChunkId>> = HashMap::new();
    for chunk in chunks.iter() {
        if let Some(parent) = chunk.parent_chunk_id {
            children.entry(parent).or_default().push(chunk.chunk_id);
        }
    }
    for chunk in chunks.iter_mut() {
        if let Some(ids) = children.remove(&chunk.chunk_id) {
            chunk.child_chunk_ids = ids;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::Language;

    fn enabled_all() -> HashSet<ChunkKindConfig> {
        [
            ChunkKindConfig::File,
            ChunkKindConfig::Module,
            ChunkKindConfig::Class,
            ChunkKindConfig::Function,
            ChunkKindConfig::Block,
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn builds_file_module_function_hierarchy() {
        let source = "def greet():\n    return 1\n";
        let module_span = Span::new("a.py", 0, 0, 1, 11, 0, source.len() as u32);
        let fn_span = Span::new("a.py", 0, 0, 1, 11, 0, source.len() as u32);

        let module = IrNode::new(NodeKind::Module, "a", "pkg.a", module_span, "a.py", Language::Python);
        let module_id = module.id;
        let func = IrNode::new(NodeKind::Function, "greet", "pkg.a.greet", fn_span, "a.py", Language::Python)
            .with_parent(module_id);

        let mut doc = IrDocument::new("a.py", Language::Python);
        doc.nodes.push(module);
        doc.nodes.push(func);

        let chunks = build_file_chunks(&doc, source, "repo", "snap", &enabled_all()).unwrap();
        let kinds: Vec<ChunkKind> = chunks.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&ChunkKind::File));
        assert!(kinds.contains(&ChunkKind::Module));
        assert!(kinds.contains(&ChunkKind::Function));

        let file_chunk = chunks.iter().find(|c| c.kind == ChunkKind::File).unwrap();
        let module_chunk = chunks.iter().find(|c| c.kind == ChunkKind::Module).unwrap();
        assert_eq!(module_chunk.parent_chunk_id, Some(file_chunk.chunk_id));
        assert!(file_chunk.child_chunk_ids.contains(&module_chunk.chunk_id));
    }

    #[test]
    fn identical_content_yields_identical_chunk_ids_and_hashes() {
        let source = "class C:\n    pass\n";
        let span = Span::new("a.py", 0, 0, 1, 8, 0, source.len() as u32);
        let module = IrNode::new(NodeKind::Module, "a", "pkg.a", span.clone(), "a.py", Language::Python);
        let module_id = module.id;
        let class = IrNode::new(NodeKind::Class, "C", "pkg.a.C", span, "a.py", Language::Python).with_parent(module_id);

        let mut doc = IrDocument::new("a.py", Language::Python);
        doc.nodes.push(module);
        doc.nodes.push(class);

        let first = build_file_chunks(&doc, source, "repo", "snap", &enabled_all()).unwrap();
        let second = build_file_chunks(&doc, source, "repo", "snap", &enabled_all()).unwrap();

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.chunk_id, b.chunk_id);
            assert_eq!(a.content_hash, b.content_hash);
        }
    }
}
