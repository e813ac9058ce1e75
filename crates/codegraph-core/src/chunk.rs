use crate::ids::Id;
use crate::span::Span;
use crate::symbol::SymbolId;
use serde::{Deserialize, Serialize};

pub type ChunkId = Id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChunkKind {
    File,
    Module,
    Class,
    Function,
    Block,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::File => "File",
            ChunkKind::Module => "Module",
            ChunkKind::Class => "Class",
            ChunkKind::Function => "Function",
            ChunkKind::Block => "Block",
        }
    }
}

/// A content-addressed, span-anchored slice of source text. `chunk_id` is a
/// stable deterministic function of `(repo_id, file_path, kind,
/// stable_key)`; `content_hash` hashes the chunk's exact textual content
/// (line endings normalized first, per the design notes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub repo_id: String,
    pub snapshot_id: String,
    pub kind: ChunkKind,
    pub file_path: String,
    pub span: Span,
    pub parent_chunk_id: Option<ChunkId>,
    pub child_chunk_ids: Vec<ChunkId>,
    pub symbol_id: Option<SymbolId>,
    pub content_hash: String,
}

impl Chunk {
    /// `stable_key` is the FQN for symbolic chunks, a normalized line range
    /// for Block chunks.
    pub fn derive_id(repo_id: &str, file_path: &str, kind: ChunkKind, stable_key: &str) -> ChunkId {
        Id::derive(
            "Chunk",
            &[repo_id, file_path, kind.as_str(), stable_key],
        )
    }
}
