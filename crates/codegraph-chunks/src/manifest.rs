use codegraph_core::{Chunk, ChunkId};
use std::collections::HashMap;

/// The full chunk set for one repo+snapshot, keyed by chunk id. Cached by
/// `repo_id`+`snapshot_id` between builds so an incremental refresh has a
/// prior state to diff against.
#[derive(Debug, Clone, Default)]
pub struct ChunkManifest {
    pub chunks: HashMap<ChunkId, Chunk>,
}

impl ChunkManifest {
    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks: chunks.into_iter().map(|c| (c.chunk_id, c)).collect(),
        }
    }

    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
