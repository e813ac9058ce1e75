use crate::build::build_file_chunks;
use crate::error::Result;
use crate::manifest::ChunkManifest;
use codegraph_core::{ChunkId, ChunkKindConfig, IrDocument};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// The refresh delta a single incremental run reports. `renamed` pairs the
/// old id with the new one so a downstream store can delete-then-insert (or
/// update in place) in a consistent order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshDelta {
    pub added: Vec<ChunkId>,
    pub modified: Vec<ChunkId>,
    pub renamed: Vec<(ChunkId, ChunkId)>,
    pub deleted: Vec<ChunkId>,
    pub unchanged: Vec<ChunkId>,
}

impl RefreshDelta {
    /// Diff two manifests by chunk id and content hash.
    ///
    /// A chunk absent from `old` but present in `new` is provisionally
    /// "added"; a chunk absent from `new` but present in `old` is
    /// provisionally "deleted". Before finalizing either bucket we match a
    /// provisionally-added chunk's content hash against a provisionally-
    /// deleted one's: a hit means the symbol moved (FQN or stable_key
    /// changed, e.g. a rename) without its body changing, so it is reported
    /// as `renamed` instead. We match in the `(new_id -> old_content_hash)`
    /// direction only (not the symmetric old-id-to-new-hash direction) —
    /// an ambiguity the source left unresolved; this direction is what lets
    /// a single pass over "added" candidates produce the renamed set.
    pub fn compute(old: &ChunkManifest, new: &ChunkManifest) -> Self {
        let mut added: Vec<ChunkId> = new.chunks.keys().filter(|id| !old.chunks.contains_key(id)).copied().collect();
        let mut deleted: Vec<ChunkId> = old.chunks.keys().filter(|id| !new.chunks.contains_key(id)).copied().collect();
        added.sort_by_key(|id| id.to_string());
        deleted.sort_by_key(|id| id.to_string());

        let mut deleted_by_hash: HashMap<String, Vec<ChunkId>> = HashMap::new();
        for id in &deleted {
            let hash = old.chunks[id].content_hash.clone();
            deleted_by_hash.entry(hash).or_default().push(*id);
        }

        let mut renamed = Vec::new();
        let mut still_added = Vec::new();
        for new_id in added {
            let new_hash = &new.chunks[&new_id].content_hash;
            if let Some(candidates) = deleted_by_hash.get_mut(new_hash) {
                if let Some(old_id) = candidates.pop() {
                    renamed.push((old_id, new_id));
                    continue;
                }
            }
            still_added.push(new_id);
        }
        let renamed_old: HashSet<ChunkId> = renamed.iter().map(|(old_id, _)| *old_id).collect();
        let still_deleted: Vec<ChunkId> = deleted.into_iter().filter(|id| !renamed_old.contains(id)).collect();

        let mut modified = Vec::new();
        let mut unchanged = Vec::new();
        for (id, new_chunk) in &new.chunks {
            if let Some(old_chunk) = old.chunks.get(id) {
                if old_chunk.content_hash != new_chunk.content_hash {
                    modified.push(*id);
                } else {
                    unchanged.push(*id);
                }
            }
        }
        modified.sort_by_key(|id| id.to_string());
        unchanged.sort_by_key(|id| id.to_string());
        renamed.sort_by_key(|(old_id, new_id)| (old_id.to_string(), new_id.to_string()));

        Self {
            added: still_added,
            modified,
            renamed,
            deleted: still_deleted,
            unchanged,
        }
    }
}

/// Refresh a prior manifest given the set of documents that changed (added
/// or modified, each paired with its source text) and the set of files
/// deleted outright. Files mentioned in neither set carry their chunks
/// forward unchanged.
pub fn refresh_build(
    prior: &ChunkManifest,
    changed: &[(IrDocument, String)],
    deleted_files: &[String],
    repo_id: &str,
    snapshot_id: &str,
    enabled: &HashSet<ChunkKindConfig>,
) -> Result<(ChunkManifest, RefreshDelta)> {
    let changed_paths: HashSet<&str> = changed.iter().map(|(doc, _)| doc.file_path.as_str()).collect();
    let deleted_paths: HashSet<&str> = deleted_files.iter().map(String::as_str).collect();

    let mut carried = HashMap::new();
    for (id, chunk) in &prior.chunks {
        if !changed_paths.contains(chunk.file_path.as_str()) && !deleted_paths.contains(chunk.file_path.as_str()) {
            carried.insert(*id, chunk.clone());
        }
    }

    for (doc, source) in changed {
        for chunk in build_file_chunks(doc, source, repo_id, snapshot_id, enabled)? {
            carried.insert(chunk.chunk_id, chunk);
        }
    }

    let new_manifest = ChunkManifest { chunks: carried };
    let delta = RefreshDelta::compute(prior, &new_manifest);

    info!(
        added = delta.added.len(),
        modified = delta.modified.len(),
        renamed = delta.renamed.len(),
        deleted = delta.deleted.len(),
        unchanged = delta.unchanged.len(),
        "chunk manifest refreshed"
    );

    Ok((new_manifest, delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{Chunk, ChunkKind, Id, Span};

    fn chunk(stable_key: &str, content_hash: &str) -> Chunk {
        Chunk {
            chunk_id: Id::derive("Chunk", &["repo", "a.py", "Function", stable_key]),
            repo_id: "repo".to_string(),
            snapshot_id: "snap".to_string(),
            kind: ChunkKind::Function,
            file_path: "a.py".to_string(),
            span: Span::new("a.py", 0, 0, 1, 0, 0, 10),
            parent_chunk_id: None,
            child_chunk_ids: Vec::new(),
            symbol_id: None,
            content_hash: content_hash.to_string(),
        }
    }

    #[test]
    fn unchanged_chunk_is_reported_unchanged() {
        let c = chunk("pkg.a.f", "hash1");
        let old = ChunkManifest::from_chunks(vec![c.clone()]);
        let new = ChunkManifest::from_chunks(vec![c.clone()]);
        let delta = RefreshDelta::compute(&old, &new);
        assert_eq!(delta.unchanged, vec![c.chunk_id]);
        assert!(delta.added.is_empty());
        assert!(delta.modified.is_empty());
        assert!(delta.deleted.is_empty());
    }

    #[test]
    fn content_change_with_same_id_is_modified() {
        let old_chunk = chunk("pkg.a.f", "hash1");
        let mut new_chunk = old_chunk.clone();
        new_chunk.content_hash = "hash2".to_string();

        let old = ChunkManifest::from_chunks(vec![old_chunk.clone()]);
        let new = ChunkManifest::from_chunks(vec![new_chunk]);
        let delta = RefreshDelta::compute(&old, &new);
        assert_eq!(delta.modified, vec![old_chunk.chunk_id]);
    }

    #[test]
    fn same_content_under_new_id_is_renamed() {
        let old_chunk = chunk("pkg.a.old_name", "hash1");
        let new_chunk = chunk("pkg.a.new_name", "hash1");

        let old = ChunkManifest::from_chunks(vec![old_chunk.clone()]);
        let new = ChunkManifest::from_chunks(vec![new_chunk.clone()]);
        let delta = RefreshDelta::compute(&old, &new);

        assert_eq!(delta.renamed, vec![(old_chunk.chunk_id, new_chunk.chunk_id)]);
        assert!(delta.added.is_empty());
        assert!(delta.deleted.is_empty());
    }

    #[test]
    fn brand_new_chunk_with_no_matching_hash_is_added() {
        let old = ChunkManifest::default();
        let new_chunk = chunk("pkg.a.f", "hash1");
        let new = ChunkManifest::from_chunks(vec![new_chunk.clone()]);
        let delta = RefreshDelta::compute(&old, &new);
        assert_eq!(delta.added, vec![new_chunk.chunk_id]);
    }
}
