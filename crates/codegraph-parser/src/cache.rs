use crate::tree::SyntaxTree;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Per-path tree cache with a bounded capacity. Eviction is plain LRU by
/// insertion/access order, tracked in a side queue rather than threaded
/// through the map itself, since `dashmap` entries don't carry a
/// recency field.
pub struct ParseCache {
    capacity: usize,
    entries: DashMap<String, Arc<SyntaxTree>>,
    order: Mutex<VecDeque<String>>,
}

impl ParseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
        }
    }

    pub fn get(&self, path: &str) -> Option<Arc<SyntaxTree>> {
        let found = self.entries.get(path).map(|e| e.value().clone());
        if found.is_some() {
            self.touch(path);
        }
        found
    }

    pub fn put(&self, path: String, tree: Arc<SyntaxTree>) {
        self.entries.insert(path.clone(), tree);
        self.touch(&path);
        self.evict_if_over_capacity();
    }

    pub fn clear(&self, path: &str) {
        self.entries.remove(path);
        self.order.lock().retain(|p| p != path);
    }

    pub fn clear_all(&self) {
        self.entries.clear();
        self.order.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn touch(&self, path: &str) {
        let mut order = self.order.lock();
        order.retain(|p| p != path);
        order.push_back(path.to_string());
    }

    fn evict_if_over_capacity(&self) {
        if self.capacity == 0 {
            return;
        }
        let mut order = self.order.lock();
        while self.entries.len() > self.capacity {
            let Some(oldest) = order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::Language;

    fn fake_tree(path: &str) -> Arc<SyntaxTree> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse("x = 1", None).unwrap();
        Arc::new(SyntaxTree {
            file_path: path.to_string(),
            language: Language::Python,
            source: "x = 1".to_string(),
            tree,
        })
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let cache = ParseCache::new(2);
        cache.put("a".into(), fake_tree("a"));
        cache.put("b".into(), fake_tree("b"));
        cache.put("c".into(), fake_tree("c"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn get_refreshes_recency() {
        let cache = ParseCache::new(2);
        cache.put("a".into(), fake_tree("a"));
        cache.put("b".into(), fake_tree("b"));
        cache.get("a");
        cache.put("c".into(), fake_tree("c"));
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }
}
