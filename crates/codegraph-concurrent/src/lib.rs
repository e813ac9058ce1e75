//! Lock-free concurrent primitives used by `codegraph-resolver` (the global
//! symbol map) and `codegraph-graph` (reverse-index construction).
//!
//! A lock-free concurrent map needs atomic single-key insert/lookup with no
//! required ordering across keys. `crossbeam-skiplist::SkipMap` is exactly
//! that: a true lock-free skiplist with no global lock.

use arc_swap::ArcSwap;
use crossbeam_skiplist::SkipMap;
use std::hash::Hash;
use std::sync::Arc;

/// A lock-free concurrent map. Disjoint keys never block each other;
/// same-key races are resolved by `SkipMap`'s internal CAS loop, not a
/// held lock.
#[derive(Debug, Default)]
pub struct ConcurrentMap<K, V> {
    inner: SkipMap<K, Arc<V>>,
}

impl<K: Ord + Send + 'static, V: Send + Sync + 'static> ConcurrentMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: SkipMap::new(),
        }
    }

    /// Best-effort: under concurrent writes to the same key the returned
    /// "previous" value may already be stale by the time the caller reads
    /// it. Callers that need an atomic swap should use `get_or_insert_with`.
    pub fn insert(&self, key: K, value: V) -> Option<Arc<V>> {
        let previous = self.inner.get(&key).map(|e| e.value().clone());
        self.inner.insert(key, Arc::new(value));
        previous
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>>
    where
        K: Clone,
    {
        self.inner.get(key).map(|e| e.value().clone())
    }

    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.inner.remove(key).map(|e| e.value().clone())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, Arc<V>)> + '_
    where
        K: Clone,
    {
        self.inner.iter().map(|e| (e.key().clone(), e.value().clone()))
    }

    /// Atomically fetch the existing value for `key`, or insert
    /// `make_value()` if absent. Lock-free: uses `SkipMap::get_or_insert`
    /// rather than a check-then-insert pair, so two racing writers never
    /// both "win" the insert.
    pub fn get_or_insert_with(&self, key: K, make_value: impl FnOnce() -> V) -> Arc<V>
    where
        K: Clone,
    {
        self.inner
            .get_or_insert(key, Arc::new(make_value()))
            .value()
            .clone()
    }
}

/// A lock-free, copy-on-write append list: reads never block, writes retry
/// under contention (RCU). Used for reverse-index adjacency lists (e.g.
/// `caller -> callees`) where many writers append concurrently.
#[derive(Debug)]
pub struct ConcurrentAppendList<T: Clone> {
    inner: ArcSwap<Vec<T>>,
}

impl<T: Clone + PartialEq> Default for ConcurrentAppendList<T> {
    fn default() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Vec::new()),
        }
    }
}

impl<T: Clone + PartialEq> ConcurrentAppendList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: T) {
        self.inner.rcu(|current| {
            let mut next = (**current).clone();
            next.push(value.clone());
            next
        });
    }

    pub fn snapshot(&self) -> Vec<T> {
        (*self.inner.load_full()).clone()
    }
}

/// A sharded map from one key to a lock-free append list of values —
/// exactly the shape both `callee -> callers` and `parent -> children`
/// reverse indices need.
#[derive(Debug, Default)]
pub struct ConcurrentMultiMap<K, V: Clone + PartialEq> {
    inner: ConcurrentMap<K, ConcurrentAppendList<V>>,
}

impl<K: Ord + Clone + Send + 'static, V: Clone + PartialEq + Send + Sync + 'static>
    ConcurrentMultiMap<K, V>
{
    pub fn new() -> Self {
        Self {
            inner: ConcurrentMap::new(),
        }
    }

    pub fn push(&self, key: K, value: V) {
        let list = self.inner.get_or_insert_with(key, ConcurrentAppendList::new);
        list.push(value);
    }

    pub fn get(&self, key: &K) -> Vec<V> {
        self.inner.get(key).map(|l| l.snapshot()).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.inner.iter().map(|(k, _)| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_map_insert_and_get() {
        let map: ConcurrentMap<String, u32> = ConcurrentMap::new();
        map.insert("a".to_string(), 1);
        assert_eq!(*map.get(&"a".to_string()).unwrap(), 1);
        assert!(map.get(&"b".to_string()).is_none());
    }

    #[test]
    fn concurrent_map_disjoint_keys_do_not_clobber() {
        let map: ConcurrentMap<u32, u32> = ConcurrentMap::new();
        std::thread::scope(|scope| {
            for i in 0..64 {
                let map = &map;
                scope.spawn(move || {
                    map.insert(i, i * 2);
                });
            }
        });
        assert_eq!(map.len(), 64);
        for i in 0..64 {
            assert_eq!(*map.get(&i).unwrap(), i * 2);
        }
    }

    #[test]
    fn append_list_accumulates_under_contention() {
        let list: ConcurrentAppendList<u32> = ConcurrentAppendList::new();
        std::thread::scope(|scope| {
            for i in 0..32 {
                let list = &list;
                scope.spawn(move || list.push(i));
            }
        });
        let mut snap = list.snapshot();
        snap.sort_unstable();
        assert_eq!(snap, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn multimap_push_and_get() {
        let mm: ConcurrentMultiMap<String, u32> = ConcurrentMultiMap::new();
        mm.push("callees".to_string(), 1);
        mm.push("callees".to_string(), 2);
        let mut got = mm.get(&"callees".to_string());
        got.sort_unstable();
        assert_eq!(got, vec![1, 2]);
    }
}
