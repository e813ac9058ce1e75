use crate::type_normalize::normalize_type_text;
use codegraph_core::{TypeEntity, TypeId};
use std::collections::HashMap;

/// Project-wide type deduplication table, keyed by canonical (normalized)
/// text. Every phase that produces a type annotation goes through this so
/// `int` declared in two different files shares one `TypeEntity`.
#[derive(Debug, Default)]
pub struct TypeTable {
    by_text: HashMap<String, TypeId>,
    entities: Vec<TypeEntity>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `raw_text`, insert if new, and return the entity id.
    pub fn intern(&mut self, raw_text: &str) -> TypeId {
        let normalized = normalize_type_text(raw_text);
        if let Some(id) = self.by_text.get(&normalized.canonical_text) {
            return *id;
        }
        let mut entity = TypeEntity::new(normalized.canonical_text.clone(), normalized.flavor);
        entity.is_nullable = normalized.is_nullable;
        let id = entity.id;
        self.by_text.insert(normalized.canonical_text, id);
        self.entities.push(entity);
        id
    }

    pub fn entities(&self) -> &[TypeEntity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<TypeEntity> {
        self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_by_canonical_text() {
        let mut table = TypeTable::new();
        let a = table.intern("Optional[str]");
        let b = table.intern("str | None");
        assert_eq!(a, b);
        assert_eq!(table.entities().len(), 1);
    }

    #[test]
    fn distinct_texts_get_distinct_ids() {
        let mut table = TypeTable::new();
        let a = table.intern("int");
        let b = table.intern("str");
        assert_ne!(a, b);
        assert_eq!(table.entities().len(), 2);
    }
}
