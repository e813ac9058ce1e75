use crate::adapter::TypeServerAdapter;
use crate::types::{HoverResult, Location};
use std::marker::PhantomData;
use std::sync::Arc;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Present {}
    impl Sealed for super::Never {}
}

/// Marker for "this builder is one of the three allowed to reach the type
/// server" (Type, Signature, Expression builders in `codegraph-semantic`).
pub struct Present;

/// Marker for every other builder (DFG, Graph Builder, and everything
/// downstream). `TypeServerHandle<Never>` has no query methods at all, so
/// querying the type server from the wrong phase is a compile error to
/// commit, not just a review-time convention.
pub struct Never;

pub trait Capability: sealed::Sealed {}
impl Capability for Present {}
impl Capability for Never {}

/// A capability-typed reference to the type server. Only
/// `TypeServerHandle<Present>` exposes `hover`/`definition`/`references`;
/// constructing one is the only way to reach the adapter at all.
pub struct TypeServerHandle<C: Capability> {
    adapter: Option<Arc<TypeServerAdapter>>,
    _cap: PhantomData<C>,
}

impl TypeServerHandle<Present> {
    pub fn new(adapter: Option<Arc<TypeServerAdapter>>) -> Self {
        Self {
            adapter,
            _cap: PhantomData,
        }
    }

    pub fn is_available(&self) -> bool {
        self.adapter.is_some()
    }

    pub async fn hover(&self, file: &str, line: u32, column: u32) -> Option<HoverResult> {
        self.adapter.as_ref()?.hover(file, line, column).await
    }

    pub async fn definition(&self, file: &str, line: u32, column: u32) -> Option<Location> {
        self.adapter.as_ref()?.definition(file, line, column).await
    }

    pub async fn references(&self, file: &str, line: u32, column: u32) -> Vec<Location> {
        match &self.adapter {
            Some(adapter) => adapter.references(file, line, column).await,
            None => Vec::new(),
        }
    }
}

impl TypeServerHandle<Never> {
    pub fn new() -> Self {
        Self {
            adapter: None,
            _cap: PhantomData,
        }
    }
}

impl Default for TypeServerHandle<Never> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_adapter_degrades_to_none() {
        let handle: TypeServerHandle<Present> = TypeServerHandle::new(None);
        assert!(!handle.is_available());
        assert!(handle.hover("a.py", 0, 0).await.is_none());
        assert!(handle.definition("a.py", 0, 0).await.is_none());
        assert!(handle.references("a.py", 0, 0).await.is_empty());
    }
}
