use crate::store::{KvStore, MemoryStore};
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ItemKey;

    #[test]
    fn clones_share_the_store() {
        let state = AppState::in_memory();
        let other = state.clone();
        let mut item = crate::store::Item::new();
        item.insert("PK".into(), "USER#a".into());
        item.insert("SK".into(), "ALERT#1".into());
        state.store.put(item).unwrap();
        assert!(other
            .store
            .get(&ItemKey::new("USER#a", "ALERT#1"))
            .unwrap()
            .is_some());
    }
}
