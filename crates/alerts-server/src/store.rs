//! Key-value store collaborator.
//!
//! Items are attribute bags keyed by a partition key (`PK`) and a sort key
//! (`SK`), both stored as string attributes on the item itself.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

pub type Item = serde_json::Map<String, Value>;

pub const PARTITION_KEY: &str = "PK";
pub const SORT_KEY: &str = "SK";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("item is missing key attribute '{0}'")]
    MissingKey(&'static str),

    #[error("key attribute '{0}' cannot be updated")]
    KeyAttribute(String),

    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Read the key attributes off an item.
    pub fn of(item: &Item) -> Result<Self, StoreError> {
        let attr = |name: &'static str| {
            item.get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(StoreError::MissingKey(name))
        };
        Ok(Self {
            pk: attr(PARTITION_KEY)?,
            sk: attr(SORT_KEY)?,
        })
    }
}

pub trait KvStore: Send + Sync {
    /// Insert or replace the item stored under the item's own key.
    fn put(&self, item: Item) -> Result<(), StoreError>;

    /// Items in partition `pk` whose sort key starts with `sk_prefix`, in
    /// sort-key order.
    fn query(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, StoreError>;

    /// Every item whose sort key equals `sk`, across all partitions.
    fn scan_sort_key(&self, sk: &str) -> Result<Vec<Item>, StoreError>;

    /// Set one attribute. Returns `false` when no item exists under `key`.
    fn update(&self, key: &ItemKey, attribute: &str, value: Value) -> Result<bool, StoreError>;

    fn get(&self, key: &ItemKey) -> Result<Option<Item>, StoreError>;
}

/// In-process store. Scans walk the whole map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<ItemKey, Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<ItemKey, Item>>, StoreError> {
        self.items.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl KvStore for MemoryStore {
    fn put(&self, item: Item) -> Result<(), StoreError> {
        let key = ItemKey::of(&item)?;
        self.lock()?.insert(key, item);
        Ok(())
    }

    fn query(&self, pk: &str, sk_prefix: &str) -> Result<Vec<Item>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|(k, _)| k.pk == pk && k.sk.starts_with(sk_prefix))
            .map(|(_, item)| item.clone())
            .collect())
    }

    fn scan_sort_key(&self, sk: &str) -> Result<Vec<Item>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|(k, _)| k.sk == sk)
            .map(|(_, item)| item.clone())
            .collect())
    }

    fn update(&self, key: &ItemKey, attribute: &str, value: Value) -> Result<bool, StoreError> {
        if attribute == PARTITION_KEY || attribute == SORT_KEY {
            return Err(StoreError::KeyAttribute(attribute.to_string()));
        }
        match self.lock()?.get_mut(key) {
            Some(item) => {
                item.insert(attribute.to_string(), value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get(&self, key: &ItemKey) -> Result<Option<Item>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }
}
