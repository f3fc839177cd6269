//! UID allocation from the shared `global.nextUid` counter

use std::sync::Arc;

use forum_core::{DomainError, KeyValueStore, Uid};
use forum_store::keys;

/// Hands out UIDs by atomically incrementing a counter kept in the same store as the
/// records. UIDs start at 1, are never reused, and gaps are possible when a creation
/// fails after allocation.
#[derive(Clone)]
pub struct IdentifierAllocator {
    store: Arc<dyn KeyValueStore>,
}

impl IdentifierAllocator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn next(&self) -> Result<Uid, DomainError> {
        let raw = self
            .store
            .increment_object_field(keys::GLOBAL, keys::NEXT_UID_FIELD)
            .await?;
        Uid::from_counter(raw).map_err(|e| {
            DomainError::StorageError(format!(
                "{}.{} produced an unusable value: {e}",
                keys::GLOBAL,
                keys::NEXT_UID_FIELD
            ))
        })
    }

    /// Last UID handed out, `None` before the first allocation
    pub async fn current(&self) -> Result<Option<Uid>, DomainError> {
        let raw = self
            .store
            .get_object_field(keys::GLOBAL, keys::NEXT_UID_FIELD)
            .await?;
        Ok(raw.and_then(|v| Uid::parse(&v).ok()))
    }
}
