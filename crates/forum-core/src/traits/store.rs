//! Key-value store port
//!
//! The primitive operation set account creation is built from. Records are hashes
//! (`user:<uid>`), lookup indexes are hashes mapping a value to a UID (`userslug:uid`),
//! counters are integer hash fields (`global.nextUid`) and rankings are ordered sets.
//! Nothing here is transactional; only `increment_object_field` and
//! `set_object_field_if_absent` are required to be atomic.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::DomainError;

/// Result type for store and collaborator operations
pub type RepoResult<T> = Result<T, DomainError>;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Write every field of a hash, merging with existing fields
    async fn set_object(&self, key: &str, fields: &[(String, String)]) -> RepoResult<()>;

    /// Read a whole hash; `None` if it does not exist
    async fn get_object(&self, key: &str) -> RepoResult<Option<HashMap<String, String>>>;

    /// Delete a key of any type
    async fn delete(&self, key: &str) -> RepoResult<()>;

    /// Set one hash field
    async fn set_object_field(&self, key: &str, field: &str, value: &str) -> RepoResult<()>;

    /// Atomically set one hash field only if it is absent; returns whether it was set
    async fn set_object_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> RepoResult<bool>;

    /// Read one hash field
    async fn get_object_field(&self, key: &str, field: &str) -> RepoResult<Option<String>>;

    /// Check whether a hash field exists
    async fn is_object_field(&self, key: &str, field: &str) -> RepoResult<bool>;

    /// Remove one hash field
    async fn delete_object_field(&self, key: &str, field: &str) -> RepoResult<()>;

    /// Atomically add 1 to an integer hash field (missing counts as 0) and return the new value
    async fn increment_object_field(&self, key: &str, field: &str) -> RepoResult<i64>;

    /// Insert or update a member of an ordered set; `true` when the member was not already present
    async fn sorted_set_add(&self, key: &str, score: f64, member: &str) -> RepoResult<bool>;

    /// Remove a member from an ordered set
    async fn sorted_set_remove(&self, key: &str, member: &str) -> RepoResult<()>;

    /// Score of a member, `None` if it is not in the set
    async fn sorted_set_score(&self, key: &str, member: &str) -> RepoResult<Option<f64>>;

    /// Number of members in an ordered set
    async fn sorted_set_card(&self, key: &str) -> RepoResult<u64>;

    /// Members in ascending score order, `start..=stop` by rank (negative counts from the end)
    async fn sorted_set_range(&self, key: &str, start: i64, stop: i64) -> RepoResult<Vec<String>>;

    /// Check that the backend is reachable
    async fn ping(&self) -> RepoResult<()> {
        Ok(())
    }
}
