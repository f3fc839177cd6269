//! In-process key-value store
//!
//! Same semantics as [`RedisStore`](crate::RedisStore) for the operations account creation
//! uses. Per-key mutations happen under the map shard lock, which gives the atomicity the
//! allocator and the index claims rely on.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use forum_core::{DomainError, KeyValueStore, RepoResult};

#[derive(Debug, Default)]
pub struct MemoryStore {
    hashes: DashMap<String, HashMap<String, String>>,
    sorted_sets: DashMap<String, HashMap<String, f64>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys of any type
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.hashes.len() + self.sorted_sets.len()
    }
}

/// Resolve Redis-style inclusive rank bounds (negative counts from the end)
fn rank_window(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = i64::try_from(len).ok()?;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if len == 0 || start > stop || start >= len {
        return None;
    }
    Some((usize::try_from(start).ok()?, usize::try_from(stop).ok()?))
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_object(&self, key: &str, fields: &[(String, String)]) -> RepoResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut hash = self.hashes.entry(key.to_string()).or_default();
        hash.extend(fields.iter().cloned());
        Ok(())
    }

    async fn get_object(&self, key: &str) -> RepoResult<Option<HashMap<String, String>>> {
        Ok(self.hashes.get(key).map(|h| h.clone()))
    }

    async fn delete(&self, key: &str) -> RepoResult<()> {
        self.hashes.remove(key);
        self.sorted_sets.remove(key);
        Ok(())
    }

    async fn set_object_field(&self, key: &str, field: &str, value: &str) -> RepoResult<()> {
        self.hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn set_object_field_if_absent(
        &self,
        key: &str,
        field: &str,
        value: &str,
    ) -> RepoResult<bool> {
        let mut hash = self.hashes.entry(key.to_string()).or_default();
        if hash.contains_key(field) {
            return Ok(false);
        }
        hash.insert(field.to_string(), value.to_string());
        Ok(true)
    }

    async fn get_object_field(&self, key: &str, field: &str) -> RepoResult<Option<String>> {
        Ok(self
            .hashes
            .get(key)
            .and_then(|h| h.get(field).cloned()))
    }

    async fn is_object_field(&self, key: &str, field: &str) -> RepoResult<bool> {
        Ok(self
            .hashes
            .get(key)
            .is_some_and(|h| h.contains_key(field)))
    }

    async fn delete_object_field(&self, key: &str, field: &str) -> RepoResult<()> {
        let emptied = match self.hashes.get_mut(key) {
            Some(mut hash) => {
                hash.remove(field);
                hash.is_empty()
            }
            None => false,
        };
        if emptied {
            self.hashes.remove_if(key, |_, h| h.is_empty());
        }
        Ok(())
    }

    async fn increment_object_field(&self, key: &str, field: &str) -> RepoResult<i64> {
        let mut hash = self.hashes.entry(key.to_string()).or_default();
        let current = match hash.get(field) {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                DomainError::StorageError(format!("hash value at {key}.{field} is not an integer"))
            })?,
            None => 0,
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| DomainError::StorageError(format!("increment overflow at {key}.{field}")))?;
        hash.insert(field.to_string(), next.to_string());
        Ok(next)
    }

    async fn sorted_set_add(&self, key: &str, score: f64, member: &str) -> RepoResult<bool> {
        let previous = self
            .sorted_sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string(), score);
        Ok(previous.is_none())
    }

    async fn sorted_set_remove(&self, key: &str, member: &str) -> RepoResult<()> {
        let emptied = match self.sorted_sets.get_mut(key) {
            Some(mut set) => {
                set.remove(member);
                set.is_empty()
            }
            None => false,
        };
        if emptied {
            self.sorted_sets.remove_if(key, |_, s| s.is_empty());
        }
        Ok(())
    }

    async fn sorted_set_score(&self, key: &str, member: &str) -> RepoResult<Option<f64>> {
        Ok(self
            .sorted_sets
            .get(key)
            .and_then(|s| s.get(member).copied()))
    }

    async fn sorted_set_card(&self, key: &str) -> RepoResult<u64> {
        Ok(self.sorted_sets.get(key).map_or(0, |s| s.len() as u64))
    }

    async fn sorted_set_range(&self, key: &str, start: i64, stop: i64) -> RepoResult<Vec<String>> {
        let Some(set) = self.sorted_sets.get(key) else {
            return Ok(Vec::new());
        };
        let mut members: Vec<(&String, f64)> = set.iter().map(|(m, s)| (m, *s)).collect();
        // Score order, ties broken lexicographically like Redis
        members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));

        Ok(match rank_window(members.len(), start, stop) {
            Some((from, to)) => members[from..=to].iter().map(|(m, _)| (*m).clone()).collect(),
            None => Vec::new(),
        })
    }
}
