//! Store-backed group membership

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use forum_core::{GroupDirectory, KeyValueStore, RepoResult, Uid};

use crate::keys;

/// Keeps members in `group:<name>:members`, scored by join time, and a member count on
/// `group:<name>`.
#[derive(Clone)]
pub struct StoreGroupDirectory {
    store: Arc<dyn KeyValueStore>,
}

impl StoreGroupDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Whether `uid` belongs to `group`
    pub async fn is_member(&self, group: &str, uid: Uid) -> RepoResult<bool> {
        let score = self
            .store
            .sorted_set_score(&keys::group_members(group), &uid.to_string())
            .await?;
        Ok(score.is_some())
    }

    /// Members of `group` in join order
    pub async fn members(&self, group: &str) -> RepoResult<Vec<Uid>> {
        let raw = self
            .store
            .sorted_set_range(&keys::group_members(group), 0, -1)
            .await?;
        Ok(raw.iter().filter_map(|m| Uid::parse(m).ok()).collect())
    }
}

#[async_trait]
impl GroupDirectory for StoreGroupDirectory {
    async fn join(&self, group: &str, uid: Uid) -> RepoResult<()> {
        if self.is_member(group, uid).await? {
            tracing::debug!(group, %uid, "Already a member");
            return Ok(());
        }

        let joined_at = Utc::now().timestamp_millis() as f64;
        let added = self
            .store
            .sorted_set_add(&keys::group_members(group), joined_at, &uid.to_string())
            .await?;
        // A concurrent join already counted this member
        if !added {
            tracing::debug!(group, %uid, "Lost join race");
            return Ok(());
        }
        self.store
            .increment_object_field(&keys::group(group), keys::MEMBER_COUNT_FIELD)
            .await?;

        tracing::debug!(group, %uid, "Joined group");
        Ok(())
    }
}
