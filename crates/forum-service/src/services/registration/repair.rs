//! Reconciliation of secondary entries
//!
//! Creation writes several keys without a transaction. Any UID whose best-effort writes
//! failed sits on `users:repair`; repairing it re-derives every secondary entry from the
//! stored record. All steps are idempotent.

use std::sync::Arc;

use forum_core::{DomainError, GroupDirectory, KeyValueStore, Uid, UserRecord};
use forum_store::keys;
use tracing::{info, instrument, warn};

/// What a single repair found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    /// Secondary entries were re-derived
    Repaired,
    /// No record exists for the UID
    Missing,
    /// The record lost its slug or email to another account and was removed
    Orphaned,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub repaired: Vec<Uid>,
    pub missing: Vec<Uid>,
    pub orphaned: Vec<Uid>,
    /// `global.userCount` after recomputation
    pub user_count: u64,
}

#[derive(Clone)]
pub struct IndexRepairer {
    store: Arc<dyn KeyValueStore>,
    groups: Arc<dyn GroupDirectory>,
    default_group: String,
}

impl IndexRepairer {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        groups: Arc<dyn GroupDirectory>,
        default_group: impl Into<String>,
    ) -> Self {
        Self {
            store,
            groups,
            default_group: default_group.into(),
        }
    }

    /// UIDs waiting for reconciliation
    pub async fn pending(&self) -> Result<Vec<Uid>, DomainError> {
        let raw = self.store.sorted_set_range(keys::USERS_REPAIR, 0, -1).await?;
        Ok(raw.iter().filter_map(|m| Uid::parse(m).ok()).collect())
    }

    /// Re-derive the secondary entries of one account and take it off the queue
    #[instrument(skip(self))]
    pub async fn repair(&self, uid: Uid) -> Result<RepairOutcome, DomainError> {
        let outcome = match self.store.get_object(&keys::user(uid)).await? {
            None => RepairOutcome::Missing,
            Some(hash) => {
                let record = UserRecord::from_hash(hash)?;
                if self.owns_unique_entries(&record).await? {
                    self.restore(&record).await?;
                    RepairOutcome::Repaired
                } else {
                    self.discard(&record).await?;
                    RepairOutcome::Orphaned
                }
            }
        };

        self.store
            .sorted_set_remove(keys::USERS_REPAIR, &uid.to_string())
            .await?;
        info!(%uid, ?outcome, "Repair finished");
        Ok(outcome)
    }

    /// Repair every queued account, then recompute `global.userCount`
    #[instrument(skip(self))]
    pub async fn repair_pending(&self) -> Result<RepairReport, DomainError> {
        let mut report = RepairReport::default();
        for uid in self.pending().await? {
            match self.repair(uid).await? {
                RepairOutcome::Repaired => report.repaired.push(uid),
                RepairOutcome::Missing => report.missing.push(uid),
                RepairOutcome::Orphaned => report.orphaned.push(uid),
            }
        }
        report.user_count = self.recount_users().await?;
        Ok(report)
    }

    /// Set `global.userCount` to the number of ranked accounts
    pub async fn recount_users(&self) -> Result<u64, DomainError> {
        let count = self.store.sorted_set_card(keys::USERS_JOINDATE).await?;
        self.store
            .set_object_field(keys::GLOBAL, keys::USER_COUNT_FIELD, &count.to_string())
            .await?;
        Ok(count)
    }

    /// Claim the slug and email for the record's UID; false if either belongs to another account
    async fn owns_unique_entries(&self, record: &UserRecord) -> Result<bool, DomainError> {
        let uid = record.uid;
        if !self.claim(keys::USERSLUG_INDEX, &record.userslug, uid).await? {
            warn!(%uid, userslug = %record.userslug, "Slug owned by another account");
            return Ok(false);
        }
        if let Some(email) = record.email.as_deref() {
            if !self.claim(keys::EMAIL_INDEX, email, uid).await? {
                warn!(%uid, "Email owned by another account");
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn restore(&self, record: &UserRecord) -> Result<(), DomainError> {
        let uid = record.uid;
        let member = uid.to_string();

        if !self.claim(keys::USERNAME_INDEX, &record.username, uid).await? {
            warn!(%uid, "Username index points at another account");
        }

        self.store
            .sorted_set_add(keys::USERS_JOINDATE, record.joindate_millis() as f64, &member)
            .await?;
        self.store
            .sorted_set_add(keys::USERS_POSTCOUNT, record.postcount as f64, &member)
            .await?;
        self.store
            .sorted_set_add(keys::USERS_REPUTATION, record.reputation as f64, &member)
            .await?;
        self.groups.join(&self.default_group, uid).await
    }

    /// Remove an account that cannot be restored. Entries still pointing at the UID are
    /// released first; the record goes last so an interrupted pass can be retried.
    async fn discard(&self, record: &UserRecord) -> Result<(), DomainError> {
        let uid = record.uid;
        let member = uid.to_string();

        self.release(keys::USERNAME_INDEX, &record.username, uid).await?;
        self.release(keys::USERSLUG_INDEX, &record.userslug, uid).await?;
        if let Some(email) = record.email.as_deref() {
            self.release(keys::EMAIL_INDEX, email, uid).await?;
        }
        for ranking in [keys::USERS_JOINDATE, keys::USERS_POSTCOUNT, keys::USERS_REPUTATION] {
            self.store.sorted_set_remove(ranking, &member).await?;
        }
        self.store.delete(&record.key()).await?;

        warn!(%uid, userslug = %record.userslug, "Removed orphaned record");
        Ok(())
    }

    /// Delete `index[value]` only if it points at `uid`
    async fn release(&self, index: &str, value: &str, uid: Uid) -> Result<(), DomainError> {
        let current = self.store.get_object_field(index, value).await?;
        if current.as_deref() == Some(uid.to_string().as_str()) {
            self.store.delete_object_field(index, value).await?;
        }
        Ok(())
    }

    /// Claim `index[value]` for `uid`; true if it is now (or already was) ours
    async fn claim(&self, index: &str, value: &str, uid: Uid) -> Result<bool, DomainError> {
        let owner = uid.to_string();
        if self
            .store
            .set_object_field_if_absent(index, value, &owner)
            .await?
        {
            return Ok(true);
        }
        let current = self.store.get_object_field(index, value).await?;
        Ok(current.as_deref() == Some(owner.as_str()))
    }
}
