//! Record persistence
//!
//! Writes the canonical record and every secondary entry for a freshly allocated UID.
//! The record and the uniqueness claims are required; the statistics, rankings and group
//! membership are best-effort and queue the UID for reconciliation when they fail.

use std::sync::Arc;

use chrono::Utc;
use forum_common::RegistrationConfig;
use forum_core::{
    DomainError, EmailVerifier, ExtensionFields, GroupDirectory, KeyValueStore, Uid, UserRecord,
    WriteStep,
};
use forum_store::keys;
use tracing::{debug, error, info, warn};

use super::avatar::gravatar_url;
use super::hooks::HookRegistry;
use super::validator::ValidatedInput;

#[derive(Clone)]
pub struct RecordWriter {
    store: Arc<dyn KeyValueStore>,
    groups: Arc<dyn GroupDirectory>,
    verifier: Arc<dyn EmailVerifier>,
    hooks: Arc<HookRegistry>,
    config: Arc<RegistrationConfig>,
}

impl RecordWriter {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        groups: Arc<dyn GroupDirectory>,
        verifier: Arc<dyn EmailVerifier>,
        hooks: Arc<HookRegistry>,
        config: Arc<RegistrationConfig>,
    ) -> Self {
        Self {
            store,
            groups,
            verifier,
            hooks,
            config,
        }
    }

    /// Build the record for `uid` and write it with all of its secondary entries.
    ///
    /// Losing a uniqueness claim to a concurrent registration removes what was written
    /// and reports `UsernameTaken` or `EmailTaken`; the UID is not reused.
    pub async fn persist(
        &self,
        uid: Uid,
        input: &ValidatedInput,
        extensions: &ExtensionFields,
    ) -> Result<UserRecord, DomainError> {
        let record = self.build_record(uid, input, extensions);

        // (a) record
        if let Err(e) = self.store.set_object(&record.key(), &record.to_hash()).await {
            return Err(self.write_failed(uid, WriteStep::Record, &e).await);
        }

        // (b) slug claim, then username index
        match self.claim(uid, keys::USERSLUG_INDEX, &record.userslug).await {
            Ok(true) => {}
            Ok(false) => return Err(self.abandon(&record, ClaimLost::Username).await),
            Err(e) => return Err(self.write_failed(uid, WriteStep::UserslugIndex, &e).await),
        }
        if let Err(e) = self
            .store
            .set_object_field(keys::USERNAME_INDEX, &record.username, &uid.to_string())
            .await
        {
            return Err(self.write_failed(uid, WriteStep::UsernameIndex, &e).await);
        }

        // (c) email claim and confirmation
        if let Some(email) = record.email.as_deref() {
            match self.claim(uid, keys::EMAIL_INDEX, email).await {
                Ok(true) => {}
                Ok(false) => return Err(self.abandon(&record, ClaimLost::Email).await),
                Err(e) => return Err(self.write_failed(uid, WriteStep::EmailIndex, &e).await),
            }

            if uid == self.config.verification_exempt_uid {
                debug!(%uid, "Skipping email verification for bootstrap account");
            } else if let Err(e) = self.verifier.verify_email(uid, email).await {
                warn!(
                    %uid,
                    step = %WriteStep::EmailVerification,
                    error = %e,
                    "Email verification not started"
                );
            }
        }

        // (d) user count
        if let Err(e) = self
            .store
            .increment_object_field(keys::GLOBAL, keys::USER_COUNT_FIELD)
            .await
        {
            self.defer_repair(uid, WriteStep::UserCount, &e).await;
        }

        // (e) rankings
        if let Err(e) = self.add_rankings(&record).await {
            self.defer_repair(uid, WriteStep::RankedSets, &e).await;
        }

        // (f) default group
        if let Err(e) = self.groups.join(&self.config.default_group, uid).await {
            self.defer_repair(uid, WriteStep::GroupMembership, &e).await;
        }

        // (g) notify
        self.hooks.fire_created(&record);

        info!(%uid, userslug = %record.userslug, "User record written");
        Ok(record)
    }

    /// Store a password hash on an existing record
    pub async fn store_password_hash(&self, uid: Uid, hash: &str) -> Result<(), DomainError> {
        match self
            .store
            .set_object_field(&keys::user(uid), keys::PASSWORD_FIELD, hash)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(self.write_failed(uid, WriteStep::PasswordField, &e).await),
        }
    }

    fn build_record(
        &self,
        uid: Uid,
        input: &ValidatedInput,
        extensions: &ExtensionFields,
    ) -> UserRecord {
        let picture = gravatar_url(input.email.as_deref(), &self.config.avatar);
        let mut record = UserRecord::new(
            uid,
            input.username.clone(),
            input.userslug.clone(),
            input.email.clone(),
            picture,
            Utc::now(),
        );
        for (key, value) in extensions.iter() {
            if !record.apply_field(key, value) {
                debug!(%uid, field = key, "Ignoring system-owned field");
            }
        }
        record
    }

    async fn claim(&self, uid: Uid, index: &str, value: &str) -> Result<bool, DomainError> {
        let claimed = self
            .store
            .set_object_field_if_absent(index, value, &uid.to_string())
            .await?;
        if !claimed {
            debug!(%uid, index, "Index entry already claimed");
        }
        Ok(claimed)
    }

    async fn add_rankings(&self, record: &UserRecord) -> Result<(), DomainError> {
        let member = record.uid.to_string();
        self.store
            .sorted_set_add(keys::USERS_JOINDATE, record.joindate_millis() as f64, &member)
            .await?;
        self.store
            .sorted_set_add(keys::USERS_POSTCOUNT, record.postcount as f64, &member)
            .await?;
        self.store
            .sorted_set_add(keys::USERS_REPUTATION, record.reputation as f64, &member)
            .await?;
        Ok(())
    }

    /// Undo the writes made for a registration that lost a uniqueness race and return the
    /// matching conflict.
    ///
    /// Index entries go first and the record last, so a failed cleanup always leaves the
    /// record behind for the repair queue to find. Cleanup failures queue the UID.
    async fn abandon(&self, record: &UserRecord, lost: ClaimLost) -> DomainError {
        let uid = record.uid;
        info!(%uid, conflict = ?lost, "Lost uniqueness race; registration abandoned");

        if let Err(e) = self.remove_abandoned(record, lost).await {
            error!(%uid, error = %e, "Failed to remove abandoned registration");
            self.queue_repair(uid).await;
        }

        match lost {
            ClaimLost::Username => DomainError::UsernameTaken,
            ClaimLost::Email => DomainError::EmailTaken,
        }
    }

    async fn remove_abandoned(
        &self,
        record: &UserRecord,
        lost: ClaimLost,
    ) -> Result<(), DomainError> {
        if matches!(lost, ClaimLost::Email) {
            // The username and slug entries were claimed by this registration
            self.store
                .delete_object_field(keys::USERNAME_INDEX, &record.username)
                .await?;
            self.store
                .delete_object_field(keys::USERSLUG_INDEX, &record.userslug)
                .await?;
        }
        self.store.delete(&record.key()).await
    }

    async fn write_failed(&self, uid: Uid, step: WriteStep, err: &DomainError) -> DomainError {
        error!(%uid, %step, error = %err, "Required write failed");
        self.queue_repair(uid).await;
        DomainError::WriteFailed {
            uid,
            step,
            message: err.to_string(),
        }
    }

    async fn defer_repair(&self, uid: Uid, step: WriteStep, err: &DomainError) {
        warn!(%uid, %step, error = %err, "Secondary write failed; queued for repair");
        self.queue_repair(uid).await;
    }

    async fn queue_repair(&self, uid: Uid) {
        let queued_at = Utc::now().timestamp_millis() as f64;
        if let Err(e) = self
            .store
            .sorted_set_add(keys::USERS_REPAIR, queued_at, &uid.to_string())
            .await
        {
            error!(%uid, error = %e, "Could not queue user for repair");
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ClaimLost {
    Username,
    Email,
}
