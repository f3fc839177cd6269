//! Email confirmation queue
//!
//! Issuing a confirmation writes `confirm:<code>` and queues the code on `email:pending` for
//! whatever delivers mail. The record is marked unconfirmed until the code is redeemed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use forum_core::{EmailVerifier, KeyValueStore, RepoResult, Uid};
use uuid::Uuid;

use crate::keys;

/// A confirmation code awaiting delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub code: String,
    pub uid: Uid,
    pub email: String,
    pub expires: DateTime<Utc>,
}

impl PendingConfirmation {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires
    }
}

#[derive(Clone)]
pub struct StoreEmailVerifier {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl StoreEmailVerifier {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self { store, ttl }
    }

    /// Look up a confirmation code
    pub async fn pending(&self, code: &str) -> RepoResult<Option<PendingConfirmation>> {
        let Some(hash) = self.store.get_object(&keys::confirm(code)).await? else {
            return Ok(None);
        };

        let uid = hash.get("uid").and_then(|v| Uid::parse(v).ok());
        let expires = hash
            .get("expires")
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        Ok(match (uid, expires) {
            (Some(uid), Some(expires)) => Some(PendingConfirmation {
                code: code.to_string(),
                uid,
                email: hash.get("email").cloned().unwrap_or_default(),
                expires,
            }),
            _ => {
                tracing::warn!(code, "Ignoring malformed confirmation entry");
                None
            }
        })
    }

    /// Codes waiting to be mailed, soonest expiry first
    pub async fn queued_codes(&self) -> RepoResult<Vec<String>> {
        self.store.sorted_set_range(keys::EMAIL_PENDING, 0, -1).await
    }

    /// Redeem a code, marking the account's email as confirmed.
    ///
    /// Returns the confirmed account, or `None` if the code is unknown or expired.
    pub async fn confirm(&self, code: &str) -> RepoResult<Option<Uid>> {
        let Some(pending) = self.pending(code).await? else {
            return Ok(None);
        };

        self.store.delete(&keys::confirm(code)).await?;
        self.store.sorted_set_remove(keys::EMAIL_PENDING, code).await?;

        if pending.is_expired(Utc::now()) {
            tracing::info!(uid = %pending.uid, "Confirmation code expired");
            return Ok(None);
        }

        self.store
            .set_object_field(&keys::user(pending.uid), keys::EMAIL_CONFIRMED_FIELD, "1")
            .await?;
        tracing::info!(uid = %pending.uid, "Email confirmed");
        Ok(Some(pending.uid))
    }
}

#[async_trait]
impl EmailVerifier for StoreEmailVerifier {
    async fn verify_email(&self, uid: Uid, email: &str) -> RepoResult<()> {
        let code = Uuid::new_v4().simple().to_string();
        let expires = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let expires_ms = expires.timestamp_millis();

        self.store
            .set_object(
                &keys::confirm(&code),
                &[
                    ("uid".to_string(), uid.to_string()),
                    ("email".to_string(), email.to_string()),
                    ("expires".to_string(), expires_ms.to_string()),
                ],
            )
            .await?;
        self.store
            .sorted_set_add(keys::EMAIL_PENDING, expires_ms as f64, &code)
            .await?;
        self.store
            .set_object_field(&keys::user(uid), keys::EMAIL_CONFIRMED_FIELD, "0")
            .await?;

        tracing::debug!(%uid, "Email confirmation queued");
        Ok(())
    }
}
