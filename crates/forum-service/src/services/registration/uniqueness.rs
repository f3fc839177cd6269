//! Index lookups confirming a username and email are free

use std::sync::Arc;

use forum_core::{DomainError, KeyValueStore};
use forum_store::keys;

#[derive(Clone)]
pub struct UniquenessChecker {
    store: Arc<dyn KeyValueStore>,
}

impl UniquenessChecker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Fails with `UsernameTaken` or `EmailTaken` if either value is already indexed.
    ///
    /// Both lookups run concurrently; the first failure wins. An empty slug is not looked
    /// up, since validation rejects it anyway.
    pub async fn check_unique(&self, userslug: &str, email: Option<&str>) -> Result<(), DomainError> {
        let slug_free = async {
            if !userslug.is_empty() && self.userslug_taken(userslug).await? {
                return Err(DomainError::UsernameTaken);
            }
            Ok::<(), DomainError>(())
        };
        let email_free = async {
            if let Some(email) = email {
                if self.email_taken(email).await? {
                    return Err(DomainError::EmailTaken);
                }
            }
            Ok::<(), DomainError>(())
        };

        tokio::try_join!(slug_free, email_free)?;
        Ok(())
    }

    pub async fn userslug_taken(&self, userslug: &str) -> Result<bool, DomainError> {
        self.store
            .is_object_field(keys::USERSLUG_INDEX, userslug)
            .await
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool, DomainError> {
        self.store.is_object_field(keys::EMAIL_INDEX, email).await
    }
}
