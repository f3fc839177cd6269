//! External collaborators invoked by account creation

use async_trait::async_trait;

use super::hooks::BoxError;
use super::store::RepoResult;
use crate::value_objects::Uid;

/// Group management
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    /// Add `uid` to `group`; joining twice is a no-op
    async fn join(&self, group: &str, uid: Uid) -> RepoResult<()>;
}

/// Email confirmation
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    /// Start confirmation of `email` for `uid`
    async fn verify_email(&self, uid: Uid, email: &str) -> RepoResult<()>;
}

/// Password hashing capability.
///
/// Synchronous and CPU-bound; callers move it off the async runtime.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, BoxError>;
}
