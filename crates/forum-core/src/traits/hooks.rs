//! Extension hook points
//!
//! Plugins register these with the registration pipeline at construction time; there is
//! no global hook lookup.

use async_trait::async_trait;

use crate::entities::{CandidateInput, UserRecord};

/// Error type returned by hooks and other pluggable collaborators
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// `filter:user.create` - sees the candidate before anything is written.
///
/// Returning `Err` vetoes the registration. Returned extension fields are merged onto the
/// caller's and win on conflicting keys.
#[async_trait]
pub trait FilterHook: Send + Sync {
    /// Name used in logs and in rejection errors
    fn name(&self) -> &str;

    async fn filter(&self, candidate: CandidateInput) -> Result<CandidateInput, BoxError>;
}

/// `action:user.create` - notified once the account exists. Failures are logged only.
#[async_trait]
pub trait ActionHook: Send + Sync {
    fn name(&self) -> &str;

    async fn on_user_created(&self, record: &UserRecord) -> Result<(), BoxError>;
}
