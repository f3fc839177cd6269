//! Account creation workflow
//!
//! ```text
//! Validating         \
//! CheckingUniqueness  > concurrent, first failure wins
//! Extending          /
//!   -> Allocating -> Writing -> HashingPassword? -> Done
//! ```
//!
//! Nothing is written before allocation, so dropping the future up to that point leaves no
//! trace. From allocation on, the work runs in its own task and completes even if the
//! caller goes away.

use std::fmt;
use std::sync::Arc;

use forum_common::{ExtensionPolicy, RegistrationConfig};
use forum_core::{
    slugify, CandidateInput, DomainError, EmailVerifier, ExtensionFields, GroupDirectory,
    KeyValueStore, PasswordHasher, Uid, UserRecord,
};
use tracing::{debug, info, instrument};

use super::allocator::IdentifierAllocator;
use super::hooks::{admit_caller_fields, HookRegistry};
use super::uniqueness::UniquenessChecker;
use super::validator::{normalize_email, ValidatedInput, Validator};
use super::writer::RecordWriter;

/// Workflow stage, for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationStage {
    Validating,
    CheckingUniqueness,
    Extending,
    Allocating,
    Writing,
    HashingPassword,
    Done,
}

impl fmt::Display for CreationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validating => "validating",
            Self::CheckingUniqueness => "checking_uniqueness",
            Self::Extending => "extending",
            Self::Allocating => "allocating",
            Self::Writing => "writing",
            Self::HashingPassword => "hashing_password",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

#[derive(Clone)]
pub struct CreationOrchestrator {
    validator: Validator,
    uniqueness: UniquenessChecker,
    hooks: Arc<HookRegistry>,
    allocator: IdentifierAllocator,
    writer: RecordWriter,
    hasher: Arc<dyn PasswordHasher>,
    extensions: ExtensionPolicy,
}

impl fmt::Debug for CreationOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreationOrchestrator")
            .field("validator", &self.validator)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl CreationOrchestrator {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        groups: Arc<dyn GroupDirectory>,
        verifier: Arc<dyn EmailVerifier>,
        hasher: Arc<dyn PasswordHasher>,
        hooks: Arc<HookRegistry>,
        config: Arc<RegistrationConfig>,
    ) -> Self {
        Self {
            validator: Validator::from_config(&config),
            uniqueness: UniquenessChecker::new(Arc::clone(&store)),
            allocator: IdentifierAllocator::new(Arc::clone(&store)),
            writer: RecordWriter::new(store, groups, verifier, Arc::clone(&hooks), Arc::clone(&config)),
            extensions: config.extensions.clone(),
            hooks,
            hasher,
        }
    }

    /// Create an account and return its UID
    pub async fn create(&self, candidate: CandidateInput) -> Result<Uid, DomainError> {
        self.create_account(candidate).await.map(|record| record.uid)
    }

    /// Create an account and return the record as written
    #[instrument(skip_all, fields(username = %candidate.username))]
    pub async fn create_account(&self, mut candidate: CandidateInput) -> Result<UserRecord, DomainError> {
        admit_caller_fields(&mut candidate.extensions, &self.extensions);

        let userslug = slugify(candidate.username.trim());
        let email = candidate.email.as_deref().and_then(normalize_email);

        debug!(stage = %CreationStage::Validating, "Running pre-allocation checks");
        let (validated, (), filtered) = tokio::try_join!(
            async { self.validator.validate(&candidate) },
            self.uniqueness.check_unique(&userslug, email.as_deref()),
            self.hooks.before_create(candidate.clone(), &self.extensions),
        )?;

        debug!(stage = %CreationStage::Allocating, "Checks passed");
        let uid = self.allocator.next().await?;

        let writer = self.writer.clone();
        let hasher = Arc::clone(&self.hasher);
        let record = tokio::spawn(commit(writer, hasher, uid, validated, filtered.extensions))
            .await
            .map_err(|e| DomainError::InternalError(format!("creation task for user {uid} failed: {e}")))??;

        info!(%uid, userslug = %record.userslug, stage = %CreationStage::Done, "User created");
        Ok(record)
    }
}

/// Everything after allocation: write, then hash the password if one was given
async fn commit(
    writer: RecordWriter,
    hasher: Arc<dyn PasswordHasher>,
    uid: Uid,
    validated: ValidatedInput,
    extensions: ExtensionFields,
) -> Result<UserRecord, DomainError> {
    debug!(%uid, stage = %CreationStage::Writing);
    let record = writer.persist(uid, &validated, &extensions).await?;

    if let Some(password) = validated.password {
        debug!(%uid, stage = %CreationStage::HashingPassword);
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| DomainError::HashingError {
                uid,
                message: e.to_string(),
            })?
            .map_err(|e| DomainError::HashingError {
                uid,
                message: e.to_string(),
            })?;
        writer.store_password_hash(uid, &hash).await?;
    }

    Ok(record)
}
