//! Domain errors - error taxonomy of the account-creation workflow

use std::fmt;

use thiserror::Error;

use crate::value_objects::Uid;

/// Persistence sub-step of account creation, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteStep {
    Record,
    UserslugIndex,
    UsernameIndex,
    EmailIndex,
    EmailVerification,
    UserCount,
    RankedSets,
    GroupMembership,
    PasswordField,
}

impl WriteStep {
    /// Stable name used in logs and error payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Record => "record",
            Self::UserslugIndex => "userslug_index",
            Self::UsernameIndex => "username_index",
            Self::EmailIndex => "email_index",
            Self::EmailVerification => "email_verification",
            Self::UserCount => "user_count",
            Self::RankedSets => "ranked_sets",
            Self::GroupMembership => "group_membership",
            Self::PasswordField => "password_field",
        }
    }
}

impl fmt::Display for WriteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Username taken")]
    UsernameTaken,

    #[error("Email taken")]
    EmailTaken,

    // =========================================================================
    // Extension Errors
    // =========================================================================
    #[error("Rejected by extension '{hook}': {reason}")]
    ExtensionRejected { hook: String, reason: String },

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Uid),

    // =========================================================================
    // Infrastructure Errors
    // =========================================================================
    /// Store failure before anything was written; safe to retry
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Store failure after a UID was allocated; partial writes may exist
    #[error("Storage error while writing user {uid} ({step}): {message}")]
    WriteFailed {
        uid: Uid,
        step: WriteStep,
        message: String,
    },

    /// Password hashing failed after the record was persisted
    #[error("Password hashing failed for user {uid}: {message}")]
    HashingError { uid: Uid, message: String },

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Validation
            Self::InvalidUsername(_) => "INVALID_USERNAME",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidPassword(_) => "INVALID_PASSWORD",

            // Conflict
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::EmailTaken => "EMAIL_TAKEN",

            // Extension
            Self::ExtensionRejected { .. } => "EXTENSION_REJECTED",

            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",

            // Infrastructure
            Self::StorageError(_) | Self::WriteFailed { .. } => "STORAGE_ERROR",
            Self::HashingError { .. } => "HASHING_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Create an extension rejection
    pub fn rejected(hook: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::ExtensionRejected {
            hook: hook.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a storage error from any displayable cause
    pub fn storage(err: impl fmt::Display) -> Self {
        Self::StorageError(err.to_string())
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Check if this is a user-correctable validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidUsername(_) | Self::InvalidEmail | Self::InvalidPassword(_)
        )
    }

    /// Check if this is a uniqueness conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UsernameTaken | Self::EmailTaken)
    }

    /// Check if an extension vetoed the operation
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::ExtensionRejected { .. })
    }

    /// Check if the store failed, before or after allocation
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageError(_) | Self::WriteFailed { .. })
    }

    /// Whether retrying the same request cannot leave partial state behind
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageError(_))
    }

    /// UID of an account that exists (fully or partially) despite this error.
    ///
    /// Set only for failures past the point of no return; operators need it to reconcile.
    pub fn committed_uid(&self) -> Option<Uid> {
        match self {
            Self::WriteFailed { uid, .. } | Self::HashingError { uid, .. } => Some(*uid),
            _ => None,
        }
    }
}
