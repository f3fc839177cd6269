//! # forum-core
//!
//! Domain layer for account creation: the user record, its value objects, the error
//! taxonomy, and the traits behind which the store and the external collaborators live.
//! This crate has no dependency on infrastructure (Redis, HTTP, password hashing).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    is_reserved, CandidateInput, ExtensionFields, FieldValue, UserRecord, UserStatus,
    RESERVED_FIELDS,
};
pub use error::{DomainError, WriteStep};
pub use traits::{
    ActionHook, BoxError, EmailVerifier, FilterHook, GroupDirectory, KeyValueStore,
    PasswordHasher, RepoResult,
};
pub use value_objects::{slugify, Uid, UidParseError, BOOTSTRAP_UID};
