//! Domain entities

mod candidate;
mod user;

pub use candidate::{is_reserved, CandidateInput, ExtensionFields, FieldValue, RESERVED_FIELDS};
pub use user::{UserRecord, UserStatus};
