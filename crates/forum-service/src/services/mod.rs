//! Business logic services

pub mod context;
pub mod error;
pub mod registration;
pub mod user;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use registration::{
    CreationOrchestrator, HookRegistry, IdentifierAllocator, IndexRepairer, RecordWriter,
    RepairOutcome, RepairReport, UniquenessChecker, ValidatedInput, Validator,
};
pub use user::UserService;
