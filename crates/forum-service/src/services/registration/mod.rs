//! Account registration pipeline

mod allocator;
mod avatar;
mod hooks;
mod orchestrator;
mod repair;
mod uniqueness;
mod validator;
mod writer;

pub use allocator::IdentifierAllocator;
pub use avatar::gravatar_url;
pub use hooks::{admit_caller_fields, HookRegistry};
pub use orchestrator::{CreationOrchestrator, CreationStage};
pub use repair::{IndexRepairer, RepairOutcome, RepairReport};
pub use uniqueness::UniquenessChecker;
pub use validator::{escape_html, normalize_email, ValidatedInput, Validator};
pub use writer::RecordWriter;
