//! Traits (ports) - the store and the external collaborators of account creation

mod collaborators;
mod hooks;
mod store;

pub use collaborators::{EmailVerifier, GroupDirectory, PasswordHasher};
pub use hooks::{ActionHook, BoxError, FilterHook};
pub use store::{KeyValueStore, RepoResult};
