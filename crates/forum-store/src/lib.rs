//! # forum-store
//!
//! Key-value storage for accounts.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Stores**: [`RedisStore`] for deployments, [`MemoryStore`] for tests and single-process use
//! - **Keys**: Names of every record, index, counter and ranking
//! - **Groups**: Store-backed group membership
//! - **Email confirmation**: Pending confirmation codes for an external mailer
//!
//! ## Example
//!
//! ```ignore
//! use forum_store::{RedisPool, RedisPoolConfig, RedisStore};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let store = RedisStore::new(pool);
//! let next = store.increment_object_field("global", "nextUid").await?;
//! ```

pub mod groups;
pub mod keys;
pub mod memory;
pub mod pool;
pub mod redis_store;
pub mod verification;

pub use groups::StoreGroupDirectory;
pub use memory::MemoryStore;
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
pub use redis_store::RedisStore;
pub use verification::{PendingConfirmation, StoreEmailVerifier};
