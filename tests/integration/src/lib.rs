//! End-to-end helpers: an in-process API server on the in-memory store and a few
//! request/response shapes.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
