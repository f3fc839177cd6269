//! # forum-service
//!
//! Application layer: the account registration pipeline, user lookups, and DTOs.

pub mod dto;
pub mod services;

pub use services::{
    CreationOrchestrator, HookRegistry, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult, UserService,
};
