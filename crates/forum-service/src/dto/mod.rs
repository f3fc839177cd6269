//! Data transfer objects for API requests and responses

pub mod requests;
pub mod responses;

pub use requests::CreateUserRequest;
pub use responses::{
    ApiResponse, CreateUserResponse, HealthChecks, HealthResponse, ReadinessResponse,
    UserResponse,
};
