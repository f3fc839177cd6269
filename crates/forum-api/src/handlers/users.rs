//! User handlers
//!
//! Registration and public profile lookups.

use axum::{
    extract::{Path, State},
    Json,
};
use forum_service::dto::{ApiResponse, CreateUserRequest, CreateUserResponse, UserResponse};
use forum_service::UserService;

use crate::extractors::{JsonBody, UidPath};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Register an account
///
/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> ApiResult<Created<Json<ApiResponse<CreateUserResponse>>>> {
    let service = UserService::new(state.service_context());
    let response = service.create_user(request).await?;
    Ok(Created(Json(ApiResponse::new(response))))
}

/// GET /users/{uid}
pub async fn get_user(
    State(state): State<AppState>,
    UidPath(uid): UidPath,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.get_user(uid).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// GET /users/slug/{userslug}
pub async fn get_user_by_slug(
    State(state): State<AppState>,
    Path(userslug): Path<String>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let service = UserService::new(state.service_context());
    let response = service.get_user_by_slug(&userslug).await?;
    Ok(Json(ApiResponse::new(response)))
}
