//! Error mapping and response wrappers
//!
//! Every failure leaves the server as `{"error": {"code", "message", "details"}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use forum_common::AppError;
use forum_core::DomainError;
use forum_service::ServiceError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    App(#[from] AppError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            Self::App(e) => e.status_code(),
            Self::Service(e) => e.status_code(),
            Self::Domain(e) => {
                if e.is_not_found() {
                    404
                } else if e.is_validation() {
                    400
                } else if e.is_conflict() {
                    409
                } else if e.is_rejection() {
                    422
                } else {
                    500
                }
            }
            Self::InvalidPath(_) | Self::InvalidBody(_) => 400,
            Self::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub fn error_code(&self) -> &str {
        match self {
            Self::App(e) => e.error_code(),
            Self::Service(e) => e.error_code(),
            Self::Domain(e) => e.code(),
            Self::InvalidPath(_) => "INVALID_PATH_PARAMETER",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn invalid_body(msg: impl Into<String>) -> Self {
        Self::InvalidBody(msg.into())
    }

    fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) | Self::Service(ServiceError::Domain(e)) => Some(e),
            Self::App(AppError::Domain(e)) => Some(e),
            _ => None,
        }
    }

    /// Structured context for failures that need it; the committed UID is reported so
    /// operators can reconcile a partially created account
    fn details(&self) -> Option<serde_json::Value> {
        match self.domain()? {
            DomainError::WriteFailed { uid, step, .. } => Some(json!({ "uid": uid, "step": step.as_str() })),
            DomainError::HashingError { uid, .. } => Some(json!({ "uid": uid })),
            DomainError::ExtensionRejected { hook, .. } => Some(json!({ "hook": hook })),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = ?self, "Server error occurred");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Created response (201)
pub struct Created<T>(pub T);

impl<T: IntoResponse> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = self.0.into_response();
        *response.status_mut() = StatusCode::CREATED;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forum_core::{Uid, WriteStep};

    #[test]
    fn test_domain_status_codes() {
        assert_eq!(
            ApiError::from(DomainError::InvalidEmail).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DomainError::UsernameTaken).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DomainError::rejected("spam", "no")).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(DomainError::storage("down")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_write_failure_details_carry_uid() {
        let err = ApiError::from(ServiceError::from(DomainError::WriteFailed {
            uid: Uid::new(12),
            step: WriteStep::Record,
            message: "boom".into(),
        }));

        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert_eq!(err.details(), Some(json!({ "uid": 12, "step": "record" })));
    }

    #[test]
    fn test_local_errors() {
        let err = ApiError::invalid_path("bad uid");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_PATH_PARAMETER");
        assert_eq!(err.details(), None);
        assert_eq!(ApiError::invalid_body("x").error_code(), "INVALID_BODY");
    }
}
