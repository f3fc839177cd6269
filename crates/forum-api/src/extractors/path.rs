//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use forum_core::Uid;

use crate::response::ApiError;

/// A `:uid` path segment parsed into a [`Uid`]; zero and non-numeric values are rejected
#[derive(Debug, Clone, Copy)]
pub struct UidPath(pub Uid);

#[async_trait]
impl<S> FromRequestParts<S> for UidPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        // UIDs start at 1
        Uid::parse(&raw)
            .ok()
            .filter(|uid| uid.into_inner() > 0)
            .map(UidPath)
            .ok_or_else(|| ApiError::invalid_path("Invalid uid format"))
    }
}
