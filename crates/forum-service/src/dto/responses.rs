//! Response DTOs for API endpoints

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use forum_core::{Uid, UserRecord, UserStatus};
use serde::Serialize;

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserResponse {
    pub uid: Uid,
    pub userslug: String,
}

impl From<&UserRecord> for CreateUserResponse {
    fn from(record: &UserRecord) -> Self {
        Self {
            uid: record.uid,
            userslug: record.userslug.clone(),
        }
    }
}

/// Public profile. The email address and password hash are never exposed.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub uid: Uid,
    pub username: String,
    pub userslug: String,
    pub fullname: String,
    pub location: String,
    pub birthday: String,
    pub website: String,
    pub signature: String,
    /// Milliseconds since the epoch
    pub joindate: i64,
    pub picture: String,
    pub uploadedpicture: String,
    pub profileviews: u64,
    pub reputation: i64,
    pub postcount: u64,
    pub banned: bool,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, String>,
}

impl From<&UserRecord> for UserResponse {
    fn from(record: &UserRecord) -> Self {
        Self {
            uid: record.uid,
            username: record.username.clone(),
            userslug: record.userslug.clone(),
            fullname: record.fullname.clone(),
            location: record.location.clone(),
            birthday: record.birthday.clone(),
            website: record.website.clone(),
            signature: record.signature.clone(),
            joindate: record.joindate_millis(),
            picture: record.picture.clone(),
            uploadedpicture: record.uploadedpicture.clone(),
            profileviews: record.profileviews,
            reputation: record.reputation,
            postcount: record.postcount,
            banned: record.banned,
            status: record.status,
            custom_fields: record
                .extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        Self::from(&record)
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub store: String,
}

impl ReadinessResponse {
    pub fn ready(store_healthy: bool) -> Self {
        Self {
            status: if store_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                store: if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
