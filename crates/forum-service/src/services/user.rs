//! User service
//!
//! Account creation and lookups by UID, slug, username and email.

use forum_core::{Uid, UserRecord};
use forum_store::keys;
use tracing::{info, instrument};

use crate::dto::{CreateUserRequest, CreateUserResponse, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::registration::normalize_email;

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Register a new account
    #[instrument(skip(self, request), fields(username = ?request.username()))]
    pub async fn create_user(&self, request: CreateUserRequest) -> ServiceResult<CreateUserResponse> {
        let record = self
            .ctx
            .orchestrator()
            .create_account(request.into_candidate())
            .await?;

        info!(uid = %record.uid, "User registered");
        Ok(CreateUserResponse::from(&record))
    }

    /// Public profile by UID
    #[instrument(skip(self))]
    pub async fn get_user(&self, uid: Uid) -> ServiceResult<UserResponse> {
        self.get_user_record(uid).await.map(UserResponse::from)
    }

    /// Public profile by slug
    #[instrument(skip(self))]
    pub async fn get_user_by_slug(&self, userslug: &str) -> ServiceResult<UserResponse> {
        let uid = self
            .get_uid_by_userslug(userslug)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", userslug))?;
        self.get_user(uid).await
    }

    /// Full stored record by UID
    pub async fn get_user_record(&self, uid: Uid) -> ServiceResult<UserRecord> {
        let hash = self
            .ctx
            .store()
            .get_object(&keys::user(uid))
            .await?
            .ok_or_else(|| ServiceError::not_found("User", uid.to_string()))?;
        Ok(UserRecord::from_hash(hash)?)
    }

    /// Whether an account already owns this slug
    pub async fn exists(&self, userslug: &str) -> ServiceResult<bool> {
        Ok(self
            .ctx
            .store()
            .is_object_field(keys::USERSLUG_INDEX, userslug)
            .await?)
    }

    /// Whether no account uses this email address
    pub async fn email_available(&self, email: &str) -> ServiceResult<bool> {
        let Some(email) = normalize_email(email) else {
            return Ok(true);
        };
        let taken = self
            .ctx
            .store()
            .is_object_field(keys::EMAIL_INDEX, &email)
            .await?;
        Ok(!taken)
    }

    pub async fn get_uid_by_userslug(&self, userslug: &str) -> ServiceResult<Option<Uid>> {
        self.lookup(keys::USERSLUG_INDEX, userslug).await
    }

    pub async fn get_uid_by_username(&self, username: &str) -> ServiceResult<Option<Uid>> {
        self.lookup(keys::USERNAME_INDEX, username.trim()).await
    }

    pub async fn get_uid_by_email(&self, email: &str) -> ServiceResult<Option<Uid>> {
        match normalize_email(email) {
            Some(email) => self.lookup(keys::EMAIL_INDEX, &email).await,
            None => Ok(None),
        }
    }

    /// Value of `global.userCount`
    pub async fn user_count(&self) -> ServiceResult<u64> {
        let raw = self
            .ctx
            .store()
            .get_object_field(keys::GLOBAL, keys::USER_COUNT_FIELD)
            .await?;
        Ok(raw.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    async fn lookup(&self, index: &str, value: &str) -> ServiceResult<Option<Uid>> {
        let raw = self.ctx.store().get_object_field(index, value).await?;
        Ok(raw.and_then(|v| Uid::parse(&v).ok()))
    }
}
