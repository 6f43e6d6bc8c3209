//! Domain service for user accounts and subscriptions.

use thiserror::Error;

use crate::api::pagination::Paginated;
use crate::api::types::{RegisterRequest, SetPasswordRequest, SubscriptionDto, UserProfileDto};
use crate::api::validation::FieldErrors;
use crate::db::User;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(i32),

    #[error("Page {0} not found")]
    PageNotFound(u64),

    #[error("Validation failed")]
    Invalid(FieldErrors),

    #[error("{0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// # Errors
    ///
    /// Returns [`UserError::Invalid`] for malformed fields or a taken
    /// username or email.
    async fn register(&self, request: RegisterRequest) -> Result<UserProfileDto, UserError>;

    async fn list(
        &self,
        page: u64,
        viewer: Option<&User>,
    ) -> Result<Paginated<UserProfileDto>, UserError>;

    async fn get(&self, id: i32, viewer: Option<&User>) -> Result<UserProfileDto, UserError>;

    async fn set_password(
        &self,
        user: &User,
        request: SetPasswordRequest,
    ) -> Result<(), UserError>;

    /// # Errors
    ///
    /// Returns [`UserError::Rejected`] for a self-subscription or an
    /// existing subscription.
    async fn subscribe(&self, user: &User, author_id: i32) -> Result<SubscriptionDto, UserError>;

    async fn unsubscribe(&self, user: &User, author_id: i32) -> Result<(), UserError>;

    async fn subscriptions(
        &self,
        user: &User,
        page: u64,
    ) -> Result<Paginated<SubscriptionDto>, UserError>;
}
