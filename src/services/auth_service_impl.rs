//! `SeaORM` implementation of the `AuthService` trait.

use crate::db::{Store, User};
use crate::services::auth_service::{AuthError, AuthService};
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .verify_user_password(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self.store.issue_user_token(user.id).await?;

        tracing::info!(user_id = user.id, "User logged in");

        Ok(token)
    }

    async fn logout(&self, user: &User) -> Result<(), AuthError> {
        self.store.clear_user_token(user.id).await?;
        tracing::info!(user_id = user.id, "User logged out");
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> Result<Option<User>, AuthError> {
        if token.is_empty() {
            return Ok(None);
        }

        Ok(self.store.get_user_by_token(token).await?)
    }
}
