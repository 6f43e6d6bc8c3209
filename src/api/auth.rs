use axum::{
    Json,
    extract::{FromRequestParts, Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::types::{LoginRequest, TokenResponse};
use super::{ApiError, ApiResponse, AppState};
use crate::db::User;
use crate::services::AuthError;

// ============================================================================
// Extractors
// ============================================================================

/// The requester, if the request carried a valid token.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<User>);

impl Viewer {
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_default())
    }
}

/// An authenticated requester; rejects anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Viewer>()
            .and_then(|viewer| viewer.0.clone())
            .map(Self)
            .ok_or_else(ApiError::unauthenticated)
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the optional requester from:
/// 1. `Authorization: Token <token>`
/// 2. `Authorization: Bearer <token>`
///
/// Requests without a token pass through as anonymous; a token that
/// matches no user is rejected.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let viewer = match extract_token(&headers) {
        Some(token) => {
            let user = state
                .auth_service()
                .authenticate(&token)
                .await
                .map_err(ApiError::from)?
                .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

            tracing::Span::current().record("user_id", user.id);
            Some(user)
        }
        None => None,
    };

    request.extensions_mut().insert(Viewer(viewer));
    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    auth_str
        .strip_prefix("Token ")
        .or_else(|| auth_str.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::validation(err.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/token/login
/// Exchange email and password for an auth token
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    let Json(payload) = payload?;

    let auth_token = state
        .auth_service()
        .login(payload.email.trim(), &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(TokenResponse { auth_token })))
}

/// POST /auth/token/logout
/// Invalidate the current token
pub async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    state.auth_service().logout(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_token_prefixes() {
        assert_eq!(
            extract_token(&headers_with("Token abc123")),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_token(&headers_with("Bearer abc123")),
            Some("abc123".to_string())
        );
        assert_eq!(extract_token(&headers_with("Basic abc123")), None);
        assert_eq!(extract_token(&headers_with("Token ")), None);
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }
}
