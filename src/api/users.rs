use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use super::auth::{AuthUser, Viewer};
use super::filters::page_from_query;
use super::pagination::Paginated;
use super::types::{RegisterRequest, SetPasswordRequest, SubscriptionDto, UserProfileDto};
use super::{ApiError, ApiResponse, AppState};
use crate::services::UserError;

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => Self::not_found("User", id),
            UserError::PageNotFound(page) => Self::page_not_found(page),
            UserError::Invalid(errors) => Self::FieldErrors(errors),
            UserError::Rejected(msg) => Self::validation(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// POST /users
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let profile = state.user_service().register(payload).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(profile))))
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<Paginated<UserProfileDto>>>, ApiError> {
    let page = page_from_query(query.as_deref())?;

    let users = state.user_service().list(page, viewer.user()).await?;

    Ok(Json(ApiResponse::success(users)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<UserProfileDto>>, ApiError> {
    let profile = state.user_service().get(id, viewer.user()).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// GET /users/me
pub async fn me(AuthUser(user): AuthUser) -> Json<ApiResponse<UserProfileDto>> {
    Json(ApiResponse::success(UserProfileDto::from_user(user, false)))
}

/// POST /users/set_password
pub async fn set_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<SetPasswordRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload?;

    state.user_service().set_password(&user, payload).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /users/{id}/subscribe
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state.user_service().subscribe(&user, id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(subscription))))
}

/// DELETE /users/{id}/subscribe
pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.user_service().unsubscribe(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/subscriptions
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<Paginated<SubscriptionDto>>>, ApiError> {
    let page = page_from_query(query.as_deref())?;

    let subscriptions = state.user_service().subscriptions(&user, page).await?;

    Ok(Json(ApiResponse::success(subscriptions)))
}
