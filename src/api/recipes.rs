use axum::{
    Json,
    extract::{Path, RawQuery, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::auth::{AuthUser, Viewer};
use super::filters::RecipeFilter;
use super::pagination::Paginated;
use super::types::{RecipeDto, RecipeShortDto, RecipeWriteRequest};
use super::{ApiError, ApiResponse, AppState};
use crate::db::RecipeListKind;
use crate::services::RecipeError;
use crate::services::shopping_list::SHOPPING_LIST_FILENAME;

impl From<RecipeError> for ApiError {
    fn from(err: RecipeError) -> Self {
        match err {
            RecipeError::NotFound(id) => Self::not_found("Recipe", id),
            RecipeError::PageNotFound(page) => Self::page_not_found(page),
            RecipeError::Invalid(errors) => Self::FieldErrors(errors),
            RecipeError::Rejected(msg) => Self::validation(msg),
            RecipeError::Forbidden => Self::Forbidden(err.to_string()),
            RecipeError::Database(msg) => Self::DatabaseError(msg),
            RecipeError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /recipes
pub async fn list_recipes(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<Paginated<RecipeDto>>>, ApiError> {
    let filter = RecipeFilter::from_query(query.as_deref())?;

    let page = state
        .recipe_service()
        .list(&filter, viewer.user())
        .await?;

    Ok(Json(ApiResponse::success(page)))
}

/// GET /recipes/{id}
pub async fn get_recipe(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RecipeDto>>, ApiError> {
    let recipe = state.recipe_service().get(id, viewer.user()).await?;
    Ok(Json(ApiResponse::success(recipe)))
}

/// POST /recipes
pub async fn create_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<RecipeWriteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    let recipe = state.recipe_service().create(&user, payload).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(recipe))))
}

/// PATCH /recipes/{id}
pub async fn update_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    payload: Result<Json<RecipeWriteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RecipeDto>>, ApiError> {
    let Json(payload) = payload?;

    let recipe = state.recipe_service().update(id, &user, payload).await?;

    Ok(Json(ApiResponse::success(recipe)))
}

/// DELETE /recipes/{id}
pub async fn delete_recipe(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.recipe_service().delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_to(
    state: &AppState,
    kind: RecipeListKind,
    user: &crate::db::User,
    id: i32,
) -> Result<(StatusCode, Json<ApiResponse<RecipeShortDto>>), ApiError> {
    let recipe = state.recipe_service().add_to_list(kind, user, id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(recipe))))
}

/// POST /recipes/{id}/favorite
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    add_to(&state, RecipeListKind::Favorites, &user, id).await
}

/// DELETE /recipes/{id}/favorite
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state
        .recipe_service()
        .remove_from_list(RecipeListKind::Favorites, &user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /recipes/{id}/shopping_cart
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    add_to(&state, RecipeListKind::ShoppingCart, &user, id).await
}

/// DELETE /recipes/{id}/shopping_cart
pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state
        .recipe_service()
        .remove_from_list(RecipeListKind::ShoppingCart, &user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /recipes/download_shopping_cart
/// Plain-text attachment with ingredient totals across the cart
pub async fn download_shopping_cart(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Response, ApiError> {
    let body = state.recipe_service().shopping_list(&user).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}
