use axum::{
    Json,
    extract::{RawQuery, State},
};
use std::sync::Arc;

use super::auth::AuthUser;
use super::filters::page_from_query;
use super::pagination::Paginated;
use super::types::RecipeShortDto;
use super::{ApiError, ApiResponse, AppState};

/// GET /favorites
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<Paginated<RecipeShortDto>>>, ApiError> {
    let page = page_from_query(query.as_deref())?;

    let favorites = state.recipe_service().list_favorites(&user, page).await?;

    Ok(Json(ApiResponse::success(favorites)))
}
