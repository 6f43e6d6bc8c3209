use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use std::sync::Arc;

use super::filters::IngredientFilter;
use super::types::IngredientDto;
use super::{ApiError, ApiResponse, AppState};

/// GET /ingredients?name=
pub async fn list_ingredients(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse<Vec<IngredientDto>>>, ApiError> {
    let filter = IngredientFilter::from_query(query.as_deref());

    let ingredients = state
        .store()
        .list_ingredients(filter.name.as_deref())
        .await
        .map_err(|e| ApiError::DatabaseError(format!("{e:#}")))?;

    Ok(Json(ApiResponse::success(
        ingredients.into_iter().map(IngredientDto::from).collect(),
    )))
}

/// GET /ingredients/{id}
pub async fn get_ingredient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<IngredientDto>>, ApiError> {
    let ingredient = state
        .store()
        .get_ingredient(id)
        .await
        .map_err(|e| ApiError::DatabaseError(format!("{e:#}")))?
        .ok_or_else(|| ApiError::not_found("Ingredient", id))?;

    Ok(Json(ApiResponse::success(IngredientDto::from(ingredient))))
}
