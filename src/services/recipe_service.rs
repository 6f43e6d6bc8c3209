//! Domain service for recipes and the per-user recipe lists.

use thiserror::Error;

use crate::api::filters::RecipeFilter;
use crate::api::pagination::Paginated;
use crate::api::types::{RecipeDto, RecipeShortDto, RecipeWriteRequest};
use crate::api::validation::FieldErrors;
use crate::db::{RecipeListKind, User};

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Recipe not found: {0}")]
    NotFound(i32),

    #[error("Page {0} not found")]
    PageNotFound(u64),

    #[error("Validation failed")]
    Invalid(FieldErrors),

    /// Request understood but refused, e.g. adding a recipe twice
    #[error("{0}")]
    Rejected(String),

    #[error("Only the author can change this recipe")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RecipeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RecipeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

#[async_trait::async_trait]
pub trait RecipeService: Send + Sync {
    /// Newest first, narrowed by `filter` relative to `viewer`.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::PageNotFound`] past the last page.
    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<&User>,
    ) -> Result<Paginated<RecipeDto>, RecipeError>;

    async fn get(&self, id: i32, viewer: Option<&User>) -> Result<RecipeDto, RecipeError>;

    /// # Errors
    ///
    /// Returns [`RecipeError::Invalid`] with every failing field.
    async fn create(
        &self,
        author: &User,
        request: RecipeWriteRequest,
    ) -> Result<RecipeDto, RecipeError>;

    /// Partial update; ingredients and tags are required and replace the
    /// previous sets.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::Forbidden`] when `editor` is not the author.
    async fn update(
        &self,
        id: i32,
        editor: &User,
        request: RecipeWriteRequest,
    ) -> Result<RecipeDto, RecipeError>;

    async fn delete(&self, id: i32, editor: &User) -> Result<(), RecipeError>;

    /// # Errors
    ///
    /// Returns [`RecipeError::Rejected`] when the recipe is already listed.
    async fn add_to_list(
        &self,
        kind: RecipeListKind,
        user: &User,
        recipe_id: i32,
    ) -> Result<RecipeShortDto, RecipeError>;

    /// # Errors
    ///
    /// Returns [`RecipeError::Rejected`] when the recipe is not listed.
    async fn remove_from_list(
        &self,
        kind: RecipeListKind,
        user: &User,
        recipe_id: i32,
    ) -> Result<(), RecipeError>;

    async fn list_favorites(
        &self,
        user: &User,
        page: u64,
    ) -> Result<Paginated<RecipeShortDto>, RecipeError>;

    /// Plain-text shopping list for the user's cart.
    async fn shopping_list(&self, user: &User) -> Result<String, RecipeError>;
}
