//! Favorites and shopping cart: two per-user recipe sets with identical
//! add/remove semantics.

use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr};
use std::collections::HashSet;

use crate::entities::{favorites, shopping_cart};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeListKind {
    Favorites,
    ShoppingCart,
}

impl RecipeListKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Favorites => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

pub struct RecipeListRepository {
    conn: DatabaseConnection,
}

impl RecipeListRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns `false` when the pair is already present.
    pub async fn add(&self, kind: RecipeListKind, user_id: i32, recipe_id: i32) -> Result<bool> {
        let result = match kind {
            RecipeListKind::Favorites => {
                favorites::Entity::insert(favorites::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                })
                .exec_without_returning(&self.conn)
                .await
            }
            RecipeListKind::ShoppingCart => {
                shopping_cart::Entity::insert(shopping_cart::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                })
                .exec_without_returning(&self.conn)
                .await
            }
        };

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err).with_context(|| format!("Failed to add to {}", kind.as_str())),
        }
    }

    /// Returns `false` when the pair was not present.
    pub async fn remove(&self, kind: RecipeListKind, user_id: i32, recipe_id: i32) -> Result<bool> {
        let result = match kind {
            RecipeListKind::Favorites => {
                favorites::Entity::delete_many()
                    .filter(favorites::Column::UserId.eq(user_id))
                    .filter(favorites::Column::RecipeId.eq(recipe_id))
                    .exec(&self.conn)
                    .await
            }
            RecipeListKind::ShoppingCart => {
                shopping_cart::Entity::delete_many()
                    .filter(shopping_cart::Column::UserId.eq(user_id))
                    .filter(shopping_cart::Column::RecipeId.eq(recipe_id))
                    .exec(&self.conn)
                    .await
            }
        }
        .with_context(|| format!("Failed to remove from {}", kind.as_str()))?;

        Ok(result.rows_affected > 0)
    }

    /// Which of `recipe_ids` are in the user's list
    pub async fn contains(
        &self,
        kind: RecipeListKind,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids = match kind {
            RecipeListKind::Favorites => favorites::Entity::find()
                .filter(favorites::Column::UserId.eq(user_id))
                .filter(favorites::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|row| row.recipe_id)
                .collect(),
            RecipeListKind::ShoppingCart => shopping_cart::Entity::find()
                .filter(shopping_cart::Column::UserId.eq(user_id))
                .filter(shopping_cart::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                .all(&self.conn)
                .await?
                .into_iter()
                .map(|row| row.recipe_id)
                .collect(),
        };

        Ok(ids)
    }
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
