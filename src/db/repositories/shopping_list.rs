use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Query,
};

use crate::entities::{ingredients, recipe_ingredients, shopping_cart};

/// Summed amount of one (ingredient name, unit) group
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

pub struct ShoppingListRepository {
    conn: DatabaseConnection,
}

impl ShoppingListRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Sums ingredient amounts over every recipe in the user's cart,
    /// grouped by (name, unit) and ordered by name then unit.
    pub async fn aggregate(&self, user_id: i32) -> Result<Vec<ShoppingListLine>> {
        recipe_ingredients::Entity::find()
            .select_only()
            .column_as(ingredients::Column::Name, "name")
            .column_as(ingredients::Column::MeasurementUnit, "measurement_unit")
            .column_as(recipe_ingredients::Column::Amount.sum(), "amount")
            .inner_join(ingredients::Entity)
            .filter(
                recipe_ingredients::Column::RecipeId.in_subquery(
                    Query::select()
                        .column(shopping_cart::Column::RecipeId)
                        .from(shopping_cart::Entity)
                        .and_where(shopping_cart::Column::UserId.eq(user_id))
                        .to_owned(),
                ),
            )
            .group_by(ingredients::Column::Name)
            .group_by(ingredients::Column::MeasurementUnit)
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::MeasurementUnit)
            .into_model::<ShoppingListLine>()
            .all(&self.conn)
            .await
            .context("Failed to aggregate shopping list")
    }
}
