use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, NotSet, QueryFilter,
    QueryOrder, QuerySelect, Set,
    sea_query::{LikeExpr, OnConflict},
};
use std::collections::{HashMap, HashSet};

use crate::entities::{ingredients, recipe_ingredients};

pub type Ingredient = ingredients::Model;

/// Ingredient row as attached to a recipe
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct IngredientAmount {
    pub recipe_id: i32,
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

pub struct IngredientRepository {
    conn: DatabaseConnection,
}

impl IngredientRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Lists ingredients ordered by name, optionally narrowed to names
    /// containing `name` (case-insensitive).
    ///
    /// SQLite's `LIKE` only folds ASCII, so an ASCII needle is narrowed in
    /// SQL and anything else is matched here against the whole catalog.
    /// Assumes the catalog stays at a few thousand imported rows.
    pub async fn list(&self, name: Option<&str>) -> Result<Vec<Ingredient>> {
        let needle = name.map(str::to_lowercase).filter(|n| !n.is_empty());

        let mut select = ingredients::Entity::find();
        if let Some(needle) = needle.as_deref().filter(|n| n.is_ascii()) {
            let pattern = LikeExpr::new(format!("%{}%", escape_like(needle))).escape('\\');
            select = select.filter(ingredients::Column::Name.like(pattern));
        }

        let rows = select
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list ingredients")?;

        let Some(needle) = needle else {
            return Ok(rows);
        };

        Ok(rows
            .into_iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Ingredient>> {
        ingredients::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query ingredient")
    }

    pub async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = ingredients::Entity::find()
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to check ingredient IDs")?;

        Ok(rows.into_iter().map(|i| i.id).collect())
    }

    /// Inserts the (name, unit) pair unless it already exists.
    /// Returns whether a row was added.
    pub async fn insert_if_missing(&self, name: &str, measurement_unit: &str) -> Result<bool> {
        let model = ingredients::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            measurement_unit: Set(measurement_unit.to_string()),
        };

        let inserted = ingredients::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    ingredients::Column::Name,
                    ingredients::Column::MeasurementUnit,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .with_context(|| format!("Failed to insert ingredient '{name}'"))?;

        Ok(inserted > 0)
    }

    /// Ingredient rows of each recipe with their amounts, ordered by name.
    pub async fn for_recipes(
        &self,
        recipe_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<IngredientAmount>>> {
        let mut map: HashMap<i32, Vec<IngredientAmount>> = HashMap::new();
        if recipe_ids.is_empty() {
            return Ok(map);
        }

        let rows = recipe_ingredients::Entity::find()
            .select_only()
            .column(recipe_ingredients::Column::RecipeId)
            .column_as(ingredients::Column::Id, "id")
            .column_as(ingredients::Column::Name, "name")
            .column_as(ingredients::Column::MeasurementUnit, "measurement_unit")
            .column(recipe_ingredients::Column::Amount)
            .inner_join(ingredients::Entity)
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .order_by_asc(ingredients::Column::Name)
            .into_model::<IngredientAmount>()
            .all(&self.conn)
            .await
            .context("Failed to load recipe ingredients")?;

        for row in rows {
            map.entry(row.recipe_id).or_default().push(row);
        }

        Ok(map)
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("sugar"), "sugar");
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }
}
