use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set,
};
use std::collections::{HashMap, HashSet};

use crate::entities::{recipe_tags, tags};

pub type Tag = tags::Model;

pub struct TagRepository {
    conn: DatabaseConnection,
}

impl TagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<Tag>> {
        tags::Entity::find()
            .order_by_asc(tags::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list tags")
    }

    pub async fn get(&self, id: i32) -> Result<Option<Tag>> {
        tags::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query tag")
    }

    pub async fn create(&self, name: &str, color: &str, slug: &str) -> Result<Tag> {
        tags::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            color: Set(color.to_string()),
            slug: Set(slug.to_string()),
        }
        .insert(&self.conn)
        .await
        .with_context(|| format!("Failed to insert tag '{slug}'"))
    }

    /// Subset of `ids` that exist
    pub async fn existing_ids(&self, ids: &[i32]) -> Result<HashSet<i32>> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = tags::Entity::find()
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to check tag IDs")?;

        Ok(rows.into_iter().map(|t| t.id).collect())
    }

    /// Tags of each recipe, ordered by name.
    pub async fn for_recipes(&self, recipe_ids: &[i32]) -> Result<HashMap<i32, Vec<Tag>>> {
        let mut map: HashMap<i32, Vec<Tag>> = HashMap::new();
        if recipe_ids.is_empty() {
            return Ok(map);
        }

        let rows = recipe_tags::Entity::find()
            .filter(recipe_tags::Column::RecipeId.is_in(recipe_ids.iter().copied()))
            .find_also_related(tags::Entity)
            .order_by_asc(tags::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to load recipe tags")?;

        for (link, tag) in rows {
            if let Some(tag) = tag {
                map.entry(link.recipe_id).or_default().push(tag);
            }
        }

        Ok(map)
    }
}
