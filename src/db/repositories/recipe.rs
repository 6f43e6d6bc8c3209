use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    NotSet, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::{Expr, Func, OnConflict, Query},
};

use super::page_in_range;
use crate::entities::{favorites, recipe_ingredients, recipe_tags, recipes, shopping_cart, tags};

pub type Recipe = recipes::Model;

/// Fields of a recipe written on create
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub author_id: i32,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    /// (ingredient id, amount)
    pub ingredients: Vec<(i32, i32)>,
    pub tags: Vec<i32>,
}

/// Partial update. `ingredients` and `tags` always replace the prior sets.
#[derive(Debug, Clone, Default)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Vec<(i32, i32)>,
    pub tags: Vec<i32>,
}

/// Resolved listing predicates. `None` means no restriction.
#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    pub author_id: Option<i32>,
    pub favorited_by: Option<i32>,
    pub in_cart_of: Option<i32>,
    pub tag_slugs: Vec<String>,
}

pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<Recipe>> {
        recipes::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query recipe")
    }

    /// Inserts the recipe with its ingredient and tag rows in one transaction.
    pub async fn create(&self, recipe: NewRecipe) -> Result<Recipe> {
        let txn = self.conn.begin().await?;

        let model = recipes::ActiveModel {
            id: NotSet,
            author_id: Set(recipe.author_id),
            name: Set(recipe.name),
            image: Set(recipe.image),
            text: Set(recipe.text),
            cooking_time: Set(recipe.cooking_time),
            pub_date: Set(chrono::Utc::now().to_rfc3339()),
        }
        .insert(&txn)
        .await
        .context("Failed to insert recipe")?;

        insert_links(&txn, model.id, &recipe.ingredients, &recipe.tags).await?;

        txn.commit().await?;

        Ok(model)
    }

    /// Applies the changes and replaces the ingredient and tag sets in one
    /// transaction. Returns the updated recipe and, when the image was
    /// replaced, the previous image path.
    pub async fn update(
        &self,
        id: i32,
        changes: RecipeChanges,
    ) -> Result<Option<(Recipe, Option<String>)>> {
        let txn = self.conn.begin().await?;

        let Some(existing) = recipes::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query recipe for update")?
        else {
            return Ok(None);
        };

        let old_image = existing.image.clone();
        let mut replaced_image = None;

        let mut active: recipes::ActiveModel = existing.clone().into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(text) = changes.text {
            active.text = Set(text);
        }
        if let Some(cooking_time) = changes.cooking_time {
            active.cooking_time = Set(cooking_time);
        }
        if let Some(image) = changes.image {
            if image != old_image {
                replaced_image = Some(old_image);
            }
            active.image = Set(image);
        }

        let updated = if active.is_changed() {
            active
                .update(&txn)
                .await
                .context("Failed to update recipe")?
        } else {
            existing
        };

        recipe_ingredients::Entity::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;
        recipe_tags::Entity::delete_many()
            .filter(recipe_tags::Column::RecipeId.eq(id))
            .exec(&txn)
            .await?;

        insert_links(&txn, id, &changes.ingredients, &changes.tags).await?;

        txn.commit().await?;

        Ok(Some((updated, replaced_image)))
    }

    /// Deletes the recipe; join and toggle rows go with it through the
    /// cascading foreign keys. Returns the image path of the deleted row.
    pub async fn delete(&self, id: i32) -> Result<Option<String>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        recipes::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete recipe")?;

        Ok(Some(existing.image))
    }

    /// One page of recipes matching `query`, newest first, plus the total.
    pub async fn list_page(
        &self,
        query: &RecipeQuery,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<Recipe>, u64)> {
        let paginator = recipes::Entity::find()
            .filter(query_condition(query))
            .order_by_desc(recipes::Column::Id)
            .paginate(&self.conn, page_size);

        let total = paginator
            .num_items()
            .await
            .context("Failed to count recipes")?;
        let rows = if page_in_range(page, page_size, total) {
            paginator
                .fetch_page(page - 1)
                .await
                .context("Failed to fetch recipes page")?
        } else {
            Vec::new()
        };

        Ok((rows, total))
    }

    pub async fn list_by_author(&self, author_id: i32) -> Result<Vec<Recipe>> {
        recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list recipes by author")
    }
}

fn query_condition(query: &RecipeQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(author_id) = query.author_id {
        condition = condition.add(recipes::Column::AuthorId.eq(author_id));
    }

    if let Some(user_id) = query.favorited_by {
        condition = condition.add(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column(favorites::Column::RecipeId)
                    .from(favorites::Entity)
                    .and_where(favorites::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        );
    }

    if let Some(user_id) = query.in_cart_of {
        condition = condition.add(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column(shopping_cart::Column::RecipeId)
                    .from(shopping_cart::Entity)
                    .and_where(shopping_cart::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        );
    }

    if !query.tag_slugs.is_empty() {
        let slugs: Vec<String> = query.tag_slugs.iter().map(|s| s.to_lowercase()).collect();
        condition = condition.add(
            recipes::Column::Id.in_subquery(
                Query::select()
                    .column((recipe_tags::Entity, recipe_tags::Column::RecipeId))
                    .from(recipe_tags::Entity)
                    .inner_join(
                        tags::Entity,
                        Expr::col((tags::Entity, tags::Column::Id))
                            .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                    )
                    .and_where(
                        Expr::expr(Func::lower(Expr::col((tags::Entity, tags::Column::Slug))))
                            .is_in(slugs),
                    )
                    .to_owned(),
            ),
        );
    }

    condition
}

async fn insert_links(
    txn: &DatabaseTransaction,
    recipe_id: i32,
    ingredients: &[(i32, i32)],
    tags: &[i32],
) -> Result<()> {
    if !ingredients.is_empty() {
        let rows = ingredients
            .iter()
            .map(|&(ingredient_id, amount)| recipe_ingredients::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(ingredient_id),
                amount: Set(amount),
            });

        recipe_ingredients::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    recipe_ingredients::Column::RecipeId,
                    recipe_ingredients::Column::IngredientId,
                ])
                .update_column(recipe_ingredients::Column::Amount)
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await
            .context("Failed to insert recipe ingredients")?;
    }

    if !tags.is_empty() {
        let rows = tags.iter().map(|&tag_id| recipe_tags::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(tag_id),
        });

        recipe_tags::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([recipe_tags::Column::RecipeId, recipe_tags::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await
            .context("Failed to insert recipe tags")?;
    }

    Ok(())
}
