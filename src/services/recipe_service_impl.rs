//! `SeaORM` implementation of the `RecipeService` trait.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::api::filters::RecipeFilter;
use crate::api::pagination::{Paginated, page_exists};
use crate::api::types::{
    RecipeDto, RecipeIngredientDto, RecipeShortDto, RecipeWriteRequest, TagDto, UserProfileDto,
};
use crate::api::validation::{
    Validator, validate_amount, validate_cooking_time, validate_id_set, validate_recipe_name,
    validate_text,
};
use crate::config::{Config, RecipesConfig};
use crate::db::{NewRecipe, Recipe, RecipeChanges, RecipeListKind, RecipeQuery, Store, User};
use crate::services::image::{DecodedImage, ImageService, decode_data_uri};
use crate::services::recipe_service::{RecipeError, RecipeService};
use crate::services::shopping_list::render_shopping_list;

const REQUIRED: &str = "This field is required";

/// Write request after every validation pass
struct ValidatedWrite {
    name: Option<String>,
    text: Option<String>,
    cooking_time: Option<i32>,
    image: Option<DecodedImage>,
    ingredients: Vec<(i32, i32)>,
    tags: Vec<i32>,
}

pub struct SeaOrmRecipeService {
    store: Store,
    images: Arc<ImageService>,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmRecipeService {
    #[must_use]
    pub const fn new(
        store: Store,
        images: Arc<ImageService>,
        config: Arc<RwLock<Config>>,
    ) -> Self {
        Self {
            store,
            images,
            config,
        }
    }

    async fn recipes_config(&self) -> RecipesConfig {
        self.config.read().await.recipes.clone()
    }

    async fn existing(&self, id: i32) -> Result<Recipe, RecipeError> {
        self.store
            .get_recipe(id)
            .await?
            .ok_or(RecipeError::NotFound(id))
    }

    /// Field validators, then the list checks, then the reference checks.
    /// Scalars are optional when `partial` is set; ingredients and tags
    /// never are.
    async fn validate_write(
        &self,
        request: RecipeWriteRequest,
        partial: bool,
    ) -> Result<ValidatedWrite, RecipeError> {
        let bounds = self.recipes_config().await;
        let mut v = Validator::new();

        match &request.name {
            Some(name) => v.check("name", validate_recipe_name(name)),
            None if !partial => v.add("name", REQUIRED),
            None => {}
        }

        match &request.text {
            Some(text) => v.check("text", validate_text(text)),
            None if !partial => v.add("text", REQUIRED),
            None => {}
        }

        match request.cooking_time {
            Some(minutes) => v.check(
                "cooking_time",
                validate_cooking_time(minutes, bounds.min_cooking_time, bounds.max_cooking_time),
            ),
            None if !partial => v.add("cooking_time", REQUIRED),
            None => {}
        }

        let image = match &request.image {
            Some(data) => match decode_data_uri(data) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    v.add("image", format!("{e:#}"));
                    None
                }
            },
            None if !partial => {
                v.add("image", REQUIRED);
                None
            }
            None => None,
        };

        let ingredients: Vec<(i32, i32)> = request
            .ingredients
            .as_ref()
            .map(|items| items.iter().map(|i| (i.id, i.amount)).collect())
            .unwrap_or_default();
        if request.ingredients.is_none() {
            v.add("ingredients", REQUIRED);
        }
        for (_, amount) in &ingredients {
            v.check("ingredients", validate_amount(*amount));
        }

        let tags = request.tags.clone().unwrap_or_default();
        if request.tags.is_none() {
            v.add("tags", REQUIRED);
        }

        v.finish().map_err(RecipeError::Invalid)?;

        let mut v = Validator::new();
        let ingredient_ids: Vec<i32> = ingredients.iter().map(|(id, _)| *id).collect();
        v.check("ingredients", validate_id_set(&ingredient_ids, "ingredient"));
        v.check("tags", validate_id_set(&tags, "tag"));
        v.finish().map_err(RecipeError::Invalid)?;

        let mut v = Validator::new();
        let known_ingredients = self.store.existing_ingredient_ids(&ingredient_ids).await?;
        for id in ingredient_ids.iter().filter(|id| !known_ingredients.contains(id)) {
            v.add("ingredients", format!("Ingredient {id} does not exist"));
        }
        let known_tags = self.store.existing_tag_ids(&tags).await?;
        for id in tags.iter().filter(|id| !known_tags.contains(id)) {
            v.add("tags", format!("Tag {id} does not exist"));
        }
        v.finish().map_err(RecipeError::Invalid)?;

        Ok(ValidatedWrite {
            name: request.name,
            text: request.text,
            cooking_time: request.cooking_time,
            image,
            ingredients,
            tags,
        })
    }

    fn short(&self, recipe: &Recipe) -> RecipeShortDto {
        RecipeShortDto {
            id: recipe.id,
            name: recipe.name.clone(),
            image: self.images.url_for(&recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }

    /// Loads authors, tags, ingredients and the viewer's relation flags for
    /// a batch of recipes, keeping their order.
    async fn build_recipes(
        &self,
        recipes: Vec<Recipe>,
        viewer: Option<&User>,
    ) -> Result<Vec<RecipeDto>, RecipeError> {
        let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
        let author_ids: Vec<i32> = recipes
            .iter()
            .map(|r| r.author_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let authors: HashMap<i32, User> = self
            .store
            .get_users(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let mut tags = self.store.tags_for_recipes(&recipe_ids).await?;
        let mut ingredients = self.store.ingredients_for_recipes(&recipe_ids).await?;

        let (favorited, in_cart, followed) = match viewer {
            Some(user) => (
                self.store
                    .list_contains(RecipeListKind::Favorites, user.id, &recipe_ids)
                    .await?,
                self.store
                    .list_contains(RecipeListKind::ShoppingCart, user.id, &recipe_ids)
                    .await?,
                self.store.followed_among(user.id, &author_ids).await?,
            ),
            None => Default::default(),
        };

        recipes
            .into_iter()
            .map(|recipe| {
                let author = authors.get(&recipe.author_id).cloned().ok_or_else(|| {
                    RecipeError::Internal(format!(
                        "Author {} of recipe {} is missing",
                        recipe.author_id, recipe.id
                    ))
                })?;
                let is_subscribed = followed.contains(&author.id);

                Ok(RecipeDto {
                    id: recipe.id,
                    tags: tags
                        .remove(&recipe.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(TagDto::from)
                        .collect(),
                    author: UserProfileDto::from_user(author, is_subscribed),
                    ingredients: ingredients
                        .remove(&recipe.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(RecipeIngredientDto::from)
                        .collect(),
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    image: self.images.url_for(&recipe.image),
                    name: recipe.name,
                    text: recipe.text,
                    cooking_time: recipe.cooking_time,
                })
            })
            .collect()
    }

    async fn build_one(
        &self,
        recipe: Recipe,
        viewer: Option<&User>,
    ) -> Result<RecipeDto, RecipeError> {
        let id = recipe.id;
        self.build_recipes(vec![recipe], viewer)
            .await?
            .pop()
            .ok_or(RecipeError::NotFound(id))
    }

    async fn page_of(
        &self,
        query: &RecipeQuery,
        page: u64,
    ) -> Result<(Vec<Recipe>, u64, u64), RecipeError> {
        let page_size = self.recipes_config().await.page_size;
        let (rows, total) = self.store.list_recipes(query, page, page_size).await?;

        if !page_exists(page, page_size, total) {
            return Err(RecipeError::PageNotFound(page));
        }

        Ok((rows, total, page_size))
    }
}

#[async_trait]
impl RecipeService for SeaOrmRecipeService {
    async fn list(
        &self,
        filter: &RecipeFilter,
        viewer: Option<&User>,
    ) -> Result<Paginated<RecipeDto>, RecipeError> {
        let query = filter.to_query(viewer.map(|u| u.id));
        let (rows, total, page_size) = self.page_of(&query, filter.page).await?;
        let results = self.build_recipes(rows, viewer).await?;

        Ok(Paginated::new(filter.page, page_size, total, results))
    }

    async fn get(&self, id: i32, viewer: Option<&User>) -> Result<RecipeDto, RecipeError> {
        let recipe = self.existing(id).await?;
        self.build_one(recipe, viewer).await
    }

    async fn create(
        &self,
        author: &User,
        request: RecipeWriteRequest,
    ) -> Result<RecipeDto, RecipeError> {
        let write = self.validate_write(request, false).await?;

        let image = write
            .image
            .ok_or_else(|| RecipeError::Internal("Validated image missing".to_string()))?;
        let image_path = self.images.save(&image).await?;

        let new_recipe = NewRecipe {
            author_id: author.id,
            name: write.name.unwrap_or_default(),
            image: image_path.clone(),
            text: write.text.unwrap_or_default(),
            cooking_time: write.cooking_time.unwrap_or_default(),
            ingredients: write.ingredients,
            tags: write.tags,
        };

        let recipe = match self.store.create_recipe(new_recipe).await {
            Ok(recipe) => recipe,
            Err(e) => {
                self.images.remove(&image_path).await;
                return Err(e.into());
            }
        };

        info!(recipe_id = recipe.id, author_id = author.id, "Recipe created");

        self.build_one(recipe, Some(author)).await
    }

    async fn update(
        &self,
        id: i32,
        editor: &User,
        request: RecipeWriteRequest,
    ) -> Result<RecipeDto, RecipeError> {
        let existing = self.existing(id).await?;
        if existing.author_id != editor.id {
            return Err(RecipeError::Forbidden);
        }

        let write = self.validate_write(request, true).await?;

        let new_image = match &write.image {
            Some(image) => Some(self.images.save(image).await?),
            None => None,
        };

        let changes = RecipeChanges {
            name: write.name,
            image: new_image.clone(),
            text: write.text,
            cooking_time: write.cooking_time,
            ingredients: write.ingredients,
            tags: write.tags,
        };

        let (recipe, replaced_image) = match self.store.update_recipe(id, changes).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                if let Some(path) = &new_image {
                    self.images.remove(path).await;
                }
                return Err(RecipeError::NotFound(id));
            }
            Err(e) => {
                if let Some(path) = &new_image {
                    self.images.remove(path).await;
                }
                return Err(e.into());
            }
        };

        if let Some(old) = replaced_image {
            self.images.remove(&old).await;
        }

        info!(recipe_id = id, "Recipe updated");

        self.build_one(recipe, Some(editor)).await
    }

    async fn delete(&self, id: i32, editor: &User) -> Result<(), RecipeError> {
        let existing = self.existing(id).await?;
        if existing.author_id != editor.id {
            return Err(RecipeError::Forbidden);
        }

        match self.store.delete_recipe(id).await? {
            Some(image) => self.images.remove(&image).await,
            None => warn!(recipe_id = id, "Recipe vanished before delete"),
        }

        info!(recipe_id = id, "Recipe deleted");
        Ok(())
    }

    async fn add_to_list(
        &self,
        kind: RecipeListKind,
        user: &User,
        recipe_id: i32,
    ) -> Result<RecipeShortDto, RecipeError> {
        let recipe = self.existing(recipe_id).await?;

        if !self.store.add_to_list(kind, user.id, recipe_id).await? {
            return Err(RecipeError::Rejected(format!(
                "Recipe is already in {}",
                kind.as_str()
            )));
        }

        Ok(self.short(&recipe))
    }

    async fn remove_from_list(
        &self,
        kind: RecipeListKind,
        user: &User,
        recipe_id: i32,
    ) -> Result<(), RecipeError> {
        self.existing(recipe_id).await?;

        if !self
            .store
            .remove_from_list(kind, user.id, recipe_id)
            .await?
        {
            return Err(RecipeError::Rejected(format!(
                "Recipe is not in {}",
                kind.as_str()
            )));
        }

        Ok(())
    }

    async fn list_favorites(
        &self,
        user: &User,
        page: u64,
    ) -> Result<Paginated<RecipeShortDto>, RecipeError> {
        let query = RecipeQuery {
            favorited_by: Some(user.id),
            ..RecipeQuery::default()
        };
        let (rows, total, page_size) = self.page_of(&query, page).await?;
        let results = rows.iter().map(|r| self.short(r)).collect();

        Ok(Paginated::new(page, page_size, total, results))
    }

    async fn shopping_list(&self, user: &User) -> Result<String, RecipeError> {
        let lines = self.store.shopping_list(user.id).await?;
        Ok(render_shopping_list(&lines))
    }
}
