use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;

pub mod migrator;
pub mod repositories;

pub use repositories::ingredient::{Ingredient, IngredientAmount};
pub use repositories::recipe::{NewRecipe, Recipe, RecipeChanges, RecipeQuery};
pub use repositories::recipe_lists::RecipeListKind;
pub use repositories::shopping_list::ShoppingListLine;
pub use repositories::tag::Tag;
pub use repositories::user::{NewUser, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        if !path_str.starts_with(":memory:") {
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn tag_repo(&self) -> repositories::tag::TagRepository {
        repositories::tag::TagRepository::new(self.conn.clone())
    }

    fn ingredient_repo(&self) -> repositories::ingredient::IngredientRepository {
        repositories::ingredient::IngredientRepository::new(self.conn.clone())
    }

    fn recipe_repo(&self) -> repositories::recipe::RecipeRepository {
        repositories::recipe::RecipeRepository::new(self.conn.clone())
    }

    fn recipe_list_repo(&self) -> repositories::recipe_lists::RecipeListRepository {
        repositories::recipe_lists::RecipeListRepository::new(self.conn.clone())
    }

    fn subscription_repo(&self) -> repositories::subscription::SubscriptionRepository {
        repositories::subscription::SubscriptionRepository::new(self.conn.clone())
    }

    fn shopping_list_repo(&self) -> repositories::shopping_list::ShoppingListRepository {
        repositories::shopping_list::ShoppingListRepository::new(self.conn.clone())
    }

    // ========== Tags ==========

    pub async fn list_tags(&self) -> Result<Vec<Tag>> {
        self.tag_repo().list().await
    }

    pub async fn get_tag(&self, id: i32) -> Result<Option<Tag>> {
        self.tag_repo().get(id).await
    }

    pub async fn create_tag(&self, name: &str, color: &str, slug: &str) -> Result<Tag> {
        self.tag_repo().create(name, color, slug).await
    }

    pub async fn existing_tag_ids(&self, ids: &[i32]) -> Result<HashSet<i32>> {
        self.tag_repo().existing_ids(ids).await
    }

    pub async fn tags_for_recipes(&self, recipe_ids: &[i32]) -> Result<HashMap<i32, Vec<Tag>>> {
        self.tag_repo().for_recipes(recipe_ids).await
    }

    // ========== Ingredients ==========

    pub async fn list_ingredients(&self, name: Option<&str>) -> Result<Vec<Ingredient>> {
        self.ingredient_repo().list(name).await
    }

    pub async fn get_ingredient(&self, id: i32) -> Result<Option<Ingredient>> {
        self.ingredient_repo().get(id).await
    }

    pub async fn existing_ingredient_ids(&self, ids: &[i32]) -> Result<HashSet<i32>> {
        self.ingredient_repo().existing_ids(ids).await
    }

    pub async fn insert_ingredient_if_missing(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<bool> {
        self.ingredient_repo()
            .insert_if_missing(name, measurement_unit)
            .await
    }

    pub async fn ingredients_for_recipes(
        &self,
        recipe_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<IngredientAmount>>> {
        self.ingredient_repo().for_recipes(recipe_ids).await
    }

    // ========== Recipes ==========

    pub async fn get_recipe(&self, id: i32) -> Result<Option<Recipe>> {
        self.recipe_repo().get(id).await
    }

    pub async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe> {
        self.recipe_repo().create(recipe).await
    }

    pub async fn update_recipe(
        &self,
        id: i32,
        changes: RecipeChanges,
    ) -> Result<Option<(Recipe, Option<String>)>> {
        self.recipe_repo().update(id, changes).await
    }

    pub async fn delete_recipe(&self, id: i32) -> Result<Option<String>> {
        self.recipe_repo().delete(id).await
    }

    pub async fn list_recipes(
        &self,
        query: &RecipeQuery,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<Recipe>, u64)> {
        self.recipe_repo().list_page(query, page, page_size).await
    }

    pub async fn list_recipes_by_author(&self, author_id: i32) -> Result<Vec<Recipe>> {
        self.recipe_repo().list_by_author(author_id).await
    }

    // ========== Favorites / Shopping cart ==========

    pub async fn add_to_list(
        &self,
        kind: RecipeListKind,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool> {
        self.recipe_list_repo().add(kind, user_id, recipe_id).await
    }

    pub async fn remove_from_list(
        &self,
        kind: RecipeListKind,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool> {
        self.recipe_list_repo().remove(kind, user_id, recipe_id).await
    }

    pub async fn list_contains(
        &self,
        kind: RecipeListKind,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>> {
        self.recipe_list_repo()
            .contains(kind, user_id, recipe_ids)
            .await
    }

    pub async fn shopping_list(&self, user_id: i32) -> Result<Vec<ShoppingListLine>> {
        self.shopping_list_repo().aggregate(user_id).await
    }

    // ========== Subscriptions ==========

    pub async fn subscribe(&self, user_id: i32, author_id: i32) -> Result<bool> {
        self.subscription_repo().add(user_id, author_id).await
    }

    pub async fn unsubscribe(&self, user_id: i32, author_id: i32) -> Result<bool> {
        self.subscription_repo().remove(user_id, author_id).await
    }

    pub async fn followed_among(&self, user_id: i32, author_ids: &[i32]) -> Result<HashSet<i32>> {
        self.subscription_repo()
            .followed_among(user_id, author_ids)
            .await
    }

    pub async fn subscribed_authors(
        &self,
        user_id: i32,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<User>, u64)> {
        self.subscription_repo()
            .authors_page(user_id, page, page_size)
            .await
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        new_user: NewUser,
        config: &SecurityConfig,
    ) -> Result<Option<User>> {
        self.user_repo().create(new_user, config).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_users(&self, ids: &[i32]) -> Result<Vec<User>> {
        self.user_repo().get_by_ids(ids).await
    }

    pub async fn username_taken(&self, username: &str) -> Result<bool> {
        self.user_repo().exists_by_username(username).await
    }

    pub async fn email_taken(&self, email: &str) -> Result<bool> {
        self.user_repo().exists_by_email(email).await
    }

    pub async fn list_users(&self, page: u64, page_size: u64) -> Result<(Vec<User>, u64)> {
        self.user_repo().list_page(page, page_size).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn check_user_password(&self, id: i32, password: &str) -> Result<bool> {
        self.user_repo().verify_password_by_id(id, password).await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, config)
            .await
    }

    pub async fn get_user_by_token(&self, token: &str) -> Result<Option<User>> {
        self.user_repo().get_by_token(token).await
    }

    pub async fn issue_user_token(&self, id: i32) -> Result<String> {
        self.user_repo().issue_token(id).await
    }

    pub async fn clear_user_token(&self, id: i32) -> Result<()> {
        self.user_repo().clear_token(id).await
    }
}
