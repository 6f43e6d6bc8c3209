//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::api::pagination::{Paginated, page_exists};
use crate::api::types::{
    RecipeShortDto, RegisterRequest, SetPasswordRequest, SubscriptionDto, UserProfileDto,
};
use crate::api::validation::{
    Validator, validate_email, validate_password, validate_person_name, validate_username,
};
use crate::config::Config;
use crate::db::{NewUser, Store, User};
use crate::services::image::ImageService;
use crate::services::user_service::{UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    images: Arc<ImageService>,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmUserService {
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

    async fn page_size(&self) -> u64 {
        self.config.read().await.recipes.page_size
    }

    async fn existing(&self, id: i32) -> Result<User, UserError> {
        self.store
            .get_user(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    async fn subscription_view(&self, author: User) -> Result<SubscriptionDto, UserError> {
        let recipes: Vec<RecipeShortDto> = self
            .store
            .list_recipes_by_author(author.id)
            .await?
            .into_iter()
            .map(|r| RecipeShortDto {
                id: r.id,
                name: r.name,
                image: self.images.url_for(&r.image),
                cooking_time: r.cooking_time,
            })
            .collect();

        Ok(SubscriptionDto {
            id: author.id,
            email: author.email,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            is_subscribed: true,
            recipes_count: recipes.len() as u64,
            recipes,
        })
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, request: RegisterRequest) -> Result<UserProfileDto, UserError> {
        let mut v = Validator::new();
        v.check("email", validate_email(&request.email));
        v.check("username", validate_username(&request.username));
        v.check("first_name", validate_person_name(&request.first_name));
        v.check("last_name", validate_person_name(&request.last_name));
        v.check("password", validate_password(&request.password));

        if v.is_valid() {
            if self.store.username_taken(&request.username).await? {
                v.add("username", "A user with that username already exists");
            }
            if self.store.email_taken(&request.email).await? {
                v.add("email", "A user with that email already exists");
            }
        }
        v.finish().map_err(UserError::Invalid)?;

        let security = self.config.read().await.security.clone();
        let (username, email) = (request.username.clone(), request.email.clone());
        let user = self
            .store
            .create_user(
                NewUser {
                    email: request.email,
                    username: request.username,
                    first_name: request.first_name,
                    last_name: request.last_name,
                    password: request.password,
                },
                &security,
            )
            .await?;

        // A concurrent registration took the username or email after the checks above.
        let Some(user) = user else {
            let email_taken = self.store.email_taken(&email).await?;
            let mut v = Validator::new();
            if email_taken {
                v.add("email", "A user with that email already exists");
            }
            if !email_taken || self.store.username_taken(&username).await? {
                v.add("username", "A user with that username already exists");
            }
            return Err(UserError::Invalid(v.into_errors()));
        };

        info!(user_id = user.id, username = %user.username, "User registered");

        Ok(UserProfileDto::from_user(user, false))
    }

    async fn list(
        &self,
        page: u64,
        viewer: Option<&User>,
    ) -> Result<Paginated<UserProfileDto>, UserError> {
        let page_size = self.page_size().await;
        let (users, total) = self.store.list_users(page, page_size).await?;

        if !page_exists(page, page_size, total) {
            return Err(UserError::PageNotFound(page));
        }

        let followed = match viewer {
            Some(viewer) => {
                let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
                self.store.followed_among(viewer.id, &ids).await?
            }
            None => Default::default(),
        };

        let results = users
            .into_iter()
            .map(|u| {
                let is_subscribed = followed.contains(&u.id);
                UserProfileDto::from_user(u, is_subscribed)
            })
            .collect();

        Ok(Paginated::new(page, page_size, total, results))
    }

    async fn get(&self, id: i32, viewer: Option<&User>) -> Result<UserProfileDto, UserError> {
        let user = self.existing(id).await?;

        let is_subscribed = match viewer {
            Some(viewer) => self
                .store
                .followed_among(viewer.id, &[id])
                .await?
                .contains(&id),
            None => false,
        };

        Ok(UserProfileDto::from_user(user, is_subscribed))
    }

    async fn set_password(
        &self,
        user: &User,
        request: SetPasswordRequest,
    ) -> Result<(), UserError> {
        let mut v = Validator::new();
        v.check("new_password", validate_password(&request.new_password));
        if request.current_password == request.new_password {
            v.add(
                "new_password",
                "New password must be different from current password",
            );
        }
        v.finish().map_err(UserError::Invalid)?;

        if !self
            .store
            .check_user_password(user.id, &request.current_password)
            .await?
        {
            let mut v = Validator::new();
            v.add("current_password", "Current password is incorrect");
            v.finish().map_err(UserError::Invalid)?;
        }

        let security = self.config.read().await.security.clone();
        self.store
            .update_user_password(user.id, &request.new_password, &security)
            .await?;

        info!(user_id = user.id, "Password changed");
        Ok(())
    }

    async fn subscribe(&self, user: &User, author_id: i32) -> Result<SubscriptionDto, UserError> {
        let author = self.existing(author_id).await?;

        if author.id == user.id {
            return Err(UserError::Rejected(
                "You cannot subscribe to yourself".to_string(),
            ));
        }

        if !self.store.subscribe(user.id, author.id).await? {
            return Err(UserError::Rejected(
                "Already subscribed to this user".to_string(),
            ));
        }

        self.subscription_view(author).await
    }

    async fn unsubscribe(&self, user: &User, author_id: i32) -> Result<(), UserError> {
        self.existing(author_id).await?;

        if !self.store.unsubscribe(user.id, author_id).await? {
            return Err(UserError::Rejected(
                "You are not subscribed to this user".to_string(),
            ));
        }

        Ok(())
    }

    async fn subscriptions(
        &self,
        user: &User,
        page: u64,
    ) -> Result<Paginated<SubscriptionDto>, UserError> {
        let page_size = self.page_size().await;
        let (authors, total) = self.store.subscribed_authors(user.id, page, page_size).await?;

        if !page_exists(page, page_size, total) {
            return Err(UserError::PageNotFound(page));
        }

        let mut results = Vec::with_capacity(authors.len());
        for author in authors {
            results.push(self.subscription_view(author).await?);
        }

        Ok(Paginated::new(page, page_size, total, results))
    }
}
