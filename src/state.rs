use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ImageService, RecipeService, SeaOrmAuthService, SeaOrmRecipeService,
    SeaOrmUserService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub image_service: Arc<ImageService>,

    pub recipe_service: Arc<dyn RecipeService>,

    pub user_service: Arc<dyn UserService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let image_service = Arc::new(ImageService::new(&config.media));
        let config_arc = Arc::new(RwLock::new(config));

        let recipe_service = Arc::new(SeaOrmRecipeService::new(
            store.clone(),
            image_service.clone(),
            config_arc.clone(),
        )) as Arc<dyn RecipeService + Send + Sync + 'static>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            image_service.clone(),
            config_arc.clone(),
        )) as Arc<dyn UserService + Send + Sync + 'static>;

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone()))
            as Arc<dyn AuthService + Send + Sync + 'static>;

        Ok(Self {
            config: config_arc,
            store,
            image_service,
            recipe_service,
            user_service,
            auth_service,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
