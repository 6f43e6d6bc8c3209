#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use foodgram::api::{AppState, create_app_state_from_config, router};
use foodgram::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

/// 1x1 transparent PNG
pub const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub dir: PathBuf,
}

pub fn test_config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", dir.join("foodgram.db").display());
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;
    config.media.root = dir.join("media").display().to_string();
    config.observability.metrics_enabled = false;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub async fn spawn_app() -> TestApp {
    let dir = std::env::temp_dir().join(format!("foodgram-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();

    let state = create_app_state_from_config(test_config(&dir), None)
        .await
        .expect("Failed to create app state");
    let router = router(state.clone()).await;

    TestApp { router, state, dir }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = self.request_raw(method, uri, token, body).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Token {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    /// Registers a user and returns `(user_id, token)`.
    pub async fn register_and_login(&self, username: &str) -> (i64, String) {
        let email = format!("{username}@example.com");
        let (status, body) = self
            .request(
                Method::POST,
                "/api/users",
                None,
                Some(json!({
                    "email": email,
                    "username": username,
                    "first_name": "Test",
                    "last_name": "User",
                    "password": "correct-horse-battery",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/token/login",
                None,
                Some(json!({"email": email, "password": "correct-horse-battery"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        let token = body["data"]["auth_token"].as_str().unwrap().to_string();

        (id, token)
    }

    pub async fn ingredient(&self, name: &str, unit: &str) -> i64 {
        self.state
            .store()
            .insert_ingredient_if_missing(name, unit)
            .await
            .unwrap();
        self.state
            .store()
            .list_ingredients(Some(name))
            .await
            .unwrap()
            .into_iter()
            .find(|i| i.name == name && i.measurement_unit == unit)
            .map(|i| i64::from(i.id))
            .unwrap()
    }

    pub async fn first_tag_id(&self) -> i64 {
        let tags = self.state.store().list_tags().await.unwrap();
        i64::from(tags[0].id)
    }

    pub async fn create_recipe(&self, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, "/api/recipes", Some(token), Some(body))
            .await
    }
}

pub fn recipe_body(
    name: &str,
    ingredients: &[(i64, i64)],
    tags: &[i64],
    cooking_time: i64,
) -> Value {
    json!({
        "ingredients": ingredients
            .iter()
            .map(|(id, amount)| json!({"id": id, "amount": amount}))
            .collect::<Vec<_>>(),
        "tags": tags,
        "image": PNG_DATA_URI,
        "name": name,
        "text": "Mix everything and bake",
        "cooking_time": cooking_time,
    })
}
