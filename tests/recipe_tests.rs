mod common;

use axum::http::{Method, StatusCode};
use common::{recipe_body, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_create_then_fetch_recipe() {
    let app = spawn_app().await;
    let (author_id, token) = app.register_and_login("chef").await;
    let flour = app.ingredient("мука", "г").await;
    let tag = app.first_tag_id().await;

    let (status, body) = app
        .create_recipe(&token, recipe_body("Блины", &[(flour, 200)], &[tag], 30))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .request(Method::GET, &format!("/api/recipes/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let recipe = &body["data"];
    assert_eq!(recipe["name"], "Блины");
    assert_eq!(recipe["cooking_time"], 30);
    assert_eq!(recipe["author"]["id"], author_id);
    assert_eq!(recipe["author"]["is_subscribed"], false);
    assert_eq!(recipe["is_favorited"], false);
    assert_eq!(recipe["is_in_shopping_cart"], false);
    assert_eq!(recipe["tags"][0]["id"], tag);
    assert_eq!(recipe["ingredients"][0]["id"], flour);
    assert_eq!(recipe["ingredients"][0]["name"], "мука");
    assert_eq!(recipe["ingredients"][0]["measurement_unit"], "г");
    assert_eq!(recipe["ingredients"][0]["amount"], 200);
    assert!(
        recipe["image"]
            .as_str()
            .unwrap()
            .starts_with("/media/recipes/images/")
    );
}

#[tokio::test]
async fn test_duplicate_ingredient_rejected_without_side_effects() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("chef").await;
    let flour = app.ingredient("мука", "г").await;
    let tag = app.first_tag_id().await;

    let (status, body) = app
        .create_recipe(
            &token,
            recipe_body("Блины", &[(flour, 100), (flour, 50)], &[tag], 30),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["errors"]["ingredients"].is_array());

    let (status, body) = app.request(Method::GET, "/api/recipes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_unknown_ingredient_and_missing_tags_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("chef").await;

    let (status, body) = app
        .create_recipe(&token, recipe_body("Суп", &[(9999, 100)], &[], 30))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["tags"].is_array());

    let tag = app.first_tag_id().await;
    let (status, body) = app
        .create_recipe(&token, recipe_body("Суп", &[(9999, 100)], &[tag], 30))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"]["ingredients"][0],
        "Ingredient 9999 does not exist"
    );
    assert!(body["errors"]["tags"].is_null());

    let (_, body) = app.request(Method::GET, "/api/recipes", None, None).await;
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_cooking_time_lower_bound() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("chef").await;
    let salt = app.ingredient("соль", "г").await;
    let tag = app.first_tag_id().await;

    let (status, _) = app
        .create_recipe(&token, recipe_body("Quick", &[(salt, 1)], &[tag], 5))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .create_recipe(&token, recipe_body("Quicker", &[(salt, 1)], &[tag], 4))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["cooking_time"].is_array());
}

#[tokio::test]
async fn test_recipe_requires_auth_and_ownership() {
    let app = spawn_app().await;
    let (_, owner) = app.register_and_login("owner").await;
    let (_, other) = app.register_and_login("other").await;
    let salt = app.ingredient("соль", "г").await;
    let tag = app.first_tag_id().await;

    let body = recipe_body("Salted", &[(salt, 5)], &[tag], 10);

    let (status, _) = app
        .request(Method::POST, "/api/recipes", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            Method::GET,
            "/api/recipes",
            Some("not-a-real-token"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) = app.create_recipe(&owner, body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/recipes/{id}");

    let (status, _) = app
        .request(Method::PATCH, &uri, Some(&other), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_replaces_ingredients_and_requires_them() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("chef").await;
    let flour = app.ingredient("мука", "г").await;
    let milk = app.ingredient("молоко", "мл").await;
    let tag = app.first_tag_id().await;

    let (_, created) = app
        .create_recipe(&token, recipe_body("Блины", &[(flour, 200)], &[tag], 30))
        .await;
    let uri = format!("/api/recipes/{}", created["data"]["id"]);

    let (status, body) = app
        .request(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"name": "Блинчики"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["ingredients"].is_array());
    assert!(body["errors"]["tags"].is_array());

    let (status, body) = app
        .request(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({
                "name": "Блинчики",
                "ingredients": [{"id": milk, "amount": 300}],
                "tags": [tag],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "Блинчики");
    assert_eq!(body["data"]["cooking_time"], 30);
    let ingredients = body["data"]["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0]["id"], milk);
    assert_eq!(ingredients[0]["amount"], 300);
}

#[tokio::test]
async fn test_favorite_toggle_lifecycle() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("fan").await;
    let salt = app.ingredient("соль", "г").await;
    let tag = app.first_tag_id().await;

    let (_, created) = app
        .create_recipe(&token, recipe_body("Salted", &[(salt, 5)], &[tag], 10))
        .await;
    let id = created["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/recipes/{id}/favorite");

    let (status, body) = app.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["name"], "Salted");

    let (status, body) = app.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Recipe is already in favorites");

    let (status, body) = app
        .request(Method::GET, &format!("/api/recipes/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_favorited"], true);

    let (status, body) = app.request(Method::GET, "/api/favorites", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Recipe is not in favorites");

    let (status, _) = app.request(Method::POST, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request(Method::POST, "/api/recipes/9999/favorite", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_shopping_cart_export_sums_amounts() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("cook").await;
    let flour = app.ingredient("мука", "г").await;
    let eggs = app.ingredient("яйца", "шт").await;
    let tag = app.first_tag_id().await;

    for (name, flour_amount) in [("Блины", 100), ("Оладьи", 150)] {
        let (_, created) = app
            .create_recipe(
                &token,
                recipe_body(name, &[(flour, flour_amount), (eggs, 2)], &[tag], 20),
            )
            .await;
        let uri = format!("/api/recipes/{}/shopping_cart", created["data"]["id"]);
        let (status, _) = app.request(Method::POST, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, bytes) = app
        .request_raw(
            Method::GET,
            "/api/recipes/download_shopping_cart",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("мука - 250 г"), "{text}");
    assert!(text.contains("яйца - 4 шт"), "{text}");

    let (status, _) = app
        .request(Method::GET, "/api/recipes/download_shopping_cart", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_shopping_cart_keeps_units_apart() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("cook").await;
    let salt_grams = app.ingredient("соль", "г").await;
    let salt_spoons = app.ingredient("соль", "ч. л.").await;
    let tag = app.first_tag_id().await;

    for (name, ingredient, amount) in [("Рассол", salt_grams, 5), ("Суп", salt_spoons, 1)] {
        let (_, created) = app
            .create_recipe(&token, recipe_body(name, &[(ingredient, amount)], &[tag], 15))
            .await;
        let uri = format!("/api/recipes/{}/shopping_cart", created["data"]["id"]);
        let (status, _) = app.request(Method::POST, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, bytes) = app
        .request_raw(
            Method::GET,
            "/api/recipes/download_shopping_cart",
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes).unwrap();
    let salt_lines: Vec<&str> = text.lines().filter(|l| l.contains("соль")).collect();
    assert_eq!(salt_lines.len(), 2, "{text}");
    assert!(text.contains("соль - 5 г"), "{text}");
    assert!(text.contains("соль - 1 ч. л."), "{text}");
}

#[tokio::test]
async fn test_list_filters() {
    let app = spawn_app().await;
    let (author_id, token) = app.register_and_login("chef").await;
    let (_, other) = app.register_and_login("other").await;
    let salt = app.ingredient("соль", "г").await;
    let tags = app.state.store().list_tags().await.unwrap();
    let (first, second) = (i64::from(tags[0].id), i64::from(tags[1].id));

    let (_, a) = app
        .create_recipe(&token, recipe_body("Alpha", &[(salt, 1)], &[first], 10))
        .await;
    app.create_recipe(&other, recipe_body("Beta", &[(salt, 1)], &[second], 10))
        .await;

    let (_, body) = app
        .request(
            Method::GET,
            &format!("/api/recipes?tags={}", tags[0].slug),
            None,
            None,
        )
        .await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["name"], "Alpha");

    let (_, body) = app
        .request(
            Method::GET,
            &format!("/api/recipes?tags={}&tags={}", tags[0].slug, tags[1].slug),
            None,
            None,
        )
        .await;
    assert_eq!(body["data"]["count"], 2);

    let (_, body) = app
        .request(
            Method::GET,
            &format!("/api/recipes?author={author_id}"),
            None,
            None,
        )
        .await;
    assert_eq!(body["data"]["count"], 1);

    // anonymous viewers are not narrowed by personal flags
    let (_, body) = app
        .request(Method::GET, "/api/recipes?is_favorited=1", None, None)
        .await;
    assert_eq!(body["data"]["count"], 2);

    let fav = format!("/api/recipes/{}/favorite", a["data"]["id"]);
    app.request(Method::POST, &fav, Some(&other), None).await;

    let (_, body) = app
        .request(Method::GET, "/api/recipes?is_favorited=1", Some(&other), None)
        .await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["name"], "Alpha");
    assert_eq!(body["data"]["results"][0]["is_favorited"], true);

    let (status, _) = app
        .request(Method::GET, "/api/recipes?page=5", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination_links() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("chef").await;
    let salt = app.ingredient("соль", "г").await;
    let tag = app.first_tag_id().await;

    for i in 0..7 {
        app.create_recipe(
            &token,
            recipe_body(&format!("Recipe {i}"), &[(salt, 1)], &[tag], 10),
        )
        .await;
    }

    let (_, body) = app.request(Method::GET, "/api/recipes", None, None).await;
    assert_eq!(body["data"]["count"], 7);
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 6);
    assert_eq!(body["data"]["results"][0]["name"], "Recipe 6");
    assert_eq!(body["data"]["next"], 2);
    assert!(body["data"]["previous"].is_null());

    let (_, body) = app
        .request(Method::GET, "/api/recipes?page=2", None, None)
        .await;
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 1);
    assert!(body["data"]["next"].is_null());

    let (status, body) = app
        .request(Method::GET, "/api/recipes?page=18446744073709551615", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
