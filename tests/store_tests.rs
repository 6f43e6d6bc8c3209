mod common;

use foodgram::config::Config;
use foodgram::db::{NewRecipe, NewUser, RecipeListKind, Store, User};

async fn open_store() -> (Store, Config, std::path::PathBuf) {
    let dir = std::env::temp_dir().join(format!("foodgram-store-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let config = common::test_config(&dir);
    let store = Store::with_pool_options(&config.general.database_path, 1, 1)
        .await
        .unwrap();
    (store, config, dir)
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        password: "correct-horse-battery".to_string(),
    }
}

async fn add_user(store: &Store, config: &Config, username: &str) -> User {
    store
        .create_user(new_user(username), &config.security)
        .await
        .unwrap()
        .expect("username and email should be free")
}

#[tokio::test]
async fn test_self_subscription_hits_check_constraint() {
    let (store, config, dir) = open_store().await;
    let user = add_user(&store, &config, "solo").await;

    let err = store.subscribe(user.id, user.id).await.unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("CHECK constraint failed"), "{message}");

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_duplicate_user_insert_reports_none() {
    let (store, config, dir) = open_store().await;
    add_user(&store, &config, "taken").await;

    let same_username = NewUser {
        email: "other@example.com".to_string(),
        ..new_user("taken")
    };
    assert!(
        store
            .create_user(same_username, &config.security)
            .await
            .unwrap()
            .is_none()
    );

    let same_email = NewUser {
        email: "taken@example.com".to_string(),
        ..new_user("fresh")
    };
    assert!(
        store
            .create_user(same_email, &config.security)
            .await
            .unwrap()
            .is_none()
    );

    assert!(!store.username_taken("fresh").await.unwrap());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_duplicate_subscription_reports_false() {
    let (store, config, dir) = open_store().await;
    let reader = add_user(&store, &config, "reader").await;
    let author = add_user(&store, &config, "author").await;

    assert!(store.subscribe(reader.id, author.id).await.unwrap());
    assert!(!store.subscribe(reader.id, author.id).await.unwrap());
    assert!(store.unsubscribe(reader.id, author.id).await.unwrap());
    assert!(!store.unsubscribe(reader.id, author.id).await.unwrap());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_recipe_delete_cascades_lists() {
    let (store, config, dir) = open_store().await;
    let user = add_user(&store, &config, "cook").await;
    store.insert_ingredient_if_missing("соль", "г").await.unwrap();
    assert!(!store.insert_ingredient_if_missing("соль", "г").await.unwrap());
    let salt = store.list_ingredients(None).await.unwrap()[0].id;
    let tag = store.list_tags().await.unwrap()[0].id;

    let recipe = store
        .create_recipe(NewRecipe {
            author_id: user.id,
            name: "Salted".to_string(),
            image: "recipes/images/x.png".to_string(),
            text: "Salt it".to_string(),
            cooking_time: 5,
            ingredients: vec![(salt, 3)],
            tags: vec![tag],
        })
        .await
        .unwrap();

    assert!(
        store
            .add_to_list(RecipeListKind::ShoppingCart, user.id, recipe.id)
            .await
            .unwrap()
    );
    assert_eq!(store.shopping_list(user.id).await.unwrap().len(), 1);

    let image = store.delete_recipe(recipe.id).await.unwrap();
    assert_eq!(image.as_deref(), Some("recipes/images/x.png"));
    assert!(store.shopping_list(user.id).await.unwrap().is_empty());

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_ingredient_name_filter() {
    let (store, _config, dir) = open_store().await;
    for (name, unit) in [("Sugar", "g"), ("brown sugar", "g"), ("Сахар", "г"), ("salt", "g")] {
        store.insert_ingredient_if_missing(name, unit).await.unwrap();
    }

    let names = |rows: Vec<foodgram::db::Ingredient>| -> Vec<String> {
        rows.into_iter().map(|i| i.name).collect()
    };

    let found = store.list_ingredients(Some("SUG")).await.unwrap();
    assert_eq!(names(found), vec!["Sugar", "brown sugar"]);

    let found = store.list_ingredients(Some("сах")).await.unwrap();
    assert_eq!(names(found), vec!["Сахар"]);

    assert!(store.list_ingredients(Some("_")).await.unwrap().is_empty());
    assert!(store.list_ingredients(Some("%")).await.unwrap().is_empty());
    assert_eq!(store.list_ingredients(Some("")).await.unwrap().len(), 4);

    let _ = std::fs::remove_dir_all(dir);
}
