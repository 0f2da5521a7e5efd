use axum::http::{StatusCode, header};
use serde_json::Value;

use larder_testing::auth::authorization;
use larder_testing::fixture::recipe_payload;

use crate::helpers::spawn_app;

#[tokio::test]
async fn should_add_and_remove_favorite() {
    let app = spawn_app().await;
    let (_, token) = app.user("anna").await;
    let tag = app.seed_tag("Lunch", "lunch").await;
    let water = app.seed_ingredient("Water", "ml").await;
    let id = app
        .create_recipe(&token, &recipe_payload("Soup", &[(water, 500)], &[tag]))
        .await;
    let url = format!("/api/recipes/{id}/favorite/");

    let (name, value) = authorization(&token);
    let resp = app.server.post(&url).add_header(name, value).await;
    resp.assert_status(StatusCode::CREATED);
    let body = resp.json::<Value>();
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Soup");
    assert_eq!(body["cooking_time"], 15);
    assert!(body.get("text").is_none());

    let (name, value) = authorization(&token);
    let resp = app.server.post(&url).add_header(name, value).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "ALREADY_FAVORITED");

    let (name, value) = authorization(&token);
    let recipe = app
        .server
        .get(&format!("/api/recipes/{id}/"))
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(recipe["is_favorited"], true);
    assert_eq!(recipe["is_in_shopping_cart"], false);

    let (name, value) = authorization(&token);
    app.server
        .delete(&url)
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let (name, value) = authorization(&token);
    let resp = app.server.delete(&url).add_header(name, value).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "NOT_FAVORITED");
}

#[tokio::test]
async fn should_return_404_for_missing_recipe() {
    let app = spawn_app().await;
    let (_, token) = app.user("anna").await;
    let (name, value) = authorization(&token);
    let resp = app
        .server
        .post("/api/recipes/9999/shopping_cart/")
        .add_header(name, value)
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(resp.json::<Value>()["kind"], "RECIPE_NOT_FOUND");
}

#[tokio::test]
async fn should_filter_by_cart_membership() {
    let app = spawn_app().await;
    let (_, token) = app.user("anna").await;
    let tag = app.seed_tag("Lunch", "lunch").await;
    let water = app.seed_ingredient("Water", "ml").await;
    let soup = app
        .create_recipe(&token, &recipe_payload("Soup", &[(water, 500)], &[tag]))
        .await;
    app.create_recipe(&token, &recipe_payload("Tea", &[(water, 200)], &[tag]))
        .await;

    let (name, value) = authorization(&token);
    app.server
        .post(&format!("/api/recipes/{soup}/shopping_cart/"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = authorization(&token);
    let body = app
        .server
        .get("/api/recipes/?is_in_shopping_cart=1")
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Soup");
    assert_eq!(body["results"][0]["is_in_shopping_cart"], true);

    let (name, value) = authorization(&token);
    let body = app
        .server
        .get("/api/recipes/?is_in_shopping_cart=0")
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Tea");

    let (name, value) = authorization(&token);
    let body = app
        .server
        .get("/api/recipes/?is_favorited=1")
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn should_list_every_recipe_when_favorite_flag_is_off() {
    let app = spawn_app().await;
    let (_, token) = app.user("anna").await;
    let tag = app.seed_tag("Lunch", "lunch").await;
    let water = app.seed_ingredient("Water", "ml").await;
    let soup = app
        .create_recipe(&token, &recipe_payload("Soup", &[(water, 500)], &[tag]))
        .await;
    app.create_recipe(&token, &recipe_payload("Tea", &[(water, 200)], &[tag]))
        .await;

    let (name, value) = authorization(&token);
    app.server
        .post(&format!("/api/recipes/{soup}/favorite/"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = authorization(&token);
    let body = app
        .server
        .get("/api/recipes/?is_favorited=0")
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(body["count"], 2);

    let (name, value) = authorization(&token);
    let body = app
        .server
        .get("/api/recipes/?is_favorited=1")
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["name"], "Soup");
}

#[tokio::test]
async fn should_download_aggregated_shopping_list() {
    let app = spawn_app().await;
    let (_, token) = app.user("anna").await;
    let tag = app.seed_tag("Lunch", "lunch").await;
    let water = app.seed_ingredient("Water", "ml").await;
    let salt = app.seed_ingredient("salt", "g").await;
    let soup = app
        .create_recipe(
            &token,
            &recipe_payload("Soup", &[(water, 700), (salt, 10)], &[tag]),
        )
        .await;
    let brine = app
        .create_recipe(
            &token,
            &recipe_payload("Brine", &[(water, 300), (salt, 2)], &[tag]),
        )
        .await;
    for id in [soup, brine] {
        let (name, value) = authorization(&token);
        app.server
            .post(&format!("/api/recipes/{id}/shopping_cart/"))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::CREATED);
    }

    let (name, value) = authorization(&token);
    let resp = app
        .server
        .get("/api/recipes/download_shopping_cart/")
        .add_header(name, value)
        .await;
    resp.assert_status_ok();
    let disposition = resp.header(header::CONTENT_DISPOSITION);
    assert!(
        disposition
            .to_str()
            .unwrap()
            .contains("filename=\"shopping_list.txt\"")
    );
    assert!(
        resp.header(header::CONTENT_TYPE)
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    assert_eq!(
        resp.text(),
        "Shopping list\n\n1. salt (g) - 12\n2. Water (ml) - 1000\n"
    );
}

#[tokio::test]
async fn should_download_empty_notice_for_empty_cart() {
    let app = spawn_app().await;
    let (_, token) = app.user("anna").await;
    let (name, value) = authorization(&token);
    let resp = app
        .server
        .get("/api/recipes/download_shopping_cart/")
        .add_header(name, value)
        .await;
    resp.assert_status_ok();
    assert_eq!(resp.text(), "Shopping list\n\nYour shopping cart is empty.\n");
}
