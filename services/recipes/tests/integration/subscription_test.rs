use axum::http::StatusCode;
use serde_json::Value;

use larder_testing::auth::authorization;
use larder_testing::fixture::recipe_payload;

use crate::helpers::{TestApp, spawn_app};

/// Author with three recipes, newest last.
async fn author_with_recipes(app: &TestApp) -> i32 {
    let (id, token) = app.user("chef").await;
    let tag = app.seed_tag("Lunch", "lunch").await;
    let water = app.seed_ingredient("Water", "ml").await;
    for name in ["First", "Second", "Third"] {
        app.create_recipe(&token, &recipe_payload(name, &[(water, 1)], &[tag]))
            .await;
    }
    id
}

#[tokio::test]
async fn should_subscribe_with_limited_recipes() {
    let app = spawn_app().await;
    let author = author_with_recipes(&app).await;
    let (_, token) = app.user("fan").await;

    let (name, value) = authorization(&token);
    let resp = app
        .server
        .post(&format!("/api/users/{author}/subscribe/?recipes_limit=2"))
        .add_header(name, value)
        .await;
    resp.assert_status(StatusCode::CREATED);
    let body = resp.json::<Value>();
    assert_eq!(body["id"], author);
    assert_eq!(body["username"], "chef");
    assert_eq!(body["is_subscribed"], true);
    assert_eq!(body["recipes_count"], 3);
    let recipes = body["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[0]["name"], "Third");
    assert_eq!(recipes[1]["name"], "Second");
}

#[tokio::test]
async fn should_ignore_unparsable_recipes_limit() {
    let app = spawn_app().await;
    let author = author_with_recipes(&app).await;
    let (_, token) = app.user("fan").await;

    let (name, value) = authorization(&token);
    let body = app
        .server
        .post(&format!("/api/users/{author}/subscribe/?recipes_limit=lots"))
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(body["recipes"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn should_reject_invalid_subscriptions() {
    let app = spawn_app().await;
    let author = author_with_recipes(&app).await;
    let (me, token) = app.user("fan").await;

    let (name, value) = authorization(&token);
    let resp = app
        .server
        .post(&format!("/api/users/{me}/subscribe/"))
        .add_header(name, value)
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "SELF_SUBSCRIPTION");

    let (name, value) = authorization(&token);
    app.server
        .post(&format!("/api/users/{author}/subscribe/"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = authorization(&token);
    let resp = app
        .server
        .post(&format!("/api/users/{author}/subscribe/"))
        .add_header(name, value)
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "ALREADY_SUBSCRIBED");

    let (name, value) = authorization(&token);
    let resp = app
        .server
        .post("/api/users/9999/subscribe/")
        .add_header(name, value)
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(resp.json::<Value>()["kind"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn should_list_subscriptions_and_mark_subscribed_users() {
    let app = spawn_app().await;
    let author = author_with_recipes(&app).await;
    let (_, token) = app.user("fan").await;

    let (name, value) = authorization(&token);
    app.server
        .post(&format!("/api/users/{author}/subscribe/"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = authorization(&token);
    let body = app
        .server
        .get("/api/users/subscriptions/?recipes_limit=1")
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["username"], "chef");
    assert_eq!(body["results"][0]["recipes_count"], 3);
    assert_eq!(body["results"][0]["recipes"].as_array().unwrap().len(), 1);

    let (name, value) = authorization(&token);
    let user = app
        .server
        .get(&format!("/api/users/{author}/"))
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(user["is_subscribed"], true);

    // Anonymous viewers never see a subscription.
    let user = app
        .server
        .get(&format!("/api/users/{author}/"))
        .await
        .json::<Value>();
    assert_eq!(user["is_subscribed"], false);

    app.server
        .get("/api/users/subscriptions/")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_unsubscribe_once() {
    let app = spawn_app().await;
    let author = author_with_recipes(&app).await;
    let (_, token) = app.user("fan").await;
    let url = format!("/api/users/{author}/subscribe/");

    let (name, value) = authorization(&token);
    app.server
        .post(&url)
        .add_header(name, value)
        .await
        .assert_status(StatusCode::CREATED);

    let (name, value) = authorization(&token);
    app.server
        .delete(&url)
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let (name, value) = authorization(&token);
    let resp = app.server.delete(&url).add_header(name, value).await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "NOT_SUBSCRIBED");

    let (name, value) = authorization(&token);
    let body = app
        .server
        .get("/api/users/subscriptions/")
        .add_header(name, value)
        .await
        .json::<Value>();
    assert_eq!(body["count"], 0);
}
