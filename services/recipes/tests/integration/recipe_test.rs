use axum::http::{StatusCode, header};
use serde_json::{Value, json};

use larder_domain::user::UserRole;
use larder_testing::auth::authorization;
use larder_testing::fixture::recipe_payload;

use crate::helpers::{PUBLIC_URL, TestApp, spawn_app};

/// Two tags, two ingredients, and a signed-in author.
struct Kitchen {
    app: TestApp,
    author_id: i32,
    token: String,
    lunch: i32,
    dinner: i32,
    salt: i32,
    water: i32,
}

async fn kitchen() -> Kitchen {
    let app = spawn_app().await;
    let (author_id, token) = app.user("chef").await;
    let lunch = app.seed_tag("Lunch", "lunch").await;
    let dinner = app.seed_tag("Dinner", "dinner").await;
    let salt = app.seed_ingredient("salt", "g").await;
    let water = app.seed_ingredient("Water", "ml").await;
    Kitchen {
        app,
        author_id,
        token,
        lunch,
        dinner,
        salt,
        water,
    }
}

fn names(body: &Value) -> Vec<&str> {
    body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn should_create_recipe_and_render_full_object() {
    let k = kitchen().await;
    let (name, value) = authorization(&k.token);
    let resp = k
        .app
        .server
        .post("/api/recipes/")
        .add_header(name, value)
        .json(&recipe_payload("Soup", &[(k.water, 500), (k.salt, 5)], &[k.lunch]))
        .await;
    resp.assert_status(StatusCode::CREATED);

    let body = resp.json::<Value>();
    assert_eq!(body["name"], "Soup");
    assert_eq!(body["cooking_time"], 15);
    assert_eq!(body["author"]["id"], k.author_id);
    assert_eq!(body["author"]["is_subscribed"], false);
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["is_in_shopping_cart"], false);
    assert_eq!(body["tags"][0]["slug"], "lunch");
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 2);
    assert_eq!(body["ingredients"][0]["id"], k.salt);
    assert_eq!(body["ingredients"][0]["measurement_unit"], "g");
    assert_eq!(body["ingredients"][0]["amount"], 5);

    let image = body["image"].as_str().unwrap();
    let path = image.strip_prefix(&format!("{PUBLIC_URL}/media/")).unwrap();
    assert!(path.starts_with("recipes/"));
    assert!(k.app.media_root.join(path).exists());
}

#[tokio::test]
async fn should_require_login_to_create() {
    let k = kitchen().await;
    let resp = k
        .app
        .server
        .post("/api/recipes/")
        .json(&recipe_payload("Soup", &[(k.water, 500)], &[k.lunch]))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_invalid_recipe_bodies() {
    let k = kitchen().await;
    let cases = [
        recipe_payload("Soup", &[], &[k.lunch]),
        recipe_payload("Soup", &[(k.water, 500)], &[]),
        recipe_payload("Soup", &[(k.water, 500), (k.water, 10)], &[k.lunch]),
        recipe_payload("Soup", &[(k.water, 0)], &[k.lunch]),
        recipe_payload("Soup", &[(k.water, 500)], &[k.lunch, k.lunch]),
        recipe_payload("Soup", &[(9999, 500)], &[k.lunch]),
        recipe_payload("Soup", &[(k.water, 500)], &[9999]),
        recipe_payload("   ", &[(k.water, 500)], &[k.lunch]),
    ];
    for body in cases {
        let (name, value) = authorization(&k.token);
        let resp = k
            .app
            .server
            .post("/api/recipes/")
            .add_header(name, value)
            .json(&body)
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(resp.json::<Value>()["kind"], "INVALID_FIELD", "{body}");
    }

    let mut body = recipe_payload("Soup", &[(k.water, 500)], &[k.lunch]);
    body["cooking_time"] = json!(0);
    let (name, value) = authorization(&k.token);
    k.app
        .server
        .post("/api/recipes/")
        .add_header(name, value)
        .json(&body)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_only_let_author_or_staff_update() {
    let k = kitchen().await;
    let id = k
        .app
        .create_recipe(&k.token, &recipe_payload("Soup", &[(k.water, 500)], &[k.lunch]))
        .await;
    let (stranger_id, stranger) = k.app.user("stranger").await;
    let mut update = recipe_payload("Better soup", &[(k.salt, 3)], &[k.dinner]);
    update.as_object_mut().unwrap().remove("image");

    let (name, value) = authorization(&stranger);
    let resp = k
        .app
        .server
        .patch(&format!("/api/recipes/{id}/"))
        .add_header(name, value)
        .json(&update)
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);

    let (name, value) = authorization(&k.token);
    let resp = k
        .app
        .server
        .patch(&format!("/api/recipes/{id}/"))
        .add_header(name, value)
        .json(&update)
        .await;
    resp.assert_status_ok();
    let body = resp.json::<Value>();
    assert_eq!(body["name"], "Better soup");
    assert_eq!(body["tags"][0]["slug"], "dinner");
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 1);
    assert_eq!(body["ingredients"][0]["name"], "salt");

    // Roles are read from the database on every request.
    k.app.set_role(stranger_id, UserRole::Staff).await;
    update["name"] = json!("Staff soup");
    let (name, value) = authorization(&stranger);
    let resp = k
        .app
        .server
        .patch(&format!("/api/recipes/{id}/"))
        .add_header(name, value)
        .json(&update)
        .await;
    resp.assert_status_ok();
    assert_eq!(resp.json::<Value>()["author"]["id"], k.author_id);
}

#[tokio::test]
async fn should_replace_image_on_update() {
    let k = kitchen().await;
    let created = {
        let (name, value) = authorization(&k.token);
        k.app
            .server
            .post("/api/recipes/")
            .add_header(name, value)
            .json(&recipe_payload("Soup", &[(k.water, 500)], &[k.lunch]))
            .await
            .json::<Value>()
    };
    let id = created["id"].as_i64().unwrap();
    let prefix = format!("{PUBLIC_URL}/media/");
    let old = created["image"].as_str().unwrap().strip_prefix(&prefix).unwrap().to_owned();

    let (name, value) = authorization(&k.token);
    let updated = k
        .app
        .server
        .patch(&format!("/api/recipes/{id}/"))
        .add_header(name, value)
        .json(&recipe_payload("Soup", &[(k.water, 500)], &[k.lunch]))
        .await
        .json::<Value>();
    let new = updated["image"].as_str().unwrap().strip_prefix(&prefix).unwrap();
    assert_ne!(new, old);
    assert!(k.app.media_root.join(new).exists());
    assert!(!k.app.media_root.join(&old).exists());
}

#[tokio::test]
async fn should_delete_recipe() {
    let k = kitchen().await;
    let id = k
        .app
        .create_recipe(&k.token, &recipe_payload("Soup", &[(k.water, 500)], &[k.lunch]))
        .await;
    let (_, stranger) = k.app.user("stranger").await;

    let (name, value) = authorization(&stranger);
    k.app
        .server
        .delete(&format!("/api/recipes/{id}/"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let (name, value) = authorization(&k.token);
    k.app
        .server
        .delete(&format!("/api/recipes/{id}/"))
        .add_header(name, value)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let resp = k.app.server.get(&format!("/api/recipes/{id}/")).await;
    resp.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(resp.json::<Value>()["kind"], "RECIPE_NOT_FOUND");
}

#[tokio::test]
async fn should_filter_recipes_by_tags_and_author() {
    let k = kitchen().await;
    let (_, other) = k.app.user("other").await;
    k.app
        .create_recipe(&k.token, &recipe_payload("Borscht", &[(k.water, 1)], &[k.lunch]))
        .await;
    k.app
        .create_recipe(&k.token, &recipe_payload("Curry", &[(k.water, 1)], &[k.dinner]))
        .await;
    k.app
        .create_recipe(
            &other,
            &recipe_payload("Au gratin", &[(k.salt, 1)], &[k.lunch, k.dinner]),
        )
        .await;

    let body = k.app.server.get("/api/recipes/").await.json::<Value>();
    assert_eq!(body["count"], 3);
    assert_eq!(names(&body), ["Au gratin", "Borscht", "Curry"]);

    let body = k
        .app
        .server
        .get("/api/recipes/?tags=lunch")
        .await
        .json::<Value>();
    assert_eq!(names(&body), ["Au gratin", "Borscht"]);

    let body = k
        .app
        .server
        .get("/api/recipes/?tags=lunch&tags=dinner")
        .await
        .json::<Value>();
    assert_eq!(body["count"], 3);

    let body = k
        .app
        .server
        .get(&format!("/api/recipes/?author={}", k.author_id))
        .await
        .json::<Value>();
    assert_eq!(names(&body), ["Borscht", "Curry"]);

    let body = k
        .app
        .server
        .get("/api/recipes/?tags=brunch")
        .await
        .json::<Value>();
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn should_ignore_collection_flags_for_anonymous_viewers() {
    let k = kitchen().await;
    k.app
        .create_recipe(&k.token, &recipe_payload("Soup", &[(k.water, 1)], &[k.lunch]))
        .await;
    let body = k
        .app
        .server
        .get("/api/recipes/?is_favorited=1&is_in_shopping_cart=1")
        .await
        .json::<Value>();
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn should_page_recipes_and_keep_filters_in_links() {
    let k = kitchen().await;
    for name in ["A", "B", "C"] {
        k.app
            .create_recipe(&k.token, &recipe_payload(name, &[(k.water, 1)], &[k.lunch]))
            .await;
    }
    let body = k
        .app
        .server
        .get("/api/recipes/?tags=lunch&limit=2")
        .await
        .json::<Value>();
    assert_eq!(names(&body), ["A", "B"]);
    assert_eq!(
        body["next"],
        format!("{PUBLIC_URL}/api/recipes/?tags=lunch&limit=2&page=2")
    );

    let body = k
        .app
        .server
        .get("/api/recipes/?limit=2&page=9")
        .await
        .json::<Value>();
    assert_eq!(body["count"], 3);
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn should_issue_and_follow_short_link() {
    let k = kitchen().await;
    let id = k
        .app
        .create_recipe(&k.token, &recipe_payload("Soup", &[(k.water, 1)], &[k.lunch]))
        .await;

    let resp = k.app.server.get(&format!("/api/recipes/{id}/get-link/")).await;
    resp.assert_status_ok();
    let link = resp.json::<Value>()["short-link"]
        .as_str()
        .unwrap()
        .to_owned();
    let path = link.strip_prefix(PUBLIC_URL).unwrap();
    assert!(path.starts_with("/s/"));

    let resp = k.app.server.get(path).await;
    resp.assert_status(StatusCode::FOUND);
    assert_eq!(resp.header(header::LOCATION), format!("/recipes/{id}"));

    k.app
        .server
        .get("/api/recipes/9999/get-link/")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    k.app
        .server
        .get("/s/not-a-code")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_restrict_tag_creation_to_admins() {
    let app = spawn_app().await;
    let (id, token) = app.user("anna").await;
    let body = json!({ "name": "Breakfast", "slug": "breakfast" });

    let (name, value) = authorization(&token);
    app.server
        .post("/api/tags/")
        .add_header(name, value)
        .json(&body)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.set_role(id, UserRole::Admin).await;
    let (name, value) = authorization(&token);
    let resp = app
        .server
        .post("/api/tags/")
        .add_header(name, value)
        .json(&body)
        .await;
    resp.assert_status(StatusCode::CREATED);
    let tag_id = resp.json::<Value>()["id"].as_i64().unwrap();

    let tag = app
        .server
        .get(&format!("/api/tags/{tag_id}/"))
        .await
        .json::<Value>();
    assert_eq!(tag["slug"], "breakfast");
    let tags = app.server.get("/api/tags/").await.json::<Value>();
    assert_eq!(tags.as_array().unwrap().len(), 1);

    let (name, value) = authorization(&token);
    let resp = app
        .server
        .post("/api/tags/")
        .add_header(name, value)
        .json(&body)
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "TAG_ALREADY_EXISTS");
}

#[tokio::test]
async fn should_search_ingredients_by_prefix() {
    let app = spawn_app().await;
    app.seed_ingredient("Salt", "g").await;
    app.seed_ingredient("salmon", "g").await;
    app.seed_ingredient("sugar", "g").await;
    app.seed_ingredient("sea salt", "g").await;

    let found = app
        .server
        .get("/api/ingredients/?name=SAL")
        .await
        .json::<Value>();
    let mut names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["Salt", "salmon"]);

    let all = app.server.get("/api/ingredients/").await.json::<Value>();
    assert_eq!(all.as_array().unwrap().len(), 4);

    app.server
        .get("/api/ingredients/9999/")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
