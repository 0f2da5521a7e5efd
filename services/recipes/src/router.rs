use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post, put},
};
use tower_http::services::ServeDir;

use larder_core::error::fallback;
use larder_core::middleware::with_http_layers;

use crate::handlers::{
    auth::{login, logout},
    ingredient::{create_ingredient, get_ingredient, search_ingredients},
    recipe::{
        add_favorite, add_to_cart, create_recipe, delete_recipe, download_shopping_cart,
        follow_short_link, get_link, get_recipe, list_recipes, remove_favorite,
        remove_from_cart, update_recipe,
    },
    subscription::{list_subscriptions, subscribe, unsubscribe},
    tag::{create_tag, get_tag, list_tags},
    user::{create_user, delete_avatar, get_me, get_user, list_users, set_avatar, set_password},
};
use crate::state::AppState;

/// Base64 images inflate uploads by a third; leave room for a few megabytes of image.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// `GET /healthz`: the process is up.
async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz`: ready once the database answers.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let media = ServeDir::new(&state.config.media_root);
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/api/auth/token/login/", post(login))
        .route("/api/auth/token/logout/", post(logout))
        // Users
        .route("/api/users/", get(list_users).post(create_user))
        .route("/api/users/me/", get(get_me))
        .route("/api/users/me/avatar/", put(set_avatar).delete(delete_avatar))
        .route("/api/users/set_password/", post(set_password))
        .route("/api/users/subscriptions/", get(list_subscriptions))
        .route("/api/users/{id}/", get(get_user))
        .route(
            "/api/users/{id}/subscribe/",
            post(subscribe).delete(unsubscribe),
        )
        // Tags
        .route("/api/tags/", get(list_tags).post(create_tag))
        .route("/api/tags/{id}/", get(get_tag))
        // Ingredients
        .route(
            "/api/ingredients/",
            get(search_ingredients).post(create_ingredient),
        )
        .route("/api/ingredients/{id}/", get(get_ingredient))
        // Recipes
        .route("/api/recipes/", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/download_shopping_cart/",
            get(download_shopping_cart),
        )
        .route(
            "/api/recipes/{id}/",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/api/recipes/{id}/get-link/", get(get_link))
        .route(
            "/api/recipes/{id}/favorite/",
            post(add_favorite).delete(remove_favorite),
        )
        .route(
            "/api/recipes/{id}/shopping_cart/",
            post(add_to_cart).delete(remove_from_cart),
        )
        .route("/s/{code}", get(follow_short_link))
        // Uploaded images
        .nest_service("/media", media)
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);
    with_http_layers(router)
}
