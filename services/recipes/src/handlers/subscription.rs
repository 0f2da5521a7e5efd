use axum::{
    Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use larder_core::extract::{PathParams, QueryParams};

use crate::config::RecipesConfig;
use crate::domain::types::AuthorView;
use crate::error::RecipesServiceError;
use crate::handlers::identity::CurrentUser;
use crate::handlers::pagination::{PageQuery, Paginated};
use crate::handlers::recipe::ShortRecipeResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::subscription::{
    ListSubscriptionsUseCase, SubscribeUseCase, UnsubscribeUseCase,
};

/// User object plus the author's newest recipes.
#[derive(Debug, Serialize)]
pub struct AuthorResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub recipes: Vec<ShortRecipeResponse>,
    pub recipes_count: u64,
}

impl AuthorResponse {
    fn from_view(view: AuthorView, config: &RecipesConfig) -> Self {
        Self {
            user: UserResponse::from_view(view.author, config),
            recipes: view
                .recipes
                .into_iter()
                .map(|r| ShortRecipeResponse::from_summary(r, config))
                .collect(),
            recipes_count: view.recipes_count,
        }
    }
}

#[derive(Deserialize)]
pub struct SubscriptionQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default, deserialize_with = "larder_core::de::lenient_u64")]
    pub recipes_limit: Option<u64>,
}

// ── GET /api/users/subscriptions/ ────────────────────────────────────────────

pub async fn list_subscriptions(
    me: CurrentUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    QueryParams(query): QueryParams<SubscriptionQuery>,
) -> Result<Json<Paginated<AuthorResponse>>, RecipesServiceError> {
    let usecase = ListSubscriptionsUseCase {
        recipes: state.recipe_repo(),
        subscriptions: state.subscription_repo(),
    };
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request();
    let page = usecase
        .execute(me.user_id, request, query.recipes_limit)
        .await?
        .map(|view| AuthorResponse::from_view(view, &state.config));
    Ok(Json(Paginated::new(
        page,
        request,
        &uri,
        &state.config.public_url,
    )))
}

// ── POST/DELETE /api/users/{id}/subscribe/ ───────────────────────────────────

pub async fn subscribe(
    me: CurrentUser,
    State(state): State<AppState>,
    PathParams(author_id): PathParams<i32>,
    QueryParams(query): QueryParams<SubscriptionQuery>,
) -> Result<(StatusCode, Json<AuthorResponse>), RecipesServiceError> {
    let usecase = SubscribeUseCase {
        users: state.user_repo(),
        recipes: state.recipe_repo(),
        subscriptions: state.subscription_repo(),
    };
    let view = usecase
        .execute(me.user_id, author_id, query.recipes_limit)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthorResponse::from_view(view, &state.config)),
    ))
}

pub async fn unsubscribe(
    me: CurrentUser,
    State(state): State<AppState>,
    PathParams(author_id): PathParams<i32>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = UnsubscribeUseCase {
        users: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    usecase.execute(me.user_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
