use axum::{
    Json,
    extract::{OriginalUri, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::response::Attachment;
use serde::{Deserialize, Serialize};

use larder_core::extract::{JsonBody, PathParams, QueryParams};

use crate::config::RecipesConfig;
use crate::domain::types::{IngredientAmount, RecipeCollection, RecipeSummary, RecipeView};
use crate::error::RecipesServiceError;
use crate::handlers::identity::CurrentUser;
use crate::handlers::pagination::{PageQuery, Paginated};
use crate::handlers::tag::TagResponse;
use crate::handlers::user::UserResponse;
use crate::state::AppState;
use crate::usecase::collection::{AddToCollectionUseCase, RemoveFromCollectionUseCase};
use crate::usecase::recipe::{
    CreateRecipeUseCase, DeleteRecipeUseCase, GetRecipeUseCase, GetShortCodeUseCase,
    ListRecipesUseCase, RecipeInput, RecipeListInput, ResolveShortCodeUseCase,
    UpdateRecipeUseCase,
};
use crate::usecase::shopping_list::DownloadShoppingListUseCase;

const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

// ── Responses ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeResponse {
    pub fn from_view(view: RecipeView, config: &RecipesConfig) -> Self {
        let RecipeView {
            recipe,
            author,
            is_favorited,
            is_in_shopping_cart,
        } = view;
        Self {
            id: recipe.id,
            tags: recipe.tags.into_iter().map(Into::into).collect(),
            author: UserResponse::from_view(author, config),
            ingredients: recipe
                .ingredients
                .into_iter()
                .map(|ri| RecipeIngredientResponse {
                    id: ri.ingredient.id,
                    name: ri.ingredient.name,
                    measurement_unit: ri.ingredient.measurement_unit,
                    amount: ri.amount,
                })
                .collect(),
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: config.media_url(&recipe.image),
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Short recipe form used by favorites, cart, and subscriptions.
#[derive(Debug, Serialize)]
pub struct ShortRecipeResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl ShortRecipeResponse {
    pub fn from_summary(summary: RecipeSummary, config: &RecipesConfig) -> Self {
        Self {
            id: summary.id,
            image: config.media_url(&summary.image),
            name: summary.name,
            cooking_time: summary.cooking_time,
        }
    }
}

// ── Requests ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct IngredientAmountRequest {
    pub id: i32,
    pub amount: i32,
}

#[derive(Deserialize)]
pub struct RecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmountRequest>,
    #[serde(default)]
    pub tags: Vec<i32>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

impl From<RecipeRequest> for RecipeInput {
    fn from(body: RecipeRequest) -> Self {
        Self {
            ingredients: body
                .ingredients
                .into_iter()
                .map(|i| IngredientAmount {
                    ingredient_id: i.id,
                    amount: i.amount,
                })
                .collect(),
            tags: body.tags,
            image: body.image,
            name: body.name,
            text: body.text,
            cooking_time: body.cooking_time,
        }
    }
}

#[derive(Deserialize)]
pub struct RecipeListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub author: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "larder_core::de::flag")]
    pub is_favorited: Option<bool>,
    #[serde(default, deserialize_with = "larder_core::de::flag")]
    pub is_in_shopping_cart: Option<bool>,
}

async fn load_recipe(
    state: &AppState,
    viewer: Option<i32>,
    id: i32,
) -> Result<RecipeResponse, RecipesServiceError> {
    let usecase = GetRecipeUseCase {
        repo: state.recipe_repo(),
        users: state.user_repo(),
        collections: state.collection_repo(),
        subscriptions: state.subscription_repo(),
    };
    let view = usecase.execute(viewer, id).await?;
    Ok(RecipeResponse::from_view(view, &state.config))
}

// ── GET /api/recipes/ ────────────────────────────────────────────────────────

pub async fn list_recipes(
    viewer: Option<CurrentUser>,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    QueryParams(query): QueryParams<RecipeListQuery>,
) -> Result<Json<Paginated<RecipeResponse>>, RecipesServiceError> {
    let usecase = ListRecipesUseCase {
        repo: state.recipe_repo(),
        users: state.user_repo(),
        collections: state.collection_repo(),
        subscriptions: state.subscription_repo(),
    };
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request();
    let input = RecipeListInput {
        author: query.author,
        tags: query.tags,
        is_favorited: query.is_favorited,
        is_in_shopping_cart: query.is_in_shopping_cart,
    };
    let page = usecase
        .execute(viewer.map(|v| v.user_id), input, request)
        .await?
        .map(|view| RecipeResponse::from_view(view, &state.config));
    Ok(Json(Paginated::new(
        page,
        request,
        &uri,
        &state.config.public_url,
    )))
}

// ── POST /api/recipes/ ───────────────────────────────────────────────────────

pub async fn create_recipe(
    me: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RecipeRequest>,
) -> Result<(StatusCode, Json<RecipeResponse>), RecipesServiceError> {
    let usecase = CreateRecipeUseCase {
        repo: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        media: state.media(),
    };
    let id = usecase.execute(me.user_id, body.into()).await?;
    let recipe = load_recipe(&state, Some(me.user_id), id).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

// ── GET/PATCH/DELETE /api/recipes/{id}/ ──────────────────────────────────────

pub async fn get_recipe(
    viewer: Option<CurrentUser>,
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<RecipeResponse>, RecipesServiceError> {
    let recipe = load_recipe(&state, viewer.map(|v| v.user_id), id).await?;
    Ok(Json(recipe))
}

pub async fn update_recipe(
    me: CurrentUser,
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
    JsonBody(body): JsonBody<RecipeRequest>,
) -> Result<Json<RecipeResponse>, RecipesServiceError> {
    let usecase = UpdateRecipeUseCase {
        repo: state.recipe_repo(),
        tags: state.tag_repo(),
        ingredients: state.ingredient_repo(),
        media: state.media(),
    };
    usecase
        .execute(me.user_id, me.role, id, body.into())
        .await?;
    let recipe = load_recipe(&state, Some(me.user_id), id).await?;
    Ok(Json(recipe))
}

pub async fn delete_recipe(
    me: CurrentUser,
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = DeleteRecipeUseCase {
        repo: state.recipe_repo(),
        media: state.media(),
    };
    usecase.execute(me.user_id, me.role, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Short links ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

pub async fn get_link(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<ShortLinkResponse>, RecipesServiceError> {
    let usecase = GetShortCodeUseCase {
        repo: state.recipe_repo(),
    };
    let code = usecase.execute(id).await?;
    Ok(Json(ShortLinkResponse {
        short_link: format!("{}/s/{code}", state.config.public_url),
    }))
}

/// `GET /s/{code}`: redirect to the recipe page.
pub async fn follow_short_link(
    State(state): State<AppState>,
    PathParams(code): PathParams<String>,
) -> Result<impl IntoResponse, RecipesServiceError> {
    let usecase = ResolveShortCodeUseCase {
        repo: state.recipe_repo(),
    };
    let id = usecase.execute(&code).await?;
    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, format!("/recipes/{id}"))],
    ))
}

// ── Favorites / shopping cart ────────────────────────────────────────────────

async fn add_to(
    collection: RecipeCollection,
    me: CurrentUser,
    state: AppState,
    recipe_id: i32,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), RecipesServiceError> {
    let usecase = AddToCollectionUseCase {
        recipes: state.recipe_repo(),
        collections: state.collection_repo(),
    };
    let summary = usecase.execute(collection, me.user_id, recipe_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShortRecipeResponse::from_summary(summary, &state.config)),
    ))
}

async fn remove_from(
    collection: RecipeCollection,
    me: CurrentUser,
    state: AppState,
    recipe_id: i32,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = RemoveFromCollectionUseCase {
        recipes: state.recipe_repo(),
        collections: state.collection_repo(),
    };
    usecase.execute(collection, me.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite(
    me: CurrentUser,
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), RecipesServiceError> {
    add_to(RecipeCollection::Favorites, me, state, id).await
}

pub async fn remove_favorite(
    me: CurrentUser,
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<StatusCode, RecipesServiceError> {
    remove_from(RecipeCollection::Favorites, me, state, id).await
}

pub async fn add_to_cart(
    me: CurrentUser,
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<(StatusCode, Json<ShortRecipeResponse>), RecipesServiceError> {
    add_to(RecipeCollection::ShoppingCart, me, state, id).await
}

pub async fn remove_from_cart(
    me: CurrentUser,
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<StatusCode, RecipesServiceError> {
    remove_from(RecipeCollection::ShoppingCart, me, state, id).await
}

// ── GET /api/recipes/download_shopping_cart/ ─────────────────────────────────

pub async fn download_shopping_cart(
    me: CurrentUser,
    State(state): State<AppState>,
) -> Result<Attachment<String>, RecipesServiceError> {
    let usecase = DownloadShoppingListUseCase {
        collections: state.collection_repo(),
    };
    let body = usecase.execute(me.user_id).await?;
    Ok(Attachment::new(body)
        .filename(SHOPPING_LIST_FILENAME)
        .content_type("text/plain; charset=utf-8"))
}
