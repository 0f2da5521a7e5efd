use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use larder_core::extract::{JsonBody, PathParams, QueryParams};

use crate::domain::types::Ingredient;
use crate::error::RecipesServiceError;
use crate::handlers::identity::CurrentUser;
use crate::state::AppState;
use crate::usecase::ingredient::{
    CreateIngredientInput, CreateIngredientUseCase, GetIngredientUseCase,
    SearchIngredientsUseCase,
};

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
}

pub async fn search_ingredients(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Vec<IngredientResponse>>, RecipesServiceError> {
    let usecase = SearchIngredientsUseCase {
        repo: state.ingredient_repo(),
    };
    let found = usecase.execute(query.name.as_deref()).await?;
    Ok(Json(found.into_iter().map(Into::into).collect()))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<IngredientResponse>, RecipesServiceError> {
    let usecase = GetIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

#[derive(Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub measurement_unit: String,
}

pub async fn create_ingredient(
    me: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<IngredientResponse>), RecipesServiceError> {
    if !me.role.can_moderate() {
        return Err(RecipesServiceError::Forbidden);
    }
    let usecase = CreateIngredientUseCase {
        repo: state.ingredient_repo(),
    };
    let ingredient = usecase
        .execute(CreateIngredientInput {
            name: body.name,
            measurement_unit: body.measurement_unit,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(ingredient.into())))
}
