use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use larder_core::extract::{JsonBody, PathParams};

use crate::domain::types::Tag;
use crate::error::RecipesServiceError;
use crate::handlers::identity::CurrentUser;
use crate::state::AppState;
use crate::usecase::tag::{CreateTagInput, CreateTagUseCase, GetTagUseCase, ListTagsUseCase};

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Vec<TagResponse>>, RecipesServiceError> {
    let usecase = ListTagsUseCase {
        repo: state.tag_repo(),
    };
    let tags = usecase.execute().await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

pub async fn get_tag(
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<TagResponse>, RecipesServiceError> {
    let usecase = GetTagUseCase {
        repo: state.tag_repo(),
    };
    Ok(Json(usecase.execute(id).await?.into()))
}

#[derive(Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub slug: String,
}

pub async fn create_tag(
    me: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), RecipesServiceError> {
    if !me.role.can_moderate() {
        return Err(RecipesServiceError::Forbidden);
    }
    let usecase = CreateTagUseCase {
        repo: state.tag_repo(),
    };
    let tag = usecase
        .execute(CreateTagInput {
            name: body.name,
            slug: body.slug,
        })
        .await?;
    tracing::info!(tag_id = tag.id, user_id = me.user_id, "tag created");
    Ok((StatusCode::CREATED, Json(tag.into())))
}
