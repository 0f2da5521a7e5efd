use axum::{
    Json,
    extract::{OriginalUri, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use larder_core::extract::{JsonBody, PathParams, QueryParams};

use crate::config::RecipesConfig;
use crate::domain::types::{User, UserView};
use crate::error::RecipesServiceError;
use crate::handlers::identity::CurrentUser;
use crate::handlers::pagination::{PageQuery, Paginated};
use crate::state::AppState;
use crate::usecase::user::{
    CreateUserInput, CreateUserUseCase, DeleteAvatarUseCase, GetUserUseCase, ListUsersUseCase,
    SetAvatarUseCase, SetPasswordInput, SetPasswordUseCase,
};

/// User object as seen by the caller.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

impl UserResponse {
    pub fn from_view(view: UserView, config: &RecipesConfig) -> Self {
        let UserView {
            user,
            is_subscribed,
        } = view;
        Self {
            avatar: user.avatar.as_deref().map(|p| config.media_url(p)),
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

// ── POST /api/users/ ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct CreatedUserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for CreatedUserResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUserResponse>), RecipesServiceError> {
    let usecase = CreateUserUseCase {
        repo: state.user_repo(),
    };
    let user = usecase
        .execute(CreateUserInput {
            email: body.email,
            username: body.username,
            first_name: body.first_name,
            last_name: body.last_name,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

// ── GET /api/users/ ──────────────────────────────────────────────────────────

pub async fn list_users(
    viewer: Option<CurrentUser>,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Paginated<UserResponse>>, RecipesServiceError> {
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let request = query.request();
    let page = usecase
        .execute(viewer.map(|v| v.user_id), request)
        .await?
        .map(|view| UserResponse::from_view(view, &state.config));
    Ok(Json(Paginated::new(
        page,
        request,
        &uri,
        &state.config.public_url,
    )))
}

// ── GET /api/users/{id}/ ─────────────────────────────────────────────────────

pub async fn get_user(
    viewer: Option<CurrentUser>,
    State(state): State<AppState>,
    PathParams(id): PathParams<i32>,
) -> Result<Json<UserResponse>, RecipesServiceError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let view = usecase.execute(viewer.map(|v| v.user_id), id).await?;
    Ok(Json(UserResponse::from_view(view, &state.config)))
}

// ── GET /api/users/me/ ───────────────────────────────────────────────────────

pub async fn get_me(
    me: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, RecipesServiceError> {
    let usecase = GetUserUseCase {
        repo: state.user_repo(),
        subscriptions: state.subscription_repo(),
    };
    let view = usecase.execute(Some(me.user_id), me.user_id).await?;
    Ok(Json(UserResponse::from_view(view, &state.config)))
}

// ── POST /api/users/set_password/ ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetPasswordRequest {
    pub new_password: String,
    pub current_password: String,
}

pub async fn set_password(
    me: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SetPasswordRequest>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = SetPasswordUseCase {
        repo: state.user_repo(),
    };
    usecase
        .execute(
            me.user_id,
            SetPasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PUT/DELETE /api/users/me/avatar/ ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct AvatarRequest {
    pub avatar: String,
}

#[derive(Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

pub async fn set_avatar(
    me: CurrentUser,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AvatarRequest>,
) -> Result<Json<AvatarResponse>, RecipesServiceError> {
    let usecase = SetAvatarUseCase {
        repo: state.user_repo(),
        media: state.media(),
    };
    let path = usecase.execute(me.user_id, &body.avatar).await?;
    Ok(Json(AvatarResponse {
        avatar: state.config.media_url(&path),
    }))
}

pub async fn delete_avatar(
    me: CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = DeleteAvatarUseCase {
        repo: state.user_repo(),
        media: state.media(),
    };
    usecase.execute(me.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
