use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use larder_core::extract::JsonBody;

use crate::error::RecipesServiceError;
use crate::handlers::identity::CurrentUser;
use crate::state::AppState;
use crate::usecase::auth::{LoginInput, LoginUseCase, LogoutUseCase};

// ── POST /api/auth/token/login/ ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub auth_token: String,
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, RecipesServiceError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        jwt_secret: state.config.jwt_secret.clone(),
        token_ttl_secs: state.config.token_ttl_secs,
    };
    let auth_token = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse { auth_token }))
}

// ── POST /api/auth/token/logout/ ─────────────────────────────────────────────

pub async fn logout(
    me: CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, RecipesServiceError> {
    let usecase = LogoutUseCase {
        tokens: state.token_repo(),
    };
    usecase.execute(me.token_id).await?;
    tracing::info!(user_id = me.user_id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}
