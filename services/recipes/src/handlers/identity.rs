//! Token authentication extractor.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use uuid::Uuid;

use larder_auth_types::header::token_from_headers;
use larder_auth_types::token::{AuthError, validate_token};
use larder_domain::user::UserRole;

use crate::error::RecipesServiceError;
use crate::state::AppState;
use crate::usecase::auth::AuthenticateUseCase;

/// The signed-in caller, resolved from `Authorization: Token <jwt>`.
///
/// The token must verify and its `jti` must still be a live session. The role
/// is read from the session row, so role changes apply without re-login.
///
/// Use `Option<CurrentUser>` on routes open to anonymous callers: a missing
/// header yields `None`, but a present and invalid token is still a 401.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: i32,
    pub role: UserRole,
    pub token_id: Uuid,
}

async fn authenticate(
    token: Result<Option<String>, AuthError>,
    state: AppState,
) -> Result<Option<CurrentUser>, RecipesServiceError> {
    let token = token.map_err(|e| {
        tracing::debug!(error = %e, "malformed authorization header");
        RecipesServiceError::Unauthorized
    })?;
    let Some(token) = token else {
        return Ok(None);
    };
    let info = validate_token(&token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "rejected auth token");
        RecipesServiceError::Unauthorized
    })?;
    let usecase = AuthenticateUseCase {
        tokens: state.token_repo(),
    };
    let session = usecase.execute(info.token_id, info.user_id).await?;
    Ok(Some(CurrentUser {
        user_id: session.user_id,
        role: session.role,
        token_id: session.token_id,
    }))
}

fn raw_token(parts: &Parts) -> Result<Option<String>, AuthError> {
    token_from_headers(&parts.headers).map(|t| t.map(str::to_owned))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = RecipesServiceError;

    // Extract synchronously and return a 'static future; see axum-core's
    // `fn -> impl Future + Send` signature.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = raw_token(parts);
        let state = state.clone();
        async move {
            authenticate(token, state)
                .await?
                .ok_or(RecipesServiceError::Unauthorized)
        }
    }
}

impl OptionalFromRequestParts<AppState> for CurrentUser {
    type Rejection = RecipesServiceError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Option<Self>, Self::Rejection>> + Send {
        let token = raw_token(parts);
        let state = state.clone();
        async move { authenticate(token, state).await }
    }
}
