use anyhow::Context as _;
use uuid::Uuid;

use larder_auth_types::password::verify_password;
use larder_auth_types::token::issue_token;

use crate::domain::repository::{AuthTokenRepository, UserRepository};
use crate::domain::types::Session;
use crate::error::RecipesServiceError;

/// Run argon2 verification off the async workers.
pub(crate) async fn password_matches(
    password: String,
    password_hash: String,
) -> Result<bool, RecipesServiceError> {
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .context("join password verification")?;
    Ok(matches)
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<U: UserRepository, T: AuthTokenRepository> {
    pub users: U,
    pub tokens: T,
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl<U: UserRepository, T: AuthTokenRepository> LoginUseCase<U, T> {
    /// Returns a signed token whose `jti` is stored as a live session.
    pub async fn execute(&self, input: LoginInput) -> Result<String, RecipesServiceError> {
        let email = input.email.trim().to_lowercase();
        let credentials = self
            .users
            .find_credentials_by_email(&email)
            .await?
            .ok_or(RecipesServiceError::InvalidCredentials)?;
        if !password_matches(input.password, credentials.password_hash).await? {
            return Err(RecipesServiceError::InvalidCredentials);
        }

        let user = credentials.user;
        let token_id = Uuid::new_v4();
        self.tokens.create(token_id, user.id).await?;
        let token = issue_token(
            user.id,
            user.role.as_u8(),
            token_id,
            self.token_ttl_secs,
            &self.jwt_secret,
        )
        .context("sign auth token")?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(token)
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<T: AuthTokenRepository> {
    pub tokens: T,
}

impl<T: AuthTokenRepository> LogoutUseCase<T> {
    pub async fn execute(&self, token_id: Uuid) -> Result<(), RecipesServiceError> {
        self.tokens.delete(token_id).await?;
        Ok(())
    }
}

// ── Authenticate ─────────────────────────────────────────────────────────────

pub struct AuthenticateUseCase<T: AuthTokenRepository> {
    pub tokens: T,
}

impl<T: AuthTokenRepository> AuthenticateUseCase<T> {
    /// Resolve a validated token to its live session.
    ///
    /// Fails with `Unauthorized` if the token was revoked or its subject no
    /// longer owns it.
    pub async fn execute(
        &self,
        token_id: Uuid,
        user_id: i32,
    ) -> Result<Session, RecipesServiceError> {
        match self.tokens.find_session(token_id).await? {
            Some(session) if session.user_id == user_id => Ok(session),
            _ => Err(RecipesServiceError::Unauthorized),
        }
    }
}
