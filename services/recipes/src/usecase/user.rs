use anyhow::Context as _;

use larder_auth_types::password::hash_password;
use larder_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{MediaStore, SubscriptionRepository, UserRepository};
use crate::domain::types::{ImageUpload, NewUser, User, UserView};
use crate::domain::validation;
use crate::error::RecipesServiceError;
use crate::usecase::auth::password_matches;
use crate::usecase::view::user_views;

const AVATAR_DIR: &str = "avatars";

async fn hash_off_thread(password: String) -> Result<String, RecipesServiceError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("join password hashing")?
        .context("hash password")?;
    Ok(hash)
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub struct CreateUserUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> CreateUserUseCase<U> {
    pub async fn execute(&self, input: CreateUserInput) -> Result<User, RecipesServiceError> {
        let username = validation::username(&input.username)?;
        let email = validation::email(&input.email)?;
        let first_name = validation::required_text(
            "first_name",
            &input.first_name,
            validation::PERSON_NAME_MAX_LEN,
        )?;
        let last_name = validation::required_text(
            "last_name",
            &input.last_name,
            validation::PERSON_NAME_MAX_LEN,
        )?;
        validation::password("password", &input.password)?;

        if self.repo.username_exists(&username).await? {
            return Err(RecipesServiceError::UsernameTaken);
        }
        if self.repo.email_exists(&email).await? {
            return Err(RecipesServiceError::EmailTaken);
        }

        let password_hash = hash_off_thread(input.password).await?;
        let user = self
            .repo
            .create(&NewUser {
                username,
                email,
                first_name,
                last_name,
                password_hash,
            })
            .await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }
}

// ── List / Get ───────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository, S: SubscriptionRepository> {
    pub repo: U,
    pub subscriptions: S,
}

impl<U: UserRepository, S: SubscriptionRepository> ListUsersUseCase<U, S> {
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        page: PageRequest,
    ) -> Result<Page<UserView>, RecipesServiceError> {
        let Page { items, count } = self.repo.list(page.clamped()).await?;
        let items = user_views(&self.subscriptions, viewer, items).await?;
        Ok(Page { items, count })
    }
}

pub struct GetUserUseCase<U: UserRepository, S: SubscriptionRepository> {
    pub repo: U,
    pub subscriptions: S,
}

impl<U: UserRepository, S: SubscriptionRepository> GetUserUseCase<U, S> {
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        id: i32,
    ) -> Result<UserView, RecipesServiceError> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(RecipesServiceError::UserNotFound)?;
        let mut views = user_views(&self.subscriptions, viewer, vec![user]).await?;
        views.pop().ok_or(RecipesServiceError::UserNotFound)
    }
}

// ── Set password ─────────────────────────────────────────────────────────────

pub struct SetPasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct SetPasswordUseCase<U: UserRepository> {
    pub repo: U,
}

impl<U: UserRepository> SetPasswordUseCase<U> {
    pub async fn execute(
        &self,
        user_id: i32,
        input: SetPasswordInput,
    ) -> Result<(), RecipesServiceError> {
        let credentials = self
            .repo
            .find_credentials_by_id(user_id)
            .await?
            .ok_or(RecipesServiceError::UserNotFound)?;
        if !password_matches(input.current_password, credentials.password_hash).await? {
            return Err(RecipesServiceError::WrongPassword);
        }
        validation::password("new_password", &input.new_password)?;
        let password_hash = hash_off_thread(input.new_password).await?;
        self.repo.update_password(user_id, &password_hash).await
    }
}

// ── Avatar ───────────────────────────────────────────────────────────────────

pub struct SetAvatarUseCase<U: UserRepository, M: MediaStore> {
    pub repo: U,
    pub media: M,
}

impl<U: UserRepository, M: MediaStore> SetAvatarUseCase<U, M> {
    /// Store the image and return its media path.
    pub async fn execute(
        &self,
        user_id: i32,
        data_uri: &str,
    ) -> Result<String, RecipesServiceError> {
        let image = ImageUpload::from_data_uri("avatar", data_uri)?;
        let path = self.media.save(AVATAR_DIR, &image).await?;
        let previous = self.repo.set_avatar(user_id, Some(&path)).await?;
        if let Some(previous) = previous {
            discard_media(&self.media, &previous).await;
        }
        Ok(path)
    }
}

pub struct DeleteAvatarUseCase<U: UserRepository, M: MediaStore> {
    pub repo: U,
    pub media: M,
}

impl<U: UserRepository, M: MediaStore> DeleteAvatarUseCase<U, M> {
    pub async fn execute(&self, user_id: i32) -> Result<(), RecipesServiceError> {
        if let Some(previous) = self.repo.set_avatar(user_id, None).await? {
            discard_media(&self.media, &previous).await;
        }
        Ok(())
    }
}

/// Remove a replaced file. The row no longer points at it, so failures are only logged.
pub(crate) async fn discard_media<M: MediaStore>(media: &M, path: &str) {
    if let Err(e) = media.delete(path).await {
        tracing::warn!(error = %e, path, "failed to delete media file");
    }
}
