#![allow(async_fn_in_trait)]

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use larder_domain::pagination::{Page, PageRequest};

use crate::domain::types::{
    CartLine, ImageUpload, Ingredient, NewIngredient, NewTag, NewUser, Recipe, RecipeChanges,
    RecipeCollection, RecipeDraft, RecipeFilter, RecipeSummary, Session, Tag, User,
    UserCredentials,
};
use crate::error::RecipesServiceError;

/// Repository for user accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RecipesServiceError>;
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RecipesServiceError>;
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, RecipesServiceError>;
    async fn find_credentials_by_id(
        &self,
        id: i32,
    ) -> Result<Option<UserCredentials>, RecipesServiceError>;
    /// Users ordered by id.
    async fn list(&self, page: PageRequest) -> Result<Page<User>, RecipesServiceError>;
    async fn username_exists(&self, username: &str) -> Result<bool, RecipesServiceError>;
    async fn email_exists(&self, email: &str) -> Result<bool, RecipesServiceError>;
    async fn create(&self, user: &NewUser) -> Result<User, RecipesServiceError>;
    async fn update_password(&self, id: i32, password_hash: &str)
    -> Result<(), RecipesServiceError>;
    /// Replace the avatar path, returning the previous one.
    async fn set_avatar(
        &self,
        id: i32,
        avatar: Option<&str>,
    ) -> Result<Option<String>, RecipesServiceError>;
}

/// Repository for issued auth tokens.
pub trait AuthTokenRepository: Send + Sync {
    async fn create(&self, token_id: Uuid, user_id: i32) -> Result<(), RecipesServiceError>;
    /// Look up a live token together with its owner's current role.
    async fn find_session(&self, token_id: Uuid) -> Result<Option<Session>, RecipesServiceError>;
    /// Revoke a token. Returns `true` if a row was deleted.
    async fn delete(&self, token_id: Uuid) -> Result<bool, RecipesServiceError>;
}

pub trait TagRepository: Send + Sync {
    /// All tags ordered by name.
    async fn list(&self) -> Result<Vec<Tag>, RecipesServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, RecipesServiceError>;
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, RecipesServiceError>;
    /// Fails with `TagAlreadyExists` on a name or slug collision.
    async fn create(&self, tag: &NewTag) -> Result<Tag, RecipesServiceError>;
}

pub trait IngredientRepository: Send + Sync {
    /// Ingredients ordered by name, optionally restricted to a case-insensitive
    /// name prefix.
    async fn search(&self, name_prefix: Option<&str>)
    -> Result<Vec<Ingredient>, RecipesServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, RecipesServiceError>;
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Ingredient>, RecipesServiceError>;
    /// Fails with `IngredientAlreadyExists` on a `(name, measurement_unit)` collision.
    async fn create(&self, ingredient: &NewIngredient)
    -> Result<Ingredient, RecipesServiceError>;
}

pub trait RecipeRepository: Send + Sync {
    /// Recipes matching `filter`, ordered by name then id.
    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, RecipesServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, RecipesServiceError>;
    async fn find_summary(&self, id: i32) -> Result<Option<RecipeSummary>, RecipesServiceError>;
    /// Insert the recipe with its tags and ingredients atomically. Returns the new id.
    async fn create(&self, draft: &RecipeDraft) -> Result<i32, RecipesServiceError>;
    /// Apply changes and replace tags and ingredients atomically.
    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), RecipesServiceError>;
    /// Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, RecipesServiceError>;
    /// An author's recipes, newest first.
    async fn list_by_author(
        &self,
        author_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<RecipeSummary>, RecipesServiceError>;
    async fn count_by_authors(
        &self,
        author_ids: &[i32],
    ) -> Result<HashMap<i32, u64>, RecipesServiceError>;
}

/// Favorites and shopping cart.
pub trait RecipeCollectionRepository: Send + Sync {
    /// Returns `false` if the recipe was already in the collection.
    async fn add(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, RecipesServiceError>;
    /// Returns `false` if the recipe was not in the collection.
    async fn remove(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, RecipesServiceError>;
    /// Which of `recipe_ids` are in the user's collection.
    async fn contains_any(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>, RecipesServiceError>;
    /// Every recipe-ingredient row of the recipes in the user's cart.
    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLine>, RecipesServiceError>;
}

pub trait SubscriptionRepository: Send + Sync {
    /// Returns `false` if the subscription already existed.
    async fn add(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError>;
    /// Returns `false` if there was no subscription.
    async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError>;
    /// Which of `author_ids` the user follows.
    async fn followed_among(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> Result<HashSet<i32>, RecipesServiceError>;
    /// Authors the user follows, ordered by username.
    async fn list_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> Result<Page<User>, RecipesServiceError>;
}

/// Storage for uploaded images.
pub trait MediaStore: Send + Sync {
    /// Store the image under `dir`, returning its media path.
    async fn save(&self, dir: &str, image: &ImageUpload) -> Result<String, RecipesServiceError>;
    async fn delete(&self, path: &str) -> Result<(), RecipesServiceError>;
}
