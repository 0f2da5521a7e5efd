use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use larder_domain::user::UserRole;

use crate::error::RecipesServiceError;

/// Registered account, without credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Media path of the avatar image.
    pub avatar: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// A user together with the stored argon2 PHC string.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// A live auth token and the current role of its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub token_id: Uuid,
    pub user_id: i32,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

/// An ingredient as used by one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub amount: i32,
}

/// A recipe with its tags and ingredients loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    pub text: String,
    /// Media path of the recipe image.
    pub image: String,
    pub cooking_time: i32,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
}

/// The short form returned by favorites, cart, and subscription endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: i32,
    pub amount: i32,
}

/// Validated input for a new recipe. `image` is already a media path.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub author_id: i32,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i32,
    pub tag_ids: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Validated partial update. Tags and ingredients always replace the old sets.
#[derive(Debug, Clone)]
pub struct RecipeChanges {
    pub name: Option<String>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub cooking_time: Option<i32>,
    pub tag_ids: Vec<i32>,
    pub ingredients: Vec<IngredientAmount>,
}

/// Membership constraint on a per-user recipe list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipFilter {
    pub user_id: i32,
    /// `true` keeps only members, `false` drops them.
    pub include: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author_id: Option<i32>,
    /// Keep recipes carrying any of these slugs. Empty means no constraint.
    pub tag_slugs: Vec<String>,
    pub favorited: Option<MembershipFilter>,
    pub in_shopping_cart: Option<MembershipFilter>,
}

/// Per-user recipe lists backed by `(user_id, recipe_id)` tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeCollection {
    Favorites,
    ShoppingCart,
}

impl RecipeCollection {
    pub fn already_added(self) -> RecipesServiceError {
        match self {
            Self::Favorites => RecipesServiceError::AlreadyFavorited,
            Self::ShoppingCart => RecipesServiceError::AlreadyInCart,
        }
    }

    pub fn not_added(self) -> RecipesServiceError {
        match self {
            Self::Favorites => RecipesServiceError::NotFavorited,
            Self::ShoppingCart => RecipesServiceError::NotInCart,
        }
    }
}

/// One recipe-ingredient row from a user's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub recipe_id: i32,
    pub ingredient_id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// One aggregated shopping-list line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub ingredient_id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// A user as seen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub user: User,
    pub is_subscribed: bool,
}

/// A recipe as seen by the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeView {
    pub recipe: Recipe,
    pub author: UserView,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

/// A followed author with their newest recipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorView {
    pub author: UserView,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: u64,
}

/// Image file types accepted in data URIs.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpeg", "jpg", "gif", "webp"];

/// A decoded `data:image/<ext>;base64,<payload>` upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn from_data_uri(
        field: &'static str,
        data_uri: &str,
    ) -> Result<Self, RecipesServiceError> {
        let invalid = |reason: &str| RecipesServiceError::invalid(field, reason);

        let rest = data_uri
            .strip_prefix("data:image/")
            .ok_or_else(|| invalid("expected a data:image/<type>;base64 URI"))?;
        let (extension, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| invalid("expected a data:image/<type>;base64 URI"))?;
        let extension = extension.to_ascii_lowercase();
        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            return Err(invalid("unsupported image type"));
        }
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|_| invalid("image payload is not valid base64"))?;
        if bytes.is_empty() {
            return Err(invalid("image payload is empty"));
        }
        Ok(Self { extension, bytes })
    }
}
