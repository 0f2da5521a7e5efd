use larder_domain::pagination::{Page, PageRequest};
use larder_domain::short_code;
use larder_domain::user::UserRole;

use crate::domain::repository::{
    IngredientRepository, MediaStore, RecipeCollectionRepository, RecipeRepository,
    SubscriptionRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    ImageUpload, IngredientAmount, MembershipFilter, RecipeChanges, RecipeDraft, RecipeFilter,
    RecipeView,
};
use crate::domain::validation;
use crate::error::RecipesServiceError;
use crate::usecase::user::discard_media;
use crate::usecase::view::recipe_views;

const RECIPE_IMAGE_DIR: &str = "recipes";

/// Recipe body shared by create and update. Optional fields are required on create.
#[derive(Debug, Clone, Default)]
pub struct RecipeInput {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i32>,
    /// `data:image/<type>;base64,...`
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
}

/// Validated scalar fields; `None` where the input left them out.
struct CheckedFields {
    name: Option<String>,
    text: Option<String>,
    cooking_time: Option<i32>,
    image: Option<ImageUpload>,
}

async fn check_input<T, I>(
    tags: &T,
    ingredients: &I,
    input: &RecipeInput,
) -> Result<CheckedFields, RecipesServiceError>
where
    T: TagRepository,
    I: IngredientRepository,
{
    validation::ingredient_amounts(&input.ingredients)?;
    validation::tag_ids(&input.tags)?;
    let name = input
        .name
        .as_deref()
        .map(|n| validation::required_text("name", n, validation::RECIPE_NAME_MAX_LEN))
        .transpose()?;
    let text = input
        .text
        .as_deref()
        .map(|t| validation::required_text("text", t, usize::MAX))
        .transpose()?;
    let cooking_time = input.cooking_time.map(validation::cooking_time).transpose()?;
    let image = input
        .image
        .as_deref()
        .map(|uri| ImageUpload::from_data_uri("image", uri))
        .transpose()?;

    let found_tags = tags.find_by_ids(&input.tags).await?;
    if let Some(missing) = input
        .tags
        .iter()
        .find(|id| !found_tags.iter().any(|t| t.id == **id))
    {
        return Err(RecipesServiceError::invalid(
            "tags",
            format!("tag {missing} does not exist"),
        ));
    }
    let ids: Vec<i32> = input.ingredients.iter().map(|i| i.ingredient_id).collect();
    let found_ingredients = ingredients.find_by_ids(&ids).await?;
    if let Some(missing) = ids
        .iter()
        .find(|id| !found_ingredients.iter().any(|i| i.id == **id))
    {
        return Err(RecipesServiceError::invalid(
            "ingredients",
            format!("ingredient {missing} does not exist"),
        ));
    }

    Ok(CheckedFields {
        name,
        text,
        cooking_time,
        image,
    })
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, RecipesServiceError> {
    value.ok_or_else(|| RecipesServiceError::invalid(field, "this field is required"))
}

/// Staff and admins may change any recipe; everyone else only their own.
fn ensure_can_modify(
    author_id: i32,
    user_id: i32,
    role: UserRole,
) -> Result<(), RecipesServiceError> {
    if author_id == user_id || role.can_moderate() {
        Ok(())
    } else {
        Err(RecipesServiceError::Forbidden)
    }
}

// ── Create ───────────────────────────────────────────────────────────────────

pub struct CreateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: MediaStore,
{
    pub repo: R,
    pub tags: T,
    pub ingredients: I,
    pub media: M,
}

impl<R, T, I, M> CreateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: MediaStore,
{
    /// Returns the new recipe id.
    pub async fn execute(
        &self,
        author_id: i32,
        input: RecipeInput,
    ) -> Result<i32, RecipesServiceError> {
        let checked = check_input(&self.tags, &self.ingredients, &input).await?;
        let name = required("name", checked.name)?;
        let text = required("text", checked.text)?;
        let cooking_time = required("cooking_time", checked.cooking_time)?;
        let image = required("image", checked.image)?;

        let image = self.media.save(RECIPE_IMAGE_DIR, &image).await?;
        let draft = RecipeDraft {
            author_id,
            name,
            text,
            image: image.clone(),
            cooking_time,
            tag_ids: input.tags,
            ingredients: input.ingredients,
        };
        match self.repo.create(&draft).await {
            Ok(id) => {
                tracing::info!(recipe_id = id, author_id, "recipe created");
                Ok(id)
            }
            Err(e) => {
                discard_media(&self.media, &image).await;
                Err(e)
            }
        }
    }
}

// ── Update ───────────────────────────────────────────────────────────────────

pub struct UpdateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: MediaStore,
{
    pub repo: R,
    pub tags: T,
    pub ingredients: I,
    pub media: M,
}

impl<R, T, I, M> UpdateRecipeUseCase<R, T, I, M>
where
    R: RecipeRepository,
    T: TagRepository,
    I: IngredientRepository,
    M: MediaStore,
{
    pub async fn execute(
        &self,
        user_id: i32,
        role: UserRole,
        recipe_id: i32,
        input: RecipeInput,
    ) -> Result<(), RecipesServiceError> {
        let current = self
            .repo
            .find_summary(recipe_id)
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        ensure_can_modify(current.author_id, user_id, role)?;

        let checked = check_input(&self.tags, &self.ingredients, &input).await?;
        let image = match &checked.image {
            Some(image) => Some(self.media.save(RECIPE_IMAGE_DIR, image).await?),
            None => None,
        };
        let changes = RecipeChanges {
            name: checked.name,
            text: checked.text,
            image: image.clone(),
            cooking_time: checked.cooking_time,
            tag_ids: input.tags,
            ingredients: input.ingredients,
        };
        if let Err(e) = self.repo.update(recipe_id, &changes).await {
            if let Some(image) = &image {
                discard_media(&self.media, image).await;
            }
            return Err(e);
        }
        if image.is_some() {
            discard_media(&self.media, &current.image).await;
        }
        Ok(())
    }
}

// ── Delete ───────────────────────────────────────────────────────────────────

pub struct DeleteRecipeUseCase<R: RecipeRepository, M: MediaStore> {
    pub repo: R,
    pub media: M,
}

impl<R: RecipeRepository, M: MediaStore> DeleteRecipeUseCase<R, M> {
    pub async fn execute(
        &self,
        user_id: i32,
        role: UserRole,
        recipe_id: i32,
    ) -> Result<(), RecipesServiceError> {
        let current = self
            .repo
            .find_summary(recipe_id)
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        ensure_can_modify(current.author_id, user_id, role)?;
        if !self.repo.delete(recipe_id).await? {
            return Err(RecipesServiceError::RecipeNotFound);
        }
        discard_media(&self.media, &current.image).await;
        tracing::info!(recipe_id, user_id, "recipe deleted");
        Ok(())
    }
}

// ── Get / List ───────────────────────────────────────────────────────────────

pub struct GetRecipeUseCase<R, U, C, S>
where
    R: RecipeRepository,
    U: UserRepository,
    C: RecipeCollectionRepository,
    S: SubscriptionRepository,
{
    pub repo: R,
    pub users: U,
    pub collections: C,
    pub subscriptions: S,
}

impl<R, U, C, S> GetRecipeUseCase<R, U, C, S>
where
    R: RecipeRepository,
    U: UserRepository,
    C: RecipeCollectionRepository,
    S: SubscriptionRepository,
{
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        id: i32,
    ) -> Result<RecipeView, RecipesServiceError> {
        let recipe = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        let mut views = recipe_views(
            &self.users,
            &self.collections,
            &self.subscriptions,
            viewer,
            vec![recipe],
        )
        .await?;
        views.pop().ok_or(RecipesServiceError::RecipeNotFound)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecipeListInput {
    pub author: Option<i32>,
    pub tags: Vec<String>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
}

impl RecipeListInput {
    /// Collection flags only apply to signed-in viewers. `is_favorited` only
    /// narrows when set; `is_in_shopping_cart=0` excludes cart recipes.
    pub fn into_filter(self, viewer: Option<i32>) -> RecipeFilter {
        let membership = |flag: Option<bool>| {
            viewer.zip(flag).map(|(user_id, include)| MembershipFilter { user_id, include })
        };
        RecipeFilter {
            author_id: self.author,
            favorited: membership(self.is_favorited.filter(|f| *f)),
            in_shopping_cart: membership(self.is_in_shopping_cart),
            tag_slugs: self.tags,
        }
    }
}

pub struct ListRecipesUseCase<R, U, C, S>
where
    R: RecipeRepository,
    U: UserRepository,
    C: RecipeCollectionRepository,
    S: SubscriptionRepository,
{
    pub repo: R,
    pub users: U,
    pub collections: C,
    pub subscriptions: S,
}

impl<R, U, C, S> ListRecipesUseCase<R, U, C, S>
where
    R: RecipeRepository,
    U: UserRepository,
    C: RecipeCollectionRepository,
    S: SubscriptionRepository,
{
    pub async fn execute(
        &self,
        viewer: Option<i32>,
        input: RecipeListInput,
        page: PageRequest,
    ) -> Result<Page<RecipeView>, RecipesServiceError> {
        let filter = input.into_filter(viewer);
        let Page { items, count } = self.repo.list(&filter, page.clamped()).await?;
        let items = recipe_views(
            &self.users,
            &self.collections,
            &self.subscriptions,
            viewer,
            items,
        )
        .await?;
        Ok(Page { items, count })
    }
}

// ── Short links ──────────────────────────────────────────────────────────────

pub struct GetShortCodeUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> GetShortCodeUseCase<R> {
    pub async fn execute(&self, recipe_id: i32) -> Result<String, RecipesServiceError> {
        let recipe = self
            .repo
            .find_summary(recipe_id)
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        let id = u64::try_from(recipe.id).map_err(|_| RecipesServiceError::RecipeNotFound)?;
        Ok(short_code::encode(id))
    }
}

pub struct ResolveShortCodeUseCase<R: RecipeRepository> {
    pub repo: R,
}

impl<R: RecipeRepository> ResolveShortCodeUseCase<R> {
    /// Returns the recipe id behind `code`. Unknown or malformed codes are not found.
    pub async fn execute(&self, code: &str) -> Result<i32, RecipesServiceError> {
        let id = short_code::decode(code)
            .ok()
            .and_then(|id| i32::try_from(id).ok())
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        let recipe = self
            .repo
            .find_summary(id)
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        Ok(recipe.id)
    }
}
