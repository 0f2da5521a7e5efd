use std::collections::{HashMap, HashSet};

use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
    sea_query::{Expr, OnConflict, Query, SelectStatement},
};
use uuid::Uuid;

use larder_core::sea_ext::starts_with_ci;
use larder_domain::pagination::{Page, PageRequest};
use larder_domain::user::UserRole;
use larder_recipes_schema::{
    auth_tokens, favorites, ingredients, recipe_ingredients, recipe_tags, recipes, shopping_carts,
    subscriptions, tags, users,
};

use crate::domain::repository::{
    AuthTokenRepository, IngredientRepository, RecipeCollectionRepository, RecipeRepository,
    SubscriptionRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    CartLine, Ingredient, IngredientAmount, MembershipFilter, NewIngredient, NewTag, NewUser,
    Recipe, RecipeChanges, RecipeCollection, RecipeDraft, RecipeFilter, RecipeIngredient,
    RecipeSummary, Session, Tag, User, UserCredentials,
};
use crate::error::RecipesServiceError;

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RecipesServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RecipesServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = users::Entity::find()
            .filter(users::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find users by ids")?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, RecipesServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(credentials_from_model))
    }

    async fn find_credentials_by_id(
        &self,
        id: i32,
    ) -> Result<Option<UserCredentials>, RecipesServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user credentials by id")?;
        Ok(model.map(credentials_from_model))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, RecipesServiceError> {
        let page = page.clamped();
        let query = users::Entity::find().order_by_asc(users::Column::Id);
        let count = query.clone().count(&self.db).await.context("count users")?;
        let models = query
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list users")?;
        Ok(Page {
            items: models.into_iter().map(user_from_model).collect(),
            count,
        })
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RecipesServiceError> {
        let count = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .count(&self.db)
            .await
            .context("check username")?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RecipesServiceError> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await
            .context("check email")?;
        Ok(count > 0)
    }

    async fn create(&self, user: &NewUser) -> Result<User, RecipesServiceError> {
        let result = users::ActiveModel {
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            password_hash: Set(user.password_hash.clone()),
            avatar: Set(None),
            role: Set(UserRole::User.as_i16()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(user_from_model(model)),
            // Lost a race with the pre-check in the use case.
            // Constraint names differ per backend, so ask which column collided.
            Err(e) if is_unique_violation(&e) => {
                if self.username_exists(&user.username).await? {
                    Err(RecipesServiceError::UsernameTaken)
                } else {
                    Err(RecipesServiceError::EmailTaken)
                }
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update_password(
        &self,
        id: i32,
        password_hash: &str,
    ) -> Result<(), RecipesServiceError> {
        users::Entity::update_many()
            .col_expr(users::Column::PasswordHash, Expr::value(password_hash))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("update password")?;
        Ok(())
    }

    async fn set_avatar(
        &self,
        id: i32,
        avatar: Option<&str>,
    ) -> Result<Option<String>, RecipesServiceError> {
        let avatar = avatar.map(str::to_owned);
        let previous = self
            .db
            .transaction::<_, Option<Option<String>>, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(model) = users::Entity::find_by_id(id).one(txn).await? else {
                        return Ok(None);
                    };
                    let previous = model.avatar;
                    users::ActiveModel {
                        id: Set(id),
                        avatar: Set(avatar),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(Some(previous))
                })
            })
            .await
            .context("set avatar")?;
        previous.ok_or(RecipesServiceError::UserNotFound)
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        avatar: model.avatar,
        role: UserRole::from_i16(model.role).unwrap_or(UserRole::User),
        created_at: model.created_at,
    }
}

fn credentials_from_model(mut model: users::Model) -> UserCredentials {
    let password_hash = std::mem::take(&mut model.password_hash);
    UserCredentials {
        user: user_from_model(model),
        password_hash,
    }
}

// ── Auth token repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthTokenRepository {
    pub db: DatabaseConnection,
}

impl AuthTokenRepository for DbAuthTokenRepository {
    async fn create(&self, token_id: Uuid, user_id: i32) -> Result<(), RecipesServiceError> {
        auth_tokens::ActiveModel {
            id: Set(token_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await
        .context("create auth token")?;
        Ok(())
    }

    async fn find_session(&self, token_id: Uuid) -> Result<Option<Session>, RecipesServiceError> {
        let row = auth_tokens::Entity::find_by_id(token_id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find auth token")?;
        Ok(row.and_then(|(token, user)| {
            user.map(|user| Session {
                token_id: token.id,
                user_id: user.id,
                role: UserRole::from_i16(user.role).unwrap_or(UserRole::User),
            })
        }))
    }

    async fn delete(&self, token_id: Uuid) -> Result<bool, RecipesServiceError> {
        let result = auth_tokens::Entity::delete_by_id(token_id)
            .exec(&self.db)
            .await
            .context("delete auth token")?;
        Ok(result.rows_affected > 0)
    }
}

// ── Tag repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTagRepository {
    pub db: DatabaseConnection,
}

impl TagRepository for DbTagRepository {
    async fn list(&self) -> Result<Vec<Tag>, RecipesServiceError> {
        let models = tags::Entity::find()
            .order_by_asc(tags::Column::Name)
            .all(&self.db)
            .await
            .context("list tags")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, RecipesServiceError> {
        let model = tags::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find tag by id")?;
        Ok(model.map(tag_from_model))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, RecipesServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = tags::Entity::find()
            .filter(tags::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find tags by ids")?;
        Ok(models.into_iter().map(tag_from_model).collect())
    }

    async fn create(&self, tag: &NewTag) -> Result<Tag, RecipesServiceError> {
        let result = tags::ActiveModel {
            name: Set(tag.name.clone()),
            slug: Set(tag.slug.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(tag_from_model(model)),
            Err(e) if is_unique_violation(&e) => Err(RecipesServiceError::TagAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create tag").into()),
        }
    }
}

fn tag_from_model(model: tags::Model) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        slug: model.slug,
    }
}

// ── Ingredient repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIngredientRepository {
    pub db: DatabaseConnection,
}

impl IngredientRepository for DbIngredientRepository {
    async fn search(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, RecipesServiceError> {
        let mut query = ingredients::Entity::find();
        if let Some(prefix) = name_prefix {
            query = query.filter(starts_with_ci(ingredients::Column::Name, prefix));
        }
        let models = query
            .order_by_asc(ingredients::Column::Name)
            .order_by_asc(ingredients::Column::Id)
            .all(&self.db)
            .await
            .context("search ingredients")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, RecipesServiceError> {
        let model = ingredients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find ingredient by id")?;
        Ok(model.map(ingredient_from_model))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Ingredient>, RecipesServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = ingredients::Entity::find()
            .filter(ingredients::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .context("find ingredients by ids")?;
        Ok(models.into_iter().map(ingredient_from_model).collect())
    }

    async fn create(&self, ingredient: &NewIngredient) -> Result<Ingredient, RecipesServiceError> {
        let result = ingredients::ActiveModel {
            name: Set(ingredient.name.clone()),
            measurement_unit: Set(ingredient.measurement_unit.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(model) => Ok(ingredient_from_model(model)),
            Err(e) if is_unique_violation(&e) => Err(RecipesServiceError::IngredientAlreadyExists),
            Err(e) => Err(anyhow::Error::new(e).context("create ingredient").into()),
        }
    }
}

fn ingredient_from_model(model: ingredients::Model) -> Ingredient {
    Ingredient {
        id: model.id,
        name: model.name,
        measurement_unit: model.measurement_unit,
    }
}

// ── Recipe repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeRepository {
    pub db: DatabaseConnection,
}

/// `SELECT recipe_id FROM <favorites|shopping_carts> WHERE user_id = ?`
fn collection_recipe_ids(collection: RecipeCollection, user_id: i32) -> SelectStatement {
    match collection {
        RecipeCollection::Favorites => Query::select()
            .column(favorites::Column::RecipeId)
            .from(favorites::Entity)
            .and_where(Expr::col(favorites::Column::UserId).eq(user_id))
            .to_owned(),
        RecipeCollection::ShoppingCart => Query::select()
            .column(shopping_carts::Column::RecipeId)
            .from(shopping_carts::Entity)
            .and_where(Expr::col(shopping_carts::Column::UserId).eq(user_id))
            .to_owned(),
    }
}

fn membership_condition(
    collection: RecipeCollection,
    filter: MembershipFilter,
) -> sea_orm::sea_query::SimpleExpr {
    let subquery = collection_recipe_ids(collection, filter.user_id);
    if filter.include {
        recipes::Column::Id.in_subquery(subquery)
    } else {
        recipes::Column::Id.not_in_subquery(subquery)
    }
}

/// Attach tags and ingredients to recipe rows, preserving row order.
async fn load_recipes<C: ConnectionTrait>(
    db: &C,
    models: Vec<recipes::Model>,
) -> Result<Vec<Recipe>, DbErr> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();

    let tag_rows = recipe_tags::Entity::find()
        .filter(recipe_tags::Column::RecipeId.is_in(ids.clone()))
        .order_by_asc(recipe_tags::Column::TagId)
        .find_also_related(tags::Entity)
        .all(db)
        .await?;
    let mut tags_by_recipe: HashMap<i32, Vec<Tag>> = HashMap::new();
    for (link, tag) in tag_rows {
        if let Some(tag) = tag {
            tags_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(tag_from_model(tag));
        }
    }

    let ingredient_rows = recipe_ingredients::Entity::find()
        .filter(recipe_ingredients::Column::RecipeId.is_in(ids))
        .order_by_asc(recipe_ingredients::Column::IngredientId)
        .find_also_related(ingredients::Entity)
        .all(db)
        .await?;
    let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredient>> = HashMap::new();
    for (link, ingredient) in ingredient_rows {
        if let Some(ingredient) = ingredient {
            ingredients_by_recipe
                .entry(link.recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    ingredient: ingredient_from_model(ingredient),
                    amount: link.amount,
                });
        }
    }

    Ok(models
        .into_iter()
        .map(|m| Recipe {
            tags: tags_by_recipe.remove(&m.id).unwrap_or_default(),
            ingredients: ingredients_by_recipe.remove(&m.id).unwrap_or_default(),
            id: m.id,
            author_id: m.author_id,
            name: m.name,
            text: m.text,
            image: m.image,
            cooking_time: m.cooking_time,
            created_at: m.created_at,
        })
        .collect())
}

async fn insert_recipe_links<C: ConnectionTrait>(
    db: &C,
    recipe_id: i32,
    tag_ids: &[i32],
    amounts: &[IngredientAmount],
) -> Result<(), DbErr> {
    if !tag_ids.is_empty() {
        recipe_tags::Entity::insert_many(tag_ids.iter().map(|tag_id| recipe_tags::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(*tag_id),
        }))
        .exec_without_returning(db)
        .await?;
    }
    if !amounts.is_empty() {
        recipe_ingredients::Entity::insert_many(amounts.iter().map(|item| {
            recipe_ingredients::ActiveModel {
                recipe_id: Set(recipe_id),
                ingredient_id: Set(item.ingredient_id),
                amount: Set(item.amount),
            }
        }))
        .exec_without_returning(db)
        .await?;
    }
    Ok(())
}

impl RecipeRepository for DbRecipeRepository {
    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, RecipesServiceError> {
        let page = page.clamped();
        let mut query = recipes::Entity::find();
        if let Some(author_id) = filter.author_id {
            query = query.filter(recipes::Column::AuthorId.eq(author_id));
        }
        if !filter.tag_slugs.is_empty() {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column((recipe_tags::Entity, recipe_tags::Column::RecipeId))
                        .from(recipe_tags::Entity)
                        .inner_join(
                            tags::Entity,
                            Expr::col((tags::Entity, tags::Column::Id))
                                .equals((recipe_tags::Entity, recipe_tags::Column::TagId)),
                        )
                        .and_where(
                            Expr::col((tags::Entity, tags::Column::Slug))
                                .is_in(filter.tag_slugs.iter().cloned()),
                        )
                        .to_owned(),
                ),
            );
        }
        if let Some(favorited) = filter.favorited {
            query = query.filter(membership_condition(RecipeCollection::Favorites, favorited));
        }
        if let Some(in_cart) = filter.in_shopping_cart {
            query = query.filter(membership_condition(RecipeCollection::ShoppingCart, in_cart));
        }

        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count recipes")?;
        let models = query
            .order_by_asc(recipes::Column::Name)
            .order_by_asc(recipes::Column::Id)
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list recipes")?;
        let items = load_recipes(&self.db, models)
            .await
            .context("load recipe relations")?;
        Ok(Page { items, count })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, RecipesServiceError> {
        let Some(model) = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe by id")?
        else {
            return Ok(None);
        };
        let recipe = load_recipes(&self.db, vec![model])
            .await
            .context("load recipe relations")?;
        Ok(recipe.into_iter().next())
    }

    async fn find_summary(&self, id: i32) -> Result<Option<RecipeSummary>, RecipesServiceError> {
        let model = recipes::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find recipe summary")?;
        Ok(model.map(summary_from_model))
    }

    async fn create(&self, draft: &RecipeDraft) -> Result<i32, RecipesServiceError> {
        let id = self
            .db
            .transaction::<_, i32, DbErr>(|txn| {
                let draft = draft.clone();
                Box::pin(async move {
                    let recipe = recipes::ActiveModel {
                        author_id: Set(draft.author_id),
                        name: Set(draft.name),
                        text: Set(draft.text),
                        image: Set(draft.image),
                        cooking_time: Set(draft.cooking_time),
                        created_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                    insert_recipe_links(txn, recipe.id, &draft.tag_ids, &draft.ingredients)
                        .await?;
                    Ok(recipe.id)
                })
            })
            .await
            .context("create recipe")?;
        Ok(id)
    }

    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), RecipesServiceError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let changes = changes.clone();
                Box::pin(async move {
                    let mut am = recipes::ActiveModel {
                        id: Unchanged(id),
                        ..Default::default()
                    };
                    if let Some(name) = changes.name {
                        am.name = Set(name);
                    }
                    if let Some(text) = changes.text {
                        am.text = Set(text);
                    }
                    if let Some(image) = changes.image {
                        am.image = Set(image);
                    }
                    if let Some(cooking_time) = changes.cooking_time {
                        am.cooking_time = Set(cooking_time);
                    }
                    if am.is_changed() {
                        am.update(txn).await?;
                    }

                    recipe_tags::Entity::delete_many()
                        .filter(recipe_tags::Column::RecipeId.eq(id))
                        .exec(txn)
                        .await?;
                    recipe_ingredients::Entity::delete_many()
                        .filter(recipe_ingredients::Column::RecipeId.eq(id))
                        .exec(txn)
                        .await?;
                    insert_recipe_links(txn, id, &changes.tag_ids, &changes.ingredients).await?;
                    Ok(())
                })
            })
            .await
            .context("update recipe")?;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, RecipesServiceError> {
        let result = recipes::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete recipe")?;
        Ok(result.rows_affected > 0)
    }

    async fn list_by_author(
        &self,
        author_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<RecipeSummary>, RecipesServiceError> {
        let mut query = recipes::Entity::find()
            .filter(recipes::Column::AuthorId.eq(author_id))
            .order_by_desc(recipes::Column::CreatedAt)
            .order_by_desc(recipes::Column::Id);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        let models = query
            .all(&self.db)
            .await
            .context("list recipes by author")?;
        Ok(models.into_iter().map(summary_from_model).collect())
    }

    async fn count_by_authors(
        &self,
        author_ids: &[i32],
    ) -> Result<HashMap<i32, u64>, RecipesServiceError> {
        #[derive(Debug, FromQueryResult)]
        struct AuthorCount {
            author_id: i32,
            recipes: i64,
        }

        if author_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = recipes::Entity::find()
            .select_only()
            .column(recipes::Column::AuthorId)
            .column_as(Expr::col(recipes::Column::Id).count(), "recipes")
            .filter(recipes::Column::AuthorId.is_in(author_ids.iter().copied()))
            .group_by(recipes::Column::AuthorId)
            .into_model::<AuthorCount>()
            .all(&self.db)
            .await
            .context("count recipes by author")?;
        Ok(rows
            .into_iter()
            .map(|row| (row.author_id, row.recipes.max(0) as u64))
            .collect())
    }
}

fn summary_from_model(model: recipes::Model) -> RecipeSummary {
    RecipeSummary {
        id: model.id,
        author_id: model.author_id,
        name: model.name,
        image: model.image,
        cooking_time: model.cooking_time,
    }
}

// ── Favorites / shopping cart ────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRecipeCollectionRepository {
    pub db: DatabaseConnection,
}

impl RecipeCollectionRepository for DbRecipeCollectionRepository {
    async fn add(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, RecipesServiceError> {
        let created_at = Utc::now();
        // The composite primary key settles concurrent duplicates.
        let inserted = match collection {
            RecipeCollection::Favorites => {
                favorites::Entity::insert(favorites::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    created_at: Set(created_at),
                })
                .on_conflict(
                    OnConflict::columns([favorites::Column::UserId, favorites::Column::RecipeId])
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await
            }
            RecipeCollection::ShoppingCart => {
                shopping_carts::Entity::insert(shopping_carts::ActiveModel {
                    user_id: Set(user_id),
                    recipe_id: Set(recipe_id),
                    created_at: Set(created_at),
                })
                .on_conflict(
                    OnConflict::columns([
                        shopping_carts::Column::UserId,
                        shopping_carts::Column::RecipeId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&self.db)
                .await
            }
        }
        .with_context(|| format!("add recipe to {collection:?}"))?;
        Ok(inserted > 0)
    }

    async fn remove(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, RecipesServiceError> {
        let result = match collection {
            RecipeCollection::Favorites => {
                favorites::Entity::delete_many()
                    .filter(favorites::Column::UserId.eq(user_id))
                    .filter(favorites::Column::RecipeId.eq(recipe_id))
                    .exec(&self.db)
                    .await
            }
            RecipeCollection::ShoppingCart => {
                shopping_carts::Entity::delete_many()
                    .filter(shopping_carts::Column::UserId.eq(user_id))
                    .filter(shopping_carts::Column::RecipeId.eq(recipe_id))
                    .exec(&self.db)
                    .await
            }
        }
        .with_context(|| format!("remove recipe from {collection:?}"))?;
        Ok(result.rows_affected > 0)
    }

    async fn contains_any(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>, RecipesServiceError> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids = recipe_ids.iter().copied();
        let found: Vec<i32> = match collection {
            RecipeCollection::Favorites => favorites::Entity::find()
                .filter(favorites::Column::UserId.eq(user_id))
                .filter(favorites::Column::RecipeId.is_in(ids))
                .all(&self.db)
                .await
                .map(|rows| rows.into_iter().map(|r| r.recipe_id).collect()),
            RecipeCollection::ShoppingCart => shopping_carts::Entity::find()
                .filter(shopping_carts::Column::UserId.eq(user_id))
                .filter(shopping_carts::Column::RecipeId.is_in(ids))
                .all(&self.db)
                .await
                .map(|rows| rows.into_iter().map(|r| r.recipe_id).collect()),
        }
        .with_context(|| format!("check {collection:?} membership"))?;
        Ok(found.into_iter().collect())
    }

    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLine>, RecipesServiceError> {
        let rows = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.in_subquery(collection_recipe_ids(
                RecipeCollection::ShoppingCart,
                user_id,
            )))
            .find_also_related(ingredients::Entity)
            .all(&self.db)
            .await
            .context("load shopping cart ingredients")?;
        Ok(rows
            .into_iter()
            .filter_map(|(link, ingredient)| {
                ingredient.map(|ingredient| CartLine {
                    recipe_id: link.recipe_id,
                    ingredient_id: ingredient.id,
                    name: ingredient.name,
                    measurement_unit: ingredient.measurement_unit,
                    amount: link.amount,
                })
            })
            .collect())
    }
}

// ── Subscription repository ──────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSubscriptionRepository {
    pub db: DatabaseConnection,
}

impl SubscriptionRepository for DbSubscriptionRepository {
    async fn add(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError> {
        let inserted = subscriptions::Entity::insert(subscriptions::ActiveModel {
            user_id: Set(user_id),
            author_id: Set(author_id),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([
                subscriptions::Column::UserId,
                subscriptions::Column::AuthorId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await
        .context("create subscription")?;
        Ok(inserted > 0)
    }

    async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.eq(author_id))
            .exec(&self.db)
            .await
            .context("delete subscription")?;
        Ok(result.rows_affected > 0)
    }

    async fn followed_among(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> Result<HashSet<i32>, RecipesServiceError> {
        if author_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let rows = subscriptions::Entity::find()
            .filter(subscriptions::Column::UserId.eq(user_id))
            .filter(subscriptions::Column::AuthorId.is_in(author_ids.iter().copied()))
            .all(&self.db)
            .await
            .context("check subscriptions")?;
        Ok(rows.into_iter().map(|r| r.author_id).collect())
    }

    async fn list_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> Result<Page<User>, RecipesServiceError> {
        let page = page.clamped();
        let query = users::Entity::find()
            .filter(
                users::Column::Id.in_subquery(
                    Query::select()
                        .column(subscriptions::Column::AuthorId)
                        .from(subscriptions::Entity)
                        .and_where(Expr::col(subscriptions::Column::UserId).eq(user_id))
                        .to_owned(),
                ),
            )
            .order_by_asc(users::Column::Username);
        let count = query
            .clone()
            .count(&self.db)
            .await
            .context("count subscriptions")?;
        let models = query
            .offset(page.offset())
            .limit(u64::from(page.limit))
            .all(&self.db)
            .await
            .context("list subscriptions")?;
        Ok(Page {
            items: models.into_iter().map(user_from_model).collect(),
            count,
        })
    }
}
