//! In-memory implementation of every repository trait for use-case tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use larder_auth_types::password::hash_password;
use larder_domain::pagination::{Page, PageRequest};
use larder_domain::user::UserRole;

use crate::domain::repository::{
    AuthTokenRepository, IngredientRepository, MediaStore, RecipeCollectionRepository,
    RecipeRepository, SubscriptionRepository, TagRepository, UserRepository,
};
use crate::domain::types::{
    CartLine, ImageUpload, Ingredient, NewIngredient, NewTag, NewUser, Recipe, RecipeChanges,
    RecipeCollection, RecipeDraft, RecipeFilter, RecipeIngredient, RecipeSummary, Session, Tag,
    User, UserCredentials,
};
use crate::error::RecipesServiceError;

#[derive(Default)]
struct State {
    next_id: i32,
    users: Vec<UserCredentials>,
    tokens: HashMap<Uuid, i32>,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    favorites: HashSet<(i32, i32)>,
    carts: HashSet<(i32, i32)>,
    subscriptions: HashSet<(i32, i32)>,
    media: HashSet<String>,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn collection(&mut self, collection: RecipeCollection) -> &mut HashSet<(i32, i32)> {
        match collection {
            RecipeCollection::Favorites => &mut self.favorites,
            RecipeCollection::ShoppingCart => &mut self.carts,
        }
    }

    fn recipe_from_draft(&self, id: i32, draft: &RecipeDraft) -> Recipe {
        Recipe {
            id,
            author_id: draft.author_id,
            name: draft.name.clone(),
            text: draft.text.clone(),
            image: draft.image.clone(),
            cooking_time: draft.cooking_time,
            created_at: Utc::now(),
            tags: self.resolve_tags(&draft.tag_ids),
            ingredients: self.resolve_ingredients(&draft.ingredients),
        }
    }

    fn resolve_tags(&self, ids: &[i32]) -> Vec<Tag> {
        self.tags
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect()
    }

    fn resolve_ingredients(
        &self,
        items: &[crate::domain::types::IngredientAmount],
    ) -> Vec<RecipeIngredient> {
        items
            .iter()
            .filter_map(|item| {
                self.ingredients
                    .iter()
                    .find(|i| i.id == item.ingredient_id)
                    .map(|ingredient| RecipeIngredient {
                        ingredient: ingredient.clone(),
                        amount: item.amount,
                    })
            })
            .collect()
    }
}

fn summary(recipe: &Recipe) -> RecipeSummary {
    RecipeSummary {
        id: recipe.id,
        author_id: recipe.author_id,
        name: recipe.name.clone(),
        image: recipe.image.clone(),
        cooking_time: recipe.cooking_time,
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: PageRequest) -> Page<T> {
    let page = page.clamped();
    let count = items.len() as u64;
    let items = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    Page { items, count }
}

#[derive(Clone, Default)]
pub struct FakeStore(Arc<Mutex<State>>);

impl FakeStore {
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    pub fn insert_user(&self, username: &str, password: &str, role: UserRole) -> User {
        let password_hash = hash_password(password).unwrap();
        let mut state = self.state();
        let user = User {
            id: state.next_id(),
            username: username.into(),
            email: format!("{username}@example.com"),
            first_name: "Test".into(),
            last_name: "Cook".into(),
            avatar: None,
            role,
            created_at: Utc::now(),
        };
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash,
        });
        user
    }

    pub fn insert_tag(&self, name: &str, slug: &str) -> Tag {
        let mut state = self.state();
        let tag = Tag {
            id: state.next_id(),
            name: name.into(),
            slug: slug.into(),
        };
        state.tags.push(tag.clone());
        tag
    }

    pub fn insert_ingredient(&self, name: &str, measurement_unit: &str) -> Ingredient {
        let mut state = self.state();
        let ingredient = Ingredient {
            id: state.next_id(),
            name: name.into(),
            measurement_unit: measurement_unit.into(),
        };
        state.ingredients.push(ingredient.clone());
        ingredient
    }

    pub fn user(&self, id: i32) -> Option<UserCredentials> {
        self.state().users.iter().find(|c| c.user.id == id).cloned()
    }

    pub fn recipe(&self, id: i32) -> Option<Recipe> {
        self.state().recipes.iter().find(|r| r.id == id).cloned()
    }

    pub fn media_paths(&self) -> HashSet<String> {
        self.state().media.clone()
    }
}

impl UserRepository for FakeStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RecipesServiceError> {
        Ok(self.user(id).map(|c| c.user))
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RecipesServiceError> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|c| ids.contains(&c.user.id))
            .map(|c| c.user.clone())
            .collect())
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, RecipesServiceError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|c| c.user.email == email)
            .cloned())
    }

    async fn find_credentials_by_id(
        &self,
        id: i32,
    ) -> Result<Option<UserCredentials>, RecipesServiceError> {
        Ok(self.user(id))
    }

    async fn list(&self, page: PageRequest) -> Result<Page<User>, RecipesServiceError> {
        let users = self.state().users.iter().map(|c| c.user.clone()).collect();
        Ok(paginate(users, page))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, RecipesServiceError> {
        Ok(self.state().users.iter().any(|c| c.user.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, RecipesServiceError> {
        Ok(self.state().users.iter().any(|c| c.user.email == email))
    }

    async fn create(&self, new: &NewUser) -> Result<User, RecipesServiceError> {
        let mut state = self.state();
        let user = User {
            id: state.next_id(),
            username: new.username.clone(),
            email: new.email.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            avatar: None,
            role: UserRole::User,
            created_at: Utc::now(),
        };
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: new.password_hash.clone(),
        });
        Ok(user)
    }

    async fn update_password(
        &self,
        id: i32,
        password_hash: &str,
    ) -> Result<(), RecipesServiceError> {
        if let Some(c) = self.state().users.iter_mut().find(|c| c.user.id == id) {
            c.password_hash = password_hash.to_owned();
        }
        Ok(())
    }

    async fn set_avatar(
        &self,
        id: i32,
        avatar: Option<&str>,
    ) -> Result<Option<String>, RecipesServiceError> {
        let mut state = self.state();
        let c = state
            .users
            .iter_mut()
            .find(|c| c.user.id == id)
            .ok_or(RecipesServiceError::UserNotFound)?;
        Ok(std::mem::replace(
            &mut c.user.avatar,
            avatar.map(str::to_owned),
        ))
    }
}

impl AuthTokenRepository for FakeStore {
    async fn create(&self, token_id: Uuid, user_id: i32) -> Result<(), RecipesServiceError> {
        self.state().tokens.insert(token_id, user_id);
        Ok(())
    }

    async fn find_session(&self, token_id: Uuid) -> Result<Option<Session>, RecipesServiceError> {
        let state = self.state();
        Ok(state.tokens.get(&token_id).and_then(|user_id| {
            state
                .users
                .iter()
                .find(|c| c.user.id == *user_id)
                .map(|c| Session {
                    token_id,
                    user_id: *user_id,
                    role: c.user.role,
                })
        }))
    }

    async fn delete(&self, token_id: Uuid) -> Result<bool, RecipesServiceError> {
        Ok(self.state().tokens.remove(&token_id).is_some())
    }
}

impl TagRepository for FakeStore {
    async fn list(&self) -> Result<Vec<Tag>, RecipesServiceError> {
        let mut tags = self.state().tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Tag>, RecipesServiceError> {
        Ok(self.state().tags.iter().find(|t| t.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>, RecipesServiceError> {
        Ok(self.state().resolve_tags(ids))
    }

    async fn create(&self, tag: &NewTag) -> Result<Tag, RecipesServiceError> {
        let mut state = self.state();
        if state
            .tags
            .iter()
            .any(|t| t.name == tag.name || t.slug == tag.slug)
        {
            return Err(RecipesServiceError::TagAlreadyExists);
        }
        let tag = Tag {
            id: state.next_id(),
            name: tag.name.clone(),
            slug: tag.slug.clone(),
        };
        state.tags.push(tag.clone());
        Ok(tag)
    }
}

impl IngredientRepository for FakeStore {
    async fn search(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, RecipesServiceError> {
        let prefix = name_prefix.map(str::to_lowercase).unwrap_or_default();
        let mut found: Vec<_> = self
            .state()
            .ingredients
            .iter()
            .filter(|i| i.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Ingredient>, RecipesServiceError> {
        Ok(self.state().ingredients.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Ingredient>, RecipesServiceError> {
        Ok(self
            .state()
            .ingredients
            .iter()
            .filter(|i| ids.contains(&i.id))
            .cloned()
            .collect())
    }

    async fn create(&self, new: &NewIngredient) -> Result<Ingredient, RecipesServiceError> {
        let mut state = self.state();
        if state
            .ingredients
            .iter()
            .any(|i| i.name == new.name && i.measurement_unit == new.measurement_unit)
        {
            return Err(RecipesServiceError::IngredientAlreadyExists);
        }
        let ingredient = Ingredient {
            id: state.next_id(),
            name: new.name.clone(),
            measurement_unit: new.measurement_unit.clone(),
        };
        state.ingredients.push(ingredient.clone());
        Ok(ingredient)
    }
}

impl RecipeRepository for FakeStore {
    async fn list(
        &self,
        filter: &RecipeFilter,
        page: PageRequest,
    ) -> Result<Page<Recipe>, RecipesServiceError> {
        let state = self.state();
        let member = |set: &HashSet<(i32, i32)>, f: Option<crate::domain::types::MembershipFilter>, id: i32| {
            f.is_none_or(|f| set.contains(&(f.user_id, id)) == f.include)
        };
        let mut recipes: Vec<Recipe> = state
            .recipes
            .iter()
            .filter(|r| filter.author_id.is_none_or(|a| r.author_id == a))
            .filter(|r| {
                filter.tag_slugs.is_empty()
                    || r.tags.iter().any(|t| filter.tag_slugs.contains(&t.slug))
            })
            .filter(|r| member(&state.favorites, filter.favorited, r.id))
            .filter(|r| member(&state.carts, filter.in_shopping_cart, r.id))
            .cloned()
            .collect();
        recipes.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(paginate(recipes, page))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Recipe>, RecipesServiceError> {
        Ok(self.recipe(id))
    }

    async fn find_summary(&self, id: i32) -> Result<Option<RecipeSummary>, RecipesServiceError> {
        Ok(self.recipe(id).as_ref().map(summary))
    }

    async fn create(&self, draft: &RecipeDraft) -> Result<i32, RecipesServiceError> {
        let mut state = self.state();
        let id = state.next_id();
        let recipe = state.recipe_from_draft(id, draft);
        state.recipes.push(recipe);
        Ok(id)
    }

    async fn update(&self, id: i32, changes: &RecipeChanges) -> Result<(), RecipesServiceError> {
        let mut state = self.state();
        let tags = state.resolve_tags(&changes.tag_ids);
        let ingredients = state.resolve_ingredients(&changes.ingredients);
        let recipe = state
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        if let Some(name) = &changes.name {
            recipe.name = name.clone();
        }
        if let Some(text) = &changes.text {
            recipe.text = text.clone();
        }
        if let Some(image) = &changes.image {
            recipe.image = image.clone();
        }
        if let Some(cooking_time) = changes.cooking_time {
            recipe.cooking_time = cooking_time;
        }
        recipe.tags = tags;
        recipe.ingredients = ingredients;
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<bool, RecipesServiceError> {
        let mut state = self.state();
        let before = state.recipes.len();
        state.recipes.retain(|r| r.id != id);
        Ok(state.recipes.len() < before)
    }

    async fn list_by_author(
        &self,
        author_id: i32,
        limit: Option<u64>,
    ) -> Result<Vec<RecipeSummary>, RecipesServiceError> {
        let state = self.state();
        let mut own: Vec<_> = state
            .recipes
            .iter()
            .filter(|r| r.author_id == author_id)
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let limit = limit.map_or(usize::MAX, |l| l as usize);
        Ok(own.into_iter().take(limit).map(summary).collect())
    }

    async fn count_by_authors(
        &self,
        author_ids: &[i32],
    ) -> Result<HashMap<i32, u64>, RecipesServiceError> {
        let mut counts = HashMap::new();
        for r in self.state().recipes.iter() {
            if author_ids.contains(&r.author_id) {
                *counts.entry(r.author_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

impl RecipeCollectionRepository for FakeStore {
    async fn add(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, RecipesServiceError> {
        Ok(self
            .state()
            .collection(collection)
            .insert((user_id, recipe_id)))
    }

    async fn remove(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<bool, RecipesServiceError> {
        Ok(self
            .state()
            .collection(collection)
            .remove(&(user_id, recipe_id)))
    }

    async fn contains_any(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_ids: &[i32],
    ) -> Result<HashSet<i32>, RecipesServiceError> {
        let mut state = self.state();
        let set = state.collection(collection);
        Ok(recipe_ids
            .iter()
            .copied()
            .filter(|id| set.contains(&(user_id, *id)))
            .collect())
    }

    async fn cart_lines(&self, user_id: i32) -> Result<Vec<CartLine>, RecipesServiceError> {
        let state = self.state();
        Ok(state
            .recipes
            .iter()
            .filter(|r| state.carts.contains(&(user_id, r.id)))
            .flat_map(|r| {
                r.ingredients.iter().map(move |ri| CartLine {
                    recipe_id: r.id,
                    ingredient_id: ri.ingredient.id,
                    name: ri.ingredient.name.clone(),
                    measurement_unit: ri.ingredient.measurement_unit.clone(),
                    amount: ri.amount,
                })
            })
            .collect())
    }
}

impl SubscriptionRepository for FakeStore {
    async fn add(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError> {
        Ok(self.state().subscriptions.insert((user_id, author_id)))
    }

    async fn remove(&self, user_id: i32, author_id: i32) -> Result<bool, RecipesServiceError> {
        Ok(self.state().subscriptions.remove(&(user_id, author_id)))
    }

    async fn followed_among(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> Result<HashSet<i32>, RecipesServiceError> {
        let state = self.state();
        Ok(author_ids
            .iter()
            .copied()
            .filter(|a| state.subscriptions.contains(&(user_id, *a)))
            .collect())
    }

    async fn list_authors(
        &self,
        user_id: i32,
        page: PageRequest,
    ) -> Result<Page<User>, RecipesServiceError> {
        let state = self.state();
        let mut authors: Vec<User> = state
            .users
            .iter()
            .filter(|c| state.subscriptions.contains(&(user_id, c.user.id)))
            .map(|c| c.user.clone())
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paginate(authors, page))
    }
}

impl MediaStore for FakeStore {
    async fn save(&self, dir: &str, image: &ImageUpload) -> Result<String, RecipesServiceError> {
        let path = format!("{dir}/{}.{}", Uuid::new_v4(), image.extension);
        self.state().media.insert(path.clone());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), RecipesServiceError> {
        self.state().media.remove(path);
        Ok(())
    }
}
