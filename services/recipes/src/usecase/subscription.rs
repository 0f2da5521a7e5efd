use larder_domain::pagination::{Page, PageRequest};

use crate::domain::repository::{RecipeRepository, SubscriptionRepository, UserRepository};
use crate::domain::types::{AuthorView, UserView};
use crate::error::RecipesServiceError;

// ── Subscribe ────────────────────────────────────────────────────────────────

pub struct SubscribeUseCase<U, R, S>
where
    U: UserRepository,
    R: RecipeRepository,
    S: SubscriptionRepository,
{
    pub users: U,
    pub recipes: R,
    pub subscriptions: S,
}

impl<U, R, S> SubscribeUseCase<U, R, S>
where
    U: UserRepository,
    R: RecipeRepository,
    S: SubscriptionRepository,
{
    pub async fn execute(
        &self,
        user_id: i32,
        author_id: i32,
        recipes_limit: Option<u64>,
    ) -> Result<AuthorView, RecipesServiceError> {
        let author = self
            .users
            .find_by_id(author_id)
            .await?
            .ok_or(RecipesServiceError::UserNotFound)?;
        if author.id == user_id {
            return Err(RecipesServiceError::SelfSubscription);
        }
        if !self.subscriptions.add(user_id, author_id).await? {
            return Err(RecipesServiceError::AlreadySubscribed);
        }
        tracing::info!(user_id, author_id, "subscribed");

        let recipes = self.recipes.list_by_author(author_id, recipes_limit).await?;
        let recipes_count = self
            .recipes
            .count_by_authors(&[author_id])
            .await?
            .get(&author_id)
            .copied()
            .unwrap_or(0);
        Ok(AuthorView {
            author: UserView {
                user: author,
                is_subscribed: true,
            },
            recipes,
            recipes_count,
        })
    }
}

// ── Unsubscribe ──────────────────────────────────────────────────────────────

pub struct UnsubscribeUseCase<U: UserRepository, S: SubscriptionRepository> {
    pub users: U,
    pub subscriptions: S,
}

impl<U: UserRepository, S: SubscriptionRepository> UnsubscribeUseCase<U, S> {
    pub async fn execute(&self, user_id: i32, author_id: i32) -> Result<(), RecipesServiceError> {
        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(RecipesServiceError::UserNotFound);
        }
        if !self.subscriptions.remove(user_id, author_id).await? {
            return Err(RecipesServiceError::NotSubscribed);
        }
        Ok(())
    }
}

// ── List ─────────────────────────────────────────────────────────────────────

pub struct ListSubscriptionsUseCase<R: RecipeRepository, S: SubscriptionRepository> {
    pub recipes: R,
    pub subscriptions: S,
}

impl<R: RecipeRepository, S: SubscriptionRepository> ListSubscriptionsUseCase<R, S> {
    pub async fn execute(
        &self,
        user_id: i32,
        page: PageRequest,
        recipes_limit: Option<u64>,
    ) -> Result<Page<AuthorView>, RecipesServiceError> {
        let Page { items, count } = self
            .subscriptions
            .list_authors(user_id, page.clamped())
            .await?;
        let ids: Vec<i32> = items.iter().map(|u| u.id).collect();
        let counts = self.recipes.count_by_authors(&ids).await?;

        let mut authors = Vec::with_capacity(items.len());
        for user in items {
            let recipes = self.recipes.list_by_author(user.id, recipes_limit).await?;
            authors.push(AuthorView {
                recipes_count: counts.get(&user.id).copied().unwrap_or(0),
                recipes,
                author: UserView {
                    user,
                    is_subscribed: true,
                },
            });
        }
        Ok(Page {
            items: authors,
            count,
        })
    }
}
