//! Viewer-dependent enrichment: subscription and collection flags.

use std::collections::HashSet;

use anyhow::anyhow;

use crate::domain::repository::{
    RecipeCollectionRepository, SubscriptionRepository, UserRepository,
};
use crate::domain::types::{Recipe, RecipeCollection, RecipeView, User, UserView};
use crate::error::RecipesServiceError;

/// Flag each user with whether `viewer` follows them. Anonymous viewers follow no one.
pub async fn user_views<S: SubscriptionRepository>(
    subscriptions: &S,
    viewer: Option<i32>,
    users: Vec<User>,
) -> Result<Vec<UserView>, RecipesServiceError> {
    let followed = match viewer {
        Some(viewer) if !users.is_empty() => {
            let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
            subscriptions.followed_among(viewer, &ids).await?
        }
        _ => HashSet::new(),
    };
    Ok(users
        .into_iter()
        .map(|user| UserView {
            is_subscribed: followed.contains(&user.id),
            user,
        })
        .collect())
}

pub async fn recipe_views<U, C, S>(
    users: &U,
    collections: &C,
    subscriptions: &S,
    viewer: Option<i32>,
    recipes: Vec<Recipe>,
) -> Result<Vec<RecipeView>, RecipesServiceError>
where
    U: UserRepository,
    C: RecipeCollectionRepository,
    S: SubscriptionRepository,
{
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let mut author_ids: Vec<i32> = recipes.iter().map(|r| r.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors = users.find_by_ids(&author_ids).await?;
    let authors = user_views(subscriptions, viewer, authors).await?;

    let (favorited, in_cart) = match viewer {
        Some(viewer) => {
            let recipe_ids: Vec<i32> = recipes.iter().map(|r| r.id).collect();
            (
                collections
                    .contains_any(RecipeCollection::Favorites, viewer, &recipe_ids)
                    .await?,
                collections
                    .contains_any(RecipeCollection::ShoppingCart, viewer, &recipe_ids)
                    .await?,
            )
        }
        None => (HashSet::new(), HashSet::new()),
    };

    recipes
        .into_iter()
        .map(|recipe| {
            let author = authors
                .iter()
                .find(|a| a.user.id == recipe.author_id)
                .cloned()
                .ok_or_else(|| anyhow!("author {} of recipe {} missing", recipe.author_id, recipe.id))?;
            Ok(RecipeView {
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                author,
                recipe,
            })
        })
        .collect()
}
