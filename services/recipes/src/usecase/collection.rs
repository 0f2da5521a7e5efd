use crate::domain::repository::{RecipeCollectionRepository, RecipeRepository};
use crate::domain::types::{RecipeCollection, RecipeSummary};
use crate::error::RecipesServiceError;

/// Add a recipe to the user's favorites or shopping cart.
pub struct AddToCollectionUseCase<R: RecipeRepository, C: RecipeCollectionRepository> {
    pub recipes: R,
    pub collections: C,
}

impl<R: RecipeRepository, C: RecipeCollectionRepository> AddToCollectionUseCase<R, C> {
    pub async fn execute(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<RecipeSummary, RecipesServiceError> {
        let recipe = self
            .recipes
            .find_summary(recipe_id)
            .await?
            .ok_or(RecipesServiceError::RecipeNotFound)?;
        if !self.collections.add(collection, user_id, recipe_id).await? {
            return Err(collection.already_added());
        }
        Ok(recipe)
    }
}

pub struct RemoveFromCollectionUseCase<R: RecipeRepository, C: RecipeCollectionRepository> {
    pub recipes: R,
    pub collections: C,
}

impl<R: RecipeRepository, C: RecipeCollectionRepository> RemoveFromCollectionUseCase<R, C> {
    pub async fn execute(
        &self,
        collection: RecipeCollection,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<(), RecipesServiceError> {
        if self.recipes.find_summary(recipe_id).await?.is_none() {
            return Err(RecipesServiceError::RecipeNotFound);
        }
        if !self
            .collections
            .remove(collection, user_id, recipe_id)
            .await?
        {
            return Err(collection.not_added());
        }
        Ok(())
    }
}
