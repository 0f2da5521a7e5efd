use crate::domain::repository::RecipeCollectionRepository;
use crate::domain::shopping_list;
use crate::error::RecipesServiceError;

/// Render the user's cart as a plain-text shopping list.
pub struct DownloadShoppingListUseCase<C: RecipeCollectionRepository> {
    pub collections: C,
}

impl<C: RecipeCollectionRepository> DownloadShoppingListUseCase<C> {
    pub async fn execute(&self, user_id: i32) -> Result<String, RecipesServiceError> {
        let lines = self.collections.cart_lines(user_id).await?;
        let items = shopping_list::aggregate(lines);
        Ok(shopping_list::render(&items))
    }
}
