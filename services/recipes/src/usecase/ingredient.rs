use crate::domain::repository::IngredientRepository;
use crate::domain::types::{Ingredient, NewIngredient};
use crate::domain::validation;
use crate::error::RecipesServiceError;

pub struct SearchIngredientsUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> SearchIngredientsUseCase<R> {
    /// Blank prefixes match everything.
    pub async fn execute(
        &self,
        name_prefix: Option<&str>,
    ) -> Result<Vec<Ingredient>, RecipesServiceError> {
        let prefix = name_prefix.map(str::trim).filter(|p| !p.is_empty());
        self.repo.search(prefix).await
    }
}

pub struct GetIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> GetIngredientUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Ingredient, RecipesServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(RecipesServiceError::IngredientNotFound)
    }
}

pub struct CreateIngredientInput {
    pub name: String,
    pub measurement_unit: String,
}

pub struct CreateIngredientUseCase<R: IngredientRepository> {
    pub repo: R,
}

impl<R: IngredientRepository> CreateIngredientUseCase<R> {
    pub async fn execute(
        &self,
        input: CreateIngredientInput,
    ) -> Result<Ingredient, RecipesServiceError> {
        let name = validation::required_text(
            "name",
            &input.name,
            validation::INGREDIENT_NAME_MAX_LEN,
        )?;
        let measurement_unit = validation::required_text(
            "measurement_unit",
            &input.measurement_unit,
            validation::MEASUREMENT_UNIT_MAX_LEN,
        )?;
        self.repo
            .create(&NewIngredient {
                name,
                measurement_unit,
            })
            .await
    }
}
