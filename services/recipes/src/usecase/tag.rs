use crate::domain::repository::TagRepository;
use crate::domain::types::{NewTag, Tag};
use crate::domain::validation;
use crate::error::RecipesServiceError;

pub struct ListTagsUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> ListTagsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<Tag>, RecipesServiceError> {
        self.repo.list().await
    }
}

pub struct GetTagUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> GetTagUseCase<R> {
    pub async fn execute(&self, id: i32) -> Result<Tag, RecipesServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(RecipesServiceError::TagNotFound)
    }
}

pub struct CreateTagInput {
    pub name: String,
    pub slug: String,
}

pub struct CreateTagUseCase<R: TagRepository> {
    pub repo: R,
}

impl<R: TagRepository> CreateTagUseCase<R> {
    pub async fn execute(&self, input: CreateTagInput) -> Result<Tag, RecipesServiceError> {
        let name = validation::required_text("name", &input.name, validation::TAG_MAX_LEN)?;
        let slug = validation::slug(&input.slug)?;
        self.repo.create(&NewTag { name, slug }).await
    }
}
