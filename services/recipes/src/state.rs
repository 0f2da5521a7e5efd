use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::RecipesConfig;
use crate::infra::db::{
    DbAuthTokenRepository, DbIngredientRepository, DbRecipeCollectionRepository,
    DbRecipeRepository, DbSubscriptionRepository, DbTagRepository, DbUserRepository,
};
use crate::infra::media::FsMediaStore;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<RecipesConfig>,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbAuthTokenRepository {
        DbAuthTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn tag_repo(&self) -> DbTagRepository {
        DbTagRepository {
            db: self.db.clone(),
        }
    }

    pub fn ingredient_repo(&self) -> DbIngredientRepository {
        DbIngredientRepository {
            db: self.db.clone(),
        }
    }

    pub fn recipe_repo(&self) -> DbRecipeRepository {
        DbRecipeRepository {
            db: self.db.clone(),
        }
    }

    pub fn collection_repo(&self) -> DbRecipeCollectionRepository {
        DbRecipeCollectionRepository {
            db: self.db.clone(),
        }
    }

    pub fn subscription_repo(&self) -> DbSubscriptionRepository {
        DbSubscriptionRepository {
            db: self.db.clone(),
        }
    }

    pub fn media(&self) -> FsMediaStore {
        FsMediaStore {
            root: self.config.media_root.clone(),
        }
    }
}
