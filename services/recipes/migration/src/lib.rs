pub use sea_orm_migration::MigratorTrait;
use sea_orm_migration::prelude::*;

mod m20261001_000001_create_users;
mod m20261001_000002_create_auth_tokens;
mod m20261001_000003_create_tags_and_ingredients;
mod m20261001_000004_create_recipes;
mod m20261001_000005_create_favorites_and_carts;
mod m20261001_000006_create_subscriptions;
mod m20261001_000007_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_users::Migration),
            Box::new(m20261001_000002_create_auth_tokens::Migration),
            Box::new(m20261001_000003_create_tags_and_ingredients::Migration),
            Box::new(m20261001_000004_create_recipes::Migration),
            Box::new(m20261001_000005_create_favorites_and_carts::Migration),
            Box::new(m20261001_000006_create_subscriptions::Migration),
            Box::new(m20261001_000007_add_lookup_indexes::Migration),
        ]
    }
}
