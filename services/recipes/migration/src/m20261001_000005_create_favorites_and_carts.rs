use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(user_recipe_table(Favorites::Table)).await?;
        manager
            .create_table(user_recipe_table(ShoppingCarts::Table))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShoppingCarts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await
    }
}

/// Both tables share one shape: a `(user_id, recipe_id)` pair with a timestamp.
fn user_recipe_table<T: Iden + Copy + 'static>(table: T) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(UserRecipe::UserId).integer().not_null())
        .col(ColumnDef::new(UserRecipe::RecipeId).integer().not_null())
        .col(
            ColumnDef::new(UserRecipe::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .primary_key(
            Index::create()
                .col(UserRecipe::UserId)
                .col(UserRecipe::RecipeId),
        )
        .foreign_key(
            ForeignKey::create()
                .from(table, UserRecipe::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .from(table, UserRecipe::RecipeId)
                .to(Recipes::Table, Recipes::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(Iden, Clone, Copy)]
enum Favorites {
    Table,
}

#[derive(Iden, Clone, Copy)]
enum ShoppingCarts {
    Table,
}

#[derive(Iden)]
enum UserRecipe {
    UserId,
    RecipeId,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Recipes {
    Table,
    Id,
}
