use sea_orm_migration::prelude::*;

use larder_recipes_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
