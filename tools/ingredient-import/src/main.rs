//! Bulk-load ingredients into the recipes database.
//!
//! ```bash
//! ingredient-import --file data/ingredients.json --database-url postgres://...
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sea_orm::Database;

use larder_core::tracing::{LogFormat, init_tracing};

#[derive(Parser)]
#[command(about = "Import ingredients from a JSON array of {name, measurement_unit}")]
struct Args {
    /// JSON file to read
    #[arg(long)]
    file: PathBuf,

    /// Recipes database connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(LogFormat::Pretty, "ingredient_import=info,sqlx=warn");
    let args = Args::parse();

    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("read {}", args.file.display()))?;
    let rows = ingredient_import::parse_rows(&raw)?;

    let db = Database::connect(&args.database_url)
        .await
        .context("connect to database")?;
    let report = ingredient_import::import(&db, rows).await?;

    tracing::info!(
        file = %args.file.display(),
        created = report.created,
        skipped = report.skipped,
        "ingredient import finished"
    );
    println!("created {}, skipped {}", report.created, report.skipped);
    Ok(())
}
