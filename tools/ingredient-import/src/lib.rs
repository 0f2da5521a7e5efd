//! Get-or-create import of `{name, measurement_unit}` rows.

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use serde::Deserialize;

use larder_recipes_schema::ingredients;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientRow {
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub skipped: usize,
}

/// Parse the import file. Surrounding whitespace is dropped from both fields.
pub fn parse_rows(raw: &str) -> Result<Vec<IngredientRow>> {
    let rows: Vec<IngredientRow> =
        serde_json::from_str(raw).context("expected a JSON array of {name, measurement_unit}")?;
    Ok(rows
        .into_iter()
        .map(|row| IngredientRow {
            name: row.name.trim().to_owned(),
            measurement_unit: row.measurement_unit.trim().to_owned(),
        })
        .collect())
}

/// Insert every `(name, measurement_unit)` pair not already present.
///
/// Rows with a blank field are skipped, as are pairs that exist already or
/// repeat earlier in the same file.
pub async fn import<C: ConnectionTrait>(db: &C, rows: Vec<IngredientRow>) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    for row in rows {
        if row.name.is_empty() || row.measurement_unit.is_empty() {
            tracing::warn!(?row, "skipping row with a blank field");
            report.skipped += 1;
            continue;
        }
        let existing = ingredients::Entity::find()
            .filter(ingredients::Column::Name.eq(row.name.as_str()))
            .filter(ingredients::Column::MeasurementUnit.eq(row.measurement_unit.as_str()))
            .one(db)
            .await
            .with_context(|| format!("look up ingredient {}", row.name))?;
        if existing.is_some() {
            report.skipped += 1;
            continue;
        }
        ingredients::ActiveModel {
            name: Set(row.name.clone()),
            measurement_unit: Set(row.measurement_unit.clone()),
            ..Default::default()
        }
        .insert(db)
        .await
        .with_context(|| format!("insert ingredient {}", row.name))?;
        report.created += 1;
    }
    Ok(report)
}
