//! Bulk ingredient import

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::db::Store;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientRecord {
    pub name: String,
    pub measurement_unit: String,
}

/// Parses the import file and drops records with a blank name or unit.
pub fn parse_ingredients(raw: &str) -> anyhow::Result<Vec<IngredientRecord>> {
    let records: Vec<IngredientRecord> =
        serde_json::from_str(raw).context("Expected a JSON array of {name, measurement_unit}")?;

    Ok(records
        .into_iter()
        .map(|r| IngredientRecord {
            name: r.name.trim().to_string(),
            measurement_unit: r.measurement_unit.trim().to_string(),
        })
        .filter(|r| !r.name.is_empty() && !r.measurement_unit.is_empty())
        .collect())
}

pub async fn cmd_import_ingredients(config: &Config, file: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records = parse_ingredients(&raw)?;

    let store = Store::new(&config.general.database_path).await?;

    let mut added = 0usize;
    for record in &records {
        if store
            .insert_ingredient_if_missing(&record.name, &record.measurement_unit)
            .await?
        {
            added += 1;
        }
    }

    let skipped = records.len() - added;
    info!(added, skipped, "Ingredient import finished");
    println!("✓ Imported {added} ingredients ({skipped} already present)");

    Ok(())
}
