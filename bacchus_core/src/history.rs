//! Drink history loading with a recency window.
//!
//! This module loads recent drinks from both WAL and CSV files to feed the
//! estimator. Entries that fail to parse, or whose numbers are implausible,
//! are skipped with a warning rather than failing the whole load.

use crate::{DrinkEvent, Result};
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// CSV row format for reading archived drinks
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    volume_ml: f64,
    abv: f64,
    consumed_at: String,
    icon: Option<String>,
}

impl TryFrom<CsvRow> for DrinkEvent {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let consumed_at = DateTime::parse_from_rfc3339(&row.consumed_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(DrinkEvent {
            id,
            name: row.name,
            volume_ml: row.volume_ml,
            abv: row.abv,
            consumed_at,
            icon: row.icon.filter(|s| !s.is_empty()),
        })
    }
}

/// Load drinks from the last N days from both WAL and CSV
///
/// Returns drinks sorted by consumed_at (newest first).
/// Automatically deduplicates drinks that appear in both WAL and CSV.
pub fn load_recent_drinks(
    wal_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<DrinkEvent>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut drinks = Vec::new();
    let mut seen_ids = HashSet::new();

    // Load from WAL first (most recent)
    if wal_path.exists() {
        let wal_drinks = crate::wal::read_drinks(wal_path)?;
        for drink in wal_drinks {
            if !drink.is_valid() {
                tracing::warn!("Skipping implausible drink {} from WAL", drink.id);
                continue;
            }
            if drink.consumed_at >= cutoff {
                seen_ids.insert(drink.id);
                drinks.push(drink);
            }
        }
        tracing::debug!("Loaded {} drinks from WAL", drinks.len());
    }

    // Load from CSV (archived)
    if csv_path.exists() {
        let csv_drinks = load_drinks_from_csv(csv_path)?;
        let mut csv_count = 0;
        for drink in csv_drinks {
            if !drink.is_valid() {
                tracing::warn!("Skipping implausible drink {} from CSV", drink.id);
                continue;
            }
            if drink.consumed_at >= cutoff && !seen_ids.contains(&drink.id) {
                seen_ids.insert(drink.id);
                drinks.push(drink);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} drinks from CSV", csv_count);
    }

    // Sort by consumed_at, newest first
    drinks.sort_by(|a, b| b.consumed_at.cmp(&a.consumed_at));

    tracing::info!(
        "Loaded {} total drinks from last {} days",
        drinks.len(),
        days
    );

    Ok(drinks)
}

/// Load all drinks from a CSV file
fn load_drinks_from_csv(path: &Path) -> Result<Vec<DrinkEvent>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut drinks = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result {
            Ok(row) => match DrinkEvent::try_from(row) {
                Ok(drink) => drinks.push(drink),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                    // Continue processing other rows
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(drinks)
}
