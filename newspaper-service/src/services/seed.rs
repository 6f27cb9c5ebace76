//! Fixture data loaded into an empty collection at startup.

use crate::models::{records_from_body, Record};
use crate::services::MongoConnection;
use anyhow::{Context, Result};

const CIRCULATION_FIXTURE: &str = include_str!("../../data/circulation.json");

/// The bundled newspaper circulation dataset.
pub fn fixture_records() -> Result<Vec<Record>> {
    records_from_body(CIRCULATION_FIXTURE.as_bytes()).context("Invalid circulation fixture")
}

/// Load the fixture into the default collection if it holds no records.
///
/// Returns how many records were inserted; 0 when the collection was
/// already populated.
pub async fn seed_if_empty(connection: &MongoConnection) -> Result<usize> {
    let existing = connection
        .count(None, None)
        .await
        .context("Failed to count existing records")?;

    if existing > 0 {
        tracing::info!(existing, "Collection already populated, skipping seed");
        return Ok(0);
    }

    let outcome = connection
        .create(fixture_records()?, None)
        .await
        .context("Failed to insert fixture records")?;

    Ok(outcome.inserted_count)
}
