//! Enrichment pipeline: normalize → batch lookup → extract

use std::path::Path;

use crate::api::currency::ExchangeRate;
use crate::api::scryfall::ScryfallClient;
use crate::error::Result;
use crate::extractor::{extract_details, refresh_details};
use crate::io;
use crate::models::CardRecord;
use crate::normalizer::{identifiers, normalize};

/// Normalizes `rows` and fills their details from Scryfall.
///
/// Failed batches only leave their cards without details; the call itself
/// does not fail.
pub fn enrich(client: &ScryfallClient, rows: Vec<CardRecord>, rate: ExchangeRate) -> Vec<CardRecord> {
    let normalized = normalize(rows);
    if normalized.is_empty() {
        log::info!("Nothing to enrich");
        return normalized;
    }

    let ids = identifiers(&normalized);
    let cards = client.fetch_collection(&ids);
    extract_details(&normalized, &cards, rate)
}

/// Re-prices already stored rows.
///
/// Returns `None` when Scryfall returned no card at all (outage, every batch
/// failed) so the caller can leave the stored collection alone. Rows missing
/// from a partial answer keep their previous details.
pub fn reprice(
    client: &ScryfallClient,
    rows: Vec<CardRecord>,
    rate: ExchangeRate,
) -> Option<Vec<CardRecord>> {
    let normalized = normalize(rows);
    if normalized.is_empty() {
        return Some(normalized);
    }

    let cards = client.fetch_collection(&identifiers(&normalized));
    if cards.is_empty() {
        log::error!("Scryfall returned no cards for {} keys", normalized.len());
        return None;
    }
    Some(refresh_details(&normalized, &cards, rate))
}

/// Stand-alone mode: enriches a local import file into a local collection file.
///
/// When `output` already exists its rows come first and the combined table is
/// merged by key again, so repeated runs add quantities instead of
/// duplicating cards. A missing `input` aborts with an I/O error.
pub fn enrich_file(
    client: &ScryfallClient,
    input: &Path,
    output: &Path,
    rate: ExchangeRate,
) -> Result<Vec<CardRecord>> {
    let rows = io::read_import_file(input)?;
    let enriched = enrich(client, rows, rate);

    let merged = if output.exists() {
        let mut existing = io::read_records_file(output)?;
        log::info!(
            "Merging {} new rows into {} existing rows",
            enriched.len(),
            existing.len()
        );
        existing.extend(enriched);
        normalize(existing)
    } else {
        enriched
    };

    io::write_records_file(output, &merged)?;
    Ok(merged)
}
