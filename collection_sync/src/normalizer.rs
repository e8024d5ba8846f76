//! Identifier normalization: one canonical row per natural key

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use mtg_common::CardIdentifier;

use crate::models::CardRecord;

/// Canonicalizes raw rows.
///
/// Rows missing a set code or collector number are dropped, set codes are
/// lower-cased, and rows sharing a natural key are merged: quantities are
/// summed and every other column keeps its first non-null value. Output is
/// sorted by (set code, collector number).
pub fn normalize(rows: Vec<CardRecord>) -> Vec<CardRecord> {
    let input_len = rows.len();
    let mut dropped = 0usize;
    let mut grouped: BTreeMap<(String, String), CardRecord> = BTreeMap::new();

    for mut row in rows {
        if !row.has_key() {
            dropped += 1;
            continue;
        }
        row.set_code = row.set_code.trim().to_lowercase();
        row.collector_number = row.collector_number.trim().to_string();

        match grouped.entry((row.set_code.clone(), row.collector_number.clone())) {
            Entry::Occupied(mut existing) => existing.get_mut().absorb(row),
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
        }
    }

    if dropped > 0 {
        log::warn!("Dropped {dropped} rows without set code or collector number");
    }
    log::info!(
        "Normalized {} rows into {} unique cards",
        input_len,
        grouped.len()
    );

    grouped.into_values().collect()
}

/// Natural keys of the given records, in order
pub fn identifiers(records: &[CardRecord]) -> Vec<CardIdentifier> {
    records.iter().map(CardRecord::key).collect()
}
