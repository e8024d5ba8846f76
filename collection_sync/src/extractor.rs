//! Card detail extraction: joins API results onto collection rows

use std::collections::HashMap;

use mtg_common::{CardDetails, CardIdentifier, ScryfallCard};

use crate::api::currency::ExchangeRate;
use crate::models::CardRecord;

/// Builds one output row per input row, in input order.
///
/// Rows whose key is present in `cards` get every detail field overwritten
/// and their prices converted with `rate`. Rows without a match keep key and
/// quantities only; all detail fields become null.
pub fn extract_details(
    rows: &[CardRecord],
    cards: &[ScryfallCard],
    rate: ExchangeRate,
) -> Vec<CardRecord> {
    join_details(rows, cards, rate, true)
}

/// Like [`extract_details`], but rows without a match keep the details they
/// already had. Used when re-pricing a stored collection, where a missing
/// lookup must not erase persisted data.
pub fn refresh_details(
    rows: &[CardRecord],
    cards: &[ScryfallCard],
    rate: ExchangeRate,
) -> Vec<CardRecord> {
    join_details(rows, cards, rate, false)
}

fn join_details(
    rows: &[CardRecord],
    cards: &[ScryfallCard],
    rate: ExchangeRate,
    clear_unmatched: bool,
) -> Vec<CardRecord> {
    let lookup: HashMap<CardIdentifier, CardDetails> = cards
        .iter()
        .map(|card| {
            let details = card.details();
            (details.identifier.clone(), details)
        })
        .collect();

    let mut missing = 0usize;
    let out: Vec<CardRecord> = rows
        .iter()
        .map(|row| {
            let mut record = row.clone();
            match lookup.get(&row.key()) {
                Some(details) => record.apply_details(details, rate),
                None => {
                    missing += 1;
                    if clear_unmatched {
                        record.clear_details();
                    }
                }
            }
            record
        })
        .collect();

    if missing > 0 {
        log::warn!(
            "{} of {} cards had no enrichment data",
            missing,
            rows.len()
        );
    }
    out
}
