//! Scryfall API client: single-card lookup and batched collection lookup
//!
//! Uses the blocking reqwest client; every call blocks the caller.

use std::thread;
use std::time::Duration;

use mtg_common::{
    ApiError, ApiResult, CardIdentifier, CollectionResponse, ScryfallCard, ScryfallError,
};

use super::USER_AGENT;

/// Public Scryfall API
pub const SCRYFALL_URL: &str = "https://api.scryfall.com";

/// Maximum identifiers accepted by `/cards/collection` per request
pub const BATCH_SIZE: usize = 75;

/// Pause between collection requests to stay under the rate limit
pub const BATCH_DELAY: Duration = Duration::from_millis(500);

/// Scryfall client with configurable endpoint and batching
pub struct ScryfallClient {
    client: reqwest::blocking::Client,
    base_url: String,
    batch_size: usize,
    batch_delay: Duration,
}

impl Default for ScryfallClient {
    fn default() -> Self {
        Self::new(SCRYFALL_URL)
    }
}

impl ScryfallClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            batch_size: BATCH_SIZE,
            batch_delay: BATCH_DELAY,
        }
    }

    /// Overrides the batch size (clamped to at least 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Overrides the delay inserted between batches
    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    /// Fetch a card by set code and collector number
    pub fn fetch_card(&self, set_code: &str, collector_number: &str) -> ApiResult<ScryfallCard> {
        let url = format!(
            "{}/cards/{}/{}",
            self.base_url,
            set_code.trim().to_lowercase(),
            collector_number.trim()
        );

        log::info!("Fetching card from Scryfall: {}", url);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .send()?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<ScryfallCard>()?)
        } else {
            let body = response.text()?;
            match serde_json::from_str::<ScryfallError>(&body) {
                Ok(error) => Err(ApiError::ApiResponse {
                    code: error.code,
                    details: error.details,
                }),
                Err(_) => Err(ApiError::HttpStatus(status)),
            }
        }
    }

    /// Looks up one batch of identifiers via `POST /cards/collection`
    pub fn fetch_batch(&self, identifiers: &[CardIdentifier]) -> ApiResult<CollectionResponse> {
        let url = format!("{}/cards/collection", self.base_url);
        let payload = serde_json::json!({ "identifiers": identifiers });

        let response = self
            .client
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .json(&payload)
            .send()?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus(response.status()));
        }

        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Lazily runs one collection request per batch.
    ///
    /// Each item is the cards returned by one batch; a failed batch yields an
    /// empty list and is logged. Iterating again re-issues every request.
    pub fn collection_batches<'a>(&'a self, identifiers: &'a [CardIdentifier]) -> CollectionBatches<'a> {
        let total = identifiers.len().div_ceil(self.batch_size);
        CollectionBatches {
            client: self,
            chunks: identifiers.chunks(self.batch_size),
            index: 0,
            total,
        }
    }

    /// Fetches details for all identifiers, tolerating failed batches.
    ///
    /// The result holds at most one card per identifier sent; its order follows
    /// the batches but not necessarily the input within a batch.
    pub fn fetch_collection(&self, identifiers: &[CardIdentifier]) -> Vec<ScryfallCard> {
        let cards: Vec<ScryfallCard> = self.collection_batches(identifiers).flatten().collect();
        log::info!(
            "Fetched details for {} of {} cards",
            cards.len(),
            identifiers.len()
        );
        cards
    }
}

/// Iterator over collection lookups, one request per `next()`
pub struct CollectionBatches<'a> {
    client: &'a ScryfallClient,
    chunks: std::slice::Chunks<'a, CardIdentifier>,
    index: usize,
    total: usize,
}

impl Iterator for CollectionBatches<'_> {
    type Item = Vec<ScryfallCard>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch = self.chunks.next()?;
        if self.index > 0 && !self.client.batch_delay.is_zero() {
            thread::sleep(self.client.batch_delay);
        }
        self.index += 1;
        log::info!(
            "Processing batch {}/{} ({} cards)",
            self.index,
            self.total,
            batch.len()
        );

        match self.client.fetch_batch(batch) {
            Ok(response) => {
                if !response.not_found.is_empty() {
                    log::info!(
                        "Batch {}: {} identifiers not found on Scryfall",
                        self.index,
                        response.not_found.len()
                    );
                    log::debug!("Not found: {:?}", response.not_found);
                }
                Some(response.data)
            }
            Err(e) => {
                log::warn!("Batch {}/{} failed, skipping: {}", self.index, self.total, e);
                Some(Vec::new())
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;
