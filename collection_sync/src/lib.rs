//! Collection Sync - MTG collection enrichment and remote storage
//!
//! Normalizes imported card rows, fills in card details and prices from
//! Scryfall, converts prices to BRL and keeps the collection CSV in a GitHub
//! repository.

pub mod analysis;
pub mod api;
pub mod config;
pub mod error;
pub mod extractor;
pub mod formatters;
pub mod io;
pub mod manager;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod reconciler;
pub mod session;

// Re-export commonly used items
pub use analysis::{prepare_for_display, CardFilter, CollectionStats, DisplayCard, SortOrder};
pub use api::{fetch_usd_to_brl, ExchangeRate, GitHubStore, RemoteSnapshot, ScryfallClient};
pub use config::Config;
pub use error::{Result, SyncError};
pub use extractor::extract_details;
pub use formatters::{format_card_check, format_gallery, format_outcome, format_stats};
pub use models::CardRecord;
pub use normalizer::normalize;
pub use pipeline::{enrich, enrich_file};
pub use reconciler::{Reconciler, WriteOutcome};
pub use session::AppContext;
