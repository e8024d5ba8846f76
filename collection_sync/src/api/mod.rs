//! API clients for external services (Scryfall, exchange rate, GitHub contents)

pub mod currency;
pub mod github;
pub mod scryfall;

pub use currency::{fetch_usd_to_brl, ExchangeRate};
pub use github::{GitHubStore, RemoteSnapshot};
pub use scryfall::ScryfallClient;

/// User-Agent sent with every request
pub(crate) const USER_AGENT: &str = "MTG-CollectionSync/1.0";
