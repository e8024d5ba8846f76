//! Shared types for MTG collection tooling.
//!
//! Holds the Scryfall wire format, the natural-key identifier sent to the
//! collection endpoint, the flattened per-card detail record and the error
//! type used by API clients.

pub mod error;
pub mod scryfall;

pub use error::{ApiError, ApiResult};
pub use scryfall::{
    CardDetails, CardFace, CardIdentifier, CollectionResponse, FaceDetails, ImageUris,
    ScryfallCard, ScryfallError, ScryfallPrices,
};
