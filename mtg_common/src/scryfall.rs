//! Scryfall wire types and the flattened card detail record

use serde::{Deserialize, Serialize};

/// Scryfall card response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScryfallCard {
    pub name: String,
    pub set: String,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub set_icon_svg_uri: Option<String>,
    pub collector_number: String,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub released_at: Option<String>,
    #[serde(default)]
    pub cmc: Option<f64>,
    #[serde(default)]
    pub prices: ScryfallPrices,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    /// For double-faced cards, per-face text and images are in card_faces
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ScryfallPrices {
    pub usd: Option<String>,
    pub usd_foil: Option<String>,
}

impl ScryfallPrices {
    /// Regular USD price, 0.0 when missing or unparseable
    pub fn usd_value(&self) -> f64 {
        parse_price(self.usd.as_deref())
    }

    /// Foil USD price, 0.0 when missing or unparseable
    pub fn usd_foil_value(&self) -> f64 {
        parse_price(self.usd_foil.as_deref())
    }
}

fn parse_price(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ImageUris {
    pub small: Option<String>,
    pub normal: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
}

/// Scryfall API error response
#[derive(Debug, Deserialize)]
pub struct ScryfallError {
    pub status: u16,
    pub code: String,
    pub details: String,
}

/// Response of `POST /cards/collection`
#[derive(Debug, Deserialize)]
pub struct CollectionResponse {
    #[serde(default)]
    pub data: Vec<ScryfallCard>,
    /// Identifiers Scryfall could not resolve, echoed back as sent
    #[serde(default)]
    pub not_found: Vec<serde_json::Value>,
}

/// Natural key of a printing in the wire form the collection endpoint expects
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardIdentifier {
    pub set: String,
    pub collector_number: String,
}

impl CardIdentifier {
    /// Builds an identifier, lower-casing the set code
    pub fn new(set: &str, collector_number: &str) -> Self {
        Self {
            set: set.trim().to_lowercase(),
            collector_number: collector_number.trim().to_string(),
        }
    }
}

impl std::fmt::Display for CardIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.set, self.collector_number)
    }
}

/// One printed side of a card
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FaceDetails {
    pub name: Option<String>,
    pub mana_cost: Option<String>,
    pub colors: Vec<String>,
    pub oracle_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub image_url: Option<String>,
}

impl FaceDetails {
    fn from_face(face: &CardFace) -> Self {
        Self {
            name: Some(face.name.clone()),
            mana_cost: face.mana_cost.clone(),
            colors: face.colors.clone().unwrap_or_default(),
            oracle_text: face.oracle_text.clone(),
            power: face.power.clone(),
            toughness: face.toughness.clone(),
            image_url: normal_image(face.image_uris.as_ref()),
        }
    }
}

/// Card data flattened into a primary face, an optional back face and
/// card-level fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CardDetails {
    pub identifier: CardIdentifier,
    pub front: FaceDetails,
    pub back: Option<FaceDetails>,
    pub set_name: Option<String>,
    pub set_icon_url: Option<String>,
    pub rarity: Option<String>,
    pub type_line: Option<String>,
    pub cmc: Option<f64>,
    pub released_at: Option<String>,
    pub price_usd: f64,
    pub price_usd_foil: f64,
}

fn normal_image(uris: Option<&ImageUris>) -> Option<String> {
    uris.and_then(|u| u.normal.clone())
}

impl ScryfallCard {
    /// Natural key of this printing
    pub fn identifier(&self) -> CardIdentifier {
        CardIdentifier::new(&self.set, &self.collector_number)
    }

    /// Flattens the card into front/back face details.
    ///
    /// Multi-face cards use their first face as the front and the second
    /// (if any) as the back. A front face without its own image or colors
    /// falls back to the card-level values.
    pub fn details(&self) -> CardDetails {
        let card_image = normal_image(self.image_uris.as_ref());
        let faces = self.card_faces.as_deref().unwrap_or(&[]);

        let (front, back) = match faces {
            [] => (
                FaceDetails {
                    name: Some(self.name.clone()),
                    mana_cost: self.mana_cost.clone(),
                    colors: self.colors.clone().unwrap_or_default(),
                    oracle_text: self.oracle_text.clone(),
                    power: self.power.clone(),
                    toughness: self.toughness.clone(),
                    image_url: card_image,
                },
                None,
            ),
            [first, rest @ ..] => {
                if rest.len() > 1 {
                    log::debug!(
                        "{} has {} faces, keeping the first two",
                        self.name,
                        faces.len()
                    );
                }
                let mut front = FaceDetails::from_face(first);
                if front.image_url.is_none() {
                    front.image_url = card_image;
                }
                if front.colors.is_empty() {
                    front.colors = self.colors.clone().unwrap_or_default();
                }
                (front, rest.first().map(FaceDetails::from_face))
            }
        };

        CardDetails {
            identifier: self.identifier(),
            front,
            back,
            set_name: self.set_name.clone(),
            set_icon_url: self.set_icon_svg_uri.clone(),
            rarity: self.rarity.clone(),
            type_line: self.type_line.clone(),
            cmc: self.cmc,
            released_at: self.released_at.clone(),
            price_usd: self.prices.usd_value(),
            price_usd_foil: self.prices.usd_foil_value(),
        }
    }
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;
