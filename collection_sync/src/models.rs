//! Canonical card record and its persisted column layout

use mtg_common::{CardDetails, CardIdentifier};
use serde::{Deserialize, Serialize};

use crate::api::currency::ExchangeRate;

/// Column order of the persisted collection file
pub const COLUMNS: [&str; 28] = [
    "colecao",
    "numero",
    "padrao",
    "foil",
    "nome",
    "mana_cost",
    "cores",
    "cmc",
    "descricao",
    "power",
    "toughness",
    "imagem",
    "nome_2",
    "mana_cost_2",
    "cores_2",
    "descricao_2",
    "power_2",
    "toughness_2",
    "imagem_2",
    "colecao_nome",
    "icone_colecao",
    "data_lancamento",
    "raridade",
    "tipo",
    "preco_usd",
    "preco_usd_foil",
    "preco_brl",
    "preco_brl_foil",
];

/// One row of the collection: a printing identified by its natural key,
/// how many copies are owned, and the enrichment fields once populated.
///
/// Field renames are the column names of the persisted CSV. Import files may
/// use the English aliases instead.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(rename = "colecao", alias = "set_code", default)]
    pub set_code: String,
    #[serde(rename = "numero", alias = "collector_number", default)]
    pub collector_number: String,
    #[serde(
        rename = "padrao",
        alias = "owned_regular",
        default = "lenient::default_regular",
        deserialize_with = "lenient::regular_quantity"
    )]
    pub owned_regular: u32,
    #[serde(
        rename = "foil",
        alias = "owned_foil",
        default,
        deserialize_with = "lenient::foil_quantity"
    )]
    pub owned_foil: u32,

    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(rename = "cores", default, with = "symbols")]
    pub colors: Vec<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub cmc: Option<f64>,
    #[serde(rename = "descricao", default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    #[serde(rename = "imagem", default)]
    pub image_url: Option<String>,

    #[serde(rename = "nome_2", default)]
    pub name_2: Option<String>,
    #[serde(default)]
    pub mana_cost_2: Option<String>,
    #[serde(rename = "cores_2", default, with = "symbols")]
    pub colors_2: Vec<String>,
    #[serde(rename = "descricao_2", default)]
    pub oracle_text_2: Option<String>,
    #[serde(default)]
    pub power_2: Option<String>,
    #[serde(default)]
    pub toughness_2: Option<String>,
    #[serde(rename = "imagem_2", default)]
    pub image_url_2: Option<String>,

    #[serde(rename = "colecao_nome", default)]
    pub set_name: Option<String>,
    #[serde(rename = "icone_colecao", default)]
    pub set_icon_url: Option<String>,
    #[serde(rename = "data_lancamento", default)]
    pub released_at: Option<String>,
    #[serde(rename = "raridade", default)]
    pub rarity: Option<String>,
    #[serde(rename = "tipo", default)]
    pub type_line: Option<String>,

    #[serde(rename = "preco_usd", default, deserialize_with = "lenient::number")]
    pub price_usd: Option<f64>,
    #[serde(rename = "preco_usd_foil", default, deserialize_with = "lenient::number")]
    pub price_usd_foil: Option<f64>,
    #[serde(rename = "preco_brl", default, deserialize_with = "lenient::number")]
    pub price_local: Option<f64>,
    #[serde(rename = "preco_brl_foil", default, deserialize_with = "lenient::number")]
    pub price_local_foil: Option<f64>,
}

/// Fills missing `Option` fields of `$dst` from `$src`
macro_rules! fill_missing {
    ($dst:expr, $src:expr; $($field:ident),* $(,)?) => {
        $(
            if $dst.$field.is_none() {
                $dst.$field = $src.$field;
            }
        )*
    };
}

impl CardRecord {
    /// Creates a bare record with only key and quantities set
    pub fn new(set_code: &str, collector_number: &str, owned_regular: u32, owned_foil: u32) -> Self {
        Self {
            set_code: set_code.trim().to_lowercase(),
            collector_number: collector_number.trim().to_string(),
            owned_regular,
            owned_foil,
            ..Self::default()
        }
    }

    /// Natural key of this record
    pub fn key(&self) -> CardIdentifier {
        CardIdentifier::new(&self.set_code, &self.collector_number)
    }

    /// Returns true if both key fields are present
    pub fn has_key(&self) -> bool {
        !self.set_code.trim().is_empty() && !self.collector_number.trim().is_empty()
    }

    /// Regular plus foil copies
    pub fn total_copies(&self) -> u32 {
        self.owned_regular.saturating_add(self.owned_foil)
    }

    /// Value of all owned copies in local currency; missing prices count as zero
    pub fn total_value(&self) -> f64 {
        self.owned_regular as f64 * self.price_local.unwrap_or(0.0)
            + self.owned_foil as f64 * self.price_local_foil.unwrap_or(0.0)
    }

    /// Drops every enrichment field, keeping key and quantities
    pub fn clear_details(&mut self) {
        *self = Self {
            set_code: std::mem::take(&mut self.set_code),
            collector_number: std::mem::take(&mut self.collector_number),
            owned_regular: self.owned_regular,
            owned_foil: self.owned_foil,
            ..Self::default()
        };
    }

    /// Overwrites the enrichment fields from API details, converting prices
    /// with `rate`.
    pub fn apply_details(&mut self, details: &CardDetails, rate: ExchangeRate) {
        let front = &details.front;
        self.name = front.name.clone();
        self.mana_cost = front.mana_cost.clone();
        self.colors = front.colors.clone();
        self.oracle_text = front.oracle_text.clone();
        self.power = front.power.clone();
        self.toughness = front.toughness.clone();
        self.image_url = front.image_url.clone();

        let back = details.back.clone().unwrap_or_default();
        self.name_2 = back.name;
        self.mana_cost_2 = back.mana_cost;
        self.colors_2 = back.colors;
        self.oracle_text_2 = back.oracle_text;
        self.power_2 = back.power;
        self.toughness_2 = back.toughness;
        self.image_url_2 = back.image_url;

        self.cmc = details.cmc;
        self.set_name = details.set_name.clone();
        self.set_icon_url = details.set_icon_url.clone();
        self.released_at = details.released_at.clone();
        self.rarity = details.rarity.clone();
        self.type_line = details.type_line.clone();

        self.price_usd = Some(details.price_usd);
        self.price_usd_foil = Some(details.price_usd_foil);
        self.price_local = Some(rate.convert(details.price_usd));
        self.price_local_foil = Some(rate.convert(details.price_usd_foil));
    }

    /// Merges a duplicate of the same key into this record: quantities are
    /// summed and every other field keeps its first non-null value.
    pub fn absorb(&mut self, other: CardRecord) {
        self.owned_regular = self.owned_regular.saturating_add(other.owned_regular);
        self.owned_foil = self.owned_foil.saturating_add(other.owned_foil);

        if self.colors.is_empty() {
            self.colors = other.colors;
        }
        if self.colors_2.is_empty() {
            self.colors_2 = other.colors_2;
        }
        fill_missing!(self, other;
            name, mana_cost, cmc, oracle_text, power, toughness, image_url,
            name_2, mana_cost_2, oracle_text_2, power_2, toughness_2, image_url_2,
            set_name, set_icon_url, released_at, rarity, type_line,
            price_usd, price_usd_foil, price_local, price_local_foil,
        );
    }
}

/// Permissive field parsers: malformed values are defaulted, never rejected.
mod lenient {
    use serde::{Deserialize, Deserializer};

    pub fn default_regular() -> u32 {
        1
    }

    /// Blank → `blank`; unparseable, negative or non-finite → 0; fractions truncate
    fn quantity(raw: Option<String>, blank: u32) -> u32 {
        let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
            return blank;
        };
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => v.trunc().min(u32::MAX as f64) as u32,
            _ => 0,
        }
    }

    pub fn regular_quantity<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(quantity(Option::<String>::deserialize(d)?, 1))
    }

    pub fn foil_quantity<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(quantity(Option::<String>::deserialize(d)?, 0))
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(Option::<String>::deserialize(d)?
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite()))
    }

}

/// Color symbols stored as a `", "`-joined cell
mod symbols {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(colors: &[String], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&colors.join(", "))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(Option::<String>::deserialize(d)?
            .map(|cell| {
                cell.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtg_common::FaceDetails;

    fn details(name: &str, usd: f64) -> CardDetails {
        CardDetails {
            identifier: CardIdentifier::new("blb", "2"),
            front: FaceDetails {
                name: Some(name.to_string()),
                colors: vec!["W".to_string()],
                ..FaceDetails::default()
            },
            back: None,
            set_name: Some("Bloomburrow".to_string()),
            set_icon_url: None,
            rarity: Some("rare".to_string()),
            type_line: Some("Creature — Mouse".to_string()),
            cmc: Some(1.0),
            released_at: None,
            price_usd: usd,
            price_usd_foil: 0.0,
        }
    }

    #[test]
    fn apply_then_clear_details_keeps_base_fields() {
        let mut record = CardRecord::new("BLB", "2", 3, 1);
        record.apply_details(&details("Test Card", 2.0), ExchangeRate::new(5.0));

        assert_eq!(record.name.as_deref(), Some("Test Card"));
        assert_eq!(record.colors, vec!["W".to_string()]);
        assert_eq!(record.price_local, Some(10.0));
        assert_eq!(record.total_value(), 30.0);

        record.clear_details();
        assert_eq!(record, CardRecord::new("blb", "2", 3, 1));
    }

    #[test]
    fn absorb_sums_quantities_and_keeps_first_values() {
        let mut first = CardRecord::new("blb", "2", 1, 0);
        first.rarity = Some("rare".to_string());

        let mut second = CardRecord::new("blb", "2", 2, 1);
        second.rarity = Some("mythic".to_string());
        second.name = Some("Test Card".to_string());

        first.absorb(second);
        assert_eq!(first.owned_regular, 3);
        assert_eq!(first.owned_foil, 1);
        assert_eq!(first.rarity.as_deref(), Some("rare"));
        assert_eq!(first.name.as_deref(), Some("Test Card"));
    }
}
