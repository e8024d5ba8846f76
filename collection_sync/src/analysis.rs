//! Display preparation, filtering and dashboard statistics

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::CardRecord;

/// Gallery sort orders
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum SortOrder {
    #[default]
    ByName,
    /// Most expensive first
    ByPrice,
    BySet,
}

/// A record cleaned for display, with its total value precomputed
#[derive(Debug, Clone)]
pub struct DisplayCard {
    pub record: CardRecord,
    pub total_value: f64,
}

/// Cleans records for display.
///
/// Lands get the color `L`; other cards without colors get `C`. Mana costs
/// lose their braces and `//` becomes `/`.
pub fn prepare_for_display(records: &[CardRecord]) -> Vec<DisplayCard> {
    records
        .iter()
        .map(|r| {
            let mut record = r.clone();
            let is_land = record
                .type_line
                .as_deref()
                .is_some_and(|t| t.contains("Land"));
            if is_land {
                record.colors = vec!["L".to_string()];
            } else if record.colors.is_empty() {
                record.colors = vec!["C".to_string()];
            }
            record.mana_cost = record.mana_cost.map(|m| clean_mana_cost(&m));
            let total_value = record.total_value();
            DisplayCard {
                record,
                total_value,
            }
        })
        .collect()
}

fn clean_mana_cost(cost: &str) -> String {
    cost.replace("//", "/").replace(['{', '}'], "")
}

/// Set code → (set name, icon url); first occurrence wins
pub fn set_map(records: &[CardRecord]) -> BTreeMap<String, (String, Option<String>)> {
    let mut map = BTreeMap::new();
    for r in records {
        map.entry(r.set_code.clone()).or_insert_with(|| {
            (
                r.set_name.clone().unwrap_or_else(|| r.set_code.to_uppercase()),
                r.set_icon_url.clone(),
            )
        });
    }
    map
}

/// Gallery filter; empty criteria match everything
#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    pub sets: Vec<String>,
    pub colors: Vec<String>,
    pub name: Option<String>,
}

impl CardFilter {
    pub fn matches(&self, card: &DisplayCard) -> bool {
        let r = &card.record;
        let set_ok = self.sets.is_empty()
            || self.sets.iter().any(|s| s.eq_ignore_ascii_case(&r.set_code));
        let color_ok = self.colors.is_empty()
            || self
                .colors
                .iter()
                .any(|c| r.colors.iter().any(|rc| rc.eq_ignore_ascii_case(c)));
        let name_ok = match &self.name {
            None => true,
            Some(q) => r
                .name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&q.to_lowercase())),
        };
        set_ok && color_ok && name_ok
    }

    /// Filters and sorts cards for the gallery
    pub fn apply(&self, cards: Vec<DisplayCard>, order: SortOrder) -> Vec<DisplayCard> {
        let mut out: Vec<DisplayCard> = cards.into_iter().filter(|c| self.matches(c)).collect();
        sort_cards(&mut out, order);
        out
    }
}

fn price_of(card: &DisplayCard) -> f64 {
    card.record.price_local.unwrap_or(0.0)
}

pub fn sort_cards(cards: &mut [DisplayCard], order: SortOrder) {
    match order {
        SortOrder::ByName => cards.sort_by(|a, b| a.record.name.cmp(&b.record.name)),
        SortOrder::ByPrice => cards.sort_by(|a, b| {
            price_of(b)
                .partial_cmp(&price_of(a))
                .unwrap_or(Ordering::Equal)
        }),
        SortOrder::BySet => cards.sort_by(|a, b| {
            (&a.record.set_code, &a.record.collector_number)
                .cmp(&(&b.record.set_code, &b.record.collector_number))
        }),
    }
}

/// Copies and value of one breakdown bucket
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bucket {
    pub copies: u32,
    pub value: f64,
}

impl Bucket {
    fn add(&mut self, card: &DisplayCard) {
        self.copies = self.copies.saturating_add(card.record.total_copies());
        self.value += card.total_value;
    }
}

/// Dashboard aggregates
#[derive(Debug, Default)]
pub struct CollectionStats {
    pub distinct_cards: usize,
    pub total_copies: u32,
    pub regular_copies: u32,
    pub foil_copies: u32,
    pub total_value: f64,
    pub by_rarity: BTreeMap<String, Bucket>,
    pub by_color: BTreeMap<String, Bucket>,
    pub by_set: BTreeMap<String, Bucket>,
}

impl CollectionStats {
    /// Aggregates prepared cards. A multicolor card counts in every one of
    /// its colors.
    pub fn from_cards(cards: &[DisplayCard]) -> Self {
        let mut stats = Self {
            distinct_cards: cards.len(),
            ..Self::default()
        };
        for card in cards {
            let r = &card.record;
            stats.regular_copies = stats.regular_copies.saturating_add(r.owned_regular);
            stats.foil_copies = stats.foil_copies.saturating_add(r.owned_foil);
            stats.total_value += card.total_value;

            let rarity = r.rarity.clone().unwrap_or_else(|| "unknown".to_string());
            stats.by_rarity.entry(rarity).or_default().add(card);
            stats.by_set.entry(r.set_code.clone()).or_default().add(card);
            for color in &r.colors {
                stats.by_color.entry(color.clone()).or_default().add(card);
            }
        }
        stats.total_copies = stats.regular_copies.saturating_add(stats.foil_copies);
        stats
    }
}

/// The `n` rows with the highest total value
pub fn top_valuable(cards: &[DisplayCard], n: usize) -> Vec<DisplayCard> {
    let mut sorted = cards.to_vec();
    sorted.sort_by(|a, b| {
        b.total_value
            .partial_cmp(&a.total_value)
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(set: &str, cn: &str, name: &str, colors: &[&str], price: f64) -> CardRecord {
        let mut r = CardRecord::new(set, cn, 1, 0);
        r.name = Some(name.to_string());
        r.colors = colors.iter().map(|c| c.to_string()).collect();
        r.price_local = Some(price);
        r.rarity = Some("rare".to_string());
        r.type_line = Some("Creature".to_string());
        r
    }

    #[test]
    fn prepare_marks_lands_and_colorless() {
        let mut land = record("blb", "1", "Forest", &["G"], 0.5);
        land.type_line = Some("Basic Land — Forest".to_string());
        let mut artifact = record("blb", "2", "Sol Ring", &[], 3.0);
        artifact.mana_cost = Some("{1}".to_string());
        let mut split = record("mh2", "3", "Fire // Ice", &["R", "U"], 1.0);
        split.mana_cost = Some("{1}{R} // {1}{U}".to_string());

        let cards = prepare_for_display(&[land, artifact, split]);
        assert_eq!(cards[0].record.colors, vec!["L"]);
        assert_eq!(cards[1].record.colors, vec!["C"]);
        assert_eq!(cards[1].record.mana_cost.as_deref(), Some("1"));
        assert_eq!(cards[2].record.mana_cost.as_deref(), Some("1R / 1U"));
    }

    #[test]
    fn filter_by_set_color_and_name() {
        let cards = prepare_for_display(&[
            record("blb", "1", "Mabel", &["W"], 1.0),
            record("blb", "2", "Maha", &["B"], 2.0),
            record("otj", "3", "Oko", &["G", "U"], 3.0),
        ]);

        let by_set = CardFilter {
            sets: vec!["BLB".to_string()],
            ..CardFilter::default()
        };
        assert_eq!(by_set.apply(cards.clone(), SortOrder::ByName).len(), 2);

        let by_color = CardFilter {
            colors: vec!["U".to_string(), "W".to_string()],
            ..CardFilter::default()
        };
        let names: Vec<_> = by_color
            .apply(cards.clone(), SortOrder::ByName)
            .into_iter()
            .map(|c| c.record.name.unwrap())
            .collect();
        assert_eq!(names, vec!["Mabel", "Oko"]);

        let by_name = CardFilter {
            name: Some("MA".to_string()),
            ..CardFilter::default()
        };
        let by_price = by_name.apply(cards, SortOrder::ByPrice);
        assert_eq!(by_price[0].record.name.as_deref(), Some("Maha"));
    }

    #[test]
    fn stats_aggregate_copies_and_value() {
        let mut foil = record("blb", "2", "Maha", &["B"], 2.0);
        foil.owned_foil = 2;
        foil.price_local_foil = Some(5.0);
        let cards = prepare_for_display(&[
            record("blb", "1", "Mabel", &["W"], 1.0),
            foil,
            record("otj", "3", "Oko", &["G", "U"], 3.0),
        ]);

        let stats = CollectionStats::from_cards(&cards);
        assert_eq!(stats.distinct_cards, 3);
        assert_eq!(stats.total_copies, 5);
        assert_eq!(stats.foil_copies, 2);
        assert_eq!(stats.total_value, 1.0 + 12.0 + 3.0);
        assert_eq!(stats.by_set["blb"].copies, 4);
        assert_eq!(stats.by_color["G"].value, 3.0);
        assert_eq!(stats.by_rarity["rare"].copies, 5);

        let top = top_valuable(&cards, 1);
        assert_eq!(top[0].record.name.as_deref(), Some("Maha"));
    }

    #[test]
    fn stats_saturate_on_huge_quantities() {
        let mut a = record("blb", "1", "A", &["W"], 1.0);
        a.owned_regular = 3_000_000_000;
        let mut b = record("blb", "2", "B", &["W"], 1.0);
        b.owned_regular = 3_000_000_000;
        b.owned_foil = 5;

        let stats = CollectionStats::from_cards(&prepare_for_display(&[a, b]));
        assert_eq!(stats.regular_copies, u32::MAX);
        assert_eq!(stats.total_copies, u32::MAX);
        assert_eq!(stats.by_set["blb"].copies, u32::MAX);
        assert_eq!(stats.by_color["W"].copies, u32::MAX);
    }

    #[test]
    fn set_map_first_occurrence_wins() {
        let mut a = record("blb", "1", "A", &[], 1.0);
        a.set_name = Some("Bloomburrow".to_string());
        let mut b = record("blb", "2", "B", &[], 1.0);
        b.set_name = Some("Other".to_string());
        let c = record("otj", "3", "C", &[], 1.0);

        let map = set_map(&[a, b, c]);
        assert_eq!(map["blb"].0, "Bloomburrow");
        assert_eq!(map["otj"].0, "OTJ");
    }
}
