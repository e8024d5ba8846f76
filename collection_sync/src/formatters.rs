//! Plain-text rendering of the gallery, dashboard and command results

use mtg_common::ScryfallCard;

use crate::analysis::{Bucket, CollectionStats, DisplayCard};
use crate::reconciler::WriteOutcome;

fn copies_label(copies: u32) -> &'static str {
    if copies == 1 {
        "copy"
    } else {
        "copies"
    }
}

/// One line per card, the text rendition of the gallery
pub fn format_gallery(cards: &[DisplayCard]) -> String {
    let mut output = String::new();

    for card in cards {
        let r = &card.record;
        let name = r.name.as_deref().unwrap_or("(no details)");
        let mana = r
            .mana_cost
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| format!(" {{{m}}}"))
            .unwrap_or_default();

        output.push_str(&format!(
            "[{} #{}] {}{} [{}]",
            r.set_code.to_uppercase(),
            r.collector_number,
            name,
            mana,
            r.colors.join(", ")
        ));

        if let Some(back) = r.name_2.as_deref() {
            output.push_str(&format!(" // {back}"));
        }

        output.push_str(&format!(
            " - {} regular, {} foil - R$ {:.2} / R$ {:.2} foil - total R$ {:.2}\n",
            r.owned_regular,
            r.owned_foil,
            r.price_local.unwrap_or(0.0),
            r.price_local_foil.unwrap_or(0.0),
            card.total_value
        ));
    }

    if cards.is_empty() {
        output.push_str("No cards match the current filters.\n");
    }

    output
}

fn push_breakdown<'a>(
    output: &mut String,
    title: &str,
    buckets: impl Iterator<Item = (&'a String, &'a Bucket)>,
) {
    output.push_str(&format!("\n{title}:\n"));
    for (label, bucket) in buckets {
        output.push_str(&format!(
            "  {:<12} {:>5} {:<6} R$ {:>10.2}\n",
            label,
            bucket.copies,
            copies_label(bucket.copies),
            bucket.value
        ));
    }
}

/// Dashboard summary with breakdowns and the most valuable rows
pub fn format_stats(stats: &CollectionStats, top: &[DisplayCard]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Distinct cards: {}\n", stats.distinct_cards));
    output.push_str(&format!(
        "Total copies:   {} ({} regular, {} foil)\n",
        stats.total_copies, stats.regular_copies, stats.foil_copies
    ));
    output.push_str(&format!("Total value:    R$ {:.2}\n", stats.total_value));

    push_breakdown(&mut output, "By rarity", stats.by_rarity.iter());
    push_breakdown(&mut output, "By color", stats.by_color.iter());
    push_breakdown(&mut output, "By set", stats.by_set.iter());

    if !top.is_empty() {
        output.push_str("\nMost valuable:\n");
        for (i, card) in top.iter().enumerate() {
            output.push_str(&format!(
                "  {:>2}. {} ({}/{}) - R$ {:.2}\n",
                i + 1,
                card.record.name.as_deref().unwrap_or("?"),
                card.record.set_code,
                card.record.collector_number,
                card.total_value
            ));
        }
    }

    output
}

/// One-line confirmation that a card exists on Scryfall
pub fn format_card_check(card: &ScryfallCard) -> String {
    format!(
        "{} - {} ({})",
        card.identifier(),
        card.name,
        card.set_name.as_deref().unwrap_or("?")
    )
}

pub fn format_outcome(outcome: &WriteOutcome) -> String {
    if outcome.success {
        format!("{} ({} rows)", outcome.message, outcome.rows)
    } else {
        format!("Error: {}", outcome.message)
    }
}
