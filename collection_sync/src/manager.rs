//! Manual edits of a loaded collection table

use mtg_common::CardIdentifier;

use crate::error::{Result, SyncError};
use crate::models::CardRecord;

/// Adds `record`, or adds its quantities to the existing row with the same key
pub fn add_or_increment(table: &mut Vec<CardRecord>, record: CardRecord) {
    let key = record.key();
    match table.iter_mut().find(|r| r.key() == key) {
        Some(existing) => {
            log::info!(
                "{} already in collection, adding {} regular / {} foil",
                key,
                record.owned_regular,
                record.owned_foil
            );
            existing.absorb(record);
        }
        None => {
            log::info!("Adding {} to collection", key);
            table.push(record);
        }
    }
}

/// Sets the owned quantities of `key`.
///
/// Other rows with the same key (left by earlier incremental merges) are
/// removed so the card ends up with exactly the given quantities.
pub fn set_quantities(
    table: &mut Vec<CardRecord>,
    key: &CardIdentifier,
    owned_regular: u32,
    owned_foil: u32,
) -> Result<()> {
    let first = table
        .iter()
        .position(|r| &r.key() == key)
        .ok_or_else(|| SyncError::NotFound(key.to_string()))?;

    let mut index = 0;
    table.retain(|r| {
        let keep = index == first || &r.key() != key;
        index += 1;
        keep
    });

    let row = &mut table[first];
    log::info!(
        "Updating {}: {}/{} -> {}/{}",
        key,
        row.owned_regular,
        row.owned_foil,
        owned_regular,
        owned_foil
    );
    row.owned_regular = owned_regular;
    row.owned_foil = owned_foil;
    Ok(())
}

/// Removes every row with `key`, returning how many were removed
pub fn remove(table: &mut Vec<CardRecord>, key: &CardIdentifier) -> Result<usize> {
    let before = table.len();
    table.retain(|r| &r.key() != key);
    let removed = before - table.len();
    if removed == 0 {
        return Err(SyncError::NotFound(key.to_string()));
    }
    log::info!("Removed {} row(s) for {}", removed, key);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Vec<CardRecord> {
        vec![
            CardRecord::new("blb", "2", 1, 0),
            CardRecord::new("otj", "5", 2, 1),
            CardRecord::new("blb", "2", 3, 0),
        ]
    }

    #[test]
    fn add_new_card_appends() {
        let mut t = table();
        add_or_increment(&mut t, CardRecord::new("mh3", "1", 1, 0));
        assert_eq!(t.len(), 4);
        assert_eq!(t[3].set_code, "mh3");
    }

    #[test]
    fn add_existing_card_increments_first_match() {
        let mut t = table();
        add_or_increment(&mut t, CardRecord::new("OTJ", "5", 1, 1));
        assert_eq!(t.len(), 3);
        assert_eq!((t[1].owned_regular, t[1].owned_foil), (3, 2));
    }

    #[test]
    fn set_quantities_collapses_duplicate_keys() {
        let mut t = table();
        set_quantities(&mut t, &CardIdentifier::new("blb", "2"), 4, 1).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!((t[0].owned_regular, t[0].owned_foil), (4, 1));
        assert_eq!(t[1].set_code, "otj");
    }

    #[test]
    fn set_quantities_unknown_key() {
        let mut t = table();
        let err = set_quantities(&mut t, &CardIdentifier::new("xxx", "1"), 1, 0).unwrap_err();
        assert!(matches!(err, SyncError::NotFound(k) if k == "xxx/1"));
    }

    #[test]
    fn remove_deletes_all_rows_for_key() {
        let mut t = table();
        assert_eq!(remove(&mut t, &CardIdentifier::new("blb", "2")).unwrap(), 2);
        assert_eq!(t.len(), 1);
        assert!(remove(&mut t, &CardIdentifier::new("blb", "2")).is_err());
    }
}
