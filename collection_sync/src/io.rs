//! Reading import files and the persisted collection layout

use std::path::Path;

use crate::error::Result;
use crate::models::{CardRecord, COLUMNS};

/// Picks `;` when the header line uses it and has no commas, else `,`
fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.contains(';') && !header.contains(',') {
        b';'
    } else {
        b','
    }
}

fn parse_delimited(content: &str, delimiter: u8) -> Result<Vec<CardRecord>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: CardRecord = result?;
        records.push(record);
    }
    Ok(records)
}

/// Reads a user import file (CSV export of the collection spreadsheet).
///
/// Needs at least `colecao` and `numero` columns (or `set_code` and
/// `collector_number`); the delimiter is detected from the header line.
pub fn read_import_file<P: AsRef<Path>>(path: P) -> Result<Vec<CardRecord>> {
    let path = path.as_ref();
    log::info!("Reading import file: {}", path.display());

    let content = std::fs::read_to_string(path)?;
    let records = parse_delimited(&content, detect_delimiter(&content))?;

    log::info!("Read {} rows from {}", records.len(), path.display());
    Ok(records)
}

/// Parses the persisted collection layout
pub fn parse_records(content: &str) -> Result<Vec<CardRecord>> {
    parse_delimited(content, b',')
}

/// Serializes records in the persisted layout, header included even when empty
pub fn write_records(records: &[CardRecord]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }

    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Serializes a single record as one CSV line (no header)
pub fn record_line(record: &CardRecord) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.serialize(record)?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Reads a local collection file in the persisted layout
pub fn read_records_file<P: AsRef<Path>>(path: P) -> Result<Vec<CardRecord>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_records(&content)
}

/// Writes records to a local file in the persisted layout
pub fn write_records_file<P: AsRef<Path>>(path: P, records: &[CardRecord]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, write_records(records)?)?;
    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
