use crate::models::Card;
use anyhow::Result;
use chrono::{DateTime, Local};
use csv::Reader;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::fs::File;
use std::io;
use std::io::{BufRead, Write};
use std::path::Path;
use struct_field_names_as_array::FieldNamesAsArray;

pub fn clear<W: Write>(lock: &mut W) -> io::Result<()> {
    write!(lock, "{esc}[2J{esc}[1;1H", esc = 27 as char)
}

pub fn create_reader(path: &Path) -> csv::Result<Reader<File>> {
    csv::ReaderBuilder::new()
        .delimiter(b'|')
        .quote(b'#')
        .has_headers(true)
        .from_path(path)
}

/// Reads one line and strips the trailing line break.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Generates a card id from the creation time and a random suffix,
/// e.g. `1746864000000-k3j9fz01q`.
pub fn generate_id(now: DateTime<Local>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}-{}", now.timestamp_millis(), suffix)
}

pub fn read_cards(path: &Path) -> Result<Vec<Card>> {
    let mut reader = create_reader(path)?;
    let mut cards = Vec::new();
    for record in reader.records() {
        cards.push(record?.deserialize::<Card>(None)?);
    }
    Ok(cards)
}

/// Rewrites the whole card box, header included. Records change width when
/// the scheduler updates a card, so in-place record patching is not an option.
pub fn write_cards(path: &Path, cards: &[Card]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'|')
        .quote(b'#')
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(Card::FIELD_NAMES_AS_ARRAY)?;
    for card in cards {
        writer.serialize(card)?;
    }
    writer.flush()?;
    Ok(())
}
