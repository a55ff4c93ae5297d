use crate::models::Card;
use crate::srs::new_card;
use crate::utils::{create_reader, read_line};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{stdin, stdout, BufRead, Write};
use std::path::Path;

struct NoopWriter {}

impl Write for NoopWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Lets user add as many new cards as he wants to a given CSV file.
pub fn add(path: &Path, silent: bool) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!(
            "File {:?} doesn't exist. Use `wordy init` to create it. Aborting.",
            path
        ));
    }
    let terms = build_term_index(path)?;
    let mut stdout_lock: Box<dyn Write> = if silent {
        Box::new(NoopWriter {})
    } else {
        Box::new(stdout().lock())
    };
    let mut stdin_lock = stdin().lock();
    let file = OpenOptions::new().append(true).open(path)?;
    let now = Local::now();
    add_cards(now, file, &mut stdin_lock, &mut stdout_lock, terms)
}

fn add_cards<F, R, W>(
    now: DateTime<Local>,
    file: F,
    mut stdin: R,
    mut stdout: W,
    mut terms: HashMap<String, usize>,
) -> Result<()>
where
    F: Write,
    R: BufRead,
    W: Write,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'|')
        .quote(b'#')
        .has_headers(false)
        .from_writer(file);

    loop {
        stdout.write_all(b"Term:        ")?;
        stdout.flush()?;
        let term: String = read_line(&mut stdin)?;
        // Exit on empty input
        if term.is_empty() {
            return Ok(());
        }

        if let Some(i) = terms.get(&term.trim().to_lowercase()) {
            return Err(anyhow!(
                "A card for this term already exists. Please check line {} of your CSV file!",
                i
            ));
        }

        stdout.write_all(b"Translation: ")?;
        stdout.flush()?;
        let translation: String = read_line(&mut stdin)?;
        stdout.write_all(b"Example:     ")?;
        stdout.flush()?;
        let example: String = read_line(&mut stdin)?;
        stdout.write_all(b"Notes:       ")?;
        stdout.flush()?;
        let notes: String = read_line(&mut stdin)?;
        stdout.write_all(b"Tag:         ")?;
        stdout.flush()?;
        let tag: String = read_line(&mut stdin)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;

        let card = new_card(
            &term,
            &translation,
            optional(example),
            optional(notes),
            optional(tag),
            now,
        )?;
        writer.serialize(&card)?;
        writer.flush()?;
        terms.insert(card.term.clone(), terms.len() + 2);
    }
}

fn optional(input: String) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input)
    }
}

fn build_term_index(path: &Path) -> Result<HashMap<String, usize>> {
    let mut reader = create_reader(path)?;
    let mut terms = HashMap::<String, usize>::new();
    for (i, record) in reader.records().enumerate() {
        let line = i + 2;
        let card = record?.deserialize::<Card>(None)?;
        if let Some(j) = terms.get(&card.term) {
            return Err(anyhow!(
                "The term {} in line {} is a duplicate! Please check line {} of your CSV file!",
                &card.term,
                line,
                j,
            ));
        }
        terms.insert(card.term, line);
    }
    Ok(terms)
}

#[cfg(test)]
fn test_now() -> DateTime<Local> {
    use chrono::TimeZone;
    Local.with_ymd_and_hms(2025, 5, 10, 9, 30, 0).unwrap()
}

#[test]
fn test_add_cards_creates_normalized_cards() {
    use std::io::Cursor;

    let mut file = Cursor::new(Vec::new());
    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(
        b"Maison\nHouse\nMa maison est grande.\n\nla\n\
    chien\ndog\n\n\n\n\
    \n",
    );
    let now = test_now();
    let result = add_cards(now, &mut file, &mut stdin, &mut stdout, HashMap::new());
    assert!(result.is_ok());

    // Check prompts
    let stdout_vec = stdout.into_inner();
    assert_eq!(
        String::from_utf8_lossy(&stdout_vec),
        "Term:        Translation: Example:     Notes:       Tag:         \n\
    Term:        Translation: Example:     Notes:       Tag:         \n\
    Term:        "
    );

    // Ids are random, so parse the CSV output instead of comparing bytes
    let output_vec = file.into_inner();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .quote(b'#')
        .has_headers(false)
        .from_reader(output_vec.as_slice());
    let cards: Vec<Card> = reader
        .deserialize()
        .collect::<Result<Vec<_>, csv::Error>>()
        .unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].term, "maison");
    assert_eq!(cards[0].translation, "house");
    assert_eq!(cards[0].example.as_deref(), Some("Ma maison est grande."));
    assert_eq!(cards[0].notes, None);
    assert_eq!(cards[0].tag.as_deref(), Some("la"));
    assert_eq!(cards[0].interval_days, 0);
    assert_eq!(cards[0].next_review_at, now);
    assert_eq!(cards[1].term, "chien");
    assert_ne!(cards[0].id, cards[1].id);
}

#[test]
fn test_cannot_add_duplicate_term_in_same_session() {
    use std::io::Cursor;

    let mut file = Cursor::new(Vec::new());
    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(
        b"maison\nhouse\n\n\n\n\
    Maison \nhome\n",
    );
    let result = add_cards(
        test_now(),
        &mut file,
        &mut stdin,
        &mut stdout,
        HashMap::new(),
    );

    // Check result: error message with line number
    assert_eq!(
        result.unwrap_err().to_string(),
        "A card for this term already exists. Please check line 2 of your CSV file!"
    );

    // Only the first card was written
    let output_vec = file.into_inner();
    let output = String::from_utf8_lossy(&output_vec);
    assert_eq!(output.lines().count(), 1);
    assert!(output.contains("|maison|house|"));
}

#[test]
fn test_add_cards_rejects_blank_translation() {
    use std::io::Cursor;

    let mut file = Cursor::new(Vec::new());
    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(b"maison\n  \n\n\n\n");
    let result = add_cards(
        test_now(),
        &mut file,
        &mut stdin,
        &mut stdout,
        HashMap::new(),
    );
    assert_eq!(
        result.unwrap_err().to_string(),
        "Translation must not be empty."
    );
    assert!(file.into_inner().is_empty());
}
