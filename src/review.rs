use crate::models::Card;
use crate::srs::schedule_review;
use crate::utils::{clear, read_cards, read_line, write_cards};
use anyhow::Result;
use chrono::{DateTime, Local};
use rand::seq::SliceRandom;
use std::io::{stdin, stdout, BufRead, Write};
use std::path::Path;

/// Lets user review all due cards in a shuffled order.
pub fn review(path: &Path) -> Result<()> {
    let mut stdout_lock = stdout().lock();
    let mut stdin_lock = stdin().lock();
    let now = Local::now();
    let mut cards = read_cards(path)?;
    let mut due = collect_due_indices(&cards, now);
    if due.is_empty() {
        writeln!(stdout_lock, "No cards due for review in {:?}", path)?;
        return Ok(());
    }
    clear(&mut stdout_lock)?;
    writeln!(
        stdout_lock,
        "Reviewing {} due card{} in {:?}\n",
        due.len(),
        if due.len() == 1 { "" } else { "s" },
        path
    )?;
    // Shuffling is purely presentational, the scheduler doesn't care.
    due.shuffle(&mut rand::rng());

    let num_cards = due.len();
    for (num_reviewed, i) in due.into_iter().enumerate() {
        writeln!(stdout_lock, "[{}/{}]", num_reviewed + 1, num_cards)?;
        let quality = review_card(&cards[i], &mut stdout_lock, &mut stdin_lock)?;
        cards[i] = schedule_review(&cards[i], quality, now)?;
        // Persist after every card so an aborted session loses nothing.
        write_cards(path, &cards)?;
    }

    writeln!(
        stdout_lock,
        "Reviewed {} card{}. Done.",
        num_cards,
        if num_cards == 1 { "" } else { "s" }
    )?;
    Ok(())
}

fn collect_due_indices(cards: &[Card], now: DateTime<Local>) -> Vec<usize> {
    cards
        .iter()
        .enumerate()
        .filter(|(_, card)| card.is_due(now))
        .map(|(i, _)| i)
        .collect()
}

// Shows front, reveals back on Enter and asks for a recall quality.
// Re-prompts until the quality is a number between 0 and 5.
fn review_card<R, W>(card: &Card, stdout: &mut W, stdin: &mut R) -> Result<u8>
where
    R: BufRead,
    W: Write,
{
    write!(stdout, "T: {}", card.term)?;
    stdout.flush()?;
    let _: String = read_line(&mut *stdin)?;

    match &card.tag {
        Some(tag) => writeln!(stdout, "B: {} ({})", card.translation, tag)?,
        None => writeln!(stdout, "B: {}", card.translation)?,
    }
    if let Some(example) = &card.example {
        writeln!(stdout, "   {}", example)?;
    }
    if let Some(notes) = &card.notes {
        writeln!(stdout, "   {}", notes)?;
    }

    loop {
        write!(stdout, "Quality (0=blackout, 5=perfect): ")?;
        stdout.flush()?;
        let input: String = read_line(&mut *stdin)?;
        match input.parse::<u8>() {
            Ok(quality) if quality <= 5 => {
                writeln!(stdout)?;
                clear(stdout)?;
                stdout.flush()?;
                return Ok(quality);
            }
            _ => writeln!(stdout, "Please enter a number between 0 and 5.")?,
        }
    }
}

#[cfg(test)]
fn sample_card(now: DateTime<Local>) -> Card {
    Card {
        id: String::from("1746864000000-abcdefghi"),
        term: String::from("maison"),
        translation: String::from("house"),
        example: Some(String::from("Ma maison est grande.")),
        notes: None,
        tag: Some(String::from("la")),
        created_at: now,
        next_review_at: now,
        interval_days: 0,
        ease_factor: 2.5,
        repetitions: 0,
        lapses: 0,
    }
}

#[test]
fn test_review_card() {
    use chrono::TimeZone;
    use std::io::Cursor;

    let now = Local.with_ymd_and_hms(2025, 5, 10, 9, 30, 0).unwrap();
    let card = sample_card(now);
    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(b"\n4\n");
    let quality = review_card(&card, &mut stdout, &mut stdin).unwrap();
    assert_eq!(quality, 4);

    // Check prompts
    let stdout_vec = stdout.into_inner();
    assert_eq!(
        String::from_utf8_lossy(&stdout_vec),
        "T: maisonB: house (la)\n   Ma maison est grande.\n\
    Quality (0=blackout, 5=perfect): \n\u{1b}[2J\u{1b}[1;1H"
    );
}

#[test]
fn test_review_card_reprompts_on_invalid_quality() {
    use chrono::TimeZone;
    use std::io::Cursor;

    let now = Local.with_ymd_and_hms(2025, 5, 10, 9, 30, 0).unwrap();
    let card = sample_card(now);
    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(b"\nx\n9\n5\n");
    let quality = review_card(&card, &mut stdout, &mut stdin).unwrap();
    assert_eq!(quality, 5);

    let stdout_vec = stdout.into_inner();
    let output = String::from_utf8_lossy(&stdout_vec);
    assert_eq!(
        output
            .matches("Please enter a number between 0 and 5.")
            .count(),
        2
    );
}

#[test]
fn test_collect_due_indices_boundary() {
    use chrono::{TimeDelta, TimeZone};

    let now = Local.with_ymd_and_hms(2025, 5, 10, 9, 30, 0).unwrap();
    let due = sample_card(now);
    let mut not_due = sample_card(now);
    not_due.next_review_at = now + TimeDelta::milliseconds(1);
    let cards = vec![not_due, due];
    assert_eq!(collect_due_indices(&cards, now), vec![1]);
}
