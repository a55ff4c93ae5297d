use crate::models::Card;
use crate::utils::read_cards;
use anyhow::Result;
use chrono::{DateTime, Days, Local};
use std::fmt;
use std::path::Path;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_words: u64,
    pub due_today: u64,
    pub reviewed_today: u64,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            concat!(
                "Total words:    {}\n",
                "Due today:      {}\n",
                "Reviewed today: {}"
            ),
            self.total_words, self.due_today, self.reviewed_today,
        )
    }
}

/// Computes dashboard counts over a card collection as of `now`.
///
/// There is no review log, so "reviewed today" is inferred: the review that
/// produced `next_review_at` happened `interval_days` days earlier, and the
/// card counts if that date is today (in local time). Cards with interval 0
/// were never successfully reviewed and never count.
pub fn compute_stats(cards: &[Card], now: DateTime<Local>) -> Stats {
    let today = now.date_naive();
    let mut stats = Stats {
        total_words: cards.len() as u64,
        ..Stats::default()
    };
    for card in cards {
        if card.is_due(now) {
            stats.due_today += 1;
        }
        if card.interval_days > 0 {
            let reviewed_on = card.next_review_at.date_naive() - Days::new(card.interval_days as u64);
            if reviewed_on >= today {
                stats.reviewed_today += 1;
            }
        }
    }
    stats
}

pub fn stats(path: &Path) -> Result<()> {
    let cards = read_cards(path)?;
    println!("{}", compute_stats(&cards, Local::now()));
    Ok(())
}

#[cfg(test)]
fn sample_card(next_review_at: DateTime<Local>, interval_days: u32) -> Card {
    Card {
        id: String::from("1746864000000-abcdefghi"),
        term: String::from("maison"),
        translation: String::from("house"),
        example: None,
        notes: None,
        tag: None,
        created_at: next_review_at - Days::new(30),
        next_review_at,
        interval_days,
        ease_factor: 2.5,
        repetitions: if interval_days > 0 { 1 } else { 0 },
        lapses: 0,
    }
}

#[cfg(test)]
fn test_now() -> DateTime<Local> {
    use chrono::TimeZone;
    Local.with_ymd_and_hms(2025, 5, 10, 9, 30, 0).unwrap()
}

#[test]
fn test_due_boundary_is_inclusive() {
    use chrono::TimeDelta;

    let now = test_now();
    let cards = vec![
        sample_card(now, 0),
        sample_card(now + TimeDelta::milliseconds(1), 0),
    ];
    let stats = compute_stats(&cards, now);
    assert_eq!(stats.total_words, 2);
    assert_eq!(stats.due_today, 1);
}

#[test]
fn test_reviewed_today_inferred_from_interval() {
    let now = test_now();
    let cards = vec![
        // Reviewed today: next review in 3 days with interval 3.
        sample_card(now + Days::new(3), 3),
        // Reviewed yesterday: next review in 2 days with interval 3.
        sample_card(now + Days::new(2), 3),
        // Never successfully reviewed.
        sample_card(now, 0),
    ];
    let stats = compute_stats(&cards, now);
    assert_eq!(stats.reviewed_today, 1);
}

#[test]
fn test_compute_stats_is_idempotent() {
    let now = test_now();
    let cards = vec![sample_card(now, 0), sample_card(now + Days::new(5), 5)];
    assert_eq!(compute_stats(&cards, now), compute_stats(&cards, now));
}

#[test]
fn test_empty_collection() {
    let stats = compute_stats(&[], test_now());
    assert_eq!(stats, Stats::default());
}
