use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use struct_field_names_as_array::FieldNamesAsArray;

/// A vocabulary flashcard together with its scheduling state.
///
/// `term` and `translation` are stored trimmed and lowercased. The
/// scheduling fields (`next_review_at`, `interval_days`, `ease_factor`,
/// `repetitions`, `lapses`) are mutated only by [`crate::srs::schedule_review`],
/// which replaces the whole card value.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, FieldNamesAsArray)]
pub struct Card {
    pub id: String,
    pub term: String,
    pub translation: String,
    pub example: Option<String>,
    pub notes: Option<String>,
    /// Free-form tag, typically the grammatical gender (le/la/les/l').
    pub tag: Option<String>,
    pub created_at: DateTime<Local>,
    pub next_review_at: DateTime<Local>,
    /// Days between the previous review and `next_review_at`.
    /// 0 means the card has never been successfully reviewed.
    pub interval_days: u32,
    pub ease_factor: f64,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
    pub lapses: u32,
}

impl Card {
    /// A card is due once its scheduled review time has passed.
    pub fn is_due(&self, now: DateTime<Local>) -> bool {
        self.next_review_at <= now
    }
}
