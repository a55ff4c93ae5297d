use crate::models::Card;
use crate::utils::generate_id;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Days, Local};

/// Ease factor assigned to freshly created cards.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;
/// Lower clamp for the ease factor. There is no upper clamp.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Creates a new card that is immediately due for review.
///
/// Term and translation are trimmed and lowercased before storage; both must
/// be non-empty afterwards. Example, notes and tag are kept as given.
pub fn new_card(
    term: &str,
    translation: &str,
    example: Option<String>,
    notes: Option<String>,
    tag: Option<String>,
    now: DateTime<Local>,
) -> Result<Card> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Err(anyhow!("Term must not be empty."));
    }
    let translation = translation.trim().to_lowercase();
    if translation.is_empty() {
        return Err(anyhow!("Translation must not be empty."));
    }
    Ok(Card {
        id: generate_id(now),
        term,
        translation,
        example,
        notes,
        tag,
        created_at: now,
        next_review_at: now,
        interval_days: 0,
        ease_factor: DEFAULT_EASE_FACTOR,
        repetitions: 0,
        lapses: 0,
    })
}

/// Applies one review with the given quality (0-5) and returns the card's
/// next state. SM-2: the ease factor is recalculated on every review, pass
/// or fail; quality below 3 is a lapse and resets the repetition streak.
///
/// The next review is scheduled `interval_days` *calendar* days from `now`,
/// so crossing a daylight-saving boundary still moves the date by whole days.
pub fn schedule_review(card: &Card, quality: u8, now: DateTime<Local>) -> Result<Card> {
    if quality > 5 {
        return Err(anyhow!("Quality must be between 0 and 5, got {}.", quality));
    }
    let spread = (5 - quality) as f64;
    let mut ease_factor = card.ease_factor + (0.1 - spread * (0.08 + spread * 0.02));
    if ease_factor < MIN_EASE_FACTOR {
        ease_factor = MIN_EASE_FACTOR;
    }

    let (interval_days, repetitions, lapses) = if quality < 3 {
        (1, 0, card.lapses + 1)
    } else {
        let interval_days = match card.repetitions {
            0 => 1,
            1 => 6,
            // f64::round ties away from zero: 6 * 1.45 = 8.7 becomes 9.
            _ => (card.interval_days as f64 * ease_factor).round() as u32,
        };
        (interval_days, card.repetitions + 1, card.lapses)
    };

    let next_review_at = now
        .checked_add_days(Days::new(interval_days as u64))
        .ok_or_else(|| anyhow!("Next review date is out of range."))?;

    Ok(Card {
        next_review_at,
        interval_days,
        ease_factor,
        repetitions,
        lapses,
        ..card.clone()
    })
}

#[cfg(test)]
fn test_now() -> DateTime<Local> {
    use chrono::TimeZone;
    Local.with_ymd_and_hms(2025, 5, 10, 9, 30, 0).unwrap()
}

#[cfg(test)]
fn assert_ease(card: &Card, expected: f64) {
    assert!(
        (card.ease_factor - expected).abs() < 1e-9,
        "ease factor {} != {}",
        card.ease_factor,
        expected
    );
}

#[test]
fn test_new_card_normalizes_and_defaults() {
    let now = test_now();
    let card = new_card(" Maison ", "House", None, None, Some("la".into()), now).unwrap();
    assert_eq!(card.term, "maison");
    assert_eq!(card.translation, "house");
    assert_eq!(card.tag.as_deref(), Some("la"));
    assert_eq!(card.created_at, now);
    assert_eq!(card.next_review_at, now);
    assert_eq!(card.interval_days, 0);
    assert_eq!(card.repetitions, 0);
    assert_eq!(card.lapses, 0);
    assert_ease(&card, DEFAULT_EASE_FACTOR);
}

#[test]
fn test_new_card_rejects_empty_term() {
    let result = new_card("", "house", None, None, None, test_now());
    assert_eq!(result.unwrap_err().to_string(), "Term must not be empty.");
}

#[test]
fn test_new_card_rejects_blank_translation() {
    let result = new_card("maison", "  ", None, None, None, test_now());
    assert_eq!(
        result.unwrap_err().to_string(),
        "Translation must not be empty."
    );
}

#[test]
fn test_new_card_ids_are_unique() {
    let now = test_now();
    let a = new_card("maison", "house", None, None, None, now).unwrap();
    let b = new_card("chien", "dog", None, None, None, now).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn test_first_success_yields_one_day() {
    let now = test_now();
    let card = new_card("maison", "house", None, None, None, now).unwrap();
    let card = schedule_review(&card, 5, now).unwrap();
    assert_eq!(card.interval_days, 1);
    assert_eq!(card.repetitions, 1);
    assert_eq!(card.lapses, 0);
    assert_eq!(card.next_review_at, now + Days::new(1));
    assert_ease(&card, 2.6);
}

#[test]
fn test_second_success_yields_six_days() {
    let now = test_now();
    let card = new_card("maison", "house", None, None, None, now).unwrap();
    let card = schedule_review(&card, 4, now).unwrap();
    let card = schedule_review(&card, 4, now).unwrap();
    assert_eq!(card.interval_days, 6);
    assert_eq!(card.repetitions, 2);
    assert_eq!(card.next_review_at, now + Days::new(6));
}

#[test]
fn test_third_success_multiplies_by_ease() {
    let now = test_now();
    let mut card = new_card("maison", "house", None, None, None, now).unwrap();
    card.interval_days = 6;
    card.repetitions = 2;
    // Quality 4 leaves the ease factor at 2.5, so 6 * 2.5 = 15.
    let card = schedule_review(&card, 4, now).unwrap();
    assert_eq!(card.interval_days, 15);
    assert_eq!(card.repetitions, 3);
    assert_ease(&card, 2.5);
}

#[test]
fn test_quality_three_counts_as_success() {
    let now = test_now();
    let mut card = new_card("maison", "house", None, None, None, now).unwrap();
    card.repetitions = 1;
    let card = schedule_review(&card, 3, now).unwrap();
    assert_eq!(card.interval_days, 6);
    assert_eq!(card.repetitions, 2);
    assert_eq!(card.lapses, 0);
}

#[test]
fn test_interval_rounds_half_up() {
    let now = test_now();
    let mut card = new_card("maison", "house", None, None, None, now).unwrap();
    card.interval_days = 6;
    card.repetitions = 2;
    card.ease_factor = 1.59;
    // Quality 3 lowers the ease factor by 0.14 to 1.45; 6 * 1.45 = 8.7 -> 9.
    let card = schedule_review(&card, 3, now).unwrap();
    assert_ease(&card, 1.45);
    assert_eq!(card.interval_days, 9);
}

#[test]
fn test_failure_resets_progress() {
    let now = test_now();
    let mut card = new_card("maison", "house", None, None, None, now).unwrap();
    card.interval_days = 30;
    card.repetitions = 5;
    card.lapses = 2;
    let card = schedule_review(&card, 2, now).unwrap();
    assert_eq!(card.interval_days, 1);
    assert_eq!(card.repetitions, 0);
    assert_eq!(card.lapses, 3);
    assert_eq!(card.next_review_at, now + Days::new(1));
}

#[test]
fn test_failed_review_still_updates_ease() {
    let now = test_now();
    let card = new_card("maison", "house", None, None, None, now).unwrap();
    // Quality 2: delta = 0.1 - 3 * (0.08 + 3 * 0.02) = -0.32.
    let card = schedule_review(&card, 2, now).unwrap();
    assert_ease(&card, 2.18);
}

#[test]
fn test_ease_factor_never_drops_below_floor() {
    let now = test_now();
    let mut card = new_card("maison", "house", None, None, None, now).unwrap();
    card.ease_factor = MIN_EASE_FACTOR;
    for quality in 0..=5 {
        let updated = schedule_review(&card, quality, now).unwrap();
        assert!(updated.ease_factor >= MIN_EASE_FACTOR);
    }
}

#[test]
fn test_rejects_out_of_range_quality() {
    let now = test_now();
    let card = new_card("maison", "house", None, None, None, now).unwrap();
    let result = schedule_review(&card, 6, now);
    assert_eq!(
        result.unwrap_err().to_string(),
        "Quality must be between 0 and 5, got 6."
    );
}

#[test]
fn test_scheduler_preserves_identity_fields() {
    let now = test_now();
    let card = new_card(
        "maison",
        "house",
        Some("Ma maison est grande.".into()),
        Some("cognate of mansion".into()),
        Some("la".into()),
        now,
    )
    .unwrap();
    let updated = schedule_review(&card, 0, now).unwrap();
    assert_eq!(updated.id, card.id);
    assert_eq!(updated.term, card.term);
    assert_eq!(updated.translation, card.translation);
    assert_eq!(updated.example, card.example);
    assert_eq!(updated.notes, card.notes);
    assert_eq!(updated.tag, card.tag);
    assert_eq!(updated.created_at, card.created_at);
}

#[test]
fn test_end_to_end_progression() {
    let now = test_now();
    let card = new_card("maison", "house", None, None, None, now).unwrap();

    let card = schedule_review(&card, 5, now).unwrap();
    assert_eq!((card.interval_days, card.repetitions), (1, 1));
    assert_ease(&card, 2.6);

    let card = schedule_review(&card, 5, now + Days::new(1)).unwrap();
    assert_eq!((card.interval_days, card.repetitions), (6, 2));
    assert_ease(&card, 2.7);

    let card = schedule_review(&card, 5, now + Days::new(7)).unwrap();
    assert_eq!(card.interval_days, 17); // round(6 * 2.8)
    assert_eq!(card.repetitions, 3);
    assert_ease(&card, 2.8);

    let card = schedule_review(&card, 1, now + Days::new(24)).unwrap();
    assert_eq!((card.interval_days, card.repetitions), (1, 0));
    assert_eq!(card.lapses, 1);
    assert!(card.ease_factor >= MIN_EASE_FACTOR);
    assert_ease(&card, 2.26);
}
