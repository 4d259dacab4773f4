//! Deterministic keyword-topic folding for old conversation turns
//!
//! When the turn buffer outgrows its summary threshold, older turns are
//! folded into a one-line summary. This is keyword bucketing, not semantic
//! compression: each user turn is matched against fixed topic buckets, and
//! the summary lists the buckets hit in a fixed canonical order so the same
//! history always folds to the same text.

use crate::conversation::{ConversationTurn, Role};

/// The topic buckets, in canonical output order.
const TOPICS: &[(&str, &[&str])] = &[
    ("book searches", &["libro", "book", "buscar", "search"]),
    ("loan management", &["prestamo", "préstamo", "loan", "borrow"]),
    ("late fee questions", &["multa", "fee", "fine", "overdue"]),
    ("reservations", &["reserva", "reserve", "reservation"]),
    ("policy questions", &["politica", "política", "policy", "policies"]),
];

const FALLBACK_TOPIC: &str = "general assistance";

/// Summarize a slice of old turns into one stable line.
///
/// Returns `None` only for an empty slice. User turns that match no bucket
/// still count toward the fallback topic, so any non-empty slice produces a
/// non-empty summary.
pub fn summarize(old_turns: &[ConversationTurn]) -> Option<String> {
    if old_turns.is_empty() {
        return None;
    }

    let mut hits = [false; TOPICS.len()];
    for turn in old_turns {
        if turn.role != Role::User {
            continue;
        }
        let content = turn.content.to_lowercase();
        for (bucket, (_, keywords)) in hits.iter_mut().zip(TOPICS) {
            if keywords.iter().any(|k| content.contains(k)) {
                *bucket = true;
            }
        }
    }

    let topics: Vec<&str> = TOPICS
        .iter()
        .zip(hits)
        .filter_map(|((topic, _), hit)| hit.then_some(*topic))
        .collect();

    let listing = if topics.is_empty() {
        FALLBACK_TOPIC.to_string()
    } else {
        topics.join(", ")
    };

    Some(format!("Earlier conversation covered: {listing}"))
}
