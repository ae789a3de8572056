//! Plain-text rendering of transcript turns

use crate::transcript::{Author, Message};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Relative age of `timestamp` as seen at `now`.
///
/// Timestamps in the future count as "just now".
pub fn age_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(timestamp);
    if age.num_minutes() < 1 {
        "just now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h ago", age.num_hours())
    } else {
        format!("{}d ago", age.num_days())
    }
}

fn author_label(author: Author) -> &'static str {
    match author {
        Author::User => "you",
        Author::Assistant => "assistant",
    }
}

/// Render one turn: a header line with author and age, the text, then
/// numbered source titles.
pub fn render_turn(message: &Message, now: DateTime<Utc>) -> String {
    let mut out = format!(
        "[{} · {}] ",
        author_label(message.author),
        age_label(message.timestamp, now)
    );
    if message.is_error() {
        out.push_str("(!) ");
    }
    out.push_str(&message.text);

    for (i, source) in message.sources.iter().enumerate() {
        let title = if source.title.is_empty() {
            "Untitled"
        } else {
            source.title.as_str()
        };
        let _ = write!(out, "\n  [{}] {}", i + 1, title);
        if !source.category.is_empty() {
            let _ = write!(out, " ({})", source.category);
        }
    }
    out
}
