//! Cheap bot heuristics. Neither is a security boundary: a hit is answered
//! with the same thank-you a human gets, and the submission is dropped.

use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_MIN_FILL_TIME: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "signal")]
pub enum BotSignal {
    // Form came back faster than a person can fill it in
    TooFast { elapsed_ms: i64 },
    // Hidden field was filled in
    Honeypot,
}

/// Timing check against the page-load stamp (epoch milliseconds as text).
/// A missing, unreadable or out-of-range stamp never flags.
pub fn submitted_too_fast(stamp: Option<&str>, submitted_at_ms: i64, min_fill: Duration) -> Option<BotSignal> {
    let loaded_at: i64 = stamp?.trim().parse().ok()?;
    let elapsed_ms = submitted_at_ms.checked_sub(loaded_at)?;
    (elapsed_ms < min_fill.as_millis() as i64).then_some(BotSignal::TooFast { elapsed_ms })
}

pub fn honeypot_tripped(value: Option<&str>) -> Option<BotSignal> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|_| BotSignal::Honeypot)
}
