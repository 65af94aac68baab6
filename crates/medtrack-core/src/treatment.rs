//! Treatment window arithmetic.
//!
//! A course that starts at instant `start` and lasts `days` days ends at
//! `start + days * 24h`. Remaining days are the ceiling of the time left until
//! that end, in whole days, clamped at zero. Nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Where `now` falls relative to a treatment window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentStatus {
    /// Treatment has not started yet
    Upcoming,
    /// Treatment is in progress
    Active,
    /// Treatment window has ended
    Completed,
}

/// Remaining whole days of treatment as of `now`.
///
/// Any partial day counts as a full day, so a course of `days` days that
/// starts exactly at `now` reports `days`, and one starting tomorrow reports
/// `days + 1`.
pub fn remaining_days(start: DateTime<Utc>, days: u32, now: DateTime<Utc>) -> u32 {
    let end_ms = start
        .timestamp_millis()
        .saturating_add(i64::from(days).saturating_mul(MS_PER_DAY));
    let remaining_ms = end_ms.saturating_sub(now.timestamp_millis());
    if remaining_ms <= 0 {
        return 0;
    }

    let whole = remaining_ms / MS_PER_DAY;
    let ceil = if remaining_ms % MS_PER_DAY == 0 {
        whole
    } else {
        whole + 1
    };
    u32::try_from(ceil).unwrap_or(u32::MAX)
}

/// Classify `now` against the window starting at `start`.
pub fn status(start: DateTime<Utc>, days: u32, now: DateTime<Utc>) -> TreatmentStatus {
    if now < start {
        TreatmentStatus::Upcoming
    } else if remaining_days(start, days, now) == 0 {
        TreatmentStatus::Completed
    } else {
        TreatmentStatus::Active
    }
}
