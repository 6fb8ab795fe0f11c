//! End-time inference and time-window filtering.
//!
//! Filtering runs in two stages: [`infer_end_times`] fills missing ends from
//! the per-channel program order, then [`filter_by_time`] applies the
//! "on air now" or time-of-day window predicate.

use std::collections::HashMap;

use chrono::{Days, NaiveDateTime, NaiveTime};

use crate::entry::ScheduleEntry;
use crate::error::{Error, Result};

/// A time-of-day window, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Earliest accepted start time.
    pub from: NaiveTime,
    /// Latest accepted start time.
    pub to: NaiveTime,
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self {
            from: NaiveTime::MIN,
            to: end_of_day(),
        }
    }
}

impl TimeWindow {
    /// Builds a window, defaulting missing bounds to the start and end of day.
    #[must_use]
    pub fn new(from: Option<NaiveTime>, to: Option<NaiveTime>) -> Self {
        let default = Self::default();
        Self {
            from: from.unwrap_or(default.from),
            to: to.unwrap_or(default.to),
        }
    }

    /// Parses optional `HH:MM` bounds; `None` when neither is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimeToken`] if a bound is not `HH:MM`.
    pub fn from_tokens(from: Option<&str>, to: Option<&str>) -> Result<Option<Self>> {
        if from.is_none() && to.is_none() {
            return Ok(None);
        }
        let from = from.map(parse_time_token).transpose()?;
        let to = to.map(parse_time_token).transpose()?;
        Ok(Some(Self::new(from, to)))
    }

    /// The prime-time window, 20:00 to 23:00.
    #[must_use]
    pub fn prime_time() -> Self {
        Self {
            from: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
            to: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or_else(end_of_day),
        }
    }

    /// Whether `time` lies in `[from, to]`. Always `false` for an inverted window.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        self.from <= time && time <= self.to
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// Parses an `HH:MM` time-of-day token.
///
/// # Errors
///
/// Returns [`Error::InvalidTimeToken`] if the token is not a valid `HH:MM`.
pub fn parse_time_token(token: &str) -> Result<NaiveTime> {
    let trimmed = token.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| Error::InvalidTimeToken(String::from(trimmed)))
}

/// Fills every missing `end` with the next start on the same channel.
///
/// Entries are grouped by channel and ordered by `start` (stable on ties).
/// The last entry of a channel ends at the midnight closing the channel's
/// broadcast day, the day of its earliest entry. A last entry starting after
/// that midnight (an after-midnight tail) keeps an unknown end. Explicit ends
/// are kept. The result is in input order.
#[must_use]
pub fn infer_end_times(entries: &[ScheduleEntry]) -> Vec<ScheduleEntry> {
    let mut by_channel: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        by_channel.entry(entry.channel.as_str()).or_default().push(idx);
    }

    let mut inferred: Vec<ScheduleEntry> = entries.to_vec();
    for indices in by_channel.values_mut() {
        indices.sort_by_key(|&idx| entries.get(idx).map(|e| e.start));
        let day_end = indices
            .first()
            .and_then(|&idx| entries.get(idx))
            .and_then(|first| following_midnight(first.start));

        let mut next_start: Option<NaiveDateTime> = None;
        for &idx in indices.iter().rev() {
            if let Some(entry) = inferred.get_mut(idx) {
                if entry.end.is_none() {
                    let start = entry.start;
                    entry.end = next_start.or_else(|| day_end.filter(|end| start < *end));
                }
                next_start = Some(entry.start);
            }
        }
    }
    inferred
}

fn following_midnight(start: NaiveDateTime) -> Option<NaiveDateTime> {
    start
        .date()
        .checked_add_days(Days::new(1))
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Filters entries to those on air at `reference` or starting inside `window`.
///
/// End times are inferred first. With `now_only` set the window is ignored
/// and entries with `start <= reference < end` are kept. Otherwise, when a
/// window is given, entries whose start time of day falls in the window are
/// kept. The result is sorted by `start`, ties in input order.
#[must_use]
pub fn filter_by_time(
    entries: &[ScheduleEntry],
    window: Option<&TimeWindow>,
    now_only: bool,
    reference: NaiveDateTime,
) -> Vec<ScheduleEntry> {
    let mut kept: Vec<ScheduleEntry> = infer_end_times(entries)
        .into_iter()
        .filter(|entry| {
            if now_only {
                entry.is_airing_at(reference)
            } else {
                window.is_none_or(|w| w.contains(entry.start.time()))
            }
        })
        .collect();
    kept.sort_by_key(|entry| entry.start);
    kept
}
