//! Schedule data model.

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

/// One broadcast program instance on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    /// Program title.
    pub title: String,
    /// Channel identifier (e.g. `rai-1`).
    pub channel: String,
    /// Local start date and time.
    pub start: NaiveDateTime,
    /// Local end date and time, when known or inferred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    /// Broad category such as `Film` or `SerieTV`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typology: Option<String>,
    /// Free-text genre such as `Commedia`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    /// Short synopsis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ScheduleEntry {
    /// Creates an entry with only the mandatory fields set.
    #[must_use]
    pub fn new(title: impl Into<String>, channel: impl Into<String>, start: NaiveDateTime) -> Self {
        Self {
            title: title.into(),
            channel: channel.into(),
            start,
            end: None,
            typology: None,
            genre: None,
            description: None,
        }
    }

    /// Length of the program, when the end is known.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        self.end
            .map(|end| end.signed_duration_since(self.start))
            .filter(|d| *d > TimeDelta::zero())
    }

    /// Whether the program is on air at `instant` (`start <= instant < end`).
    ///
    /// Always `false` while the end is unknown; run
    /// [`infer_end_times`](crate::infer_end_times) first.
    #[must_use]
    pub fn is_airing_at(&self, instant: NaiveDateTime) -> bool {
        self.end
            .is_some_and(|end| self.start <= instant && instant < end)
    }
}

/// A channel's schedule for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    /// Channel identifier used in requests.
    pub channel_id: String,
    /// Human-readable channel name.
    pub channel_name: String,
    /// Validated entries in fetch order.
    pub entries: Vec<ScheduleEntry>,
}

/// An entry of the channel listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    /// Display label (e.g. `Rai 1`).
    pub label: String,
    /// Identifier accepted by `--canale` (e.g. `rai-1`).
    pub path: String,
}
