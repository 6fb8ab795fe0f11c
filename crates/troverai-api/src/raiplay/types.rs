//! RaiPlay JSON payload types and their validation into core types.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Deserialize;
use troverai_core::{ChannelInfo, DateSpec, DaySchedule, Error, Result, ScheduleEntry};

/// Response of `palinsesto/app/{channel}/{date}.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPalinsesto {
    /// Channel display name.
    #[serde(default)]
    pub channel: Option<String>,
    /// Broadcast events; the API pads the list with `null` and `{}`.
    #[serde(default)]
    pub events: Vec<Option<RawEvent>>,
}

/// A single broadcast event as sent by RaiPlay.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    /// Program title.
    pub name: Option<String>,
    /// Start time, `HH:MM`.
    pub hour: Option<String>,
    /// Length, `HH:MM:SS`.
    pub duration: Option<String>,
    /// Synopsis.
    pub description: Option<String>,
    /// Air date, `dd/mm/yyyy`.
    pub date: Option<String>,
    /// Advertising metadata carrying typology and genre.
    pub dfp: Option<RawDfp>,
}

/// Advertising metadata block (`dfp`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDfp {
    /// Typology, e.g. `Film`.
    pub escaped_typology_name: Option<String>,
    /// Genre, e.g. `Commedia`.
    pub escaped_genre_name: Option<String>,
}

/// Response of `guidatv.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChannelList {
    /// Channel entries.
    #[serde(default)]
    pub channels: Vec<RawChannel>,
}

/// A channel entry of `guidatv.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawChannel {
    /// Display label.
    pub label: Option<String>,
    /// Path identifier, possibly with leading segments.
    pub absolute_path: Option<String>,
}

impl RawEvent {
    fn is_blank(&self) -> bool {
        non_empty(self.name.as_deref()).is_none() && non_empty(self.hour.as_deref()).is_none()
    }
}

impl RawPalinsesto {
    /// Validates the payload into a [`DaySchedule`].
    ///
    /// Empty events are skipped. Events without their own `date` are placed
    /// on `date`, rolling to the next day once the start hour goes backwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedSchedule`] for an event with a missing
    /// name or hour, or an unparsable hour, duration or date.
    pub fn into_day_schedule(self, channel_id: &str, date: DateSpec) -> Result<DaySchedule> {
        let mut entries = Vec::with_capacity(self.events.len());
        let mut day = date.date();
        let mut previous: Option<NaiveTime> = None;

        for (idx, event) in self.events.into_iter().enumerate() {
            let Some(event) = event else { continue };
            if event.is_blank() {
                continue;
            }
            let bad = |what: String| Error::malformed(channel_id, format!("event {idx}: {what}"));

            let title = non_empty(event.name.as_deref())
                .ok_or_else(|| bad(String::from("missing name")))?;
            let hour = non_empty(event.hour.as_deref())
                .ok_or_else(|| bad(format!("missing hour for {title:?}")))?;
            let time = NaiveTime::parse_from_str(hour, "%H:%M")
                .map_err(|_| bad(format!("invalid hour {hour:?}")))?;

            if let Some(raw_date) = non_empty(event.date.as_deref()) {
                day = parse_event_date(raw_date)
                    .ok_or_else(|| bad(format!("invalid date {raw_date:?}")))?;
            } else if previous.is_some_and(|p| time < p) {
                day = day
                    .checked_add_days(Days::new(1))
                    .ok_or_else(|| bad(String::from("date out of range")))?;
            }
            previous = Some(time);

            let start = day.and_time(time);
            let end = match non_empty(event.duration.as_deref()) {
                Some(raw) => {
                    let length =
                        parse_duration(raw).ok_or_else(|| bad(format!("invalid duration {raw:?}")))?;
                    end_after(start, length)
                }
                None => None,
            };

            let (typology, genre) = event.dfp.map_or((None, None), |dfp| {
                (
                    non_empty(dfp.escaped_typology_name.as_deref()).map(String::from),
                    non_empty(dfp.escaped_genre_name.as_deref()).map(String::from),
                )
            });

            entries.push(ScheduleEntry {
                title: String::from(title),
                channel: String::from(channel_id),
                start,
                end,
                typology,
                genre,
                description: non_empty(event.description.as_deref()).map(String::from),
            });
        }

        let channel_name = non_empty(self.channel.as_deref())
            .map_or_else(|| String::from(channel_id), String::from);

        Ok(DaySchedule {
            channel_id: String::from(channel_id),
            channel_name,
            entries,
        })
    }
}

impl RawChannelList {
    /// Converts to [`ChannelInfo`], dropping entries without a path.
    #[must_use]
    pub fn into_channels(self) -> Vec<ChannelInfo> {
        self.channels
            .into_iter()
            .filter_map(|ch| {
                let path = non_empty(ch.absolute_path.as_deref())?
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .filter(|p| !p.is_empty())?;
                let label = non_empty(ch.label.as_deref()).unwrap_or(path);
                Some(ChannelInfo {
                    label: String::from(label),
                    path: String::from(path),
                })
            })
            .collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%m-%Y"))
        .ok()
}

/// Parses `HH:MM:SS` (or `HH:MM`) into a duration.
fn parse_duration(raw: &str) -> Option<TimeDelta> {
    let parts: Vec<i64> = raw
        .split(':')
        .map(|p| p.trim().parse::<i64>().ok().filter(|n| *n >= 0))
        .collect::<Option<Vec<_>>>()?;
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [h, m] => (*h, *m, 0),
        _ => return None,
    };
    let total = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)?;
    TimeDelta::try_seconds(total)
}

fn end_after(start: NaiveDateTime, length: TimeDelta) -> Option<NaiveDateTime> {
    if length.is_zero() {
        return None;
    }
    start.checked_add_signed(length)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn date() -> DateSpec {
        DateSpec::new(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap())
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn parse(json: &str) -> Result<DaySchedule> {
        let raw: RawPalinsesto = serde_json::from_str(json).unwrap();
        raw.into_day_schedule("rai-1", date())
    }

    #[test]
    fn test_parse_fixture() {
        // Arrange
        let json = include_str!("../../../../fixtures/raiplay/palinsesto_rai-1.json");

        // Act
        let day = parse(json).unwrap();

        // Assert
        assert_eq!(day.channel_name, "Rai 1");
        assert_eq!(day.channel_id, "rai-1");
        assert!(!day.entries.is_empty());
        let tg = &day.entries[0];
        assert_eq!(tg.title, "Tg1");
        assert_eq!(tg.start, at(16, 20, 0));
        assert_eq!(tg.end, Some(at(16, 20, 30)));
        assert_eq!(tg.typology.as_deref(), Some("ProgrammiTv"));
    }

    #[test]
    fn test_blank_events_skipped() {
        // Arrange
        let json = r#"{"channel":"Rai 1","events":[null,{},{"name":"Tg1","hour":"20:00"}]}"#;

        // Act
        let day = parse(json).unwrap();

        // Assert
        assert_eq!(day.entries.len(), 1);
        assert_eq!(day.entries[0].end, None);
    }

    #[test]
    fn test_rolls_over_midnight() {
        // Arrange
        let json = r#"{"events":[
            {"name":"Porta a Porta","hour":"23:30","duration":"01:00:00"},
            {"name":"Tg1 Notte","hour":"00:30"}
        ]}"#;

        // Act
        let day = parse(json).unwrap();

        // Assert
        assert_eq!(day.entries[0].end, Some(at(17, 0, 30)));
        assert_eq!(day.entries[1].start, at(17, 0, 30));
        assert_eq!(day.channel_name, "rai-1");
    }

    #[test]
    fn test_event_date_overrides_requested_day() {
        // Arrange
        let json = r#"{"events":[{"name":"Replica","hour":"01:00","date":"17/01/2026"}]}"#;

        // Act
        let day = parse(json).unwrap();

        // Assert
        assert_eq!(day.entries[0].start, at(17, 1, 0));
    }

    #[test]
    fn test_invalid_hour_is_malformed() {
        // Arrange
        let json = r#"{"events":[{"name":"Tg1","hour":"ore venti"}]}"#;

        // Act
        let result = parse(json);

        // Assert
        assert!(matches!(result, Err(Error::MalformedSchedule { .. })));
        assert!(result.unwrap_err().to_string().contains("ore venti"));
    }

    #[test]
    fn test_missing_hour_is_malformed() {
        // Arrange
        let json = r#"{"events":[{"name":"Tg1"}]}"#;

        // Act & Assert
        assert!(matches!(parse(json), Err(Error::MalformedSchedule { .. })));
    }

    #[test]
    fn test_invalid_duration_is_malformed() {
        // Arrange
        let json = r#"{"events":[{"name":"Tg1","hour":"20:00","duration":"mezz'ora"}]}"#;

        // Act & Assert
        assert!(matches!(parse(json), Err(Error::MalformedSchedule { .. })));
    }

    #[test]
    fn test_parse_duration() {
        // Arrange & Act & Assert
        assert_eq!(parse_duration("01:30:00").unwrap().num_minutes(), 90);
        assert_eq!(parse_duration("00:45").unwrap().num_minutes(), 45);
        assert!(parse_duration("1:2:3:4").is_none());
        assert!(parse_duration("-1:00:00").is_none());
    }

    #[test]
    fn test_channel_list_conversion() {
        // Arrange
        let json = include_str!("../../../../fixtures/raiplay/guidatv.json");
        let raw: RawChannelList = serde_json::from_str(json).unwrap();

        // Act
        let channels = raw.into_channels();

        // Assert
        assert_eq!(channels[0].label, "Rai 1");
        assert_eq!(channels[0].path, "rai-1");
        assert!(channels.iter().all(|c| !c.path.contains('/')));
    }
}
