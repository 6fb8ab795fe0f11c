//! RaiPlay API utility functions.

use tracing::instrument;
use troverai_core::{DateSpec, DaySchedule, Result};

use super::api::LocalRaiPlayApi;

/// Fetches one day of schedule for each channel, one request at a time.
///
/// A channel that fails is logged and skipped so the others still render.
/// Results keep the order of `channels`.
///
/// # Errors
///
/// Returns the first channel's error when every channel fails.
#[instrument(skip_all, fields(channels = channels.len(), date = %date))]
pub async fn fetch_days(
    api: &(impl LocalRaiPlayApi + Sync),
    channels: &[String],
    date: DateSpec,
) -> Result<Vec<DaySchedule>> {
    let mut days = Vec::with_capacity(channels.len());
    let mut first_error = None;

    for channel in channels {
        match api.fetch_day(channel, date).await {
            Ok(day) => days.push(day),
            Err(err) => {
                tracing::warn!(channel = %channel, error = %err, "skipping channel");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    if days.is_empty()
        && let Some(err) = first_error
    {
        return Err(err);
    }

    tracing::info!(
        fetched = days.len(),
        failed = channels.len().saturating_sub(days.len()),
        "schedule fetch completed"
    );
    Ok(days)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Mutex;

    use chrono::NaiveDate;
    use troverai_core::{ChannelInfo, Error, ScheduleEntry};

    use super::*;

    /// Mock API that fails for the channels listed in `failing`.
    struct MockRaiPlayApi {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl MockRaiPlayApi {
        fn new(failing: Vec<&'static str>) -> Self {
            Self {
                failing,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl LocalRaiPlayApi for MockRaiPlayApi {
        async fn fetch_day(&self, channel: &str, date: DateSpec) -> Result<DaySchedule> {
            self.calls.lock().unwrap().push(String::from(channel));
            if self.failing.contains(&channel) {
                return Err(Error::fetch_failed(channel, "HTTP 503"));
            }
            let start = date.date().and_hms_opt(20, 0, 0).unwrap();
            Ok(DaySchedule {
                channel_id: String::from(channel),
                channel_name: String::from(channel),
                entries: vec![ScheduleEntry::new("Tg", channel, start)],
            })
        }

        async fn list_channels(&self) -> Result<Vec<ChannelInfo>> {
            Ok(vec![])
        }
    }

    fn date() -> DateSpec {
        DateSpec::new(NaiveDate::from_ymd_opt(2026, 1, 16).unwrap())
    }

    fn channels(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| String::from(*s)).collect()
    }

    #[tokio::test]
    async fn test_fetch_days_keeps_order() {
        // Arrange
        let api = MockRaiPlayApi::new(vec![]);

        // Act
        let days = fetch_days(&api, &channels(&["rai-3", "rai-1", "rai-2"]), date())
            .await
            .unwrap();

        // Assert
        let ids: Vec<&str> = days.iter().map(|d| d.channel_id.as_str()).collect();
        assert_eq!(ids, vec!["rai-3", "rai-1", "rai-2"]);
    }

    #[tokio::test]
    async fn test_fetch_days_skips_failing_channel() {
        // Arrange
        let api = MockRaiPlayApi::new(vec!["rai-2"]);

        // Act
        let days = fetch_days(&api, &channels(&["rai-1", "rai-2", "rai-3"]), date())
            .await
            .unwrap();

        // Assert
        assert_eq!(days.len(), 2);
        assert_eq!(api.calls.lock().unwrap().len(), 3);
        assert!(days.iter().all(|d| d.channel_id != "rai-2"));
    }

    #[tokio::test]
    async fn test_fetch_days_all_failing_returns_first_error() {
        // Arrange
        let api = MockRaiPlayApi::new(vec!["rai-1", "rai-2"]);

        // Act
        let result = fetch_days(&api, &channels(&["rai-1", "rai-2"]), date()).await;

        // Assert
        let err = result.unwrap_err();
        assert!(matches!(err, Error::FetchFailed { ref target, .. } if target == "rai-1"));
    }

    #[tokio::test]
    async fn test_fetch_days_no_channels() {
        // Arrange
        let api = MockRaiPlayApi::new(vec![]);

        // Act
        let days = fetch_days(&api, &[], date()).await.unwrap();

        // Assert
        assert!(days.is_empty());
    }
}
