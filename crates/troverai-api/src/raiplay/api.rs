//! `RaiPlayApi` trait definition.
#![allow(clippy::future_not_send)]

use troverai_core::{ChannelInfo, DateSpec, DaySchedule, Result};

/// RaiPlay schedule API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(RaiPlayApi: Send)]
pub trait LocalRaiPlayApi {
    /// Fetches one channel's schedule for a day.
    ///
    /// # Errors
    ///
    /// - `FetchFailed` on transport errors or non-success HTTP status.
    /// - `AuthRequired` when the server answers 401/403.
    /// - `MalformedSchedule` when the payload does not match the schema.
    async fn fetch_day(&self, channel: &str, date: DateSpec) -> Result<DaySchedule>;

    /// Lists the channels the catalog knows about.
    ///
    /// # Errors
    ///
    /// Same conditions as [`fetch_day`](Self::fetch_day).
    async fn list_channels(&self) -> Result<Vec<ChannelInfo>>;
}
