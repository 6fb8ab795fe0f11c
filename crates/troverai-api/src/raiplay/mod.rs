//! RaiPlay schedule API client module.
//!
//! Fetches per-channel daily schedules (`palinsesto`) and the channel
//! listing, validating the JSON payloads into core schedule types.

mod api;
mod channels;
mod client;
mod repair;
mod types;
mod util;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalRaiPlayApi, RaiPlayApi};
pub use channels::{NOW_CHANNELS, PRIME_TIME_CHANNELS, SEARCH_CHANNELS, normalize_channel};
#[allow(clippy::module_name_repetitions)]
pub use client::{RAIPLAY_BASE_URL, RaiPlayClient, RaiPlayClientBuilder};
pub use repair::{JsonFix, Repaired, repair_json};
pub use types::{RawChannel, RawChannelList, RawDfp, RawEvent, RawPalinsesto};
pub use util::fetch_days;
