//! `RaiPlayClient` - RaiPlay schedule API client implementation.

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use tracing::instrument;
use troverai_core::{ChannelInfo, DateSpec, DaySchedule, Error};
use url::Url;

use super::api::LocalRaiPlayApi;
use super::repair::repair_json;
use super::types::{RawChannelList, RawPalinsesto};

/// Base URL for the RaiPlay website.
pub const RAIPLAY_BASE_URL: &str = "https://www.raiplay.it/";

/// Path of the channel listing.
const CHANNELS_PATH: &str = "guidatv.json";

/// RaiPlay schedule API client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct RaiPlayClient {
    /// HTTP client (reqwest, gzip enabled).
    http_client: Client,
    /// Base URL.
    base_url: Url,
    /// Optional JWT sent as a bearer token.
    bearer_token: Option<String>,
}

/// Builder for `RaiPlayClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct RaiPlayClientBuilder {
    base_url: Option<Url>,
    user_agent: Option<String>,
    bearer_token: Option<String>,
}

impl RaiPlayClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            user_agent: None,
            bearer_token: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the JWT sent with every request (optional).
    #[must_use]
    pub fn bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<RaiPlayClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(RAIPLAY_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(RaiPlayClient {
            http_client,
            base_url,
            bearer_token: self.bearer_token,
        })
    }
}

impl RaiPlayClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> RaiPlayClientBuilder {
        RaiPlayClientBuilder::new()
    }

    /// Whether requests carry a bearer token.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Sends a GET request and returns the body text.
    #[instrument(skip_all, fields(path = %path))]
    async fn get_text(&self, path: &str, target: &str) -> troverai_core::Result<String> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::fetch_failed(target, format!("invalid URL path {path}: {e}")))?;

        let mut request = self
            .http_client
            .get(url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let request = request
            .build()
            .map_err(|e| Error::fetch_failed(target, e))?;

        tracing::debug!(url = %request.url(), "RaiPlay API request");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| Error::fetch_failed(target, e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(
                %status,
                authenticated = self.is_authenticated(),
                "RaiPlay API refused the request"
            );
            return Err(Error::AuthRequired {
                target: String::from(target),
            });
        }
        if !status.is_success() {
            return Err(Error::fetch_failed(target, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch_failed(target, format!("failed to read body: {e}")))
    }

    /// Decodes a JSON body, retrying once on a repaired copy.
    pub(crate) fn decode<T: DeserializeOwned>(
        body: &str,
        target: &str,
    ) -> troverai_core::Result<T> {
        let strict_err = match serde_json::from_str::<T>(body) {
            Ok(parsed) => return Ok(parsed),
            Err(err) => err,
        };

        let repaired = repair_json(body);
        if repaired.is_unchanged() {
            return Err(Error::malformed(target, strict_err));
        }

        tracing::warn!(
            target_name = target,
            fixes = repaired.fixes.len(),
            "RaiPlay returned malformed JSON, parsing repaired copy"
        );
        serde_json::from_str::<T>(&repaired.text).map_err(|e| Error::malformed(target, e))
    }
}

impl LocalRaiPlayApi for RaiPlayClient {
    #[instrument(skip_all, fields(channel = %channel, date = %date))]
    async fn fetch_day(&self, channel: &str, date: DateSpec) -> troverai_core::Result<DaySchedule> {
        let path = format!("palinsesto/app/{channel}/{}.json", date.to_path_segment());
        let body = self.get_text(&path, channel).await?;
        let raw: RawPalinsesto = Self::decode(&body, channel)?;
        let day = raw.into_day_schedule(channel, date)?;

        tracing::debug!(entries = day.entries.len(), "schedule fetched");
        Ok(day)
    }

    #[instrument(skip_all)]
    async fn list_channels(&self) -> troverai_core::Result<Vec<ChannelInfo>> {
        let body = self.get_text(CHANNELS_PATH, "channel list").await?;
        let raw: RawChannelList = Self::decode(&body, "channel list")?;
        Ok(raw.into_channels())
    }
}
