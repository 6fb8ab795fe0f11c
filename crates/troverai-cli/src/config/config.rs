//! `AppConfig` struct and TOML loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use troverai_api::auth::TOKEN_FILE_NAME;
use troverai_api::raiplay::{NOW_CHANNELS, PRIME_TIME_CHANNELS, SEARCH_CHANNELS};
use url::Url;

/// User-Agent sent when the config does not set one.
const DEFAULT_USER_AGENT: &str = concat!("troverai/", env!("CARGO_PKG_VERSION"));

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Channel sets used by the multi-channel views.
    #[serde(default)]
    pub channels: ChannelsConfig,
    /// RaiPlay API overrides.
    #[serde(default)]
    pub api: ApiConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Channel set configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChannelsConfig {
    /// Channels checked by `--ora`.
    pub now: Vec<String>,
    /// Channels shown by `--prima-serata`.
    pub prime_time: Vec<String>,
    /// Channels scanned by `--cerca`.
    pub search: Vec<String>,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            now: owned(NOW_CHANNELS),
            prime_time: owned(PRIME_TIME_CHANNELS),
            search: owned(SEARCH_CHANNELS),
        }
    }
}

fn owned(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| String::from(*id)).collect()
}

/// RaiPlay API configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL override (e.g. a local mirror).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// User-Agent override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Authentication configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// Token file location; defaults to `raiplay_tokens.json` next to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
    /// Rai SSO domain API key; read from the RaiPlay app config when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_api_key: Option<String>,
    /// Token refresh endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    /// Login endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_url: Option<String>,
    /// RaiPlay app config location override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_url: Option<String>,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// The configured User-Agent, or `troverai/{version}`.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        self.api
            .user_agent
            .as_deref()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    /// The base URL override, with a trailing slash so paths join beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if `api.base_url` is not a valid URL.
    pub fn base_url(&self) -> Result<Option<Url>> {
        self.api
            .base_url
            .as_deref()
            .map(|raw| {
                let with_slash = if raw.ends_with('/') {
                    String::from(raw)
                } else {
                    format!("{raw}/")
                };
                Url::parse(&with_slash).with_context(|| format!("invalid api.base_url: {raw}"))
            })
            .transpose()
    }

    /// The refresh URL override.
    ///
    /// # Errors
    ///
    /// Returns an error if `auth.refresh_url` is not a valid URL.
    pub fn refresh_url(&self) -> Result<Option<Url>> {
        parse_url_setting("auth.refresh_url", self.auth.refresh_url.as_deref())
    }

    /// The login URL override.
    ///
    /// # Errors
    ///
    /// Returns an error if `auth.login_url` is not a valid URL.
    pub fn login_url(&self) -> Result<Option<Url>> {
        parse_url_setting("auth.login_url", self.auth.login_url.as_deref())
    }

    /// The RaiPlay app config URL override.
    ///
    /// # Errors
    ///
    /// Returns an error if `auth.config_url` is not a valid URL.
    pub fn config_url(&self) -> Result<Option<Url>> {
        parse_url_setting("auth.config_url", self.auth.config_url.as_deref())
    }

    /// Token file location for a config loaded from `config_path`.
    #[must_use]
    pub fn token_path(&self, config_path: &Path) -> PathBuf {
        self.auth.token_file.clone().unwrap_or_else(|| {
            config_path
                .parent()
                .map_or_else(|| PathBuf::from(TOKEN_FILE_NAME), |dir| dir.join(TOKEN_FILE_NAME))
        })
    }
}

fn parse_url_setting(key: &str, raw: Option<&str>) -> Result<Option<Url>> {
    raw.map(|raw| Url::parse(raw).with_context(|| format!("invalid {key}: {raw}")))
        .transpose()
}
