//! Domain API key and SSO endpoint lookup in the RaiPlay app config.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use url::Url;

/// Published RaiPlay app configuration.
pub const DEFAULT_CONFIG_URL: &str =
    "https://www.raiplay.it/mobile/prod/config/RaiPlay_Config.json";

/// Known locations of the domain API key, newest layout first.
const DOMAIN_API_KEY_POINTERS: [&str; 3] = [
    "/userServices/raiPlayServicesNew/raiPlayDomainApiKey",
    "/userServices/raiPlayServices/raiPlayDomainApiKey",
    "/gigya/raiPlayDomainApiKey",
];

const SSO_BASE_URL_POINTER: &str = "/userServices/raiSsoServicesNew/raiSsoBaseUrl";
const SSO_REFRESH_PATH_POINTER: &str = "/userServices/raiSsoServicesNew/raiSsoRefreshToken";

const DEFAULT_SSO_BASE_URL: &str = "https://www.rai.it";
const DEFAULT_REFRESH_PATH: &str = "/raisso/user/token/refresh";

/// The RaiPlay app config, kept as loosely typed JSON.
///
/// Only a few keys are read and their location has moved between app
/// releases, so lookups go through JSON pointers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    raw: Value,
}

impl RemoteConfig {
    /// Parses the config document.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` is not a JSON object.
    pub fn parse(body: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(body).context("invalid RaiPlay config JSON")?;
        if !raw.is_object() {
            bail!("RaiPlay config is not a JSON object");
        }
        Ok(Self { raw })
    }

    /// The domain API key, from the first known location that holds one.
    #[must_use]
    pub fn domain_api_key(&self) -> Option<&str> {
        DOMAIN_API_KEY_POINTERS
            .iter()
            .find_map(|pointer| self.str_at(pointer))
    }

    /// The SSO token refresh endpoint (`raiSsoBaseUrl` + `raiSsoRefreshToken`).
    ///
    /// Missing parts fall back to `https://www.rai.it` and
    /// `/raisso/user/token/refresh`.
    ///
    /// # Errors
    ///
    /// Returns an error if the combined URL is invalid.
    pub fn refresh_url(&self) -> Result<Url> {
        let base = self
            .str_at(SSO_BASE_URL_POINTER)
            .unwrap_or(DEFAULT_SSO_BASE_URL);
        let path = self
            .str_at(SSO_REFRESH_PATH_POINTER)
            .unwrap_or(DEFAULT_REFRESH_PATH);
        let joined = format!("{}{path}", base.trim_end_matches('/'));
        Url::parse(&joined).with_context(|| format!("invalid refresh URL in RaiPlay config: {joined}"))
    }

    fn str_at(&self, pointer: &str) -> Option<&str> {
        self.raw
            .pointer(pointer)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
