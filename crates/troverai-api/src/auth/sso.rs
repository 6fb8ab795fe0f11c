//! `SsoClient` - Rai SSO client shared by login and token refresh.

use anyhow::{Context, Result, bail};
use reqwest::{Client, header};
use tracing::instrument;
use url::Url;

use super::discovery::{DEFAULT_CONFIG_URL, RemoteConfig};

/// Default Rai SSO refresh endpoint.
pub const DEFAULT_REFRESH_URL: &str = "https://www.rai.it/raisso/user/token/refresh";

/// Default RaiPlay login endpoint.
pub const DEFAULT_LOGIN_URL: &str = "https://www.raiplay.it/raisso/login/domain/app/social";

/// Longest slice of a rejected response quoted in errors.
const BODY_EXCERPT_CHARS: usize = 100;

/// Key and endpoints used for one SSO exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoSettings {
    /// `domainApiKey` form field.
    pub domain_api_key: String,
    /// Token refresh endpoint.
    pub refresh_url: Url,
    /// Login endpoint.
    pub login_url: Url,
}

/// Rai SSO client.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SsoClient {
    /// HTTP client (reqwest).
    http_client: Client,
    /// Configured domain API key; looked up in the app config when unset.
    domain_api_key: Option<String>,
    /// Configured refresh endpoint.
    refresh_url: Option<Url>,
    /// Configured login endpoint.
    login_url: Option<Url>,
    /// RaiPlay app config location.
    config_url: Url,
}

/// Builder for `SsoClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SsoClientBuilder {
    user_agent: Option<String>,
    domain_api_key: Option<String>,
    refresh_url: Option<Url>,
    login_url: Option<Url>,
    config_url: Option<Url>,
}

impl SsoClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            user_agent: None,
            domain_api_key: None,
            refresh_url: None,
            login_url: None,
            config_url: None,
        }
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the domain API key; blank keys count as unset.
    #[must_use]
    pub fn domain_api_key(mut self, key: Option<String>) -> Self {
        self.domain_api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    /// Overrides the refresh endpoint.
    #[must_use]
    pub fn refresh_url(mut self, url: Option<Url>) -> Self {
        self.refresh_url = url;
        self
    }

    /// Overrides the login endpoint.
    #[must_use]
    pub fn login_url(mut self, url: Option<Url>) -> Self {
        self.login_url = url;
        self
    }

    /// Overrides the app config location (for wiremock in tests).
    #[must_use]
    pub fn config_url(mut self, url: Url) -> Self {
        self.config_url = Some(url);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<SsoClient> {
        let user_agent = self.user_agent.context("user_agent is required")?;

        let config_url = if let Some(url) = self.config_url {
            url
        } else {
            Url::parse(DEFAULT_CONFIG_URL).context("invalid default config URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .build()
            .context("failed to build HTTP client")?;

        Ok(SsoClient {
            http_client,
            domain_api_key: self.domain_api_key,
            refresh_url: self.refresh_url,
            login_url: self.login_url,
            config_url,
        })
    }
}

impl SsoClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> SsoClientBuilder {
        SsoClientBuilder::new()
    }

    pub(super) const fn http(&self) -> &Client {
        &self.http_client
    }

    /// Resolves the domain API key and endpoints.
    ///
    /// The app config is fetched only when no domain API key is configured.
    /// Its refresh endpoint is then used unless one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the app config is needed but cannot be fetched or
    /// holds no domain API key.
    #[instrument(skip_all)]
    pub async fn settings(&self) -> Result<SsoSettings> {
        let login_url = match &self.login_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_LOGIN_URL).context("invalid default login URL")?,
        };

        if let Some(key) = &self.domain_api_key {
            let refresh_url = match &self.refresh_url {
                Some(url) => url.clone(),
                None => Url::parse(DEFAULT_REFRESH_URL).context("invalid default refresh URL")?,
            };
            return Ok(SsoSettings {
                domain_api_key: key.clone(),
                refresh_url,
                login_url,
            });
        }

        let remote = self.fetch_remote_config().await?;
        let domain_api_key = remote
            .domain_api_key()
            .map(String::from)
            .context("raiPlayDomainApiKey not found in RaiPlay config")?;
        let refresh_url = match &self.refresh_url {
            Some(url) => url.clone(),
            None => remote.refresh_url()?,
        };
        tracing::debug!(%refresh_url, "SSO settings read from RaiPlay config");

        Ok(SsoSettings {
            domain_api_key,
            refresh_url,
            login_url,
        })
    }

    /// Downloads the RaiPlay app config.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not a success,
    /// or the body is not a JSON object.
    #[instrument(skip_all, fields(url = %self.config_url))]
    pub async fn fetch_remote_config(&self) -> Result<RemoteConfig> {
        let response = self
            .http_client
            .get(self.config_url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .context("RaiPlay config request failed")?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read RaiPlay config")?;

        if !status.is_success() {
            bail!("failed to fetch RaiPlay config: HTTP {status}");
        }
        RemoteConfig::parse(&body)
    }
}

/// Leading part of a response body, for error messages.
pub(super) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
