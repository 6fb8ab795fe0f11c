//! Username/password login against the RaiPlay SSO endpoint.

use std::fmt;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use reqwest::header;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::instrument;

use super::sso::{SsoClient, excerpt};
use super::tokens::TokenSet;

/// Environment variable holding the account e-mail.
pub const USERNAME_ENV: &str = "RAIPLAY_USERNAME";
/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "RAIPLAY_PASSWORD";

/// JSON form of the login response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    authorization: Option<String>,
    #[serde(default, rename = "refreshToken")]
    refresh_token: Option<String>,
    #[serde(default)]
    ua: Option<Value>,
    #[serde(default)]
    raisso: Option<LoginProfile>,
}

/// Account details returned with a successful login.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginProfile {
    #[serde(default)]
    uid: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
}

/// RaiPlay account credentials.
#[derive(Clone)]
pub struct Credentials {
    /// Account e-mail.
    pub email: String,
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Reads [`USERNAME_ENV`] and [`PASSWORD_ENV`] through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is missing or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        match (read(USERNAME_ENV), read(PASSWORD_ENV)) {
            (Some(email), Some(password)) => Ok(Self::new(email.trim(), password)),
            _ => bail!("{USERNAME_ENV} and {PASSWORD_ENV} must be set to log in"),
        }
    }
}

impl SsoClient {
    /// Logs in and returns a fresh token set.
    ///
    /// # Errors
    ///
    /// Returns an error if the SSO settings cannot be resolved, the request
    /// fails, the server answers with a non-success status, or the login is
    /// rejected.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials, now: DateTime<Utc>) -> Result<TokenSet> {
        let settings = self.settings().await?;

        let response = self
            .http()
            .post(settings.login_url)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
                ("domainApiKey", settings.domain_api_key.as_str()),
            ])
            .send()
            .await
            .context("login request failed")?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read login response")?;

        if !status.is_success() {
            bail!("login failed: HTTP {status}: {}", excerpt(&body));
        }

        let tokens = parse_login_body(&body, now)?;
        tracing::info!("logged in");
        Ok(tokens)
    }
}

/// Builds a token set from a login response body.
///
/// Account details are stored as `uid`, `email`, `first_name`, `last_name`
/// and `ua`, next to `login_time`.
///
/// # Errors
///
/// Returns an error when the body is not JSON, the login was not accepted,
/// or no JWT was returned.
pub fn parse_login_body(body: &str, now: DateTime<Utc>) -> Result<TokenSet> {
    let parsed: LoginResponse = serde_json::from_str(body)
        .with_context(|| format!("invalid login response: {}", excerpt(body)))?;
    if parsed.response.as_deref() != Some("OK") {
        bail!("login rejected: {}", excerpt(body));
    }
    let jwt_token = parsed
        .authorization
        .filter(|t| !t.trim().is_empty())
        .context("login response has no authorization token")?;

    let profile = parsed.raisso.unwrap_or_default();
    let mut extra = Map::new();
    for (key, value) in [
        ("uid", profile.uid),
        ("email", profile.email),
        ("first_name", profile.first_name),
        ("last_name", profile.last_name),
    ] {
        if let Some(value) = value {
            extra.insert(String::from(key), Value::String(value));
        }
    }
    if let Some(ua) = parsed.ua {
        extra.insert(String::from("ua"), ua);
    }
    extra.insert(String::from("login_time"), Value::String(now.to_rfc3339()));

    Ok(TokenSet {
        jwt_token,
        refresh_token: parsed.refresh_token,
        last_refresh: None,
        extra,
    })
}
