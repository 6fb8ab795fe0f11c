//! JWT refresh exchange against the Rai SSO endpoint.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use reqwest::header;
use serde::Deserialize;
use tracing::instrument;

use super::sso::{SsoClient, excerpt};
use super::tokens::TokenSet;

/// JSON form of the refresh response.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    authorization: Option<String>,
    #[serde(default, rename = "refreshToken")]
    refresh_token: Option<String>,
}

impl SsoClient {
    /// Exchanges the refresh token for a new JWT and returns the updated set.
    ///
    /// # Errors
    ///
    /// Returns an error if `tokens` has no refresh token, the SSO settings
    /// cannot be resolved, the request fails, the server answers with a
    /// non-success status, or the body carries no new JWT.
    #[instrument(skip_all)]
    pub async fn refresh(&self, tokens: &TokenSet, now: DateTime<Utc>) -> Result<TokenSet> {
        let refresh_token = tokens.refresh().context("no refresh token available")?;
        let settings = self.settings().await?;
        tracing::debug!(url = %settings.refresh_url, "refreshing access token");

        let mut request = self
            .http()
            .post(settings.refresh_url)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("refreshToken", refresh_token),
                ("domainApiKey", settings.domain_api_key.as_str()),
            ]);
        if let Some(jwt) = tokens.jwt() {
            request = request.bearer_auth(jwt);
        }

        let response = request
            .send()
            .await
            .context("token refresh request failed")?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read token refresh response")?;

        if !status.is_success() {
            bail!(
                "token refresh failed: HTTP {status}: {}",
                excerpt(&body)
            );
        }

        let mut refreshed = parse_refresh_body(tokens, &body)?;
        refreshed.last_refresh = Some(now.to_rfc3339());
        tracing::info!("access token refreshed");
        Ok(refreshed)
    }
}

/// Applies a refresh response body to `tokens`.
///
/// Accepts either a JSON object with `authorization` (and optionally
/// `refreshToken`) or the bare JWT as plain text.
///
/// # Errors
///
/// Returns an error when the body carries no usable token.
pub fn parse_refresh_body(tokens: &TokenSet, body: &str) -> Result<TokenSet> {
    let mut updated = tokens.clone();

    if let Ok(parsed) = serde_json::from_str::<RefreshResponse>(body) {
        let accepted = parsed.response.as_deref() == Some("OK");
        match parsed.authorization {
            Some(jwt) => updated.jwt_token = jwt,
            None if accepted => {}
            None => bail!("token refresh rejected: {}", excerpt(body)),
        }
        if let Some(refresh) = parsed.refresh_token.filter(|r| !r.is_empty()) {
            updated.refresh_token = Some(refresh);
        }
        return Ok(updated);
    }

    let candidate = body.trim();
    if candidate.starts_with("eyJ") && candidate.matches('.').count() == 2 {
        updated.jwt_token = String::from(candidate);
        return Ok(updated);
    }

    bail!("invalid token refresh response: {}", excerpt(body))
}
