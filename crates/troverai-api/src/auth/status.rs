//! Summary of the stored credentials.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::jwt::expiry;
use super::tokens::TokenStore;

/// State of the token file at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenStatus {
    /// Token file location.
    pub token_file: PathBuf,
    /// Whether the file holds a JWT.
    pub logged_in: bool,
    /// Account holder name, when the login stored one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Account e-mail, when the login stored one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// JWT expiry; `None` when the token carries no readable `exp`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the JWT is past its expiry.
    pub expired: bool,
    /// Whether a refresh token is stored.
    pub refreshable: bool,
    /// Timestamp of the last successful refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<String>,
}

/// Reads the token file and describes it as of `now`.
///
/// # Errors
///
/// Returns an error if the token file exists but cannot be read or parsed.
pub fn token_status(store: &TokenStore, now: DateTime<Utc>) -> Result<TokenStatus> {
    let mut status = TokenStatus {
        token_file: store.path().to_path_buf(),
        logged_in: false,
        user: None,
        email: None,
        expires_at: None,
        expired: false,
        refreshable: false,
        last_refresh: None,
    };
    let Some(tokens) = store.load()? else {
        return Ok(status);
    };

    let name: Vec<&str> = ["first_name", "last_name"]
        .into_iter()
        .filter_map(|key| tokens.extra_str(key))
        .collect();
    status.user = (!name.is_empty()).then(|| name.join(" "));
    status.email = tokens.extra_str("email").map(String::from);
    status.refreshable = tokens.refresh().is_some();
    status.last_refresh.clone_from(&tokens.last_refresh);

    if let Some(jwt) = tokens.jwt() {
        status.logged_in = true;
        status.expires_at = expiry(jwt);
        status.expired = status.expires_at.is_some_and(|exp| exp <= now);
    }
    Ok(status)
}
