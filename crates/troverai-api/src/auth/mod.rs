//! Optional RaiPlay authentication.
//!
//! Public schedules need no token. When a token file exists its JWT is sent
//! as a bearer token, refreshed first if it is about to expire. A token file
//! is created by logging in with account credentials.

mod discovery;
mod jwt;
mod login;
mod refresh;
mod sso;
mod status;
mod tokens;

use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::instrument;

pub use discovery::{DEFAULT_CONFIG_URL, RemoteConfig};
pub use jwt::{decode_payload, expiry, is_expired};
pub use login::{Credentials, PASSWORD_ENV, USERNAME_ENV, parse_login_body};
pub use refresh::parse_refresh_body;
pub use sso::{DEFAULT_LOGIN_URL, DEFAULT_REFRESH_URL, SsoClient, SsoClientBuilder, SsoSettings};
pub use status::{TokenStatus, token_status};
pub use tokens::{TOKEN_FILE_NAME, TokenSet, TokenStore};

/// Margin before `exp` at which a JWT is already refreshed.
pub const REFRESH_BUFFER: TimeDelta = TimeDelta::minutes(5);

/// Returns the JWT to send, refreshing and saving it when expired.
///
/// - No token file, or a file without a JWT: `None` (anonymous access).
/// - A JWT that is still valid: that JWT.
/// - An expired JWT: refreshed through `sso` and written back. When the
///   refresh fails, a warning is logged and `None` is returned.
///
/// # Errors
///
/// Returns an error if the token file exists but cannot be read or parsed,
/// or if a refreshed token cannot be saved.
#[instrument(skip_all, fields(path = %store.path().display()))]
pub async fn resolve_access_token(
    store: &TokenStore,
    sso: &SsoClient,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    let Some(tokens) = store.load()? else {
        return Ok(None);
    };
    let Some(jwt) = tokens.jwt() else {
        tracing::warn!("token file has no jwt_token, continuing without authentication");
        return Ok(None);
    };

    if !is_expired(jwt, now, REFRESH_BUFFER) {
        tracing::debug!(expires = ?expiry(jwt), "using stored access token");
        return Ok(Some(String::from(jwt)));
    }

    match sso.refresh(&tokens, now).await {
        Ok(refreshed) => {
            store.save(&refreshed)?;
            Ok(refreshed.jwt().map(String::from))
        }
        Err(err) => {
            tracing::warn!(error = %err, "token refresh failed, continuing without authentication");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use url::Url;

    use super::jwt::tests::make_jwt;
    use super::*;

    const NOW_TS: i64 = 1_768_600_000;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(NOW_TS, 0).unwrap()
    }

    fn write_tokens(dir: &tempfile::TempDir, tokens: &TokenSet) -> TokenStore {
        let store = TokenStore::new(dir.path().join(TOKEN_FILE_NAME));
        store.save(tokens).unwrap();
        store
    }

    fn sso(refresh_url: Option<Url>) -> SsoClient {
        SsoClient::builder()
            .user_agent("test/0.0.0")
            .domain_api_key(Some(String::from("key-1")))
            .refresh_url(refresh_url)
            .build()
            .unwrap()
    }

    fn token_set(exp: i64) -> TokenSet {
        TokenSet {
            jwt_token: make_jwt(&serde_json::json!({ "exp": exp })),
            refresh_token: Some(String::from("refresh-1")),
            ..TokenSet::default()
        }
    }

    #[tokio::test]
    async fn test_no_token_file_is_anonymous() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(TOKEN_FILE_NAME));

        // Act
        let token = resolve_access_token(&store, &sso(None), now()).await.unwrap();

        // Assert
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn test_valid_token_is_used() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let tokens = token_set(NOW_TS + 3600);
        let store = write_tokens(&dir, &tokens);

        // Act
        let token = resolve_access_token(&store, &sso(None), now()).await.unwrap();

        // Assert
        assert_eq!(token.as_deref(), Some(tokens.jwt_token.as_str()));
    }

    #[tokio::test]
    async fn test_expired_without_refresh_token_is_anonymous() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = write_tokens(
            &dir,
            &TokenSet {
                refresh_token: None,
                ..token_set(NOW_TS + 60)
            },
        );

        // Act
        let token = resolve_access_token(&store, &sso(None), now()).await.unwrap();

        // Assert
        assert!(token.is_none());
    }

    #[tokio::test]
    async fn test_expired_with_unreachable_config_is_anonymous() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let original = token_set(NOW_TS - 10);
        let store = write_tokens(&dir, &original);
        let sso = SsoClient::builder()
            .user_agent("test/0.0.0")
            .config_url(mock_server.uri().parse().unwrap())
            .build()
            .unwrap();

        // Act
        let token = resolve_access_token(&store, &sso, now()).await.unwrap();

        // Assert
        assert!(token.is_none());
        assert_eq!(store.load().unwrap().unwrap(), original);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_saved() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;
        let new_jwt = make_jwt(&serde_json::json!({ "exp": NOW_TS + 7200 }));

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(new_jwt.clone()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = write_tokens(&dir, &token_set(NOW_TS - 10));
        let url: Url = mock_server.uri().parse().unwrap();
        let sso = sso(Some(url));

        // Act
        let token = resolve_access_token(&store, &sso, now())
            .await
            .unwrap();

        // Assert
        assert_eq!(token.as_deref(), Some(new_jwt.as_str()));
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.jwt_token, new_jwt);
        assert!(saved.last_refresh.is_some());
    }

    #[tokio::test]
    async fn test_refresh_failure_is_anonymous() {
        // Arrange
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let original = token_set(NOW_TS - 10);
        let store = write_tokens(&dir, &original);
        let url: Url = mock_server.uri().parse().unwrap();
        let sso = sso(Some(url));

        // Act
        let token = resolve_access_token(&store, &sso, now())
            .await
            .unwrap();

        // Assert
        assert!(token.is_none());
        assert_eq!(store.load().unwrap().unwrap(), original);
    }

    #[tokio::test]
    async fn test_corrupt_token_file_is_error() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE_NAME);
        std::fs::write(&path, "[").unwrap();

        // Act
        let result = resolve_access_token(&TokenStore::new(path), &sso(None), now()).await;

        // Assert
        assert!(result.is_err());
    }
}
