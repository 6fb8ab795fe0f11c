//! Token file persistence.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default token file name.
pub const TOKEN_FILE_NAME: &str = "raiplay_tokens.json";

/// Contents of the token file.
///
/// Fields this tool does not know about are kept and written back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    /// Access JWT sent as bearer token.
    #[serde(default)]
    pub jwt_token: String,
    /// Token exchanged for a new JWT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Timestamp of the last successful refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<String>,
    /// Unknown fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenSet {
    /// The JWT, when not blank.
    #[must_use]
    pub fn jwt(&self) -> Option<&str> {
        Some(self.jwt_token.trim()).filter(|t| !t.is_empty())
    }

    /// A string field written by the login, such as `email`, when not blank.
    #[must_use]
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// The refresh token, when not blank.
    #[must_use]
    pub fn refresh(&self) -> Option<&str> {
        self.refresh_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Reads and writes a [`TokenSet`] at a fixed path.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Creates a store for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the token file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the token file. A missing file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<TokenSet>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no token file");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let tokens = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(Some(tokens))
    }

    /// Writes the token file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, tokens: &TokenSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content =
            serde_json::to_string_pretty(tokens).context("failed to serialize token file")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_load_missing_file() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join(TOKEN_FILE_NAME));

        // Act
        let tokens = store.load().unwrap();

        // Assert
        assert!(tokens.is_none());
    }

    #[test]
    fn test_save_and_load_preserves_unknown_fields() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(TOKEN_FILE_NAME);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            r#"{"jwt_token":"a.b.c","refresh_token":"r1","user":{"uid":"42"}}"#,
        )
        .unwrap();
        let store = TokenStore::new(&path);

        // Act
        let mut tokens = store.load().unwrap().unwrap();
        tokens.jwt_token = String::from("d.e.f");
        store.save(&tokens).unwrap();
        let reloaded = store.load().unwrap().unwrap();

        // Assert
        assert_eq!(reloaded.jwt(), Some("d.e.f"));
        assert_eq!(reloaded.refresh(), Some("r1"));
        assert_eq!(reloaded.extra["user"]["uid"], "42");
    }

    #[test]
    fn test_save_creates_parent_directory() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("a").join("b").join(TOKEN_FILE_NAME));

        // Act
        store.save(&TokenSet::default()).unwrap();

        // Assert
        assert!(store.path().exists());
    }

    #[test]
    fn test_load_corrupt_file_is_error() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE_NAME);
        std::fs::write(&path, "{not json").unwrap();

        // Act
        let result = TokenStore::new(&path).load();

        // Assert
        assert!(result.unwrap_err().to_string().contains("failed to parse"));
    }

    #[test]
    fn test_blank_tokens_are_absent() {
        // Arrange
        let tokens = TokenSet {
            jwt_token: String::from("  "),
            refresh_token: Some(String::new()),
            ..TokenSet::default()
        };

        // Act & Assert
        assert_eq!(tokens.jwt(), None);
        assert_eq!(tokens.refresh(), None);
    }

    #[test]
    fn test_extra_str() {
        // Arrange
        let tokens: TokenSet = serde_json::from_str(
            r#"{"jwt_token":"a.b.c","email":"utente@example.it","uid":42,"first_name":""}"#,
        )
        .unwrap();

        // Act & Assert
        assert_eq!(tokens.extra_str("email"), Some("utente@example.it"));
        assert_eq!(tokens.extra_str("uid"), None);
        assert_eq!(tokens.extra_str("first_name"), None);
        assert_eq!(tokens.extra_str("last_name"), None);
    }
}
