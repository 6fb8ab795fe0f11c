//! Error taxonomy shared across the workspace.

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by date resolution, fetching and validation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `--data` value that is neither a keyword, an offset nor a valid date.
    #[error(
        "invalid date: {0} (expected oggi, domani, ieri, +N, -N, dd-mm-yyyy or dd/mm/yyyy)"
    )]
    InvalidDateToken(String),

    /// A `--dalle` / `--alle` value that is not `HH:MM`.
    #[error("invalid time: {0} (expected HH:MM)")]
    InvalidTimeToken(String),

    /// A time window given for today's "on air now" view, which has no use
    /// for one.
    #[error(
        "--dalle/--alle apply to a schedule: add --canale, --prima-serata, --cerca or a --data other than today"
    )]
    WindowWithoutSchedule,

    /// Network or remote error while fetching.
    #[error("failed to fetch {target}: {reason}")]
    FetchFailed {
        /// Channel or resource being fetched.
        target: String,
        /// Underlying cause.
        reason: String,
    },

    /// The remote rejected the request for lack of a valid token.
    #[error(
        "authentication required for {target}: refresh or recreate the token file and try again"
    )]
    AuthRequired {
        /// Channel or resource being fetched.
        target: String,
    },

    /// The response did not match the expected schedule schema.
    #[error("malformed schedule for {target}: {reason}")]
    MalformedSchedule {
        /// Channel or resource being fetched.
        target: String,
        /// What was wrong with the payload.
        reason: String,
    },
}

impl Error {
    /// Builds a [`Error::FetchFailed`] from any displayable cause.
    pub fn fetch_failed(target: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::FetchFailed {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Builds a [`Error::MalformedSchedule`] from any displayable cause.
    pub fn malformed(target: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedSchedule {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for errors the user fixes by correcting an argument.
    #[must_use]
    pub const fn is_user_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidDateToken(_) | Self::InvalidTimeToken(_) | Self::WindowWithoutSchedule
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date_message_lists_formats() {
        // Arrange
        let err = Error::InvalidDateToken(String::from("dopodomani"));

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("dopodomani"));
        assert!(msg.contains("dd-mm-yyyy"));
    }

    #[test]
    fn test_auth_required_mentions_token_file() {
        // Arrange & Act
        let msg = Error::AuthRequired {
            target: String::from("rai-1"),
        }
        .to_string();

        // Assert
        assert!(msg.contains("rai-1"));
        assert!(msg.contains("token file"));
    }

    #[test]
    fn test_is_user_input() {
        // Arrange & Act & Assert
        assert!(Error::InvalidTimeToken(String::from("25:00")).is_user_input());
        assert!(Error::WindowWithoutSchedule.is_user_input());
        assert!(!Error::fetch_failed("rai-1", "HTTP 500").is_user_input());
        assert!(!Error::malformed("rai-1", "bad hour").is_user_input());
    }
}
