//! JWT payload inspection (no signature verification).

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

/// Decodes the payload segment of a JWT.
///
/// Returns `None` when the token does not have three segments or the payload
/// is not base64url-encoded JSON.
#[must_use]
pub fn decode_payload(token: &str) -> Option<Value> {
    let mut segments = token.split('.');
    let (_, payload, _) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Reads the `exp` claim as a UTC instant.
#[must_use]
pub fn expiry(token: &str) -> Option<DateTime<Utc>> {
    let exp = decode_payload(token)?.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}

/// Whether the token expires within `buffer` of `now`.
///
/// Tokens without a readable `exp` are treated as valid.
#[must_use]
pub fn is_expired(token: &str, now: DateTime<Utc>, buffer: TimeDelta) -> bool {
    expiry(token).is_some_and(|exp| {
        exp.checked_sub_signed(buffer)
            .is_none_or(|deadline| now >= deadline)
    })
}
