//! Date token resolution.
//!
//! Turns the user's `--data` value into a concrete calendar day relative to
//! a caller-supplied reference date.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::error::{Error, Result};

/// Day offset tokens such as `+1` or `-2`.
#[allow(clippy::expect_used)]
static OFFSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-])(\d+)$").expect("failed to compile offset regex"));

/// Explicit date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"];

/// A resolved calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateSpec(NaiveDate);

impl DateSpec {
    /// Wraps a calendar date.
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The underlying date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// Formats as the RaiPlay path segment, e.g. `16-01-2026`.
    #[must_use]
    pub fn to_path_segment(self) -> String {
        self.0.format("%d-%m-%Y").to_string()
    }
}

impl fmt::Display for DateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d-%m-%Y"))
    }
}

impl From<NaiveDate> for DateSpec {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// Resolves a date token against `reference`.
///
/// Accepted (case-insensitive):
/// - `oggi` / `today`, `domani` / `tomorrow`, `ieri` / `yesterday`
/// - `+N` / `-N` day offsets
/// - `dd-mm-yyyy`, `dd/mm/yyyy`, `yyyy-mm-dd`
///
/// # Errors
///
/// Returns [`Error::InvalidDateToken`] when the token matches none of the
/// forms above, names an impossible date, or the offset leaves the
/// supported calendar range.
pub fn resolve_date(token: &str, reference: NaiveDate) -> Result<DateSpec> {
    let normalized = token.trim().to_lowercase();
    let invalid = || Error::InvalidDateToken(String::from(token.trim()));

    let resolved = match normalized.as_str() {
        "oggi" | "today" => Some(reference),
        "domani" | "tomorrow" => reference.checked_add_days(Days::new(1)),
        "ieri" | "yesterday" => reference.checked_sub_days(Days::new(1)),
        other => {
            if let Some(caps) = OFFSET_RE.captures(other) {
                let days: u64 = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .ok_or_else(invalid)?;
                if caps.get(1).is_some_and(|m| m.as_str() == "-") {
                    reference.checked_sub_days(Days::new(days))
                } else {
                    reference.checked_add_days(Days::new(days))
                }
            } else {
                DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(other, fmt).ok())
            }
        }
    };

    let date = resolved.ok_or_else(invalid)?;
    tracing::debug!(token, %date, "resolved date token");
    Ok(DateSpec(date))
}
