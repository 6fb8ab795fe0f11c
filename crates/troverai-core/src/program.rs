//! Program filtering by title, typology and genre.

use crate::entry::ScheduleEntry;

/// Title / typology / genre criteria, combined with logical AND.
///
/// Matching is case-insensitive. The title is a substring match; typology
/// and genre must match exactly. A criterion that is `None` accepts
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramFilter {
    title_query: Option<String>,
    typology: Option<String>,
    genre: Option<String>,
}

impl ProgramFilter {
    /// Creates a filter from optional criteria. Blank criteria are ignored.
    #[must_use]
    pub fn new(title_query: Option<&str>, typology: Option<&str>, genre: Option<&str>) -> Self {
        Self {
            title_query: normalize(title_query),
            typology: normalize(typology),
            genre: normalize(genre),
        }
    }

    /// `true` when no criterion is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title_query.is_none() && self.typology.is_none() && self.genre.is_none()
    }

    /// Whether a single entry satisfies every criterion.
    #[must_use]
    pub fn matches(&self, entry: &ScheduleEntry) -> bool {
        let title_ok = self
            .title_query
            .as_deref()
            .is_none_or(|q| entry.title.to_lowercase().contains(q));
        title_ok
            && field_matches(self.typology.as_deref(), entry.typology.as_deref())
            && field_matches(self.genre.as_deref(), entry.genre.as_deref())
    }

    /// Keeps the matching entries, in input order.
    #[must_use]
    pub fn apply(&self, entries: &[ScheduleEntry]) -> Vec<ScheduleEntry> {
        if self.is_empty() {
            return entries.to_vec();
        }
        entries
            .iter()
            .filter(|entry| self.matches(entry))
            .cloned()
            .collect()
    }
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn field_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual.is_some_and(|a| a.trim().to_lowercase() == wanted),
    }
}
