//! Channel identifiers and user-input normalization.

/// Channels checked for "on air now".
pub const NOW_CHANNELS: &[&str] = &[
    "rai-1",
    "rai-2",
    "rai-3",
    "rai-4",
    "rai-5",
    "rai-movie",
    "rai-premium",
    "rai-gulp",
    "rai-yoyo",
    "rai-storia",
    "rai-scuola",
    "rai-news-24",
    "rai-sport",
];

/// Channels shown for prime time.
pub const PRIME_TIME_CHANNELS: &[&str] = &["rai-1", "rai-2", "rai-3"];

/// Channels scanned by title search.
pub const SEARCH_CHANNELS: &[&str] = &[
    "rai-1",
    "rai-2",
    "rai-3",
    "rai-4",
    "rai-5",
    "rai-movie",
    "rai-premium",
    "rai-storia",
];

/// Compact spellings mapped to API identifiers.
const ALIASES: &[(&str, &str)] = &[
    ("rai1", "rai-1"),
    ("rai2", "rai-2"),
    ("rai3", "rai-3"),
    ("rai4", "rai-4"),
    ("rai5", "rai-5"),
    ("raimovie", "rai-movie"),
    ("raipremium", "rai-premium"),
    ("raigulp", "rai-gulp"),
    ("raiyoyo", "rai-yoyo"),
    ("raistoria", "rai-storia"),
    ("raiscuola", "rai-scuola"),
    ("rainews24", "rai-news-24"),
    ("rainews", "rai-news-24"),
    ("raisport", "rai-sport"),
];

/// Normalizes a user-typed channel name to the API identifier.
///
/// `Rai 1`, `rai1` and `RAI-1` all become `rai-1`. Unknown names are
/// lowercased, spaces become dashes, and a `rai-` prefix is added if missing.
#[must_use]
pub fn normalize_channel(name: &str) -> String {
    let compact: String = name
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect();

    if let Some((_, id)) = ALIASES.iter().find(|(alias, _)| *alias == compact) {
        return String::from(*id);
    }

    let dashed = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    if dashed.starts_with("rai-") {
        dashed
    } else {
        format!("rai-{dashed}")
    }
}
