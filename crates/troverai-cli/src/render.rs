//! Terminal and JSON rendering of schedules.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeDelta, Utc};
use crossterm::style::Stylize;
use serde::Serialize;
use troverai_api::auth::TokenStatus;
use troverai_core::{ChannelInfo, ScheduleEntry};

/// Description length in the single-channel schedule.
const SCHEDULE_DESCRIPTION_CHARS: usize = 100;
/// Description length in the "on air now" view.
const NOW_DESCRIPTION_CHARS: usize = 120;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable, optionally colored.
    Text,
    /// One line per program, never colored.
    Compact,
    /// Pretty-printed JSON.
    Json,
}

/// Writes schedules in the selected [`OutputMode`].
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    mode: OutputMode,
    color: bool,
}

impl Renderer {
    /// Creates a renderer. Color only applies to [`OutputMode::Text`].
    #[must_use]
    pub const fn new(mode: OutputMode, color: bool) -> Self {
        Self {
            mode,
            color: color && matches!(mode, OutputMode::Text),
        }
    }

    /// Creates a renderer with color enabled unless `NO_COLOR` is set.
    #[must_use]
    pub fn from_env(mode: OutputMode) -> Self {
        Self::new(mode, std::env::var_os("NO_COLOR").is_none())
    }

    /// Whether output is JSON.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.mode, OutputMode::Json)
    }

    /// Whether output is compact.
    #[must_use]
    pub const fn is_compact(&self) -> bool {
        matches!(self.mode, OutputMode::Compact)
    }

    fn cyan_bold(&self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            String::from(text)
        }
    }

    fn yellow_bold(&self, text: &str) -> String {
        if self.color {
            text.yellow().bold().to_string()
        } else {
            String::from(text)
        }
    }

    fn green_bold(&self, text: &str) -> String {
        if self.color {
            text.green().bold().to_string()
        } else {
            String::from(text)
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            text.bold().to_string()
        } else {
            String::from(text)
        }
    }

    fn italic(&self, text: &str) -> String {
        if self.color {
            text.italic().to_string()
        } else {
            String::from(text)
        }
    }

    /// Writes a `=== title ===` heading followed by a blank line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn heading(&self, out: &mut impl Write, title: &str) -> Result<()> {
        writeln!(out, "{}\n", self.cyan_bold(&format!("=== {title} ===")))?;
        Ok(())
    }

    /// Writes a plain informational line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn message(&self, out: &mut impl Write, text: &str) -> Result<()> {
        writeln!(out, "{text}")?;
        Ok(())
    }

    /// Writes `value` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn json<T: Serialize + ?Sized>(&self, out: &mut impl Write, value: &T) -> Result<()> {
        let text = serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
        writeln!(out, "{text}")?;
        Ok(())
    }

    /// Writes one line of a channel's schedule, highlighting the airing entry.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn schedule_entry(
        &self,
        out: &mut impl Write,
        entry: &ScheduleEntry,
        airing: bool,
    ) -> Result<()> {
        let time = entry.start.format("%H:%M");

        if self.is_compact() {
            let marker = if airing { ">" } else { " " };
            writeln!(out, "{marker} {time} {}", entry.title)?;
            return Ok(());
        }

        let (marker, title) = if airing {
            (self.green_bold(">>>"), self.bold(&entry.title))
        } else {
            (String::from("   "), entry.title.clone())
        };
        writeln!(out, "{marker} {time} - {title}{}", duration_suffix(entry))?;

        if airing && let Some(description) = entry.description.as_deref() {
            writeln!(
                out,
                "       {}",
                self.italic(&truncate(description, SCHEDULE_DESCRIPTION_CHARS))
            )?;
        }
        Ok(())
    }

    /// Writes the program currently on air on a channel.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn now_entry(
        &self,
        out: &mut impl Write,
        channel_name: &str,
        entry: &ScheduleEntry,
    ) -> Result<()> {
        if self.is_compact() {
            writeln!(out, "{channel_name}: {}", entry.title)?;
            return Ok(());
        }

        writeln!(out, "{}", self.yellow_bold(channel_name))?;
        writeln!(
            out,
            "  {} - {}{}",
            entry.start.format("%H:%M"),
            self.bold(&entry.title),
            duration_suffix(entry)
        )?;
        if let Some(description) = entry.description.as_deref() {
            writeln!(
                out,
                "  {}",
                self.italic(&truncate(description, NOW_DESCRIPTION_CHARS))
            )?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Writes a channel name followed by its programs.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn channel_block(
        &self,
        out: &mut impl Write,
        channel_name: &str,
        entries: &[ScheduleEntry],
    ) -> Result<()> {
        writeln!(out, "{}", self.yellow_bold(channel_name))?;
        for entry in entries {
            let time = entry.start.format("%H:%M");
            if self.is_compact() {
                writeln!(out, "  {time} {}", entry.title)?;
            } else {
                writeln!(out, "  {time} - {}{}", entry.title, duration_suffix(entry))?;
            }
        }
        writeln!(out)?;
        Ok(())
    }

    /// Writes a title search hit.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn search_hit(
        &self,
        out: &mut impl Write,
        channel_name: &str,
        entry: &ScheduleEntry,
    ) -> Result<()> {
        writeln!(
            out,
            "{} - {}",
            self.yellow_bold(channel_name),
            entry.start.format("%H:%M")
        )?;
        writeln!(out, "  {}{}\n", self.bold(&entry.title), duration_suffix(entry))?;
        Ok(())
    }

    /// Writes the token file summary; expiry is shown in local time.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn token_status(
        &self,
        out: &mut impl Write,
        status: &TokenStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !status.logged_in {
            writeln!(out, "Nessun token salvato. Usa --accedi per autenticarti.")?;
            writeln!(out, "File token:     {}", status.token_file.display())?;
            return Ok(());
        }

        if let Some(user) = status.user.as_deref() {
            writeln!(out, "Utente:         {}", self.bold(user))?;
        }
        if let Some(email) = status.email.as_deref() {
            writeln!(out, "Email:          {email}")?;
        }
        match status.expires_at {
            Some(expires_at) => {
                let local = expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
                let note = if status.expired {
                    self.yellow_bold("SCADUTO")
                } else {
                    format!(
                        "{} rimanenti",
                        format_duration(expires_at.signed_duration_since(now))
                    )
                };
                writeln!(out, "Scadenza token: {local} ({note})")?;
            }
            None => writeln!(out, "Scadenza token: sconosciuta")?,
        }
        let refreshable = if status.refreshable { "si" } else { "no" };
        writeln!(out, "Rinnovabile:    {refreshable}")?;
        if let Some(last_refresh) = status.last_refresh.as_deref() {
            writeln!(out, "Ultimo rinnovo: {last_refresh}")?;
        }
        writeln!(out, "File token:     {}", status.token_file.display())?;
        Ok(())
    }

    /// Writes the channel listing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn channel_list(&self, out: &mut impl Write, channels: &[ChannelInfo]) -> Result<()> {
        for channel in channels {
            writeln!(out, "  {:20} (--canale {})", channel.label, channel.path)?;
        }
        Ok(())
    }
}

fn duration_suffix(entry: &ScheduleEntry) -> String {
    entry
        .duration()
        .map_or_else(String::new, |d| format!(" ({})", format_duration(d)))
}

/// Formats a program length as `1h05m` or `45m`.
#[must_use]
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_minutes().max(0);
    let (hours, minutes) = (total.div_euclid(60), total.rem_euclid(60));
    if hours > 0 {
        format!("{hours}h{minutes:02}m")
    } else {
        format!("{minutes}m")
    }
}

/// Shortens `text` to at most `max_chars` characters, ending in `...` when cut.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return String::from(text);
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}
