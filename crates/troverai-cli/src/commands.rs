//! Handlers for the schedule views.
//!
//! Every handler takes the API client, the already-resolved options and the
//! output sink, so the current instant is read once by the caller.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::instrument;
use troverai_api::raiplay::{LocalRaiPlayApi, fetch_days, normalize_channel};
use troverai_core::{DateSpec, ProgramFilter, ScheduleEntry, TimeWindow, filter_by_time};

use crate::render::Renderer;

/// Options shared by every view.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Day to show.
    pub date: DateSpec,
    /// `--dalle` / `--alle` window.
    pub window: Option<TimeWindow>,
    /// `--tipo` filter.
    pub typology: Option<String>,
    /// `--genere` filter.
    pub genre: Option<String>,
    /// Local reference instant.
    pub now: NaiveDateTime,
}

impl ViewOptions {
    fn is_today(&self) -> bool {
        self.date.date() == self.now.date()
    }

    fn program_filter(&self, title_query: Option<&str>) -> ProgramFilter {
        ProgramFilter::new(
            title_query,
            self.typology.as_deref(),
            self.genre.as_deref(),
        )
    }

    /// Entries on air at `now` that pass the program filter.
    fn airing(&self, entries: &[ScheduleEntry]) -> Vec<ScheduleEntry> {
        let airing = filter_by_time(entries, None, true, self.now);
        self.program_filter(None).apply(&airing)
    }

    /// Entries of one day narrowed by `window` and the program filter.
    fn select(
        &self,
        entries: &[ScheduleEntry],
        window: Option<&TimeWindow>,
        title_query: Option<&str>,
    ) -> Vec<ScheduleEntry> {
        let timed = filter_by_time(entries, window, false, self.now);
        self.program_filter(title_query).apply(&timed)
    }
}

fn normalize_all(channels: &[String]) -> Vec<String> {
    channels.iter().map(|c| normalize_channel(c)).collect()
}

/// Narrows the "now" channel set to the ones matching `wanted`.
///
/// A channel outside the set is used on its own.
fn restrict_channels(channels: &[String], wanted: &str) -> Vec<String> {
    let wanted = normalize_channel(wanted);
    let matching: Vec<String> = channels
        .iter()
        .filter(|c| c.contains(wanted.as_str()))
        .cloned()
        .collect();
    if matching.is_empty() {
        vec![wanted]
    } else {
        matching
    }
}

/// Programs on air now from the previous day's after-midnight tail.
///
/// A failure only drops the fallback; today's result stays empty.
async fn previous_day_airing(
    api: &(impl LocalRaiPlayApi + Sync),
    channel: &str,
    opts: &ViewOptions,
) -> Vec<ScheduleEntry> {
    let Some(previous) = opts.date.date().pred_opt().map(DateSpec::new) else {
        return Vec::new();
    };
    match api.fetch_day(channel, previous).await {
        Ok(day) => opts.airing(&day.entries),
        Err(err) => {
            tracing::debug!(channel, error = %err, "previous day unavailable");
            Vec::new()
        }
    }
}

/// Shows what is on air now, or every channel's schedule for another day.
///
/// Before a channel's first program of the day, the program on air belongs
/// to the previous day's schedule, which is fetched as a fallback.
///
/// # Errors
///
/// Returns an error if every channel fails to load or writing fails.
#[instrument(skip_all, fields(date = %opts.date))]
pub async fn run_now(
    api: &(impl LocalRaiPlayApi + Sync),
    channels: &[String],
    channel_filter: Option<&str>,
    opts: &ViewOptions,
    renderer: &Renderer,
    out: &mut impl Write,
) -> Result<()> {
    let mut channels = normalize_all(channels);
    if let Some(wanted) = channel_filter {
        channels = restrict_channels(&channels, wanted);
    }
    let today = opts.is_today();

    let days = fetch_days(api, &channels, opts.date).await?;

    if !renderer.is_json() {
        let title = if today {
            format!("Ora in onda - {}", opts.now.format("%H:%M"))
        } else {
            format!("Palinsesto - {}", opts.date)
        };
        renderer.heading(out, &title)?;
    }

    let mut collected = Vec::new();
    for day in &days {
        let entries = if today {
            let airing = opts.airing(&day.entries);
            if airing.is_empty() {
                previous_day_airing(api, &day.channel_id, opts).await
            } else {
                airing
            }
        } else {
            opts.select(&day.entries, opts.window.as_ref(), None)
        };
        tracing::debug!(channel = %day.channel_id, entries = entries.len(), "channel filtered");

        if renderer.is_json() {
            collected.extend(entries);
        } else if today {
            for entry in &entries {
                renderer.now_entry(out, &day.channel_name, entry)?;
            }
        } else {
            renderer.channel_block(out, &day.channel_name, &entries)?;
        }
    }

    if renderer.is_json() {
        renderer.json(out, &collected)?;
    }
    Ok(())
}

/// Shows one channel's schedule.
///
/// # Errors
///
/// Returns an error if the schedule cannot be loaded or writing fails.
#[instrument(skip_all, fields(channel = %channel, date = %opts.date))]
pub async fn run_schedule(
    api: &(impl LocalRaiPlayApi + Sync),
    channel: &str,
    opts: &ViewOptions,
    renderer: &Renderer,
    out: &mut impl Write,
) -> Result<()> {
    let channel = normalize_channel(channel);
    let day = api.fetch_day(&channel, opts.date).await?;
    let entries = opts.select(&day.entries, opts.window.as_ref(), None);

    if renderer.is_json() {
        return renderer.json(out, &entries);
    }

    renderer.heading(out, &format!("{} - {}", day.channel_name, opts.date))?;
    if entries.is_empty() {
        return renderer.message(out, "No programs found for the specified time range.");
    }

    let today = opts.is_today();
    for entry in &entries {
        renderer.schedule_entry(out, entry, today && entry.is_airing_at(opts.now))?;
    }
    Ok(())
}

/// Lists the channels known to RaiPlay.
///
/// # Errors
///
/// Returns an error if the listing cannot be loaded or writing fails.
#[instrument(skip_all)]
pub async fn run_channels(
    api: &(impl LocalRaiPlayApi + Sync),
    renderer: &Renderer,
    out: &mut impl Write,
) -> Result<()> {
    let channels = api.list_channels().await?;

    if renderer.is_json() {
        return renderer.json(out, &channels);
    }

    renderer.heading(out, "Canali disponibili")?;
    renderer.channel_list(out, &channels)
}

/// Shows prime time (20:00 to 23:00) on the prime-time channel set.
///
/// # Errors
///
/// Returns an error if every channel fails to load or writing fails.
#[instrument(skip_all, fields(date = %opts.date))]
pub async fn run_prime_time(
    api: &(impl LocalRaiPlayApi + Sync),
    channels: &[String],
    opts: &ViewOptions,
    renderer: &Renderer,
    out: &mut impl Write,
) -> Result<()> {
    let days = fetch_days(api, &normalize_all(channels), opts.date).await?;
    let window = TimeWindow::prime_time();

    if !renderer.is_json() {
        renderer.heading(out, &format!("Prima Serata - {}", opts.date))?;
    }

    let mut collected = Vec::new();
    for day in &days {
        let entries = opts.select(&day.entries, Some(&window), None);
        if renderer.is_json() {
            collected.extend(entries);
        } else {
            renderer.channel_block(out, &day.channel_name, &entries)?;
        }
    }

    if renderer.is_json() {
        renderer.json(out, &collected)?;
    }
    Ok(())
}

/// Searches program titles over the search channel set.
///
/// # Errors
///
/// Returns an error if every channel fails to load or writing fails.
#[instrument(skip_all, fields(query = %query, date = %opts.date))]
pub async fn run_search(
    api: &(impl LocalRaiPlayApi + Sync),
    channels: &[String],
    query: &str,
    opts: &ViewOptions,
    renderer: &Renderer,
    out: &mut impl Write,
) -> Result<()> {
    let days = fetch_days(api, &normalize_all(channels), opts.date).await?;

    if !renderer.is_json() {
        renderer.heading(out, &format!("Ricerca: '{query}' - {}", opts.date))?;
    }

    let mut collected = Vec::new();
    for day in &days {
        let hits = opts.select(&day.entries, opts.window.as_ref(), Some(query));
        if !renderer.is_json() {
            for entry in &hits {
                renderer.search_hit(out, &day.channel_name, entry)?;
            }
        }
        collected.extend(hits);
    }

    tracing::info!(hits = collected.len(), "search completed");
    if renderer.is_json() {
        renderer.json(out, &collected)
    } else if collected.is_empty() {
        renderer.message(out, &format!("Nessun programma trovato con '{query}'"))
    } else {
        Ok(())
    }
}
