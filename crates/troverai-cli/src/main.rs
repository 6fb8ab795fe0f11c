//! troverai - TV schedule viewer for RaiPlay.

/// Login and token status views.
mod account;
/// Schedule view handlers.
mod commands;
/// Application configuration (TOML).
mod config;
/// Terminal and JSON output.
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use clap::error::ErrorKind;
use clap::{ArgGroup, CommandFactory, Parser};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;
use troverai_api::auth::{Credentials, SsoClient, TokenStore, resolve_access_token};
use troverai_api::raiplay::RaiPlayClient;
use troverai_core::{Error as ScheduleError, TimeWindow, resolve_date};

use crate::commands::ViewOptions;
use crate::config::{AppConfig, resolve_config_path};
use crate::render::{OutputMode, Renderer};

/// Examples appended to `--help`.
const EXAMPLES: &str = "\
Examples:
  troverai --ora                        # What's on air now
  troverai --canale rai-1               # Today's Rai 1 schedule
  troverai --canale rai-1 --data domani # Tomorrow's schedule
  troverai --canale rai-2 --dalle 20:00 # Evening schedule
  troverai --prima-serata               # Prime time on main channels
  troverai --cerca \"film\"               # Search for programs
  troverai --canali                     # List available channels
  troverai --accedi                     # Log in (RAIPLAY_USERNAME, RAIPLAY_PASSWORD)
  troverai --stato                      # Show the saved login

Date formats:
  oggi, today, domani, tomorrow, ieri, yesterday
  dd-mm-yyyy, dd/mm/yyyy, +1, -2 (offset from today)";

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "troverai", about, version, after_help = EXAMPLES)]
#[command(group(
    ArgGroup::new("mode").args(["ora", "canali", "prima_serata", "cerca", "accedi", "stato"])
))]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Show what's currently on air.
    #[arg(short = 'o', long)]
    ora: bool,

    /// Show schedule for a specific channel.
    #[arg(short = 'c', long, value_name = "NOME")]
    canale: Option<String>,

    /// List available channels.
    #[arg(long)]
    canali: bool,

    /// Show prime time (20:00-23:00) on Rai 1/2/3.
    #[arg(short = 'p', long)]
    prima_serata: bool,

    /// Search for a program by name.
    #[arg(short = 's', long, value_name = "TESTO")]
    cerca: Option<String>,

    /// Date (oggi/domani/dd-mm-yyyy, default: oggi).
    #[arg(short = 'd', long, value_name = "DATA")]
    data: Option<String>,

    /// Filter programs starting from time.
    #[arg(long, value_name = "HH:MM", conflicts_with = "ora")]
    dalle: Option<String>,

    /// Filter programs until time.
    #[arg(long, value_name = "HH:MM", conflicts_with = "ora")]
    alle: Option<String>,

    /// Compact output format.
    #[arg(long, conflicts_with = "json")]
    compatto: bool,

    /// Output in JSON format.
    #[arg(long)]
    json: bool,

    /// Filter by typology (Film, ProgrammiTv, SerieTV).
    #[arg(short = 't', long, value_name = "TIPO")]
    tipo: Option<String>,

    /// Filter by genre (Commedia, Drammatico, AzioneAvventura, etc.).
    #[arg(short = 'g', long, value_name = "GENERE")]
    genere: Option<String>,

    /// Log in with RAIPLAY_USERNAME and RAIPLAY_PASSWORD and save the token file.
    #[arg(long)]
    accedi: bool,

    /// Show the saved login and when its token expires.
    #[arg(long)]
    stato: bool,

    /// Override config/data directory.
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Override the auth token file.
    #[arg(long, value_name = "PATH")]
    token_file: Option<PathBuf>,
}

impl Cli {
    /// Whether no view was picked, so "on air now" runs as the default.
    const fn default_mode(&self) -> bool {
        !(self.ora
            || self.canali
            || self.prima_serata
            || self.accedi
            || self.stato
            || self.cerca.is_some()
            || self.canale.is_some())
    }

    const fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.compatto {
            OutputMode::Compact
        } else {
            OutputMode::Text
        }
    }
}

/// Builds the Rai SSO client from the `[auth]` settings.
///
/// # Errors
///
/// Returns an error if an endpoint override is invalid or the HTTP client
/// cannot be built.
fn build_sso(config: &AppConfig) -> Result<SsoClient> {
    let mut builder = SsoClient::builder()
        .user_agent(config.user_agent())
        .domain_api_key(config.auth.domain_api_key.clone())
        .refresh_url(config.refresh_url()?)
        .login_url(config.login_url()?);
    if let Some(url) = config.config_url()? {
        builder = builder.config_url(url);
    }
    builder.build().context("failed to set up Rai SSO client")
}

/// Builds the API client, attaching a bearer token when one is available.
///
/// # Errors
///
/// Returns an error if the config is invalid, the token file is unreadable,
/// or the HTTP client cannot be built.
#[instrument(skip_all)]
async fn build_client(
    config: &AppConfig,
    store: &TokenStore,
    sso: &SsoClient,
    utc_now: DateTime<Utc>,
) -> Result<RaiPlayClient> {
    let token = resolve_access_token(store, sso, utc_now).await?;
    tracing::debug!(authenticated = token.is_some(), "API client configured");

    let mut builder = RaiPlayClient::builder()
        .user_agent(config.user_agent())
        .bearer_token(token);
    if let Some(url) = config.base_url()? {
        builder = builder.base_url(url);
    }
    builder.build().context("failed to build API client")
}

/// Runs the selected view.
///
/// Priority: `--accedi`, `--stato`, `--ora`, `--canali`, `--prima-serata`,
/// `--cerca`, `--canale`, then "on air now" as the default.
///
/// # Errors
///
/// Returns an error if an argument is invalid, the config cannot be loaded,
/// or the view fails.
#[instrument(skip_all)]
async fn run(cli: Cli, now: NaiveDateTime, utc_now: DateTime<Utc>) -> Result<()> {
    let date = resolve_date(cli.data.as_deref().unwrap_or("oggi"), now.date())?;
    let window = TimeWindow::from_tokens(cli.dalle.as_deref(), cli.alle.as_deref())?;
    if window.is_some() && cli.default_mode() && date.date() == now.date() {
        return Err(ScheduleError::WindowWithoutSchedule.into());
    }

    let config_path = resolve_config_path(cli.dir.as_deref())?;
    let config = AppConfig::load(&config_path)?;
    tracing::debug!(config = %config_path.display(), %date, "configuration loaded");

    let store = TokenStore::new(token_path(&cli, &config, &config_path));
    let renderer = Renderer::from_env(cli.output_mode());
    let mut out = std::io::stdout();

    if cli.stato {
        return account::run_status(&store, utc_now, &renderer, &mut out);
    }

    let sso = build_sso(&config)?;
    if cli.accedi {
        let credentials = Credentials::from_lookup(|key| std::env::var(key).ok())?;
        return account::run_login(&sso, &store, &credentials, utc_now, &renderer, &mut out)
            .await;
    }

    let client = build_client(&config, &store, &sso, utc_now).await?;
    let opts = ViewOptions {
        date,
        window,
        typology: cli.tipo.clone(),
        genre: cli.genere.clone(),
        now,
    };

    if cli.ora {
        commands::run_now(
            &client,
            &config.channels.now,
            cli.canale.as_deref(),
            &opts,
            &renderer,
            &mut out,
        )
        .await
    } else if cli.canali {
        commands::run_channels(&client, &renderer, &mut out).await
    } else if cli.prima_serata {
        commands::run_prime_time(
            &client,
            &config.channels.prime_time,
            &opts,
            &renderer,
            &mut out,
        )
        .await
    } else if let Some(query) = cli.cerca.as_deref() {
        commands::run_search(
            &client,
            &config.channels.search,
            query,
            &opts,
            &renderer,
            &mut out,
        )
        .await
    } else if let Some(channel) = cli.canale.as_deref() {
        commands::run_schedule(&client, channel, &opts, &renderer, &mut out).await
    } else {
        commands::run_now(
            &client,
            &config.channels.now,
            None,
            &opts,
            &renderer,
            &mut out,
        )
        .await
    }
}

/// Token file location: `--token-file`, then `[auth] token_file`, then the
/// default next to the config file.
fn token_path(cli: &Cli, config: &AppConfig, config_path: &Path) -> PathBuf {
    cli.token_file
        .clone()
        .unwrap_or_else(|| config.token_path(config_path))
}

/// Reports argument mistakes the way clap reports its own, with exit code 2.
fn exit_on_user_input(err: &anyhow::Error) {
    if let Some(schedule_err) = err
        .downcast_ref::<ScheduleError>()
        .filter(|e| e.is_user_input())
    {
        Cli::command()
            .error(ErrorKind::ValueValidation, schedule_err)
            .exit();
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if the selected view fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let now = Local::now();
    run(cli, now.naive_local(), now.with_timezone(&Utc))
        .await
        .inspect_err(exit_on_user_input)
}
