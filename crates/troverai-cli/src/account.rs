//! Login and token status views.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::instrument;
use troverai_api::auth::{Credentials, SsoClient, TokenStore, token_status};

use crate::render::Renderer;

/// Shows who is logged in and when the stored JWT expires.
///
/// # Errors
///
/// Returns an error if the token file cannot be read or writing fails.
#[instrument(skip_all, fields(path = %store.path().display()))]
pub fn run_status(
    store: &TokenStore,
    now: DateTime<Utc>,
    renderer: &Renderer,
    out: &mut impl Write,
) -> Result<()> {
    let status = token_status(store, now)?;

    if renderer.is_json() {
        return renderer.json(out, &status);
    }

    renderer.heading(out, "Stato autenticazione")?;
    renderer.token_status(out, &status, now)
}

/// Logs in, writes the token file and shows its status.
///
/// # Errors
///
/// Returns an error if the login fails, the token file cannot be written,
/// or writing fails.
#[instrument(skip_all, fields(path = %store.path().display()))]
pub async fn run_login(
    sso: &SsoClient,
    store: &TokenStore,
    credentials: &Credentials,
    now: DateTime<Utc>,
    renderer: &Renderer,
    out: &mut impl Write,
) -> Result<()> {
    let tokens = sso.login(credentials, now).await?;
    store.save(&tokens)?;
    tracing::info!("token file written");

    let status = token_status(store, now)?;
    if renderer.is_json() {
        return renderer.json(out, &status);
    }

    let who = status
        .user
        .as_deref()
        .or(status.email.as_deref())
        .unwrap_or(credentials.email.as_str());
    renderer.heading(out, "Accesso")?;
    renderer.message(out, &format!("Accesso eseguito come {who}\n"))?;
    renderer.token_status(out, &status, now)
}
