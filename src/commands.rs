//! CLI entry points, one per subcommand.
//!
//! Each `run_*` drives the relevant store(s) of a [`Dashboard`] to
//! completion and renders the final state. Nothing is printed here; the
//! caller writes [`Report::text`] to stdout and maps [`Report::ok`] to the
//! exit status.

use anyhow::{Context, Result};

use crate::dashboard::Dashboard;
use crate::locator::SERVICES;
use crate::sources::Source;
use crate::state::ListState;
use crate::store::Store;
use crate::view::{render_asset_detail, render_list, Card, SEARCH_PROMPT};

/// Rendered output of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    /// `false` when the store ended in its failed phase.
    pub ok: bool,
}

impl Report {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ok: true,
        }
    }

    fn of<T: Card + Clone>(state: &ListState<T>, text: String) -> Self {
        Self {
            text,
            ok: state.error().is_none(),
        }
    }
}

/// `--limit` / `--page` / `--select` shared by the list commands.
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub limit: Option<usize>,
    pub page: Option<usize>,
    pub select: Option<String>,
}

/// Resize (no fetch while idle), submit, then move to the requested page.
async fn load<S>(store: &Store<S>, query: &str, args: &ListArgs) -> Result<ListState<S::Item>>
where
    S: Source + 'static,
{
    if let Some(limit) = args.limit {
        store.resize_limit(limit).await.context("invalid --limit")?;
    }
    store.submit(query).await;

    if let Some(page) = args.page.filter(|&p| p != 1) {
        if store.snapshot().await.error().is_none() {
            store.goto_page(page).await.context("invalid --page")?;
        }
    }
    if let Some(key) = &args.select {
        store.select(key).await;
    }
    Ok(store.snapshot().await)
}

pub fn run_services(dashboard: &Dashboard) -> Report {
    let locator = dashboard.locator();
    let mut lines = vec![format!("{:<24} {:<40} {}", "SERVICE", "URL", "SOURCE")];
    for service in SERVICES {
        let (url, origin) = locator.resolve_with_origin(service);
        lines.push(format!("{:<24} {:<40} {}", service, url, origin.as_str()));
    }
    Report::ok(lines.join("\n"))
}

pub async fn run_search(dashboard: &Dashboard, query: &str, args: &ListArgs) -> Result<Report> {
    if query.trim().is_empty() {
        return Ok(Report::ok(SEARCH_PROMPT));
    }
    let state = load(&dashboard.search, query, args).await?;
    Ok(Report::of(&state, render_list(&state, "No assets found")))
}

pub async fn run_asset(dashboard: &Dashboard, name: &str) -> Result<Report> {
    let state = load(&dashboard.asset, name, &ListArgs::default()).await?;
    Ok(Report::of(&state, render_asset_detail(&state)))
}

pub async fn run_featuresets(
    dashboard: &Dashboard,
    asset: &str,
    args: &ListArgs,
) -> Result<Report> {
    let state = load(&dashboard.featuresets, asset, args).await?;
    Ok(Report::of(&state, render_list(&state, "No featuresets found")))
}

pub async fn run_metricsets(
    dashboard: &Dashboard,
    asset: &str,
    args: &ListArgs,
) -> Result<Report> {
    let state = load(&dashboard.metricsets, asset, args).await?;
    Ok(Report::of(&state, render_list(&state, "No metricsets found")))
}

/// All connectors, or just `name` when given.
pub async fn run_connectors(
    dashboard: &Dashboard,
    name: Option<&str>,
    args: &ListArgs,
) -> Result<Report> {
    let state = load(&dashboard.connectors, name.unwrap_or(""), args).await?;
    Ok(Report::of(&state, render_list(&state, "No connectors found")))
}

pub async fn run_restart(dashboard: &Dashboard, name: &str) -> Result<Report> {
    match dashboard.restart_connector(name).await {
        Ok(()) => Ok(Report::ok(format!(
            "Restart requested for connector {}.",
            name
        ))),
        Err(e) => Ok(Report {
            text: format!("error: {}", e.message()),
            ok: false,
        }),
    }
}

/// Latest version of every subject, or of `subject` alone.
pub async fn run_schemas(
    dashboard: &Dashboard,
    subject: Option<&str>,
    args: &ListArgs,
) -> Result<Report> {
    let state = load(&dashboard.schemas, subject.unwrap_or(""), args).await?;
    Ok(Report::of(&state, render_list(&state, "No schemas found")))
}
