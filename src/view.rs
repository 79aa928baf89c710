//! Text rendering of list stores.
//!
//! A rendered list is, top to bottom: the pagination summary, one card per
//! item on the current page, and the page selector. Loading, failure and
//! empty results each replace the whole list with a single line.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::lineage::Lineage;
use crate::models::{Asset, Connector, Featureset, Keyed, Metricset, SchemaSubject};
use crate::paging::{PageSelector, Pagination};
use crate::state::{ListState, Phase};

/// Shown instead of dispatching a search for an empty query.
pub const SEARCH_PROMPT: &str = "Please enter a search term!";
pub const LOADING: &str = "Loading...";

/// How an item is drawn in a list.
pub trait Card: Keyed {
    fn card(&self) -> String;

    /// Extra lines shown when the item is selected.
    fn expanded(&self) -> Option<String> {
        None
    }
}

pub fn pagination_line(pagination: &Pagination) -> String {
    format!(
        "Page {} of {}, {} results found.",
        pagination.page, pagination.total_page, pagination.total
    )
}

pub fn page_selector_line(pagination: &Pagination) -> Option<String> {
    let selector = PageSelector::for_pagination(pagination)?;

    let mut parts = Vec::new();
    parts.push(match selector.previous {
        Some(_) => "Previous".to_string(),
        None => "(Previous)".to_string(),
    });
    parts.extend(selector.before.iter().map(|p| p.to_string()));
    parts.push(format!("[{}]", selector.current));
    parts.extend(selector.after.iter().map(|p| p.to_string()));
    parts.push(match selector.next {
        Some(_) => "Next".to_string(),
        None => "(Next)".to_string(),
    });
    Some(parts.join(" "))
}

/// Render a list store. `empty` is the informational line for zero results.
pub fn render_list<T: Card + Clone>(state: &ListState<T>, empty: &str) -> String {
    let page = match state.phase() {
        Phase::Idle => return String::new(),
        Phase::Loading => return LOADING.to_string(),
        Phase::Failed(err) => return format!("error: {}", err.message),
        Phase::Loaded(page) => page,
    };
    if page.items.is_empty() {
        return empty.to_string();
    }

    let mut lines = Vec::new();
    if let Some(pagination) = &page.pagination {
        lines.push(pagination_line(pagination));
        lines.push(String::new());
    }

    let selected = state.selected();
    for item in &page.items {
        let is_selected = selected == Some(item.key().as_str());
        let marker = if is_selected { "* " } else { "  " };
        for (i, line) in item.card().lines().enumerate() {
            if i == 0 {
                lines.push(format!("{}{}", marker, line));
            } else {
                lines.push(format!("  {}", line));
            }
        }
        if is_selected {
            if let Some(expanded) = item.expanded() {
                lines.extend(expanded.lines().map(|l| format!("    {}", l)));
            }
        }
    }

    if let Some(selector) = page.pagination.as_ref().and_then(page_selector_line) {
        lines.push(String::new());
        lines.push(selector);
    }
    lines.join("\n")
}

fn date(ts: &Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Card for Asset {
    fn card(&self) -> String {
        let mut out = format!("{} [{}]", self.name, self.asset_type);
        if !self.description.is_empty() {
            out.push_str(&format!("\n{}", self.description));
        }
        if !self.tags.is_empty() {
            out.push_str(&format!("\ntags: {}", self.tags.join(", ")));
        }
        out
    }
}

/// Full asset page: header, tags, versions, labels and lineage.
pub fn render_asset(asset: &Asset) -> String {
    let mut lines = vec![format!("{} [{}]", asset.name, asset.asset_type)];
    if !asset.description.is_empty() {
        lines.push(asset.description.clone());
    }
    lines.push(String::new());
    lines.push(format!("tags:          {}", asset.tags.join(", ")));
    lines.push(format!(
        "versions:      {}",
        asset.versions.keys().cloned().collect::<Vec<_>>().join(", ")
    ));
    lines.push(format!("published:     {}", date(&asset.published_on)));
    lines.push(format!("discovered:    {}", date(&asset.last_discovered_at)));
    for (key, value) in &asset.labels {
        lines.push(format!("label {}: {}", key, scalar(value)));
    }
    lines.push(String::new());
    lines.push("depends on:".to_string());
    lines.push(Lineage::of(asset).render());
    lines.join("\n")
}

/// Asset detail store: the asset page, or the store's status line.
pub fn render_asset_detail(state: &ListState<Asset>) -> String {
    match state.items().first() {
        Some(asset) => render_asset(asset),
        None => render_list(state, "No asset found"),
    }
}

impl Card for Featureset {
    fn card(&self) -> String {
        format!(
            "{} v{} ({} features, inserted {})",
            self.name,
            self.version,
            self.features.len(),
            date(&self.inserted_at)
        )
    }

    fn expanded(&self) -> Option<String> {
        let mut lines: Vec<String> = self
            .labels
            .iter()
            .map(|(k, v)| format!("label {}: {}", k, v))
            .collect();
        lines.extend(
            self.features
                .iter()
                .map(|f| format!("- {} = {} ({})", f.name, scalar(&f.value), f.data_type)),
        );
        Some(lines.join("\n"))
    }
}

impl Card for Metricset {
    fn card(&self) -> String {
        format!(
            "{} v{} ({} metrics, inserted {})",
            self.name,
            self.version,
            self.metrics.len(),
            date(&self.inserted_at)
        )
    }

    fn expanded(&self) -> Option<String> {
        let mut lines = Vec::new();
        for metric in &self.metrics {
            let tags: Vec<String> = metric
                .result_key
                .tags
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            lines.push(format!(
                "run {} [{}]",
                metric.result_key.data_set_date,
                tags.join(", ")
            ));
            for instance in &metric.analyzer_context.metric_map {
                lines.push(format!(
                    "- {}({}) {} {} = {}",
                    instance.analyzer.analyzer_name,
                    instance.analyzer.column,
                    instance.metric.entity,
                    instance.metric.name,
                    instance.metric.value
                ));
            }
        }
        Some(lines.join("\n"))
    }
}

impl Card for Connector {
    fn card(&self) -> String {
        let mut lines = vec![format!(
            "{} [{}] {}",
            self.name,
            self.info.connector_type,
            self.class().unwrap_or("-")
        )];
        lines.push(format!(
            "state: {} on {}",
            self.status.connector.state, self.status.connector.worker_id
        ));
        for task in &self.status.tasks {
            lines.push(format!(
                "task {} {} on {}",
                task.id, task.state, task.worker_id
            ));
        }
        lines.join("\n")
    }

    fn expanded(&self) -> Option<String> {
        serde_json::to_string_pretty(&self.info.config).ok()
    }
}

impl Card for SchemaSubject {
    fn card(&self) -> String {
        format!(
            "{} v{} id={} [{}]",
            self.subject, self.version, self.id, self.schema_type
        )
    }

    fn expanded(&self) -> Option<String> {
        let pretty = serde_json::from_str::<Value>(&self.schema)
            .ok()
            .and_then(|v| serde_json::to_string_pretty(&v).ok());
        Some(pretty.unwrap_or_else(|| self.schema.clone()))
    }
}
