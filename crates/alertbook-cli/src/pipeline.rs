//! One run of the catalogue or override report: load, normalize, group,
//! render, publish. Every step is awaited in order.

use alertbook_alert::grouping::group_alerts_by_team;
use alertbook_alert::normalize::parse_alert_document;
use alertbook_alert::overrides::{environment_from_key, parse_override_document, OverrideCollector};
use alertbook_alert::variables::parse_variable_document;
use alertbook_common::types::{AlertRecord, TeamAlerts};
use alertbook_notify::publisher::{PublishOutcome, ReportPublisher};
use alertbook_notify::report_template::{
    AlertReportRenderer, OverrideReportRenderer, ReportParams, VariableReportRenderer,
};
use alertbook_source::{AlertSource, ExtensionFilter};
use anyhow::{Context, Result};
use std::collections::HashMap;

/// Where a rendered fragment goes.
pub enum Delivery<'a> {
    Publish(&'a ReportPublisher),
    /// Render only; the wiki is never contacted.
    DryRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing qualified for rendering; the wiki was not contacted.
    NoData,
    DryRun(String),
    Published(PublishOutcome),
}

/// Reads every qualifying file from `source` and normalizes it.
///
/// A listing failure aborts the run. A file that cannot be read is skipped.
pub async fn collect_alerts(
    source: &dyn AlertSource,
    filter: &ExtensionFilter,
) -> Result<Vec<AlertRecord>> {
    let names = source
        .list_files()
        .await
        .with_context(|| format!("Failed to list files in {}", source.describe()))?;

    let qualifying: Vec<&String> = names.iter().filter(|name| filter.matches(name)).collect();
    if qualifying.is_empty() {
        tracing::warn!(
            source = %source.describe(),
            listed = names.len(),
            extensions = ?filter.extensions(),
            "No rule files found"
        );
        return Ok(Vec::new());
    }
    tracing::info!(source = %source.describe(), files = qualifying.len(), "Processing rule files");

    let mut alerts = Vec::new();
    for name in qualifying {
        let text = match source.read_file(name).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(file = %name, error = %e, "Failed to read rule file, skipping");
                continue;
            }
        };
        let records = parse_alert_document(name, &text);
        if records.is_empty() {
            tracing::warn!(file = %name, "No alerts found in file");
        } else {
            tracing::debug!(file = %name, alerts = records.len(), "Parsed rule file");
        }
        alerts.extend(records);
    }
    Ok(alerts)
}

/// Team information for every team in `teams`. Inline configuration wins
/// over the source's own lookup.
pub async fn resolve_team_info(
    source: &dyn AlertSource,
    teams: &TeamAlerts,
    inline: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut info = HashMap::new();
    for team in teams.keys() {
        let text = match inline.get(team) {
            Some(text) => Some(text.clone()),
            None => source.team_info(team).await,
        };
        if let Some(text) = text {
            info.insert(team.clone(), text);
        }
    }
    info
}

/// Settings of a catalogue run that do not come from the source itself.
pub struct CatalogueRun<'a> {
    pub filter: &'a ExtensionFilter,
    pub team_info: &'a HashMap<String, String>,
    /// Formatted "Last Updated" timestamp.
    pub updated_at: &'a str,
    pub delivery: Delivery<'a>,
}

pub async fn run_catalogue(source: &dyn AlertSource, run: CatalogueRun<'_>) -> Result<RunOutcome> {
    let alerts = collect_alerts(source, run.filter).await?;
    if alerts.is_empty() {
        tracing::warn!(source = %source.describe(), "No alerts to publish");
        return Ok(RunOutcome::NoData);
    }

    let teams = group_alerts_by_team(alerts);
    let team_info = resolve_team_info(source, &teams, run.team_info).await;
    let html = AlertReportRenderer::render_html(&ReportParams {
        updated_at: run.updated_at,
        teams: &teams,
        team_info: &team_info,
    });
    tracing::info!(
        teams = teams.len(),
        alerts = teams.values().map(Vec::len).sum::<usize>(),
        bytes = html.len(),
        "Rendered alert catalogue"
    );

    Ok(deliver(html, run.delivery).await)
}

/// Builds the disabled-alerts report from one override file per environment.
/// Unlike rule files, an override file that fails to load aborts the run.
pub async fn run_overrides(
    source: &dyn AlertSource,
    keys: &[String],
    delivery: Delivery<'_>,
) -> Result<RunOutcome> {
    if keys.is_empty() {
        tracing::warn!(source = %source.describe(), "No override files configured");
        return Ok(RunOutcome::NoData);
    }

    let mut collector = OverrideCollector::new();
    for key in keys {
        let environment = environment_from_key(key);
        let text = source
            .read_file(key)
            .await
            .with_context(|| format!("Failed to read override file {key}"))?;
        let doc = parse_override_document(&text)
            .with_context(|| format!("Failed to parse override file {key}"))?;
        tracing::debug!(file = %key, environment = %environment, "Loaded override file");
        collector.add_document(&environment, &doc);
    }

    let summary = collector.finish();
    if summary.is_empty() {
        tracing::info!("No alerts or groups are disabled in any environment");
    }
    tracing::info!(
        alerts = summary.alerts.len(),
        groups = summary.groups.len(),
        "Collected disabled alerts"
    );
    let html = OverrideReportRenderer::render_html(&summary);
    Ok(deliver(html, delivery).await)
}

/// Renders the alert variable sheet stored under `key`. A sheet that cannot
/// be read, or is not a list, aborts the run.
pub async fn run_variables(
    source: &dyn AlertSource,
    key: &str,
    delivery: Delivery<'_>,
) -> Result<RunOutcome> {
    let text = source
        .read_file(key)
        .await
        .with_context(|| format!("Failed to read variable sheet {key}"))?;
    let rows = parse_variable_document(&text)
        .with_context(|| format!("Invalid variable sheet {key}"))?;
    if rows.is_empty() {
        tracing::warn!(file = %key, "Variable sheet has no entries");
        return Ok(RunOutcome::NoData);
    }

    tracing::info!(file = %key, rows = rows.len(), "Loaded alert variables");
    let html = VariableReportRenderer::render_html(&rows);
    Ok(deliver(html, delivery).await)
}

/// Entry point for event-driven invocation. The event payload carries no
/// information and is only logged.
pub async fn handle_event(
    event: serde_json::Value,
    source: &dyn AlertSource,
    run: CatalogueRun<'_>,
) -> Result<RunOutcome> {
    tracing::debug!(event = %event, "Received trigger event");
    run_catalogue(source, run).await
}

async fn deliver(html: String, delivery: Delivery<'_>) -> RunOutcome {
    match delivery {
        Delivery::Publish(publisher) => RunOutcome::Published(publisher.publish(&html).await),
        Delivery::DryRun => RunOutcome::DryRun(html),
    }
}
