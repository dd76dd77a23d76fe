use crate::error::{PublishError, Result};
use crate::publisher::{PageTitle, PublishOutcome, ReportPublisher};
use crate::report_template::{
    format_updated_at, html_escape, AlertReportRenderer, OverrideReportRenderer, ReportParams,
    VariableReportRenderer,
};
use crate::{PageSnapshot, PageUpdate, WikiApi};
use alertbook_common::types::{AlertRecord, OverrideSummary, TeamAlerts, VariableRow};
use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

fn alert(team: &str, name: &str, envs: &[&str]) -> AlertRecord {
    let mut record = AlertRecord::new(name, "rate(http_errors_total[5m]) > 5");
    record.team = team.to_string();
    record.threshold = "5".to_string();
    record.environments.extend(envs.iter().map(|e| e.to_string()));
    record
}

fn teams(alerts: Vec<AlertRecord>) -> TeamAlerts {
    let mut grouped = TeamAlerts::new();
    for alert in alerts {
        grouped.entry(alert.team.clone()).or_default().push(alert);
    }
    grouped
}

fn render(teams: &TeamAlerts, team_info: &HashMap<String, String>) -> String {
    AlertReportRenderer::render_html(&ReportParams {
        updated_at: "10/18/2026, 3:04:05 PM",
        teams,
        team_info,
    })
}

#[test]
fn renders_one_section_per_team_with_a_row_per_alert() {
    let grouped = teams(vec![
        alert("Platform", "ApiErrors", &["prod"]),
        alert("Platform", "QueueBacklog", &["staging"]),
    ]);
    let html = render(&grouped, &HashMap::new());

    assert!(html.starts_with("<p>Last Updated: 10/18/2026, 3:04:05 PM</p>"));
    assert_eq!(html.matches("<h1>Platform Team Alerts</h1>").count(), 1);
    // one header row plus two alert rows
    assert_eq!(html.matches("<tr>").count(), 3);
    assert_eq!(html.matches("<td>").count(), 2 * 12);
    assert_eq!(html.matches("<th ").count(), 12);
}

#[test]
fn team_sections_follow_mapping_order() {
    let grouped = teams(vec![
        alert("Storage", "DiskFull", &["prod"]),
        alert("Platform", "ApiErrors", &["prod"]),
    ]);
    let html = render(&grouped, &HashMap::new());
    let storage = html.find("<h1>Storage Team Alerts</h1>").unwrap();
    let platform = html.find("<h1>Platform Team Alerts</h1>").unwrap();
    assert!(storage < platform);
}

#[test]
fn user_supplied_fields_are_escaped() {
    let mut record = alert("Platform", "<script>alert(1)</script>", &["prod"]);
    record.description = "Tom & Jerry's \"cartoon\"".to_string();
    record.link = "https://example.com/?a=1&b=<2>".to_string();
    let html = render(&teams(vec![record]), &HashMap::new());

    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("Tom &amp; Jerry&#039;s &quot;cartoon&quot;"));
    assert!(html.contains(r#"<a href="https://example.com/?a=1&amp;b=&lt;2&gt;">View</a>"#));
}

#[test]
fn missing_link_points_to_anchor_and_environments_are_joined() {
    let html = render(
        &teams(vec![alert("Platform", "ApiErrors", &["prod", "staging", "dev"])]),
        &HashMap::new(),
    );
    assert!(html.contains(r##"<a href="#">View</a>"##));
    assert!(html.contains("<td>prod, staging, dev</td>"));
}

#[test]
fn team_info_block_uses_text_or_placeholder() {
    let grouped = teams(vec![
        alert("Platform", "ApiErrors", &["prod"]),
        alert("Storage", "DiskFull", &["prod"]),
        alert("Search", "IndexLag", &["prod"]),
    ]);
    let mut info = HashMap::new();
    info.insert("Platform".to_string(), "  On-call: #platform-oncall\n".to_string());
    info.insert("Search".to_string(), "   ".to_string());
    let html = render(&grouped, &info);

    assert!(html.contains("<p>On-call: #platform-oncall</p>"));
    assert!(html.contains("<p>No specific information available for Storage.</p>"));
    assert!(html.contains("<p>No specific information available for Search.</p>"));
    assert!(html.contains(r#"<ac:parameter ac:name="title">Storage Team Information</ac:parameter>"#));
}

#[test]
fn rendering_is_deterministic_for_fixed_timestamp() {
    let grouped = teams(vec![
        alert("Platform", "ApiErrors", &["prod", "staging"]),
        alert("Storage", "DiskFull", &["prod"]),
    ]);
    let info = HashMap::new();
    assert_eq!(render(&grouped, &info), render(&grouped, &info));
}

#[test]
fn timestamp_uses_locale_style_format() {
    let at = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2026, 10, 8, 15, 4, 5)
        .unwrap();
    assert_eq!(format_updated_at(&at), "10/8/2026, 3:04:05 PM");
}

#[test]
fn escape_covers_all_five_characters() {
    assert_eq!(html_escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;");
}

#[test]
fn override_report_lists_disabled_names() {
    let mut summary = OverrideSummary::default();
    summary
        .alerts
        .insert("HighCpu".to_string(), vec!["ENV1".to_string(), "ENV2".to_string()]);
    summary.groups.insert("node<x>".to_string(), vec!["ENV3".to_string()]);
    let html = OverrideReportRenderer::render_html(&summary);

    assert!(html.starts_with("<h2>Disabled Alerts</h2>"));
    assert!(html.contains("<tr><td>HighCpu</td><td>ENV1, ENV2</td></tr>"));
    assert!(html.contains("<h2>Disabled Alert Groups</h2>"));
    assert!(html.contains("<tr><td>node&lt;x&gt;</td><td>ENV3</td></tr>"));
}

fn variable_row(values: &[&str]) -> VariableRow {
    let mut cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    cells.resize(11, String::new());
    VariableRow { cells }
}

#[test]
fn variable_report_highlights_threshold_and_escapes_cells() {
    let rows = vec![
        variable_row(&["HighCpu", "node", "90", "P2"]),
        variable_row(&["Disk<Full>", "storage & backup", "", "P1"]),
    ];
    let html = VariableReportRenderer::render_html(&rows);

    assert!(html.starts_with(r#"<table style="max-width: 1000px; width: 100%;"><tbody><tr><th>Alert Name</th><th>Service</th><th>Threshold</th>"#));
    assert!(html.ends_with("</tbody></table>"));
    assert_eq!(html.matches("<th>").count(), 11);
    assert_eq!(html.matches("<tr>").count(), 3);
    assert_eq!(html.matches(r#"<ac:structured-macro ac:name="warning">"#).count(), 2);
    assert!(html.contains("<tr><td>HighCpu</td><td>node</td><td><ac:structured-macro ac:name=\"warning\"><ac:rich-text-body><p>90</p></ac:rich-text-body></ac:structured-macro></td><td>P2</td>"));
    assert!(html.contains("<td>Disk&lt;Full&gt;</td><td>storage &amp; backup</td>"));
    assert!(html.contains("<p></p>"));
}

#[test]
fn empty_variable_sheet_renders_header_only() {
    let html = VariableReportRenderer::render_html(&[]);
    assert_eq!(html.matches("<tr>").count(), 1);
    assert!(!html.contains("<td>"));
}

#[derive(Default)]
struct Calls {
    version_reads: usize,
    page_reads: usize,
    updates: Vec<PageUpdate>,
}

struct FakeWiki {
    calls: Arc<Mutex<Calls>>,
    version: Option<u64>,
    page: Option<PageSnapshot>,
    update_status: std::result::Result<u16, u16>,
}

impl FakeWiki {
    fn with_page(version: u64, body: &str) -> (Self, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let wiki = Self {
            calls: calls.clone(),
            version: Some(version),
            page: Some(PageSnapshot {
                title: "Team Alerts".to_string(),
                version,
                body: body.to_string(),
            }),
            update_status: Ok(200),
        };
        (wiki, calls)
    }
}

#[async_trait]
impl WikiApi for FakeWiki {
    async fn current_version(&self) -> Result<u64> {
        self.calls.lock().unwrap().version_reads += 1;
        self.version.ok_or(PublishError::Api {
            status: 401,
            body: "unauthorized".to_string(),
        })
    }

    async fn fetch_page(&self) -> Result<PageSnapshot> {
        self.calls.lock().unwrap().page_reads += 1;
        self.page.clone().ok_or(PublishError::Api {
            status: 404,
            body: "not found".to_string(),
        })
    }

    async fn update_page(&self, update: &PageUpdate) -> Result<u16> {
        self.calls.lock().unwrap().updates.push(update.clone());
        self.update_status.map_err(|status| PublishError::Api {
            status,
            body: "{\"message\":\"Version must be incremented\"}".to_string(),
        })
    }

    fn page_id(&self) -> &str {
        "12345"
    }
}

#[tokio::test]
async fn unchanged_content_skips_update() {
    let (wiki, calls) = FakeWiki::with_page(7, "<p>same</p>");
    let publisher = ReportPublisher::new(Box::new(wiki), PageTitle::default());

    assert_eq!(publisher.publish("<p>same</p>").await, PublishOutcome::Unchanged);
    let calls = calls.lock().unwrap();
    assert_eq!(calls.page_reads, 1);
    assert!(calls.updates.is_empty());
}

#[tokio::test]
async fn changed_content_writes_next_version_with_fixed_title() {
    let (wiki, calls) = FakeWiki::with_page(7, "<p>old</p>");
    let publisher = ReportPublisher::new(Box::new(wiki), PageTitle::default());

    assert_eq!(
        publisher.publish("<p>new</p>").await,
        PublishOutcome::Updated {
            version: 8,
            status: 200
        }
    );
    let calls = calls.lock().unwrap();
    assert_eq!(
        calls.updates,
        vec![PageUpdate {
            version: 8,
            title: "Updated Prometheus Alerts".to_string(),
            content: "<p>new</p>".to_string(),
        }]
    );
}

#[tokio::test]
async fn keep_existing_title_reuses_page_title() {
    let (wiki, calls) = FakeWiki::with_page(2, "");
    let publisher = ReportPublisher::new(Box::new(wiki), PageTitle::KeepExisting);
    publisher.publish("<h2>Disabled Alerts</h2>").await;
    assert_eq!(calls.lock().unwrap().updates[0].title, "Team Alerts");
}

#[tokio::test]
async fn version_read_failure_skips_everything_else() {
    let (mut wiki, calls) = FakeWiki::with_page(7, "<p>old</p>");
    wiki.version = None;
    let publisher = ReportPublisher::new(Box::new(wiki), PageTitle::default());

    assert_eq!(
        publisher.publish("<p>new</p>").await,
        PublishOutcome::BaselineUnavailable
    );
    let calls = calls.lock().unwrap();
    assert_eq!(calls.version_reads, 1);
    assert_eq!(calls.page_reads, 0);
    assert!(calls.updates.is_empty());
}

#[tokio::test]
async fn content_read_failure_skips_update() {
    let (mut wiki, calls) = FakeWiki::with_page(7, "<p>old</p>");
    wiki.page = None;
    let publisher = ReportPublisher::new(Box::new(wiki), PageTitle::default());

    assert_eq!(
        publisher.publish("<p>new</p>").await,
        PublishOutcome::BaselineUnavailable
    );
    assert!(calls.lock().unwrap().updates.is_empty());
}

#[tokio::test]
async fn rejected_update_is_reported_without_retry() {
    let (mut wiki, calls) = FakeWiki::with_page(7, "<p>old</p>");
    wiki.update_status = Err(409);
    let publisher = ReportPublisher::new(Box::new(wiki), PageTitle::default());

    assert_eq!(
        publisher.publish("<p>new</p>").await,
        PublishOutcome::UpdateFailed { status: Some(409) }
    );
    assert_eq!(calls.lock().unwrap().updates.len(), 1);
}
