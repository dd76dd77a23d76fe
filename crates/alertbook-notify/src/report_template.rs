use alertbook_common::types::{
    AlertRecord, NameEnvironments, OverrideSummary, TeamAlerts, VariableRow, NOT_AVAILABLE,
    VARIABLE_COLUMNS,
};
use chrono::{DateTime, TimeZone};
use std::collections::HashMap;
use std::fmt::Write;

/// Alert catalogue rendering parameters.
pub struct ReportParams<'a> {
    /// Already formatted "Last Updated" timestamp, see [`format_updated_at`].
    pub updated_at: &'a str,
    pub teams: &'a TeamAlerts,
    /// Free-text information per team; teams without an entry get a
    /// placeholder sentence.
    pub team_info: &'a HashMap<String, String>,
}

/// Formats a timestamp the way the catalogue header shows it, e.g.
/// `10/18/2026, 3:04:05 PM`.
pub fn format_updated_at<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Sentence shown for teams without supplementary information.
pub fn team_info_placeholder(team: &str) -> String {
    format!("No specific information available for {team}.")
}

/// Renders the alert catalogue as a Confluence storage-format fragment.
pub struct AlertReportRenderer;

impl AlertReportRenderer {
    /// Renders the whole page body. Output depends only on `params`.
    pub fn render_html(params: &ReportParams<'_>) -> String {
        let mut html = format!(
            "<p>Last Updated: {}</p>",
            html_escape(params.updated_at)
        );
        for (team, alerts) in params.teams {
            let info = params
                .team_info
                .get(team)
                .map(|text| text.trim())
                .filter(|text| !text.is_empty());
            html.push_str(&Self::render_team_section(team, info, alerts));
        }
        html
    }

    fn render_team_section(team: &str, info: Option<&str>, alerts: &[AlertRecord]) -> String {
        let team_html = html_escape(team);
        let info_html = match info {
            Some(text) => html_escape(text),
            None => html_escape(&team_info_placeholder(team)),
        };
        let rows: String = alerts.iter().map(Self::render_row).collect();

        format!(
            r#"
<h1>{team_html} Team Alerts</h1>
<ac:structured-macro ac:name="expand">
<ac:parameter ac:name="title">{team_html} Team Information</ac:parameter>
<ac:rich-text-body>
<p>{info_html}</p>
</ac:rich-text-body>
</ac:structured-macro>
<div style="overflow-x: auto;">
<table class="confluenceTable" style="width: 100%; border-collapse: collapse; border: 1px solid #ccc;">
<thead>
{header}</thead>
<tbody>{rows}</tbody>
</table>
</div>
"#,
            header = include_str!("templates/alert_table_header.html"),
        )
    }

    fn render_row(alert: &AlertRecord) -> String {
        let mut row = String::from("\n<tr>");
        let cells = [
            alert.alert_name.as_str(),
            alert.description.as_str(),
            alert.summary.as_str(),
            alert.duration.as_str(),
            alert.component.as_str(),
        ];
        for cell in cells {
            push_cell(&mut row, cell);
        }
        let _ = write!(
            row,
            "<td><a href=\"{}\">View</a></td>",
            html_escape(alert.link_target().unwrap_or("#"))
        );
        push_cell(&mut row, &alert.runbook);
        push_cell(&mut row, &alert.service);
        push_cell(&mut row, &alert.environments_label());
        push_cell(&mut row, &alert.severity);
        push_cell(&mut row, &alert.threshold);
        push_cell(&mut row, &alert.expr);
        row.push_str("</tr>");
        row
    }
}

/// Renders the disabled-alerts summary built from override files.
pub struct OverrideReportRenderer;

impl OverrideReportRenderer {
    pub fn render_html(summary: &OverrideSummary) -> String {
        let mut html = Self::render_table(&summary.alerts, "Disabled Alerts");
        html.push_str(&Self::render_table(&summary.groups, "Disabled Alert Groups"));
        html
    }

    fn render_table(entries: &NameEnvironments, title: &str) -> String {
        let mut html = format!(
            "<h2>{}</h2><table><tbody><tr><th>Name</th><th>Disabled Environments</th></tr>",
            html_escape(title)
        );
        for (name, environments) in entries {
            let _ = write!(
                html,
                "<tr><td>{}</td><td>{}</td></tr>",
                html_escape(name),
                html_escape(&environments.join(", "))
            );
        }
        html.push_str("</tbody></table>");
        html
    }
}

/// Renders an alert variable sheet as one table. Threshold values are
/// highlighted with a warning macro.
pub struct VariableReportRenderer;

impl VariableReportRenderer {
    const HIGHLIGHTED_COLUMN: &'static str = "Threshold";

    pub fn render_html(rows: &[VariableRow]) -> String {
        let mut html =
            String::from(r#"<table style="max-width: 1000px; width: 100%;"><tbody><tr>"#);
        for column in VARIABLE_COLUMNS {
            let _ = write!(html, "<th>{}</th>", html_escape(column));
        }
        html.push_str("</tr>");

        for row in rows {
            html.push_str("<tr>");
            for (column, value) in VARIABLE_COLUMNS.iter().zip(&row.cells) {
                let value = html_escape(value);
                if *column == Self::HIGHLIGHTED_COLUMN {
                    let _ = write!(
                        html,
                        r#"<td><ac:structured-macro ac:name="warning"><ac:rich-text-body><p>{value}</p></ac:rich-text-body></ac:structured-macro></td>"#
                    );
                } else {
                    let _ = write!(html, "<td>{value}</td>");
                }
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }
}

fn push_cell(row: &mut String, value: &str) {
    let value = if value.is_empty() { NOT_AVAILABLE } else { value };
    let _ = write!(row, "<td>{}</td>", html_escape(value));
}

/// Escapes the characters that are significant in HTML text and attribute
/// values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
