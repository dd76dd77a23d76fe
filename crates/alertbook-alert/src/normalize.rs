use crate::merge_first_wins;
use crate::threshold::extract_threshold;
use alertbook_common::types::{AlertRecord, NOT_AVAILABLE, UNKNOWN_TEAM};
use indexmap::IndexMap;
use serde_yaml::Value;

/// Parses one rule file and normalizes its alerts.
///
/// Malformed YAML is logged and yields no alerts; it never fails the caller.
pub fn parse_alert_document(source: &str, text: &str) -> Vec<AlertRecord> {
    match serde_yaml::from_str::<Value>(text) {
        Ok(doc) => normalize_document(&doc),
        Err(e) => {
            tracing::error!(file = %source, error = %e, "Failed to parse rule file");
            Vec::new()
        }
    }
}

/// Converts a parsed `groups[].rules[]` document into alert records, one per
/// distinct alert name, in first-seen order.
pub fn normalize_document(doc: &Value) -> Vec<AlertRecord> {
    let Some(groups) = doc.get("groups").and_then(Value::as_sequence) else {
        tracing::warn!("Invalid or unexpected data structure in rule file");
        return Vec::new();
    };

    let mut alerts: IndexMap<String, AlertRecord> = IndexMap::new();
    for group in groups {
        let Some(rules) = group.get("rules").and_then(Value::as_sequence) else {
            continue;
        };
        for rule in rules {
            if let Some(record) = normalize_rule(rule) {
                merge_first_wins(&mut alerts, record.alert_name.clone(), record);
            }
        }
    }

    alerts.into_values().collect()
}

/// Builds a record from a single rule, or `None` when the rule lacks an
/// alert name or expression (recording rules, for instance).
fn normalize_rule(rule: &Value) -> Option<AlertRecord> {
    let alert_name = scalar_text(rule.get("alert")?)?;
    let expr = scalar_text(rule.get("expr")?)?;

    let labels = rule.get("labels");
    let annotations = rule.get("annotations");
    let label = |key: &str| labels.and_then(|l| l.get(key));
    let annotation = |key: &str| annotations.and_then(|a| a.get(key));

    let mut record = AlertRecord::new(alert_name, expr);
    record.threshold = extract_threshold(&record.expr);
    record.description = text_or(annotation("description"), NOT_AVAILABLE);
    record.summary = text_or(annotation("summary"), NOT_AVAILABLE);
    record.duration = text_or(rule.get("for"), NOT_AVAILABLE);
    record.component = text_or(label("component"), NOT_AVAILABLE);
    record.link = joined_or(label("link"), NOT_AVAILABLE);
    record.runbook = joined_or(label("runbook"), NOT_AVAILABLE);
    record.service = text_or(label("service"), NOT_AVAILABLE);
    record.team = text_or(label("team"), UNKNOWN_TEAM);
    record.severity = text_or(label("sev"), NOT_AVAILABLE);
    record
        .environments
        .insert(text_or(label("env"), NOT_AVAILABLE));
    Some(record)
}

/// Renders a scalar node as text. Empty strings, `null`, `false`, sequences
/// and mappings count as absent.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(scalar_text)
        .unwrap_or_else(|| default.to_string())
}

/// Joins a sequence of scalars with `", "`. Anything other than a non-empty
/// sequence falls back to `default`.
fn joined_or(value: Option<&Value>, default: &str) -> String {
    let joined = value
        .and_then(Value::as_sequence)
        .map(|items| {
            items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();
    if joined.is_empty() {
        default.to_string()
    } else {
        joined
    }
}
