//! Per-environment alert override files.
//!
//! An override file disables alerts or whole rule groups for the environment
//! it belongs to:
//!
//! ```yaml
//! alert_overrides:
//!   - alertname: HighCpu
//!     enabled: "no"
//! group_overrides:
//!   - groupname: node
//!     enabled: "no"
//! ```

use alertbook_common::types::{NameEnvironments, OverrideSummary};
use serde_yaml::Value;

/// Derives the environment label from an override file key: the file name up
/// to its first `-`, upper-cased (`overrides/env1-overrides.yml` → `ENV1`).
pub fn environment_from_key(key: &str) -> String {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    file_name
        .split('-')
        .next()
        .unwrap_or(file_name)
        .to_uppercase()
}

/// Parses an override file. Unlike rule files, a malformed override file is
/// an error for the caller to handle.
pub fn parse_override_document(text: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

fn is_disabled(entry: &Value) -> bool {
    match entry.get("enabled") {
        Some(Value::String(s)) => s == "no",
        Some(Value::Bool(enabled)) => !enabled,
        _ => false,
    }
}

fn collect_disabled(
    doc: &Value,
    section: &str,
    name_key: &str,
    environment: &str,
    into: &mut NameEnvironments,
) {
    let Some(entries) = doc.get(section).and_then(Value::as_sequence) else {
        return;
    };
    for entry in entries.iter().filter(|e| is_disabled(e)) {
        let Some(name) = entry.get(name_key).and_then(Value::as_str) else {
            tracing::warn!(section, "Override entry without a name, skipping");
            continue;
        };
        let environments = into.entry(name.to_string()).or_default();
        if !environments.iter().any(|e| e == environment) {
            environments.push(environment.to_string());
        }
    }
}

/// Accumulates disabled alerts and groups across environments.
#[derive(Debug, Default)]
pub struct OverrideCollector {
    summary: OverrideSummary,
}

impl OverrideCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self, environment: &str, doc: &Value) {
        collect_disabled(
            doc,
            "alert_overrides",
            "alertname",
            environment,
            &mut self.summary.alerts,
        );
        collect_disabled(
            doc,
            "group_overrides",
            "groupname",
            environment,
            &mut self.summary.groups,
        );
    }

    pub fn finish(self) -> OverrideSummary {
        self.summary
    }
}
