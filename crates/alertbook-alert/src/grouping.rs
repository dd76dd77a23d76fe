use crate::merge_first_wins;
use alertbook_common::types::{AlertRecord, TeamAlerts, UNKNOWN_TEAM};
use indexmap::IndexMap;

fn team_of(alert: &AlertRecord) -> &str {
    if alert.team.is_empty() {
        UNKNOWN_TEAM
    } else {
        &alert.team
    }
}

/// Merges alerts from every processed document and partitions them by team.
///
/// Alerts are identified by `(team, alert_name)`. Duplicates contribute only
/// their environments to the first occurrence. Teams appear in the order they
/// were first seen; each team's alerts keep their first global occurrence
/// order.
pub fn group_alerts_by_team<I>(alerts: I) -> TeamAlerts
where
    I: IntoIterator<Item = AlertRecord>,
{
    let mut unique: IndexMap<(String, String), AlertRecord> = IndexMap::new();
    for alert in alerts {
        let key = (team_of(&alert).to_string(), alert.alert_name.clone());
        merge_first_wins(&mut unique, key, alert);
    }

    let mut grouped = TeamAlerts::new();
    for ((team, _), alert) in unique {
        grouped.entry(team).or_default().push(alert);
    }

    tracing::debug!(teams = grouped.len(), "Grouped alerts by team");
    grouped
}
