//! Alert variable sheets: a YAML list of entries keyed by the table's column
//! names.
//!
//! ```yaml
//! - Alert Name: HighCpu
//!   Service: node
//!   Threshold: 90
//!   Level: P2
//!   Creator: sre-team
//! ```

use crate::error::{DocumentError, Result};
use crate::normalize::scalar_text;
use alertbook_common::types::{VariableRow, VARIABLE_COLUMNS};
use serde_yaml::Value;

/// Parses a variable sheet. Anything other than a top-level list is an
/// error; entries keep file order.
pub fn parse_variable_document(text: &str) -> Result<Vec<VariableRow>> {
    let doc: Value = serde_yaml::from_str(text)?;
    let Value::Sequence(entries) = &doc else {
        return Err(DocumentError::NotAList {
            found: kind_of(&doc),
        });
    };
    Ok(entries.iter().map(variable_row).collect())
}

fn variable_row(entry: &Value) -> VariableRow {
    if !entry.is_mapping() {
        tracing::warn!(found = kind_of(entry), "Variable entry is not a mapping");
    }
    VariableRow {
        cells: VARIABLE_COLUMNS
            .iter()
            .map(|column| entry.get(*column).and_then(scalar_text).unwrap_or_default())
            .collect(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
