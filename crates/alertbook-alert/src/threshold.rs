use alertbook_common::types::NOT_AVAILABLE;
use regex::Regex;
use std::sync::OnceLock;

fn trailing_number() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?-u:\b)[0-9]+(?:\.[0-9]+)?$").expect("trailing number pattern is valid")
    })
}

/// Returns the numeric literal an alert expression ends with, or `"N/A"`.
///
/// The literal must start on an ASCII word boundary, so `rate_5m` yields
/// nothing while `rate > 5` yields `5`. Non-ASCII letters do not count as
/// word characters.
///
/// # Examples
///
/// ```
/// use alertbook_alert::threshold::extract_threshold;
///
/// assert_eq!(extract_threshold("node_load1 > 1.5"), "1.5");
/// assert_eq!(extract_threshold("up == 0"), "0");
/// assert_eq!(extract_threshold("absent(up)"), "N/A");
/// ```
pub fn extract_threshold(expr: &str) -> String {
    trailing_number()
        .find(expr)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
