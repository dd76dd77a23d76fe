//! Helpers for logging wiki traffic.

use serde_json::Value;

/// Maximum number of bytes of a response body kept in log lines.
pub const MAX_BODY_LENGTH: usize = 4000;

/// Truncates `s` to at most `max_len` bytes, backing off to the nearest char
/// boundary so multi-byte characters are never split.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... [truncated]", &s[..end])
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_lowercase();
    key.contains("token")
        || key.contains("password")
        || key.contains("secret")
        || key.contains("api_key")
        || key.contains("credentials")
}

/// Replaces the values of credential-like keys with `"***"`, recursively.
///
/// Used before configuration or credentials are written to the log.
pub fn redact_sensitive_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| {
                    let val = if is_sensitive_key(key) {
                        Value::String("***".to_string())
                    } else {
                        redact_sensitive_json(val)
                    };
                    (key.clone(), val)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_sensitive_json).collect()),
        _ => value.clone(),
    }
}
