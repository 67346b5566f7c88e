//! Redaction of sensitive fields in caller-supplied JSON.

use serde_json::Value;

/// Replacement for every sensitive value.
pub const PLACEHOLDER: &str = "[redacted]";

/// Object keys whose values are never persisted or forwarded. Matched
/// case-insensitively.
pub const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "pass",
    "pwd",
    "token",
    "auth",
    "authorization",
    "apikey",
    "api_key",
    "api-key",
    "secret",
    "refresh_token",
];

/// Whether `key` names a sensitive field.
///
/// Keys are folded with Unicode lowercase rules, so `\u{212A}` matches `k`
/// and `\u{130}` matches `i`.
pub fn is_sensitive_key(key: &str) -> bool {
    let folded: String = key
        .chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect();
    SENSITIVE_KEYS.contains(&folded.as_str())
}

/// Redact `value`, returning the cleaned tree.
pub fn redact(mut value: Value) -> Value {
    redact_in_place(&mut value);
    value
}

/// Redact `value` in place.
///
/// The value under a sensitive key is replaced wholesale, whatever its shape.
/// Other objects and arrays are walked recursively; scalars pass through.
pub fn redact_in_place(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if is_sensitive_key(key) {
                    *child = Value::String(PLACEHOLDER.to_string());
                } else {
                    redact_in_place(child);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_in_place),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}
