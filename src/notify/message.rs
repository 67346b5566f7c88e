//! Human-readable login summaries.

use std::fmt::Write as _;

use serde_json::Value;

/// Fields pulled from a redacted `/login` payload for notification text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginSummary {
    pub username: String,
    pub ip: String,
    pub platform: String,
    pub language: String,
    pub screen: Option<(u64, u64)>,
    pub timestamp: String,
}

impl LoginSummary {
    /// Extract the recognized convenience fields. Missing or mistyped fields
    /// are left empty.
    pub fn from_payload(client: &Value, ip: &str, timestamp: &str) -> Self {
        let device = client.get("device");
        let screen = device.and_then(|d| d.get("screen"));
        let width = screen.and_then(|s| s.get("width")).and_then(as_dimension);
        let height = screen.and_then(|s| s.get("height")).and_then(as_dimension);

        Self {
            username: text_field(client.get("username")),
            ip: ip.to_string(),
            platform: text_field(device.and_then(|d| d.get("platform"))),
            language: text_field(device.and_then(|d| d.get("language"))),
            screen: width.zip(height).filter(|(w, h)| *w > 0 && *h > 0),
            timestamp: timestamp.to_string(),
        }
    }

    /// Render the plain-text message sent to every target.
    pub fn compose(&self) -> String {
        let mut out = String::from("New connection:\n");
        push_line(&mut out, "user", &self.username);
        push_line(&mut out, "ip", &self.ip);
        push_line(&mut out, "os", &self.platform);
        push_line(&mut out, "lang", &self.language);
        if let Some((w, h)) = self.screen {
            let _ = writeln!(out, "- screen: {}x{}", w, h);
        }
        push_line(&mut out, "time", &self.timestamp);
        out
    }
}

fn push_line(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "- {}: {}", label, value);
    }
}

fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
        _ => String::new(),
    }
}

fn as_dimension(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_summary() {
        let client = json!({
            "username": "bob",
            "password": "[redacted]",
            "device": {
                "platform": "Linux x86_64",
                "language": "en-US",
                "screen": {"width": 1920, "height": 1080}
            }
        });
        let summary = LoginSummary::from_payload(&client, "203.0.113.9", "2024-05-01T12:00:00Z");

        assert_eq!(
            summary.compose(),
            "New connection:\n\
             - user: bob\n\
             - ip: 203.0.113.9\n\
             - os: Linux x86_64\n\
             - lang: en-US\n\
             - screen: 1920x1080\n\
             - time: 2024-05-01T12:00:00Z\n"
        );
    }

    #[test]
    fn test_missing_fields_are_skipped() {
        let summary = LoginSummary::from_payload(&json!({}), "", "2024-05-01T12:00:00Z");
        assert_eq!(summary.compose(), "New connection:\n- time: 2024-05-01T12:00:00Z\n");
    }

    #[test]
    fn test_loose_types() {
        let client = json!({
            "username": 42,
            "device": {"platform": ["x"], "screen": {"width": "800", "height": 600.7}}
        });
        let summary = LoginSummary::from_payload(&client, "ip", "t");
        assert_eq!(summary.username, "42");
        assert_eq!(summary.platform, "");
        assert_eq!(summary.screen, Some((800, 600)));
    }

    #[test]
    fn test_zero_screen_omitted() {
        let client = json!({"device": {"screen": {"width": 0, "height": 600}}});
        let summary = LoginSummary::from_payload(&client, "ip", "t");
        assert_eq!(summary.screen, None);
        assert!(!summary.compose().contains("screen"));
    }

    #[test]
    fn test_redacted_values_stay_redacted() {
        let client = json!({"username": "[redacted]"});
        let text = LoginSummary::from_payload(&client, "ip", "t").compose();
        assert!(text.contains("- user: [redacted]"));
    }
}
