//! Outbound notification endpoints.

use serde_json::json;
use thiserror::Error;

use crate::config::NotifyConfig;

/// Errors from a single notification attempt.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Connection, timeout or client construction failure. The request URL
    /// is stripped because the bot URL embeds its token.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Transport(e.without_url())
    }
}

/// A configured notification endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Chat webhook receiving `{"content": text}`.
    Webhook { url: String },
    /// Chat bot API receiving `{"chat_id", "text", "disable_web_page_preview"}`.
    Bot {
        api_base: String,
        token: String,
        chat_id: String,
    },
}

impl Target {
    /// Short label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Target::Webhook { .. } => "webhook",
            Target::Bot { .. } => "bot",
        }
    }

    /// Post `text` once. No retries.
    pub async fn send(&self, client: &reqwest::Client, text: &str) -> Result<(), NotifyError> {
        let (request, excerpt_limit) = match self {
            Target::Webhook { url } => (client.post(url).json(&json!({ "content": text })), 1024),
            Target::Bot {
                api_base,
                token,
                chat_id,
            } => {
                let url = format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), token);
                let body = json!({
                    "chat_id": chat_id,
                    "text": text,
                    "disable_web_page_preview": true,
                });
                (client.post(url).json(&body), 2048)
            }
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Status {
            status: status.as_u16(),
            body: truncate(&body, excerpt_limit).to_string(),
        })
    }
}

/// Build the enabled targets. A target missing any setting is skipped.
pub fn targets_from_config(config: &NotifyConfig) -> Vec<Target> {
    let mut targets = Vec::new();

    if let Some(url) = non_empty(&config.discord_webhook_url) {
        targets.push(Target::Webhook {
            url: url.to_string(),
        });
    }

    match (
        non_empty(&config.telegram_bot_token),
        non_empty(&config.telegram_chat_id),
    ) {
        (Some(token), Some(chat_id)) => targets.push(Target::Bot {
            api_base: config.telegram_api_base.clone(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        }),
        (None, None) => {}
        _ => tracing::warn!("Bot token and chat id must both be set; bot notifications disabled"),
    }

    targets
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
