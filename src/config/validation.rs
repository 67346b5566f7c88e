//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits, windows and timeouts > 0)
//! - Check addresses and outbound URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;
use crate::security::rate_limit::MAX_WINDOW;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rate_limit.requests must be positive")]
    ZeroRateLimit,

    #[error("rate_limit.window_secs must be positive")]
    ZeroRateWindow,

    #[error("rate_limit.window_secs must be at most {max}")]
    RateWindowTooLarge { max: u64 },

    #[error("rate_limit.sweep_interval_secs must be positive")]
    ZeroSweepInterval,

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("storage.log_path must not be empty")]
    EmptyLogPath,

    #[error("limits.max_body_bytes must be positive")]
    ZeroBodyLimit,

    #[error("timeouts.request_secs must be positive")]
    ZeroRequestTimeout,

    #[error("notify.timeout_secs must be positive")]
    ZeroNotifyTimeout,

    #[error("notify.queue_capacity must be positive")]
    ZeroQueueCapacity,

    #[error("{field} is not an http(s) URL: '{value}'")]
    InvalidUrl { field: &'static str, value: String },
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rate_limit.requests == 0 {
        errors.push(ValidationError::ZeroRateLimit);
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroRateWindow);
    } else if config.rate_limit.window_secs > MAX_WINDOW.as_secs() {
        errors.push(ValidationError::RateWindowTooLarge {
            max: MAX_WINDOW.as_secs(),
        });
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_addr(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.storage.log_path.trim().is_empty() {
        errors.push(ValidationError::EmptyLogPath);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let notify = &config.notify;
    if notify.timeout_secs == 0 {
        errors.push(ValidationError::ZeroNotifyTimeout);
    }
    if notify.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }
    if let Some(url) = notify.discord_webhook_url.as_deref().filter(|u| !u.is_empty()) {
        check_url(&mut errors, "notify.discord_webhook_url", url);
    }
    check_url(&mut errors, "notify.telegram_api_base", &notify.telegram_api_base);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let ok = Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false);
    if !ok {
        errors.push(ValidationError::InvalidUrl {
            field,
            value: value.to_string(),
        });
    }
}
