//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::env::EnvVars;
use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the optional TOML file, then `env`.
///
/// The merged result is validated before it is returned.
pub fn load_config(path: Option<&Path>, env: &EnvVars) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env(&mut config, env);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply recognized environment keys on top of `config`.
///
/// Numeric keys that are not positive integers are ignored with a warning.
pub fn apply_env(config: &mut AppConfig, env: &EnvVars) {
    if let Some(v) = env.get("BIND_ADDRESS") {
        config.listener.bind_address = v.to_string();
    }
    if let Some(v) = env.get("LOG_PATH") {
        config.storage.log_path = v.to_string();
    }
    if let Some(v) = env.get("DISCORD_WEBHOOK_URL") {
        config.notify.discord_webhook_url = Some(v.to_string());
    }
    if let Some(v) = env.get("TELEGRAM_BOT_TOKEN") {
        config.notify.telegram_bot_token = Some(v.to_string());
    }
    if let Some(v) = env.get("TELEGRAM_CHAT_ID") {
        config.notify.telegram_chat_id = Some(v.to_string());
    }
    if let Some(n) = positive(env, "RATE_LIMIT") {
        config.rate_limit.requests = n;
    }
    if let Some(n) = positive(env, "RATE_WINDOW_SECONDS") {
        config.rate_limit.window_secs = n;
    }
}

fn positive<T>(env: &EnvVars, key: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let raw = env.get(key)?;
    match raw.trim().parse::<T>() {
        Ok(n) if n > T::default() => Some(n),
        _ => {
            tracing::warn!(key, value = raw, "Ignoring non-positive or malformed setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None, &EnvVars::new()).unwrap();
        assert_eq!(config.rate_limit.requests, 5);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[rate_limit]
requests = 20
window_secs = 30

[storage]
log_path = "/var/log/api-logger/logins.jsonl"
"#
        )
        .unwrap();

        let env: EnvVars = [
            ("RATE_LIMIT", "3"),
            ("DISCORD_WEBHOOK_URL", "https://example.com/hook"),
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ]
        .into_iter()
        .collect();

        let config = load_config(Some(file.path()), &env).unwrap();
        assert_eq!(config.rate_limit.requests, 3);
        assert_eq!(config.rate_limit.window_secs, 30);
        assert_eq!(config.storage.log_path, "/var/log/api-logger/logins.jsonl");
        assert_eq!(
            config.notify.discord_webhook_url.as_deref(),
            Some("https://example.com/hook")
        );
        assert_eq!(config.notify.telegram_bot_token.as_deref(), Some("123:abc"));
        assert!(config.notify.telegram_chat_id.is_none());
    }

    #[test]
    fn test_invalid_numbers_ignored() {
        let env: EnvVars = [("RATE_LIMIT", "0"), ("RATE_WINDOW_SECONDS", "soon")]
            .into_iter()
            .collect();
        let config = load_config(None, &env).unwrap();
        assert_eq!(config.rate_limit.requests, 5);
        assert_eq!(config.rate_limit.window_secs, 60);
    }

    #[test]
    fn test_huge_env_window_rejected() {
        let env: EnvVars = [("RATE_WINDOW_SECONDS", u64::MAX.to_string())]
            .into_iter()
            .collect();
        let err = load_config(None, &env).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref e)
                if e == &[ValidationError::RateWindowTooLarge { max: 604_800 }]
        ));
    }

    #[test]
    fn test_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[rate_limit\nrequests = ").unwrap();
        let err = load_config(Some(file.path()), &EnvVars::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_surfaces() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[rate_limit]\nrequests = 0").unwrap();
        let err = load_config(Some(file.path()), &EnvVars::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("rate_limit.requests"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/nope/config.toml")), &EnvVars::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
