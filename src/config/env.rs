//! Environment-style configuration sources.
//!
//! The process environment is snapshotted once, then a `.env` file is layered
//! on top of it. Nothing is written back into the process environment.

use std::collections::HashMap;
use std::path::Path;

/// A snapshot of `KEY=value` settings.
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// An empty set of variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Snapshot the process environment, then overlay the dotenv file at `path`.
    ///
    /// A missing file is not an error.
    pub fn from_process_and_file(path: &Path) -> Result<Self, dotenvy::Error> {
        let mut env = Self::from_process();
        env.overlay_file(path)?;
        Ok(env)
    }

    /// Overlay entries parsed from a dotenv file. Entries from the file win.
    pub fn overlay_file(&mut self, path: &Path) -> Result<(), dotenvy::Error> {
        let entries = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter.collect::<Result<Vec<_>, _>>()?,
            Err(e) if e.not_found() => return Ok(()),
            Err(e) => return Err(e),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "Loaded env file");
        self.vars.extend(entries);
        Ok(())
    }

    /// Set a single variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Look up a variable. Empty values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_overlay_dotenv_syntax() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "# comment\nRATE_LIMIT=10\nexport TELEGRAM_CHAT_ID=12345\nDISCORD_WEBHOOK_URL=\"https://example.com/hook?a=b\"\nEMPTY=\n"
        )
        .unwrap();

        let mut env = EnvVars::new();
        env.overlay_file(file.path()).unwrap();

        assert_eq!(env.get("RATE_LIMIT"), Some("10"));
        assert_eq!(env.get("TELEGRAM_CHAT_ID"), Some("12345"));
        assert_eq!(env.get("DISCORD_WEBHOOK_URL"), Some("https://example.com/hook?a=b"));
        assert_eq!(env.get("EMPTY"), None);
    }

    #[test]
    fn test_file_overrides_existing() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "RATE_LIMIT=9").unwrap();

        let mut env: EnvVars = [("RATE_LIMIT", "3"), ("OTHER", "x")].into_iter().collect();
        env.overlay_file(file.path()).unwrap();

        assert_eq!(env.get("RATE_LIMIT"), Some("9"));
        assert_eq!(env.get("OTHER"), Some("x"));
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let mut env = EnvVars::new();
        env.overlay_file(Path::new("/definitely/not/here/.env")).unwrap();
        assert_eq!(env.get("ANYTHING"), None);
    }

    #[test]
    fn test_empty_value_is_unset() {
        let env: EnvVars = [("TELEGRAM_BOT_TOKEN", "")].into_iter().collect();
        assert_eq!(env.get("TELEGRAM_BOT_TOKEN"), None);
    }
}
