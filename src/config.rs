//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MBOXSPAM_CONFIG` (environment variable)
//! 2. `~/.config/mboxspam/config.toml` (Linux/macOS)
//!    `%APPDATA%\mboxspam\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Input and store locations.
    pub paths: PathsConfig,
    /// Mailbox parsing options.
    pub parse: ParseConfig,
    /// Report options.
    pub report: ReportConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Input and store locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Mailbox file to parse.
    pub input_path: PathBuf,
    /// SQLite database file.
    pub store_path: PathBuf,
    /// Delete existing rows before loading.
    pub clear_on_start: bool,
}

/// Mailbox parsing options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Fail on a message missing sender, weekday or confidence
    /// instead of skipping it.
    pub strict: bool,
}

/// Report options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Weekday abbreviations included in the filtered report.
    pub weekdays: Vec<String>,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("mbox-short.txt"),
            store_path: PathBuf::from("email_data.db"),
            clear_on_start: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            weekdays: vec!["Fri".to_string(), "Sat".to_string()],
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MBOXSPAM_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mboxspam").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mboxspam")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.paths.input_path, PathBuf::from("mbox-short.txt"));
        assert_eq!(cfg.paths.store_path, PathBuf::from("email_data.db"));
        assert!(!cfg.paths.clear_on_start);
        assert!(!cfg.parse.strict);
        assert_eq!(cfg.report.weekdays, vec!["Fri", "Sat"]);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[paths]
store_path = "/tmp/spam.db"
clear_on_start = true

[parse]
strict = true
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.paths.store_path, PathBuf::from("/tmp/spam.db"));
        assert!(cfg.paths.clear_on_start);
        assert!(cfg.parse.strict);
        // Other fields use defaults
        assert_eq!(cfg.paths.input_path, PathBuf::from("mbox-short.txt"));
        assert_eq!(cfg.report.weekdays, vec!["Fri", "Sat"]);
    }

    #[test]
    fn test_cache_dir_override() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/var/tmp/mboxspam"));
        assert_eq!(cache_dir(&cfg), PathBuf::from("/var/tmp/mboxspam"));
    }
}
