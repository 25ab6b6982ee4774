//! Configuration loading and representation.
//!
//! Configuration is a TOML document with `[database]`, `[audit]` and
//! `[logging]` sections; every key is optional. A handful of environment
//! variables override the file (see the `*_ENV` constants).

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Deserialize;

use polybase_observability::LoggingConfig;

/// Overrides `database.path`.
pub const DATABASE_ENV: &str = "POLYBASE_DATABASE";
/// Overrides `audit.path`; set it to an empty string to disable auditing.
pub const AUDIT_LOG_ENV: &str = "POLYBASE_AUDIT_LOG";
/// Overrides `logging.json` (`true`/`false`/`1`/`0`).
pub const LOG_JSON_ENV: &str = "POLYBASE_LOG_JSON";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub audit: AuditConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/var/lib/polybase/polybase.db"),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Audit log file. Empty disables the audit trail.
    pub path: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: "/var/log/polybase/polybase.log".to_string(),
        }
    }
}

impl Config {
    /// Read a TOML file, apply environment overrides, then validate.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;
        let mut config = Self::parse(&raw)
            .with_context(|| format!("invalid configuration file {}", path.display()))?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, validated.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).context("failed to parse TOML configuration")
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(DATABASE_ENV) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(path) = lookup(AUDIT_LOG_ENV) {
            self.audit.path = path;
        }
        if let Some(raw) = lookup(LOG_JSON_ENV) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => self.logging.json = true,
                "0" | "false" => self.logging.json = false,
                other => tracing::warn!("ignoring {LOG_JSON_ENV}={other:?}: expected true or false"),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.path.as_os_str().is_empty() {
            bail!("database.path is required");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = Config::parse("[database]\npath = \"/tmp/polybase.db\"\n").unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/polybase.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.audit, AuditConfig::default());
        assert!(!config.logging.json);
    }

    #[test]
    fn full_document_parses() {
        let raw = r#"
            [database]
            path = "polybase.db"
            max_connections = 2

            [audit]
            path = ""

            [logging]
            json = true
            filter = "debug"
        "#;
        let config = Config::parse(raw).unwrap();
        assert_eq!(config.database.max_connections, 2);
        assert!(config.audit.path.is_empty());
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "debug");
        config.validate().unwrap();
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            DATABASE_ENV => Some("/srv/polybase.db".to_string()),
            AUDIT_LOG_ENV => Some(String::new()),
            LOG_JSON_ENV => Some("TRUE".to_string()),
            _ => None,
        });
        assert_eq!(config.database.path, PathBuf::from("/srv/polybase.db"));
        assert!(config.audit.path.is_empty());
        assert!(config.logging.json);
    }

    #[test]
    fn zero_connections_is_rejected() {
        let config = Config::parse("[database]\nmax_connections = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load("/nonexistent/polybase.toml").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/polybase.toml"));
    }
}
