//! Board configuration.
//!
//! # Responsibility
//! - Hold tunables for defaults, reactivation ordering and presentation
//!   timeouts.
//! - Parse partial JSON documents; absent fields keep their defaults.
//! - Start logging at the configured level.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Projects created on first load.
pub const DEFAULT_PROJECTS: [&str; 2] = ["Work", "Personal"];
/// Fallback deadline for a pending presentation.
pub const DEFAULT_PRESENTATION_TIMEOUT_MS: u64 = 1_000;

/// How a completed task is re-ranked when toggled back to active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReactivationPolicy {
    /// Place the task after all active tasks of its project.
    #[default]
    AppendToEnd,
    /// Keep the priority the task had when it was completed. It may collide
    /// with tasks added since.
    KeepStale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardConfig {
    /// Project list used when nothing is persisted.
    pub default_projects: Vec<String>,
    pub reactivation: ReactivationPolicy,
    /// Deadline after which a pending presentation completes on its own.
    pub presentation_timeout_ms: u64,
    /// Level passed to `init_logging` by `BoardConfig::init_logging`.
    pub log_level: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            default_projects: DEFAULT_PROJECTS.iter().map(|name| name.to_string()).collect(),
            reactivation: ReactivationPolicy::default(),
            presentation_timeout_ms: DEFAULT_PRESENTATION_TIMEOUT_MS,
            log_level: crate::logging::default_log_level().to_string(),
        }
    }
}

/// Errors from configuration parsing.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    /// Timeout must be positive.
    ZeroPresentationTimeout,
    /// A default project name fails project validation.
    InvalidDefaultProject(String),
    /// Log level is not one of trace, debug, info, warn, error.
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid board config: {err}"),
            Self::ZeroPresentationTimeout => {
                write!(f, "presentationTimeoutMs must be greater than zero")
            }
            Self::InvalidDefaultProject(name) => {
                write!(f, "invalid default project name: `{name}`")
            }
            Self::InvalidLogLevel(level) => write!(f, "invalid log level: `{level}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl BoardConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.presentation_timeout_ms == 0 {
            return Err(ConfigError::ZeroPresentationTimeout);
        }
        for name in &self.default_projects {
            crate::model::project::validate_project_name(name)
                .map_err(|_| ConfigError::InvalidDefaultProject(name.clone()))?;
        }
        crate::logging::normalize_level(&self.log_level)
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))?;
        Ok(())
    }

    /// Starts file logging at `log_level` into absolute directory `log_dir`.
    pub fn init_logging(&self, log_dir: &str) -> Result<(), String> {
        crate::logging::init_logging(&self.log_level, log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardConfig, ConfigError, ReactivationPolicy};

    #[test]
    fn defaults_match_initial_board() {
        let config = BoardConfig::default();
        assert_eq!(config.default_projects, vec!["Work", "Personal"]);
        assert_eq!(config.reactivation, ReactivationPolicy::AppendToEnd);
        assert_eq!(config.presentation_timeout_ms, 1_000);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            BoardConfig::from_json(r#"{"reactivation":"keep_stale","presentationTimeoutMs":250}"#)
                .unwrap();
        assert_eq!(config.reactivation, ReactivationPolicy::KeepStale);
        assert_eq!(config.presentation_timeout_ms, 250);
        assert_eq!(config.default_projects, vec!["Work", "Personal"]);
    }

    #[test]
    fn rejects_zero_timeout_and_blank_projects() {
        let err = BoardConfig::from_json(r#"{"presentationTimeoutMs":0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPresentationTimeout));

        let err = BoardConfig::from_json(r#"{"defaultProjects":["  "]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefaultProject(_)));
    }

    #[test]
    fn log_level_is_validated() {
        let config = BoardConfig::from_json(r#"{"logLevel":"WARNING"}"#).unwrap();
        assert_eq!(config.log_level, "WARNING");

        let err = BoardConfig::from_json(r#"{"logLevel":"verbose"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogLevel(ref level) if level == "verbose"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = BoardConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
