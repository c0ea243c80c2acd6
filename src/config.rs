//! Runtime settings read from the environment.
//!
//! A `.env` file in the working directory is loaded first, so every
//! variable can also be pinned there.

use std::path::PathBuf;

use crate::classify::ClassifyMode;
use crate::error::ConfigError;
use crate::request::CommandOptions;

/// Where host interactions are served from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostMode {
    /// The real machine.
    #[default]
    Live,
    /// The real machine, with traffic written to a transcript.
    Record(PathBuf),
    /// A recorded transcript.
    Replay(PathBuf),
    /// The in-memory simulated host.
    Simulated,
}

/// Settings for one process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// How command output is classified.
    pub classify: ClassifyMode,
    /// Command composition knobs.
    pub commands: CommandOptions,
    /// `tracing` filter directive for diagnostics on stderr.
    pub log_filter: String,
    /// Where host interactions go.
    pub host: HostMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            classify: ClassifyMode::default(),
            commands: CommandOptions::default(),
            log_filter: "warn".into(),
            host: HostMode::Live,
        }
    }
}

impl Settings {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for malformed values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps variable names to values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for malformed values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get("WINNMT_CLASSIFY") {
            settings.classify = value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "WINNMT_CLASSIFY",
                value,
                expected: "exit-status or text",
            })?;
        }
        if let Some(value) = get("WINNMT_PRINCIPAL") {
            settings.commands.principal = value;
        }
        if let Some(value) = get("WINNMT_PERSISTENT") {
            settings.commands.persistent = parse_bool("WINNMT_PERSISTENT", value)?;
        }
        if let Some(value) = get("WINNMT_POWERSHELL") {
            settings.commands.powershell = value;
        }
        if let Some(value) = get("WINNMT_LOG") {
            settings.log_filter = value;
        }

        let simulate = get("WINNMT_SIMULATE")
            .map(|value| parse_bool("WINNMT_SIMULATE", value))
            .transpose()?
            .unwrap_or(false);
        settings.host = match (get("WINNMT_RECORD"), get("WINNMT_REPLAY")) {
            (Some(_), Some(_)) => return Err(ConfigError::RecordAndReplay),
            (Some(path), None) => HostMode::Record(PathBuf::from(path)),
            (None, Some(path)) => HostMode::Replay(PathBuf::from(path)),
            (None, None) if simulate => HostMode::Simulated,
            (None, None) => HostMode::Live,
        };
        Ok(settings)
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value, expected: "a boolean" }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let s = settings(&[]).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.classify, ClassifyMode::ExitStatus);
        assert_eq!(s.commands.principal, "Everyone");
        assert!(s.commands.persistent);
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("WINNMT_CLASSIFY", "text"),
            ("WINNMT_PRINCIPAL", "BUILTIN\\Users"),
            ("WINNMT_PERSISTENT", "no"),
            ("WINNMT_POWERSHELL", "pwsh"),
            ("WINNMT_LOG", "winnmt=debug"),
            ("WINNMT_SIMULATE", "1"),
        ])
        .unwrap();
        assert_eq!(s.classify, ClassifyMode::Text);
        assert_eq!(s.commands.principal, "BUILTIN\\Users");
        assert!(!s.commands.persistent);
        assert_eq!(s.commands.powershell, "pwsh");
        assert_eq!(s.log_filter, "winnmt=debug");
        assert_eq!(s.host, HostMode::Simulated);
    }

    #[test]
    fn transcripts_take_precedence_over_simulation() {
        let s = settings(&[("WINNMT_REPLAY", "host.yaml"), ("WINNMT_SIMULATE", "yes")]).unwrap();
        assert_eq!(s.host, HostMode::Replay(PathBuf::from("host.yaml")));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            settings(&[("WINNMT_CLASSIFY", "fuzzy")]),
            Err(ConfigError::InvalidValue { key: "WINNMT_CLASSIFY", .. })
        ));
        assert!(matches!(
            settings(&[("WINNMT_PERSISTENT", "maybe")]),
            Err(ConfigError::InvalidValue { key: "WINNMT_PERSISTENT", .. })
        ));
        assert_eq!(
            settings(&[("WINNMT_RECORD", "a.yaml"), ("WINNMT_REPLAY", "b.yaml")]),
            Err(ConfigError::RecordAndReplay)
        );
    }
}
