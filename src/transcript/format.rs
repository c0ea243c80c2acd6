//! Transcript file format.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One call made through a port and the host's answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Exchange {
    /// Position in the whole transcript.
    pub seq: u64,
    /// Port name (`runner`, `inventory`).
    pub port: String,
    /// Method called on the port.
    pub call: String,
    /// What was asked.
    pub request: serde_json::Value,
    /// What came back, `{"Ok": ..}` or `{"Err": ..}`.
    pub response: serde_json::Value,
}

/// A recorded session against one host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    /// Session label.
    pub name: String,
    /// When recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Machine the session ran on.
    pub host: String,
    /// Calls in the order they happened.
    pub exchanges: Vec<Exchange>,
}

impl Transcript {
    /// Reads a YAML transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read transcript {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse transcript {}: {e}", path.display()))
    }
}

/// Best-effort name of the local machine.
#[must_use]
pub fn host_name() -> String {
    ["COMPUTERNAME", "HOSTNAME"]
        .iter()
        .find_map(|key| std::env::var(key).ok())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_reports_missing_file() {
        let err = Transcript::load(Path::new("/nonexistent/winnmt.transcript.yaml")).unwrap_err();
        assert!(err.starts_with("Failed to read transcript"));
    }

    #[test]
    fn yaml_keeps_exchange_payloads() {
        let transcript = Transcript {
            name: "t".into(),
            recorded_at: Utc::now(),
            host: "WS01".into(),
            exchanges: vec![Exchange {
                seq: 0,
                port: "runner".into(),
                call: "run".into(),
                request: json!({"intent": "map_drive"}),
                response: json!({"Ok": {"output": "ok", "exit_code": 0}}),
            }],
        };
        let yaml = serde_yaml::to_string(&transcript).unwrap();
        assert!(yaml.contains("map_drive"));
        let back: Transcript = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.exchanges[0].response["Ok"]["exit_code"], json!(0));
    }
}
