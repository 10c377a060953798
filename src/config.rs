//! Launch configuration.
//!
//! Optional `~/.resupply/config.json`. Every field has a default, so a missing
//! file is not an error; an unreadable or malformed one is worth surfacing.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the database (defaults to `~/.resupply`).
    pub data_dir: Option<PathBuf>,
    /// Fire-loop poll interval override, in seconds.
    pub poll_interval_secs: Option<u64>,
}

impl Config {
    /// Load `~/.resupply/config.json`, falling back to defaults when the file
    /// doesn't exist.
    pub fn load() -> Result<Self, String> {
        let home = dirs::home_dir().ok_or("Could not find home directory")?;
        let config_path = home.join(".resupply").join("config.json");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Database path implied by the data-dir override, if any.
    pub fn db_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("resupply.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_fields() {
        let config: Config =
            serde_json::from_str(r#"{"dataDir": "/tmp/supplies", "pollIntervalSecs": 30}"#)
                .expect("parse");
        assert_eq!(config.data_dir.as_deref(), Some(std::path::Path::new("/tmp/supplies")));
        assert_eq!(config.poll_interval_secs, Some(30));
        assert_eq!(
            config.db_path().as_deref(),
            Some(std::path::Path::new("/tmp/supplies/resupply.db"))
        );
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config: Config = serde_json::from_str("{}").expect("parse");
        assert!(config.data_dir.is_none());
        assert!(config.poll_interval_secs.is_none());
        assert!(config.db_path().is_none());
    }
}
