use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

const CONFIG_FILE_PATH: &str = "guide.toml";
const DEFAULT_SESSION_ID: &str = "default";
const DEFAULT_REPLY_DELAY_MS: u64 = 1200;
const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Root directory for persisted sessions
    pub data_dir: PathBuf,
    pub session_id: String,
    /// Pause before a reply is delivered
    pub reply_delay_ms: u64,
    pub history_limit: usize,
    /// Optional JSON verse catalog replacing the built-in one
    pub verses_path: Option<PathBuf>,
}

pub fn guide_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
        .join(".gita_guide")
}

fn guide_config_json_path() -> PathBuf {
    guide_dir().join("config.json")
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            data_dir: guide_dir(),
            session_id: DEFAULT_SESSION_ID.to_string(),
            reply_delay_ms: DEFAULT_REPLY_DELAY_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            verses_path: None,
        }
    }
}

impl GuideConfig {
    /// Config from `~/.gita_guide/config.json`, else `./guide.toml`, then the
    /// `GUIDE_*` environment variables.
    pub fn load() -> Result<Self> {
        let mut config =
            Self::from_files(&guide_config_json_path(), Path::new(CONFIG_FILE_PATH))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// The JSON file wins when both exist; missing files yield defaults.
    pub fn from_files(json_path: &Path, toml_path: &Path) -> Result<Self> {
        if json_path.exists() {
            let content = std::fs::read_to_string(json_path)?;
            let config = serde_json::from_str(&content).map_err(|e| {
                SessionError::Config(format!("{}: {}", json_path.display(), e))
            })?;
            tracing::debug!("Loaded config from {}", json_path.display());
            return Ok(config);
        }

        if toml_path.exists() {
            let content = std::fs::read_to_string(toml_path)?;
            let config = toml::from_str(&content).map_err(|e| {
                SessionError::Config(format!("{}: {}", toml_path.display(), e))
            })?;
            tracing::debug!("Loaded config from {}", toml_path.display());
            return Ok(config);
        }

        Ok(Self::default())
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("GUIDE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(session) = lookup("GUIDE_SESSION") {
            self.session_id = session;
        }
        if let Some(delay) = lookup("GUIDE_REPLY_DELAY_MS") {
            self.reply_delay_ms = parse_number("GUIDE_REPLY_DELAY_MS", &delay)?;
        }
        if let Some(limit) = lookup("GUIDE_HISTORY_LIMIT") {
            self.history_limit = parse_number("GUIDE_HISTORY_LIMIT", &limit)?;
        }
        if let Some(path) = lookup("GUIDE_VERSES_PATH") {
            self.verses_path = Some(PathBuf::from(path));
        }
        Ok(())
    }

    /// Directory holding one subdirectory per session
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    /// Directory holding the entries of the configured session
    pub fn session_dir(&self) -> PathBuf {
        self.sessions_dir().join(&self.session_id)
    }

    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SessionError::Config(format!("{} must be a number, got '{}'", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempdir().unwrap();
        let config =
            GuideConfig::from_files(&dir.path().join("none.json"), &dir.path().join("none.toml"))
                .unwrap();
        assert_eq!(config.reply_delay_ms, 1200);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.session_id, "default");
    }

    #[test]
    fn test_json_file_wins_over_toml() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("config.json");
        let toml_path = dir.path().join("guide.toml");
        std::fs::write(&json_path, r#"{"session_id": "from-json"}"#).unwrap();
        std::fs::write(&toml_path, "session_id = \"from-toml\"\n").unwrap();

        let config = GuideConfig::from_files(&json_path, &toml_path).unwrap();
        assert_eq!(config.session_id, "from-json");
        // Unset fields keep their defaults
        assert_eq!(config.history_limit, 10);
    }

    #[test]
    fn test_toml_file_partial() {
        let dir = tempdir().unwrap();
        let toml_path = dir.path().join("guide.toml");
        std::fs::write(&toml_path, "reply_delay_ms = 0\nhistory_limit = 4\n").unwrap();

        let config = GuideConfig::from_files(&dir.path().join("none.json"), &toml_path).unwrap();
        assert_eq!(config.reply_delay(), Duration::ZERO);
        assert_eq!(config.history_limit, 4);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, "{oops").unwrap();

        let err = GuideConfig::from_files(&json_path, &dir.path().join("none.toml")).unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("GUIDE_DATA_DIR", "/tmp/guide"),
            ("GUIDE_SESSION", "evening"),
            ("GUIDE_REPLY_DELAY_MS", " 250 "),
            ("GUIDE_VERSES_PATH", "/tmp/verses.json"),
        ]
        .into_iter()
        .collect();

        let mut config = GuideConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.reply_delay_ms, 250);
        assert_eq!(config.sessions_dir(), PathBuf::from("/tmp/guide/sessions"));
        assert_eq!(config.session_dir(), PathBuf::from("/tmp/guide/sessions/evening"));
        assert_eq!(config.verses_path, Some(PathBuf::from("/tmp/verses.json")));
    }

    #[test]
    fn test_env_override_rejects_non_numbers() {
        let mut config = GuideConfig::default();
        let err = config
            .apply_overrides(|key| (key == "GUIDE_HISTORY_LIMIT").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
    }
}
