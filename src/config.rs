use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Hard ceiling on recipients per send run
pub const MAX_RECIPIENTS: usize = 250;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Credentials
    pub api_token: String,
    pub phone_number_id: String,
    pub waba_id: String,

    // Graph API
    pub graph_base_url: String,
    pub templates_api_version: String,
    pub messages_api_version: String,
    pub language_code: String,
    pub request_timeout_secs: u64,

    // Sending
    pub max_recipients: usize,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            phone_number_id: String::new(),
            waba_id: String::new(),
            graph_base_url: "https://graph.facebook.com".to_string(),
            templates_api_version: "v23.0".to_string(),
            messages_api_version: "v19.0".to_string(),
            language_code: "en_US".to_string(),
            request_timeout_secs: 30,
            max_recipients: MAX_RECIPIENTS,
            log_level: "INFO".to_string(),
        }
    }
}

/// Account credentials used by every Graph API call
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
    pub api_token: String,
    pub phone_number_id: String,
    pub waba_id: String,
}

// Keeps the token out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_token", &"<redacted>")
            .field("phone_number_id", &self.phone_number_id)
            .field("waba_id", &self.waba_id)
            .finish()
    }
}

impl Credentials {
    pub fn has_token(&self) -> bool {
        !self.api_token.trim().is_empty()
    }
}

impl Config {
    /// Load config from the default location, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    let backup_path = path.with_extension("json.corrupt");
                    let _ = std::fs::rename(path, &backup_path);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        config.apply_env();
        config.clamp();
        Ok(config)
    }

    /// Write a default config unless one exists; true when a file was written.
    ///
    /// Defaults only, so no token from the environment or flags lands on disk.
    pub fn init_file(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("WABULK_API_TOKEN") {
            self.api_token = v;
        }
        if let Ok(v) = std::env::var("WABULK_PHONE_NUMBER_ID") {
            self.phone_number_id = v;
        }
        if let Ok(v) = std::env::var("WABULK_WABA_ID") {
            self.waba_id = v;
        }
    }

    fn clamp(&mut self) {
        if self.max_recipients == 0 || self.max_recipients > MAX_RECIPIENTS {
            tracing::warn!(
                "⚠️ max_recipients {} out of range, using {}",
                self.max_recipients,
                MAX_RECIPIENTS
            );
            self.max_recipients = MAX_RECIPIENTS;
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = 30;
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_token: self.api_token.trim().to_string(),
            phone_number_id: self.phone_number_id.trim().to_string(),
            waba_id: self.waba_id.trim().to_string(),
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wabulk")
        .join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.language_code, "en_US");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.max_recipients, 250);
        assert_eq!(config.templates_api_version, "v23.0");
        assert_eq!(config.messages_api_version, "v19.0");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"waba_id": "123", "max_recipients": 9000}"#).unwrap();

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.waba_id, "123");
        assert_eq!(config.max_recipients, MAX_RECIPIENTS);
        assert_eq!(config.graph_base_url, "https://graph.facebook.com");
    }

    #[test]
    fn test_corrupt_file_falls_back_and_is_backed_up() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not valid json").unwrap();

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.language_code, "en_US");
        assert!(!path.exists());
        assert!(dir.path().join("config.json.corrupt").exists());
    }

    #[test]
    fn test_init_file_writes_defaults_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.json");

        assert!(Config::init_file(&path).expect("init"));
        let written: Config =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(written.api_token.is_empty());

        std::fs::write(&path, r#"{"waba_id": "kept"}"#).unwrap();
        assert!(!Config::init_file(&path).expect("init"));
        assert!(std::fs::read_to_string(&path).unwrap().contains("kept"));
    }

    #[test]
    fn test_credentials_debug_hides_token() {
        let creds = Credentials {
            api_token: "secret-token".into(),
            phone_number_id: "42".into(),
            waba_id: "7".into(),
        };
        let printed = format!("{:?}", creds);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("42"));
    }
}
