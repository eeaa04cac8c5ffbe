//! User settings stored as settings.json in the app data directory

use crate::constants::{DEFAULT_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS, ENDPOINT_ENV};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Prediction service
    pub endpoint: String,
    pub request_timeout_secs: u64,

    // Presentation
    pub animate_box: bool,

    // Paths
    pub last_open_dir: Option<String>,
    pub last_export_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            animate_box: true,
            last_open_dir: None,
            last_export_dir: None,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    /// Endpoint with the `SNEAKER_ENDPOINT` override applied
    pub fn resolved_endpoint(&self) -> String {
        Self::endpoint_with_override(&self.endpoint, std::env::var(ENDPOINT_ENV).ok())
    }

    fn endpoint_with_override(configured: &str, env: Option<String>) -> String {
        env.map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| configured.to_string())
    }

    pub fn last_open_dir_or_default(&self) -> PathBuf {
        self.last_open_dir
            .as_ref()
            .map(PathBuf::from)
            .filter(|p| p.is_dir())
            .or_else(dirs::picture_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn last_export_dir_or_default(&self) -> PathBuf {
        self.last_export_dir
            .as_ref()
            .map(PathBuf::from)
            .filter(|p| p.is_dir())
            .or_else(dirs::document_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert!(settings.animate_box);
    }

    #[test]
    fn saved_settings_are_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            endpoint: "http://gpu-box:5000/predict".into(),
            request_timeout_secs: 5,
            animate_box: false,
            ..Settings::default()
        };
        settings.save(dir.path());
        let loaded = Settings::load(dir.path());
        assert_eq!(loaded.endpoint, "http://gpu-box:5000/predict");
        assert_eq!(loaded.request_timeout_secs, 5);
        assert!(!loaded.animate_box);
    }

    #[test]
    fn partial_and_corrupt_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{"animate_box": false}"#).unwrap();
        let loaded = Settings::load(dir.path());
        assert!(!loaded.animate_box);
        assert_eq!(loaded.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

        std::fs::write(dir.path().join("settings.json"), "{ nope").unwrap();
        assert_eq!(Settings::load(dir.path()).endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn environment_overrides_endpoint() {
        assert_eq!(
            Settings::endpoint_with_override("http://a/predict", Some("http://b/predict".into())),
            "http://b/predict"
        );
        assert_eq!(Settings::endpoint_with_override("http://a/predict", Some("  ".into())), "http://a/predict");
        assert_eq!(Settings::endpoint_with_override("http://a/predict", None), "http://a/predict");
    }
}
