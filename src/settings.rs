use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cdn::DEFAULT_CDN;

pub const DEFAULT_API_BASE_URL: &str = "https://ophim1.com/v1/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub api_base_url: String,
    pub image_cdn: String,
    pub suggest_debounce_ms: u64,
    pub suggest_min_chars: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: String::from(DEFAULT_API_BASE_URL),
            image_cdn: String::from(DEFAULT_CDN),
            suggest_debounce_ms: 500,
            suggest_min_chars: 2,
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("ophix")
                .join("config.json")
        })
    }

    pub fn load() -> Option<Self> {
        let path = Self::config_path()?;
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content)
            .inspect_err(|e| warn!(error = %e, "ignoring malformed config file"))
            .ok()
    }

    pub fn save(&self) -> Result<(), String> {
        let path = Self::config_path().ok_or("Could not determine config path")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())
    }

    pub fn resolve() -> Self {
        let settings = match Self::load() {
            Some(settings) => settings,
            None => {
                let settings = Self::default();
                if Self::config_path().is_some_and(|p| !p.exists()) {
                    match settings.save() {
                        Ok(()) => info!("wrote default config"),
                        Err(e) => warn!(error = %e, "could not write default config"),
                    }
                }
                settings
            }
        };
        settings.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = lookup("OPHIX_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(cdn) = lookup("OPHIX_IMAGE_CDN") {
            self.image_cdn = cdn;
        }
        if let Some(ms) = lookup("OPHIX_SUGGEST_DEBOUNCE_MS") {
            match ms.parse() {
                Ok(ms) => self.suggest_debounce_ms = ms,
                Err(_) => warn!(value = %ms, "ignoring invalid OPHIX_SUGGEST_DEBOUNCE_MS"),
            }
        }
        self
    }

    pub fn suggest_debounce(&self) -> Duration {
        Duration::from_millis(self.suggest_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{ "image_cdn": "https://img.test" }"#).expect("parses");
        assert_eq!(settings.image_cdn, "https://img.test");
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.suggest_debounce(), Duration::from_millis(500));
        assert_eq!(settings.suggest_min_chars, 2);
    }

    #[test]
    fn environment_overrides_file_values() {
        let settings = AppSettings::default().with_overrides(|key| match key {
            "OPHIX_API_BASE_URL" => Some(String::from("http://localhost:8080/v1/api")),
            "OPHIX_IMAGE_CDN" => Some(String::from("  ")),
            "OPHIX_SUGGEST_DEBOUNCE_MS" => Some(String::from("250")),
            _ => None,
        });
        assert_eq!(settings.api_base_url, "http://localhost:8080/v1/api");
        assert_eq!(settings.image_cdn, DEFAULT_CDN);
        assert_eq!(settings.suggest_debounce_ms, 250);
    }

    #[test]
    fn invalid_debounce_override_is_ignored() {
        let settings =
            AppSettings::default().with_overrides(|key| (key == "OPHIX_SUGGEST_DEBOUNCE_MS").then(|| String::from("soon")));
        assert_eq!(settings.suggest_debounce_ms, 500);
    }
}
