use thiserror::Error;

use crate::progress::ProgressConfig;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub gemini: GeminiConfig,
    pub progress: ProgressConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let defaults = GeminiConfig::default();
        let gemini = GeminiConfig {
            api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            base_url: get("GEMINI_API_BASE").unwrap_or(defaults.base_url),
            text_model: get("GEMINI_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: get("GEMINI_IMAGE_MODEL").unwrap_or(defaults.image_model),
        };

        Ok(Self { port, gemini, progress: ProgressConfig::default() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.gemini, GeminiConfig::default());
    }

    #[test]
    fn reads_overrides_and_key_fallback() {
        let cfg = load(&[("PORT", "9000"), ("API_KEY", "abc"), ("GEMINI_IMAGE_MODEL", "img-model"), ("GEMINI_API_KEY", "  ")]).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.gemini.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.gemini.image_model, "img-model");
        assert_eq!(cfg.gemini.text_model, DEFAULT_TEXT_MODEL);
    }

    #[test]
    fn rejects_bad_port() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert_eq!(err, ConfigError::Invalid { key: "PORT", value: "eighty".into() });
    }
}
