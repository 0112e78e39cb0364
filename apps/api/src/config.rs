use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::{LlmSettings, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::render::RenderConfig;
use crate::store::StoreConfig;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub together_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            together_api_key: require(&lookup, "TOGETHER_API_KEY")?,
            llm_base_url: optional("LLM_BASE_URL", DEFAULT_BASE_URL),
            llm_model: optional("LLM_MODEL", DEFAULT_MODEL),
            llm_timeout_secs: optional("LLM_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            data_dir: PathBuf::from(optional("DATA_DIR", "data")),
            output_dir: PathBuf::from(optional("OUTPUT_DIR", "output")),
            port: optional("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG", "info"),
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            data_dir: self.data_dir.clone(),
        }
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_key: self.together_api_key.clone(),
            base_url: self.llm_base_url.clone(),
            model: self.llm_model.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            output_dir: self.output_dir.clone(),
        }
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    let value =
        lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))?;
    if value.trim().is_empty() {
        bail!("Required environment variable '{key}' is empty");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[("TOGETHER_API_KEY", "tk-123")])).unwrap();
        assert_eq!(config.llm_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.llm_model, DEFAULT_MODEL);
        assert_eq!(config.llm_timeout_secs, 60);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.llm_settings().timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_or_blank_key_fails() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("TOGETHER_API_KEY"));

        let err = Config::from_lookup(lookup_from(&[("TOGETHER_API_KEY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_overrides_flow_into_component_settings() {
        let config = Config::from_lookup(lookup_from(&[
            ("TOGETHER_API_KEY", "tk-123"),
            ("LLM_BASE_URL", "http://127.0.0.1:9999/v1"),
            ("LLM_TIMEOUT_SECS", "5"),
            ("DATA_DIR", "/tmp/draftsmith-data"),
            ("OUTPUT_DIR", "/tmp/draftsmith-out"),
        ]))
        .unwrap();

        assert_eq!(config.llm_settings().base_url, "http://127.0.0.1:9999/v1");
        assert_eq!(config.llm_settings().timeout, Duration::from_secs(5));
        assert_eq!(config.store_config().data_dir, PathBuf::from("/tmp/draftsmith-data"));
        assert_eq!(config.render_config().output_dir, PathBuf::from("/tmp/draftsmith-out"));
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("TOGETHER_API_KEY", "tk-123"),
            ("PORT", "eighty"),
        ]));
        assert!(result.is_err());
    }
}
