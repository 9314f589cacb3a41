//! Runtime configuration for the `bp-tracker` binary.
//!
//! Values come from the process environment after `.env` has been loaded.
//!
//! # Environment Variables
//! - `GEMINI_API_KEY`: key for the text-generation service (recommendations
//!   are unavailable without it)
//! - `GEMINI_MODEL`: model name (default: "gemini-1.5-pro")
//! - `GEMINI_BASE_URL`: service root (default: the public endpoint)
//! - `GEMINI_TIMEOUT_SECS`: request timeout in seconds (default: 60)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use genai_client::GeminiConfig;

const RECORDS_FILE: &str = "records.json";
const ACCOUNTS_FILE: &str = "accounts.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    gemini: GeminiConfig,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env(data_dir: PathBuf) -> Result<Self> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Resolve configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(data_dir: PathBuf, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut gemini = GeminiConfig {
            api_key: var("GEMINI_API_KEY"),
            ..GeminiConfig::default()
        };
        if let Some(model) = var("GEMINI_MODEL") {
            gemini.model = model;
        }
        if let Some(base_url) = var("GEMINI_BASE_URL") {
            gemini.base_url = base_url;
        }
        if let Some(timeout) = var("GEMINI_TIMEOUT_SECS") {
            gemini.timeout_secs = timeout
                .parse()
                .with_context(|| format!("GEMINI_TIMEOUT_SECS must be a whole number of seconds, got '{}'", timeout))?;
            if gemini.timeout_secs == 0 {
                bail!("GEMINI_TIMEOUT_SECS must be greater than zero");
            }
        }

        Ok(Self { data_dir, gemini })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Snapshot file of the record store.
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE)
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join(ACCOUNTS_FILE)
    }

    pub fn gemini(&self) -> &GeminiConfig {
        &self.gemini
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(PathBuf::from("data"), lookup(&[])).unwrap();
        assert_eq!(config.gemini().api_key, None);
        assert_eq!(config.gemini().model, "gemini-1.5-pro");
        assert_eq!(config.gemini().timeout_secs, 60);
        assert_eq!(config.records_path(), PathBuf::from("data/records.json"));
        assert_eq!(config.accounts_path(), PathBuf::from("data/accounts.json"));
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = AppConfig::from_lookup(
            PathBuf::from("/tmp/bp"),
            lookup(&[
                ("GEMINI_API_KEY", "  "),
                ("GEMINI_MODEL", "gemini-1.5-flash"),
                ("GEMINI_BASE_URL", "http://127.0.0.1:8080"),
                ("GEMINI_TIMEOUT_SECS", "15"),
            ]),
        )
        .unwrap();
        assert_eq!(config.gemini().api_key, None);
        assert_eq!(config.gemini().model, "gemini-1.5-flash");
        assert_eq!(config.gemini().base_url, "http://127.0.0.1:8080");
        assert_eq!(config.gemini().timeout_secs, 15);
    }

    #[test]
    fn test_rejects_bad_timeout() {
        for bad in ["soon", "-1", "0"] {
            let result = AppConfig::from_lookup(PathBuf::from("data"), lookup(&[("GEMINI_TIMEOUT_SECS", bad)]));
            assert!(result.is_err(), "accepted timeout {}", bad);
        }
    }
}
