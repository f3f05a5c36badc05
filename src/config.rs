use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::api_connection::endpoints::DEFAULT_MODEL;

// Name of the variable that holds the OpenRouter key
pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV_VAR: &str = "KITCHEN_MODEL";
pub const DATA_DIR_ENV_VAR: &str = "KITCHEN_DATA_DIR";
pub const CACHE_FILE_ENV_VAR: &str = "KITCHEN_CACHE_FILE";
pub const USER_ID_ENV_VAR: &str = "KITCHEN_USER_ID";

const DEFAULT_DATA_DIR: &str = "kitchen_data";
const DEFAULT_CACHE_FILE: &str = "kitchen_data/cache.json";
const DEFAULT_USER_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key_env_var: String,
    pub model: String,
    pub data_dir: PathBuf,
    pub cache_file: PathBuf,
    pub user_id: i64,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let user_id = match lookup(USER_ID_ENV_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("{} must be an integer, got '{}'", USER_ID_ENV_VAR, raw))?,
            None => DEFAULT_USER_ID,
        };

        Ok(Self {
            api_key_env_var: API_KEY_ENV_VAR.to_string(),
            model: lookup(MODEL_ENV_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            data_dir: lookup(DATA_DIR_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            cache_file: lookup(CACHE_FILE_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE)),
            user_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_key_env_var, "OPENROUTER_API_KEY");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.data_dir, PathBuf::from("kitchen_data"));
        assert_eq!(config.user_id, 1);
    }

    #[test]
    fn test_values_from_environment() {
        let vars: HashMap<&str, &str> = [
            (MODEL_ENV_VAR, "meta-llama/llama-3.3-70b"),
            (DATA_DIR_ENV_VAR, "/tmp/kitchen"),
            (USER_ID_ENV_VAR, " 42 "),
        ]
        .into();
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.model, "meta-llama/llama-3.3-70b");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/kitchen"));
        assert_eq!(config.cache_file, PathBuf::from("kitchen_data/cache.json"));
        assert_eq!(config.user_id, 42);
    }

    #[test]
    fn test_invalid_user_id_is_an_error() {
        let result = AppConfig::from_lookup(|k| (k == USER_ID_ENV_VAR).then(|| "abc".to_string()));
        assert!(result.is_err());
    }
}
