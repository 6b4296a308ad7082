//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::{GatewayConfig, TronConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Selects the `dev_main` custody wallet when set to any non-empty value.
pub const DEV_MODE_ENV_VAR: &str = "IS_DEV";

/// API key for the Tron HTTP API.
pub const TRON_API_KEY_ENV_VAR: &str = "TRON_API_KEY";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load, override from the process environment, and validate a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse TOML text and apply overrides from `env`.
pub fn parse_config<F>(content: &str, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: GatewayConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_env_overrides(&mut config, env);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply `IS_DEV` and `TRON_API_KEY`.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if env(DEV_MODE_ENV_VAR).is_some_and(|v| !v.is_empty()) {
        config.custody.dev_mode = true;
    }

    if let Some(key) = env(TRON_API_KEY_ENV_VAR).filter(|v| !v.is_empty()) {
        config.tron.get_or_insert_with(TronConfig::default).api_key = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_dev_flag_selects_dev_custody() {
        let config = parse_config("", env_of(&[("IS_DEV", "1")])).unwrap();
        assert!(config.custody.dev_mode);

        let config = parse_config("", env_of(&[("IS_DEV", "")])).unwrap();
        assert!(!config.custody.dev_mode);
    }

    #[test]
    fn test_tron_key_from_env() {
        let config = parse_config("[tron]\napi_key = \"file\"\n", env_of(&[("TRON_API_KEY", "env")]))
            .unwrap();
        assert_eq!(config.tron.unwrap().api_key, "env");

        let config = parse_config("", env_of(&[("TRON_API_KEY", "env")])).unwrap();
        assert_eq!(config.tron.unwrap().api_key, "env");
    }

    #[test]
    fn test_parse_error() {
        let result = parse_config("[polling\n", env_of(&[]));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_surfaces() {
        let result = parse_config("[polling]\nmax_attempts = 0\n", env_of(&[]));
        match result {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dogecoin]\nrpc_url = \"http://127.0.0.1:22555\"").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dogecoin.unwrap().rpc_url, "http://127.0.0.1:22555");
    }
}
