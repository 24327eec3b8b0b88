//! Configuration loading from disk and the environment.
//!
//! Precedence: environment variables, then the TOML file, then defaults.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{LogFormat, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `observability.log_level`.
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
/// Overrides `observability.log_format` (`json` or `text`).
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
/// Overrides `listener.bind_address`.
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the process environment, and validate.
///
/// Without a path the defaults are used as the base.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`], reading variables through `lookup`.
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ServiceConfig::default(),
    };

    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(level) = present(ENV_LOG_LEVEL) {
        config.observability.log_level = level.to_ascii_lowercase();
    }

    if let Some(format) = present(ENV_LOG_FORMAT) {
        config.observability.log_format = format
            .parse::<LogFormat>()
            .map_err(|value| ConfigError::Env { key: ENV_LOG_FORMAT, value })?;
    }

    if let Some(addr) = present(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{}-{}.toml", name, std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config_with(None, env(&[])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_env_wins_over_file() {
        let path = write_temp(
            "env-wins",
            "[observability]\nlog_level = \"debug\"\nlog_format = \"json\"\n",
        );
        let config = load_config_with(
            Some(&path),
            env(&[
                ("LOG_LEVEL", "WARN"),
                ("LOG_FORMAT", "text"),
                ("BIND_ADDRESS", "127.0.0.1:9000"),
            ]),
        )
        .unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.observability.log_level, "warn");
        assert_eq!(config.observability.log_format, LogFormat::Text);
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let config = load_config_with(None, env(&[("LOG_LEVEL", " ")])).unwrap();
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_invalid_env_format_rejected() {
        let err = load_config_with(None, env(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "LOG_FORMAT", .. }));
    }

    #[test]
    fn test_validation_errors_reported() {
        let err = load_config_with(None, env(&[("BIND_ADDRESS", "nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let missing = Path::new("/definitely/not/here.toml");
        let err = load_config_with(Some(missing), env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
