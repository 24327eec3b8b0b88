//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, log level and timeout ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("timeouts.shutdown_secs must be greater than zero")]
    ShutdownTimeout,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    LogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if config.timeouts.shutdown_secs == 0 {
        errors.push(ValidationError::ShutdownTimeout);
    }

    if config.observability.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServiceConfig::default();
        config.name = "  ".into();
        config.listener.bind_address = "localhost".into();
        config.timeouts.request_secs = 0;
        config.timeouts.shutdown_secs = 0;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyName,
                ValidationError::BindAddress("localhost".into()),
                ValidationError::RequestTimeout,
                ValidationError::ShutdownTimeout,
                ValidationError::LogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MetricsAddress("nowhere".into())]
        );
    }
}
