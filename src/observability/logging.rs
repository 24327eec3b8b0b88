//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from config
//! - Honor `RUST_LOG` when set
//!
//! # Design Decisions
//! - JSON format for production, text for development

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, ObservabilityConfig};

/// Default directives when `RUST_LOG` is not set.
pub fn default_directives(level: &str) -> String {
    format!("service_router={level},tower_http={level}")
}

/// Install the global subscriber.
pub fn init_logging(
    config: &ObservabilityConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.log_level)));

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
}
