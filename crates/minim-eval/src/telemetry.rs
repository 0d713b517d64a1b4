//! # Telemetry
//!
//! Subscriber setup for embedding applications and tests.
//!
//! - `RUST_LOG` selects the filter (default: `minim_eval=info`)
//! - `MINIM_LOG_FORMAT=json` switches to machine-parseable output

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "minim_eval=info";

/// Install the global subscriber. Does nothing if one is already installed.
pub fn init() {
    if try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Install the global subscriber, failing if one is already installed.
pub fn try_init() -> Result<(), TryInitError> {
    let log_format = std::env::var("MINIM_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.into());

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    }
}
