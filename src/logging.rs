//! Tracing subscriber setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(config: &LoggingConfig) -> String {
    format!("visitor_registry_server={},tower_http=debug", config.level)
}

/// Install the global subscriber: `RUST_LOG` wins over the configured level,
/// `format = "json"` switches to structured output.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let subscriber = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => subscriber
            .with(fmt::layer().json().with_current_span(true).with_target(true))
            .init(),
        _ => subscriber.with(fmt::layer()).init(),
    }
}
