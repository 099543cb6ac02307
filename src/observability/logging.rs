//! Structured logging.
//!
//! Initializes the tracing subscriber once per process. `RUST_LOG` wins over
//! the configured level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for a configured level such as "info".
pub fn default_filter(level: &str) -> String {
    format!("protocol_relay={level},tower_http={level}")
}

/// Install the global subscriber.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_covers_crate_and_tower_http() {
        assert_eq!(default_filter("debug"), "protocol_relay=debug,tower_http=debug");
    }

    #[test]
    fn init_twice_is_harmless() {
        init("info");
        init("debug");
    }
}
