//! Logging setup
//!
//! Library code only emits `tracing` events. Binaries call `init_logging`
//! once at startup; `RUST_LOG` overrides the configured level.

use repsync_core::{RepError, RepResult};
use tracing_subscriber::EnvFilter;

use crate::LogConfig;

/// Install the global `tracing` subscriber
pub fn init_logging(config: &LogConfig) -> RepResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| RepError::Telemetry(format!("bad log level {:?}: {e}", config.level)))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| RepError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_an_error() {
        // The first call may lose to another test harness subscriber,
        // the second can never succeed
        let _ = init_logging(&LogConfig::default());
        let second = init_logging(&LogConfig::json());
        assert!(matches!(second, Err(RepError::Telemetry(_))));
    }
}
