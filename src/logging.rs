use tracing_subscriber::{EnvFilter, fmt};

use crate::errors::GraphBridgeError;

/// Installs the global `fmt` subscriber filtered by `level` (an `EnvFilter` directive).
pub fn init_logging(level: &str) -> Result<(), GraphBridgeError> {
    fmt()
        .with_env_filter(
            EnvFilter::try_new(level)
                .map_err(|e| GraphBridgeError::config(format!("invalid log level: {e}")))?,
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| GraphBridgeError::config("logging already initialized"))
}
