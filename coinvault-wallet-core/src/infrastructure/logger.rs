//! Logging setup
//!
//! `RUST_LOG` wins over the configured level when it is set.

use env_logger::{Builder, Env};

/// Initialise the global logger once; later calls are no-ops
pub fn init_logging(level: &str) {
    let env = Env::default().default_filter_or(level);
    let result = Builder::from_env(env)
        .format_timestamp_millis()
        .format_target(false)
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialised");
    } else {
        log::debug!("Logger initialised at level {}", level);
    }
}
