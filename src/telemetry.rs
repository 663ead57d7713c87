//! Tracing subscriber initialisation.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `config.level` when set. Calling this more than once
/// is a no-op.
pub fn init_subscriber(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // set_global_default fails if already set
    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
