use std::io::IsTerminal;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Level used when neither `RUST_LOG` nor `--verbose` nor the config file
/// says otherwise.
pub const DEFAULT_LEVEL: &str = "warn";

/// Pick the fallback filter directive. `RUST_LOG` is consulted separately and
/// always wins.
pub fn default_level(verbose: bool, config: &Config) -> &str {
    if verbose {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or(DEFAULT_LEVEL)
    }
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init(verbose: bool, config: &Config) {
    let level = default_level(verbose, config);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
}
