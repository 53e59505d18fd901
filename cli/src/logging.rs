//! # Logging
//!
//! Installs the `tracing` subscriber. Diagnostics go to stderr so that stdout
//! only carries command output.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "OPDOC_LOG";

/// Builds the filter: `OPDOC_LOG` if set, else `warn`, raised to `debug` by `verbose`.
pub fn build_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();
    if verbose {
        filter.add_directive(Level::DEBUG.into())
    } else {
        filter
    }
}

/// Initializes the global subscriber. Later calls are ignored.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_enables_debug() {
        let filter = build_filter(true).to_string();
        assert!(filter.contains("debug"), "{}", filter);
    }
}
