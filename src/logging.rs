//! Tracing subscriber setup.
//!
//! One call at startup wires the global subscriber according to the loaded
//! configuration. `RUST_LOG` takes precedence over the configured level, so
//! operators can raise verbosity per module without touching config.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// `log_format` selects between human-readable text and JSON lines; any
/// value other than `"json"` means text. Safe to call more than once: later
/// calls are no-ops, which keeps tests that share a process from fighting
/// over the global subscriber.
pub fn init_tracing(log_level: &str, log_format: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if log_format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already initialized, keeping the existing one");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_tracing("debug", "text");
        init_tracing("info", "json");
    }
}
