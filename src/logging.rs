//! Logging initialization and configuration.
//!
//! Log output goes to stderr so it never interleaves with the prompt and
//! command output on stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a configured level is present.
pub const DEFAULT_FILTER: &str = "interaction=warn";

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the logging system.
///
/// Uses the `RUST_LOG` environment variable for filtering. If not set,
/// defaults to `interaction=warn`.
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init() {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init()
}

/// Try to initialize logging with an explicit filter directive.
///
/// A bare level such as `debug` is scoped to this crate; anything else is
/// passed to [`EnvFilter`] unchanged.
pub fn try_init_with(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter_directive(level)))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init()
}

fn filter_directive(level: &str) -> String {
    match level {
        "error" | "warn" | "info" | "debug" | "trace" => format!("interaction={}", level),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_init_idempotent() {
        // Whichever test runs first wins; the rest must not panic.
        let _ = try_init();
        let _ = try_init();
    }

    #[test]
    fn test_logging_works() {
        let _ = try_init_with("debug");

        tracing::info!("test info message");
        tracing::debug!("test debug message");
        tracing::warn!("test warn message");
    }

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive("debug"), "interaction=debug");
        assert_eq!(
            filter_directive("interaction=trace,tokio=warn"),
            "interaction=trace,tokio=warn"
        );
    }
}
