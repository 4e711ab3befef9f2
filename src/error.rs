//! Error types for interaction.

use thiserror::Error;

/// Error returned by an execute function for a single command.
pub type CommandError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for interaction operations.
#[derive(Error, Debug)]
pub enum InteractionError {
    /// No execute function was configured.
    #[error("execute function must not be nil")]
    MissingExecuteFn,

    /// The current user could not be resolved for the default prompt.
    #[error("failed to get current user: {0}")]
    CurrentUser(String),

    /// The hostname could not be resolved for the default prompt.
    #[error("failed to get hostname: {0}")]
    Hostname(String),

    /// Switching the terminal to raw mode failed.
    #[error("failed to get raw terminal: {0}")]
    RawMode(std::io::Error),

    /// Registering a signal listener failed.
    #[error("failed to register signal {signal}: {source}")]
    Signal {
        signal: nix::sys::signal::Signal,
        source: std::io::Error,
    },

    /// A signal name could not be parsed.
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    /// Invalid state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        from: crate::session::SessionState,
        to: crate::session::SessionState,
    },

    /// The line reader task panicked or was cancelled.
    #[error("line reader failed: {0}")]
    Reader(tokio::task::JoinError),

    /// The async runtime could not be built.
    #[error("failed to start runtime: {0}")]
    Runtime(std::io::Error),

    /// Command-line arguments could not be parsed.
    #[error(transparent)]
    Args(#[from] crate::cli::ArgsError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// A one-shot command returned an error.
    #[error("{0}")]
    Command(CommandError),
}

/// Convenience Result type for interaction operations.
pub type Result<T> = std::result::Result<T, InteractionError>;
