//! Interactive session module.
//!
//! This module provides the embedder-facing [`Interactive`] builder, the
//! [`Session`] runtime that owns the terminal for the life of the REPL, and
//! the pieces it is built from: key bindings, signal watching, suspend and
//! resume, and lifecycle state tracking.

mod interactive;
mod keys;
mod prompt;
mod signals;
mod state;
mod suspend;

pub use interactive::{ExecuteFn, ExitReason, Interactive, Session, DEFAULT_RESUME_DELAY};
pub use keys::{intercept_key, KeyOutcome};
pub use prompt::{default_prompt, format_prompt};
pub use signals::{parse_signal, ControlEvent, SignalWatcher, DEFAULT_EXIT_SIGNALS};
pub use state::SessionState;
