//! # interaction
//!
//! Interactive read-eval-print shell for command-line tools.
//!
//! The embedding application supplies a function that executes one command
//! line; this crate owns everything around it: the prompt, line editing in
//! raw mode, a one-shot `-c <command>` mode, exit signals, Ctrl-Z suspend and
//! resume, and restoring the terminal on every way out.
//!
//! ## Features
//!
//! - **Raw-mode line editing**: Ctrl-A/Ctrl-E/Ctrl-U, arrow keys, history
//! - **Signal aware**: SIGINT, SIGQUIT and SIGTERM exit cleanly by default
//! - **Job control**: Ctrl-Z stops the process and resumes on `fg`
//! - **One-shot mode**: `-c <command>` runs a single command without raw mode
//!
//! ## Quick Start
//!
//! ```no_run
//! use interaction::Interactive;
//!
//! fn main() -> interaction::Result<()> {
//!     interaction::logging::try_init().ok();
//!
//!     Interactive::new()
//!         .with_prompt("demo> ")
//!         .with_execute(|command| {
//!             if command == "fail" {
//!                 return Err("command failed".into());
//!             }
//!             println!("{}", command.to_uppercase());
//!             Ok(())
//!         })
//!         .start()
//! }
//! ```

#![cfg(unix)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod terminal;

// Re-export commonly used types
pub use error::{CommandError, InteractionError, Result};
pub use session::{ExitReason, Interactive, Session, SessionState};
pub use terminal::{StdinTerminal, Terminal, TerminalGuard};
