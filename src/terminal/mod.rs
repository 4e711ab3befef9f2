//! Terminal abstraction layer.
//!
//! This module separates the terminal device (raw mode, job control, key
//! input) from the session that drives it. [`TerminalGuard`] holds the
//! saved original mode as an explicit `Option` so that every exit path can
//! restore it without caring whether raw mode was ever entered.

mod line;
mod native;

pub use line::{
    typed_keys, KeyInterceptor, KeySource, LineEditor, ReadError, MAX_HISTORY, MAX_LINE_LENGTH,
};
pub use native::{StdinTerminal, TerminalKeys};

use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::InteractionError;
use crate::session::SessionState;
use crate::Result;

/// A terminal device that can be switched to raw mode and back.
pub trait Terminal: Send + Sync + 'static {
    /// Snapshot of the terminal mode taken when entering raw mode.
    type Mode: Send + 'static;

    /// Switch to raw mode, returning the previous mode.
    fn enter_raw(&self) -> io::Result<Self::Mode>;

    /// Put the terminal back into `mode`.
    fn restore(&self, mode: &Self::Mode) -> io::Result<()>;

    /// Stop the whole process (job control) until it is continued.
    fn stop_process(&self) -> io::Result<()>;
}

struct GuardInner<M> {
    saved: Option<M>,
    state: SessionState,
}

/// Owns the saved terminal mode and the session lifecycle state.
///
/// `saved` is `Some` exactly while the terminal is in raw mode.
pub struct TerminalGuard<T: Terminal> {
    terminal: T,
    inner: Mutex<GuardInner<T::Mode>>,
}

impl<T: Terminal> TerminalGuard<T> {
    /// Create a guard for a terminal that has not been touched yet.
    pub fn new(terminal: T) -> Self {
        Self {
            terminal,
            inner: Mutex::new(GuardInner {
                saved: None,
                state: SessionState::Created,
            }),
        }
    }

    /// The wrapped terminal.
    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Whether the terminal is currently in raw mode.
    pub fn is_raw(&self) -> bool {
        self.lock().saved.is_some()
    }

    // Restore must work even after a panic elsewhere, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, GuardInner<T::Mode>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enter raw mode and remember the original mode.
    pub fn init(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.saved.is_some() {
            return Ok(());
        }

        if !inner.state.can_transition_to(SessionState::Active) {
            return Err(InteractionError::InvalidStateTransition {
                from: inner.state,
                to: SessionState::Active,
            });
        }

        let mode = self
            .terminal
            .enter_raw()
            .map_err(InteractionError::RawMode)?;
        inner.saved = Some(mode);
        inner.state.transition_to(SessionState::Active)?;

        debug!("terminal switched to raw mode");
        Ok(())
    }

    /// Restore the original mode ahead of a process stop.
    pub fn suspend(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.state.transition_to(SessionState::Suspended)?;
        self.restore_locked(&mut inner);
        Ok(())
    }

    /// Restore the original mode if raw mode is active.
    ///
    /// Returns `true` if a saved mode was restored. Calling this when raw
    /// mode was never entered, or more than once, does nothing.
    pub fn restore(&self) -> bool {
        let mut inner = self.lock();
        self.restore_locked(&mut inner)
    }

    /// Restore the terminal and mark the session as terminated.
    pub fn terminate(&self) {
        let mut inner = self.lock();
        self.restore_locked(&mut inner);
        if !inner.state.is_terminal() {
            inner.state = SessionState::Terminated;
        }
    }

    fn restore_locked(&self, inner: &mut GuardInner<T::Mode>) -> bool {
        match inner.saved.take() {
            Some(mode) => {
                if let Err(e) = self.terminal.restore(&mode) {
                    warn!("failed to restore terminal: {}", e);
                }
                debug!("terminal restored");
                true
            }
            None => false,
        }
    }
}
