//! Exit signal watching.
//!
//! Signals are turned into [`ControlEvent`]s on a channel; the session's
//! supervisor is the only place that decides to end the session.

use std::str::FromStr;

use futures_util::future::select_all;
use nix::sys::signal::Signal;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::InteractionError;
use crate::Result;

/// Signals that end a session when none are configured.
pub const DEFAULT_EXIT_SIGNALS: [Signal; 3] = [Signal::SIGINT, Signal::SIGQUIT, Signal::SIGTERM];

/// Events delivered to the session supervisor.
#[derive(Debug)]
pub enum ControlEvent {
    /// A watched exit signal arrived.
    Signal(Signal),
    /// Ctrl-C was pressed.
    Interrupt,
    /// Re-entering raw mode after a stop failed.
    ResumeFailed(InteractionError),
}

/// Parse a signal name such as `INT`, `SIGTERM` or `sigquit`.
pub fn parse_signal(name: &str) -> Result<Signal> {
    let upper = name.trim().to_ascii_uppercase();
    let full = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{}", upper)
    };
    Signal::from_str(&full).map_err(|_| InteractionError::InvalidSignal(name.to_string()))
}

/// Listeners for a set of exit signals.
///
/// Registration happens in [`SignalWatcher::register`], before the watcher
/// task is spawned, so a signal arriving in between is not lost.
pub struct SignalWatcher {
    listeners: Vec<(Signal, tokio::signal::unix::Signal)>,
}

impl SignalWatcher {
    /// Register listeners for every signal in `signals`.
    ///
    /// Must be called within a tokio runtime.
    pub fn register(signals: &[Signal]) -> Result<Self> {
        let listeners = signals
            .iter()
            .map(|&sig| {
                signal(SignalKind::from_raw(sig as i32))
                    .map(|listener| (sig, listener))
                    .map_err(|source| InteractionError::Signal {
                        signal: sig,
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("watching exit signals: {:?}", signals);
        Ok(Self { listeners })
    }

    /// Wait for the first watched signal.
    ///
    /// Returns `None` if nothing is watched.
    pub async fn recv(&mut self) -> Option<Signal> {
        if self.listeners.is_empty() {
            return None;
        }

        let signals: Vec<Signal> = self.listeners.iter().map(|(sig, _)| *sig).collect();
        let waits = self
            .listeners
            .iter_mut()
            .map(|(_, listener)| Box::pin(listener.recv()));
        let (received, index, _) = select_all(waits).await;
        received.map(|()| signals[index])
    }

    /// Spawn a task forwarding the first watched signal to `tx`.
    pub fn spawn(mut self, tx: mpsc::UnboundedSender<ControlEvent>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Some(sig) = self.recv().await {
                debug!("received exit signal {}", sig);
                let _ = tx.send(ControlEvent::Signal(sig));
            }
        })
    }
}
