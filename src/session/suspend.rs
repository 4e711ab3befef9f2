//! Suspend (Ctrl-Z) and resume.

use std::sync::Arc;
use std::time::Duration;

use nix::sys::signal::Signal;
use tokio::runtime::Handle;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use super::ControlEvent;
use crate::terminal::{Terminal, TerminalGuard};

/// Stops the process on Ctrl-Z and brings the terminal back afterwards.
pub(crate) struct Suspender<T: Terminal> {
    guard: Arc<TerminalGuard<T>>,
    events: mpsc::UnboundedSender<ControlEvent>,
    runtime: Handle,
    resume_delay: Duration,
}

impl<T: Terminal> Suspender<T> {
    pub(crate) fn new(
        guard: Arc<TerminalGuard<T>>,
        events: mpsc::UnboundedSender<ControlEvent>,
        runtime: Handle,
        resume_delay: Duration,
    ) -> Self {
        Self {
            guard,
            events,
            runtime,
            resume_delay,
        }
    }

    /// Restore the terminal, stop the process and block until resumed.
    ///
    /// Called from the line reader thread. On return the terminal is back
    /// in raw mode, or the supervisor has been told that it could not be.
    pub(crate) fn suspend(&self) {
        if let Err(e) = self.guard.suspend() {
            warn!("cannot suspend: {}", e);
            return;
        }

        // Listen for SIGCONT before stopping so the notification is not missed.
        let continued = {
            let _enter = self.runtime.enter();
            signal(SignalKind::from_raw(Signal::SIGCONT as i32))
        };
        let continued = match continued {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!(
                    "cannot watch SIGCONT, resuming after {:?}: {}",
                    self.resume_delay, e
                );
                None
            }
        };

        let (done_tx, done_rx) = oneshot::channel();
        let watcher = self.runtime.spawn(resume(
            self.guard.clone(),
            self.events.clone(),
            continued,
            self.resume_delay,
            done_tx,
        ));

        debug!("stopping process");
        if let Err(e) = self.guard.terminal().stop_process() {
            warn!("failed to stop process: {}", e);
            watcher.abort();
            if let Err(e) = self.guard.init() {
                let _ = self.events.send(ControlEvent::ResumeFailed(e));
            }
            return;
        }

        let _ = done_rx.blocking_recv();
    }
}

async fn resume<T: Terminal>(
    guard: Arc<TerminalGuard<T>>,
    events: mpsc::UnboundedSender<ControlEvent>,
    continued: Option<tokio::signal::unix::Signal>,
    delay: Duration,
    done: oneshot::Sender<()>,
) {
    match continued {
        Some(mut listener) => {
            listener.recv().await;
        }
        None => tokio::time::sleep(delay).await,
    }

    println!("resuming...");
    match guard.init() {
        Ok(()) => {
            debug!("resumed");
            let _ = done.send(());
        }
        Err(e) => {
            let _ = events.send(ControlEvent::ResumeFailed(e));
        }
    }
}
