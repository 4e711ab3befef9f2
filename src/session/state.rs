//! Session lifecycle state machine.

/// Represents the lifecycle state of an interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Session has been created; the terminal is untouched.
    #[default]
    Created,
    /// Terminal is in raw mode and lines are being read.
    Active,
    /// Terminal was restored and the process stopped (Ctrl-Z).
    Suspended,
    /// Session has ended; the terminal is restored for good.
    Terminated,
}

impl SessionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Created -> Active
    /// - Created -> Terminated
    /// - Active -> Suspended
    /// - Active -> Terminated
    /// - Suspended -> Active
    /// - Suspended -> Terminated
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (*self, target),
            (Created, Active)
                | (Created, Terminated)
                | (Active, Suspended)
                | (Active, Terminated)
                | (Suspended, Active)
                | (Suspended, Terminated)
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: SessionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::InteractionError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }

    /// Check if the terminal is expected to be in raw mode.
    pub fn is_raw(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}
