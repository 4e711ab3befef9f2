//! Session key bindings applied on top of the line editor.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a keystroke means to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Replace the line and cursor.
    Override(String, usize),
    /// Leave the key to the editor's default handling.
    PassThrough,
    /// Ctrl-C: end the session.
    Interrupt,
    /// Ctrl-Z: stop the process.
    Suspend,
}

impl KeyOutcome {
    /// The `(line, pos, override)` triple handed back to the line editor.
    pub fn into_parts(self) -> (String, usize, bool) {
        match self {
            KeyOutcome::Override(line, pos) => (line, pos, true),
            _ => (String::new(), 0, false),
        }
    }
}

/// Decide what `key` does given the current `line` and cursor `pos`.
pub fn intercept_key(line: &str, _pos: usize, key: KeyEvent) -> KeyOutcome {
    if !key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyOutcome::PassThrough;
    }

    match key.code {
        KeyCode::Char('a') => KeyOutcome::Override(line.to_string(), 0),
        KeyCode::Char('e') => KeyOutcome::Override(line.to_string(), line.chars().count()),
        KeyCode::Char('u') => KeyOutcome::Override(String::new(), 0),
        KeyCode::Char('c') => KeyOutcome::Interrupt,
        KeyCode::Char('z') => KeyOutcome::Suspend,
        _ => KeyOutcome::PassThrough,
    }
}
