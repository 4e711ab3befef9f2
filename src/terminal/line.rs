//! Line editing on top of decoded key events.
//!
//! [`LineEditor`] pulls [`KeyEvent`]s from a [`KeySource`], offers each one
//! to an optional [`KeyInterceptor`] and otherwise applies default editing.
//! The cursor position is counted in characters; the terminal works out
//! display columns itself when the line is redrawn.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::mpsc;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use thiserror::Error;
use tracing::trace;

/// Longest line the editor accepts, in characters.
pub const MAX_LINE_LENGTH: usize = 4096;

/// Number of submitted lines kept for Up/Down recall.
pub const MAX_HISTORY: usize = 100;

/// Where the editor gets its keystrokes from.
pub trait KeySource: Send {
    /// Block until the next key. `Ok(None)` means input is closed.
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>>;
}

/// Scripted keys, consumed front to back.
impl KeySource for VecDeque<KeyEvent> {
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        Ok(self.pop_front())
    }
}

/// Keys fed from another thread; input closes when every sender is gone.
impl KeySource for mpsc::Receiver<KeyEvent> {
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        Ok(self.recv().ok())
    }
}

/// The keys produced by typing `text` on a terminal in raw mode.
///
/// Newlines become Enter, `\x7f` Backspace, `\x1b` Esc, `\t` Tab, and the
/// ASCII control characters `\x01..=\x1a` Ctrl plus the matching letter.
pub fn typed_keys(text: &str) -> VecDeque<KeyEvent> {
    text.chars()
        .map(|c| match c {
            '\r' | '\n' => KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            '\t' => KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE),
            '\x7f' => KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
            '\x1b' => KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            '\x01'..='\x1a' => {
                let letter = (b'a' + c as u8 - 1) as char;
                KeyEvent::new(KeyCode::Char(letter), KeyModifiers::CONTROL)
            }
            c => KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE),
        })
        .collect()
}

/// Hook called on every keystroke with the current line and cursor.
///
/// Returning `Some((line, pos))` replaces the line and cursor and skips
/// default handling for that key.
pub type KeyInterceptor = Box<dyn FnMut(&str, usize, KeyEvent) -> Option<(String, usize)> + Send>;

/// Why [`LineEditor::read_line`] did not produce a line.
#[derive(Error, Debug)]
pub enum ReadError {
    /// Input closed, or Ctrl-D on an empty line.
    #[error("end of input")]
    Eof,

    /// Ctrl-C was not intercepted.
    #[error("interrupted")]
    Interrupted,

    /// Reading or writing the terminal failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A single-row line editor with history.
pub struct LineEditor<K: KeySource, W: Write> {
    keys: K,
    output: W,
    prompt: String,
    line: Vec<char>,
    pos: usize,
    history: VecDeque<String>,
    history_index: Option<usize>,
    stash: Vec<char>,
    interceptor: Option<KeyInterceptor>,
}

impl<K: KeySource, W: Write> LineEditor<K, W> {
    /// Create an editor reading from `keys` and echoing to `output`.
    pub fn new(keys: K, output: W, prompt: impl Into<String>) -> Self {
        Self {
            keys,
            output,
            prompt: prompt.into(),
            line: Vec::new(),
            pos: 0,
            history: VecDeque::new(),
            history_index: None,
            stash: Vec::new(),
            interceptor: None,
        }
    }

    /// Install a key interceptor.
    pub fn with_interceptor(mut self, interceptor: KeyInterceptor) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// The prompt written before each line.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Submitted lines, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    /// Write `text` on its own row. Raw mode does no newline translation,
    /// so the row ends with `\r\n`.
    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "{}\r\n", text)?;
        self.output.flush()
    }

    /// Borrow the output writer.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Read one line.
    pub fn read_line(&mut self) -> Result<String, ReadError> {
        self.line.clear();
        self.pos = 0;
        self.history_index = None;
        self.refresh()?;

        loop {
            let key = match self.keys.next_key()? {
                Some(key) => key,
                None => return Err(ReadError::Eof),
            };
            trace!("key: {:?}", key);

            if let Some(interceptor) = self.interceptor.as_mut() {
                let current: String = self.line.iter().collect();
                if let Some((line, pos)) = interceptor(&current, self.pos, key) {
                    self.set_line(line.chars().collect(), pos)?;
                    continue;
                }
            }

            if let Some(line) = self.handle_key(key)? {
                return Ok(line);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Option<String>, ReadError> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Enter => {
                self.output.write_all(b"\r\n")?;
                self.output.flush()?;
                let line: String = self.line.iter().collect();
                self.push_history(&line);
                return Ok(Some(line));
            }
            KeyCode::Char('d') if ctrl => {
                if self.line.is_empty() {
                    return Err(ReadError::Eof);
                }
                self.delete_at_cursor()?;
            }
            KeyCode::Char('c') if ctrl => return Err(ReadError::Interrupted),
            KeyCode::Char('h') if ctrl => self.backspace()?,
            KeyCode::Backspace => self.backspace()?,
            KeyCode::Char('l') | KeyCode::Char('z') if ctrl => self.refresh()?,
            KeyCode::Delete => self.delete_at_cursor()?,
            KeyCode::Left if self.pos > 0 => {
                self.pos -= 1;
                self.refresh()?;
            }
            KeyCode::Right if self.pos < self.line.len() => {
                self.pos += 1;
                self.refresh()?;
            }
            KeyCode::Home => {
                self.pos = 0;
                self.refresh()?;
            }
            KeyCode::End => {
                self.pos = self.line.len();
                self.refresh()?;
            }
            KeyCode::Up => self.history_back()?,
            KeyCode::Down => self.history_forward()?,
            KeyCode::Char(c) if !ctrl && !alt && self.line.len() < MAX_LINE_LENGTH => {
                self.line.insert(self.pos, c);
                self.pos += 1;
                self.refresh()?;
            }
            _ => {}
        }
        Ok(None)
    }

    fn backspace(&mut self) -> io::Result<()> {
        if self.pos > 0 {
            self.line.remove(self.pos - 1);
            self.pos -= 1;
            self.refresh()?;
        }
        Ok(())
    }

    fn delete_at_cursor(&mut self) -> io::Result<()> {
        if self.pos < self.line.len() {
            self.line.remove(self.pos);
            self.refresh()?;
        }
        Ok(())
    }

    fn set_line(&mut self, line: Vec<char>, pos: usize) -> io::Result<()> {
        self.pos = pos.min(line.len());
        self.line = line;
        self.refresh()
    }

    fn push_history(&mut self, line: &str) {
        if line.trim().is_empty() || self.history.back().map(String::as_str) == Some(line) {
            return;
        }
        if self.history.len() == MAX_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(line.to_string());
    }

    fn history_back(&mut self) -> io::Result<()> {
        let index = match self.history_index {
            None if self.history.is_empty() => return Ok(()),
            None => {
                self.stash = self.line.clone();
                self.history.len() - 1
            }
            Some(0) => return Ok(()),
            Some(i) => i - 1,
        };
        self.history_index = Some(index);
        let entry: Vec<char> = self.history[index].chars().collect();
        let pos = entry.len();
        self.set_line(entry, pos)
    }

    fn history_forward(&mut self) -> io::Result<()> {
        let Some(index) = self.history_index else {
            return Ok(());
        };
        let entry = if index + 1 < self.history.len() {
            self.history_index = Some(index + 1);
            self.history[index + 1].chars().collect()
        } else {
            self.history_index = None;
            std::mem::take(&mut self.stash)
        };
        let pos = entry.len();
        self.set_line(entry, pos)
    }

    /// Redraw prompt and line, then place the cursor.
    ///
    /// The cursor is placed by printing the prompt and the text before it
    /// again, so wide characters land where the terminal put them.
    fn refresh(&mut self) -> io::Result<()> {
        let line: String = self.line.iter().collect();
        queue!(
            self.output,
            MoveToColumn(0),
            Print(&self.prompt),
            Print(&line),
            Clear(ClearType::UntilNewLine)
        )?;
        if self.pos < self.line.len() {
            let head: String = self.line[..self.pos].iter().collect();
            queue!(
                self.output,
                MoveToColumn(0),
                Print(&self.prompt),
                Print(&head)
            )?;
        }
        self.output.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(input: &str) -> LineEditor<VecDeque<KeyEvent>, Vec<u8>> {
        LineEditor::new(typed_keys(input), Vec::new(), "> ")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn output(ed: &mut LineEditor<VecDeque<KeyEvent>, Vec<u8>>) -> String {
        String::from_utf8(ed.output().clone()).unwrap()
    }

    #[test]
    fn test_typed_keys() {
        let keys: Vec<_> = typed_keys("a\x01\n\x7f\x1b").into_iter().collect();
        assert_eq!(
            keys,
            vec![
                key(KeyCode::Char('a')),
                KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL),
                key(KeyCode::Enter),
                key(KeyCode::Backspace),
                key(KeyCode::Esc),
            ]
        );
    }

    #[test]
    fn test_read_simple_lines() {
        let mut ed = editor("status\rshow all\n");
        assert_eq!(ed.read_line().unwrap(), "status");
        assert_eq!(ed.read_line().unwrap(), "show all");
        assert!(matches!(ed.read_line(), Err(ReadError::Eof)));
    }

    #[test]
    fn test_prompt_is_written() {
        let mut ed = editor("x\n");
        ed.read_line().unwrap();
        assert!(output(&mut ed).starts_with("\x1b[1G> "));
    }

    #[test]
    fn test_eof_mid_line() {
        let mut ed = editor("partial");
        assert!(matches!(ed.read_line(), Err(ReadError::Eof)));
    }

    #[test]
    fn test_ctrl_d_on_empty_line() {
        let mut ed = editor("\x04");
        assert!(matches!(ed.read_line(), Err(ReadError::Eof)));
    }

    #[test]
    fn test_ctrl_d_deletes_under_cursor() {
        let mut keys = typed_keys("abc");
        keys.push_back(key(KeyCode::Left));
        keys.extend(typed_keys("\x04\n"));
        let mut ed = LineEditor::new(keys, Vec::new(), "> ");
        assert_eq!(ed.read_line().unwrap(), "ab");
    }

    #[test]
    fn test_ctrl_c_interrupts() {
        let mut ed = editor("abc\x03");
        assert!(matches!(ed.read_line(), Err(ReadError::Interrupted)));
    }

    #[test]
    fn test_backspace() {
        let mut ed = editor("abcd\x7f\x7fx\n");
        assert_eq!(ed.read_line().unwrap(), "abx");

        let mut ed = editor("\x7fa\x08b\n");
        assert_eq!(ed.read_line().unwrap(), "b");
    }

    #[test]
    fn test_cursor_movement_inserts_in_place() {
        let mut keys = typed_keys("abcd");
        keys.extend([key(KeyCode::Left), key(KeyCode::Left)]);
        keys.extend(typed_keys("X"));
        keys.push_back(key(KeyCode::Home));
        keys.extend(typed_keys("Y"));
        keys.push_back(key(KeyCode::End));
        keys.extend(typed_keys("Z\n"));
        let mut ed = LineEditor::new(keys, Vec::new(), "> ");
        assert_eq!(ed.read_line().unwrap(), "YabXcdZ");
    }

    #[test]
    fn test_delete_key() {
        let mut keys = typed_keys("abc");
        keys.extend([key(KeyCode::Home), key(KeyCode::Delete)]);
        keys.extend(typed_keys("\n"));
        let mut ed = LineEditor::new(keys, Vec::new(), "> ");
        assert_eq!(ed.read_line().unwrap(), "bc");
    }

    #[test]
    fn test_utf8_input() {
        let mut ed = editor("héllo wörld ✓\n");
        assert_eq!(ed.read_line().unwrap(), "héllo wörld ✓");
    }

    #[test]
    fn test_escape_does_not_swallow_next_key() {
        let mut ed = editor("a\x1bxc\n");
        assert_eq!(ed.read_line().unwrap(), "axc");
    }

    #[test]
    fn test_unbound_keys_ignored() {
        let mut keys = typed_keys("a\x02\x06b\t");
        keys.push_back(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT));
        keys.push_back(key(KeyCode::F(1)));
        keys.extend(typed_keys("c\n"));
        let mut ed = LineEditor::new(keys, Vec::new(), "> ");
        assert_eq!(ed.read_line().unwrap(), "abc");
    }

    #[test]
    fn test_shifted_chars_are_inserted() {
        let keys = VecDeque::from(vec![
            KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT),
            key(KeyCode::Enter),
        ]);
        let mut ed = LineEditor::new(keys, Vec::new(), "> ");
        assert_eq!(ed.read_line().unwrap(), "A");
    }

    #[test]
    fn test_wide_chars_cursor_placed_by_reprint() {
        let mut keys = typed_keys("你好");
        keys.push_back(key(KeyCode::Left));
        let mut ed = LineEditor::new(keys, Vec::new(), "> ");
        assert!(matches!(ed.read_line(), Err(ReadError::Eof)));

        let out = output(&mut ed);
        assert!(out.ends_with("\x1b[1G> 你好\x1b[K\x1b[1G> 你"));
        assert!(!out.contains("\x1b[1D"));
    }

    #[test]
    fn test_history_recall() {
        let mut keys = typed_keys("first\nsecond\n");
        keys.extend([key(KeyCode::Up), key(KeyCode::Up), key(KeyCode::Enter)]);
        keys.extend([key(KeyCode::Up), key(KeyCode::Down), key(KeyCode::Enter)]);
        let mut ed = LineEditor::new(keys, Vec::new(), "> ");
        assert_eq!(ed.read_line().unwrap(), "first");
        assert_eq!(ed.read_line().unwrap(), "second");
        assert_eq!(ed.read_line().unwrap(), "first");
        // Up then Down returns to the (empty) line being typed.
        assert_eq!(ed.read_line().unwrap(), "");
    }

    #[test]
    fn test_history_skips_blank_and_duplicates() {
        let mut ed = editor("a\na\n  \nb\n");
        for _ in 0..4 {
            ed.read_line().unwrap();
        }
        assert_eq!(ed.history().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_history_is_bounded() {
        let input: String = (0..MAX_HISTORY + 5).map(|i| format!("cmd{}\n", i)).collect();
        let mut ed = editor(&input);
        while ed.read_line().is_ok() {}
        assert_eq!(ed.history().count(), MAX_HISTORY);
        assert_eq!(ed.history().next(), Some("cmd5"));
    }

    #[test]
    fn test_line_length_limit() {
        let input = format!("{}\n", "x".repeat(MAX_LINE_LENGTH + 10));
        let mut ed = editor(&input);
        assert_eq!(ed.read_line().unwrap().len(), MAX_LINE_LENGTH);
    }

    #[test]
    fn test_interceptor_override() {
        let interceptor: KeyInterceptor = Box::new(|_line: &str, _pos: usize, key: KeyEvent| {
            let ctrl_u = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
            (key == ctrl_u).then(|| (String::new(), 0))
        });
        let mut ed = editor("abc\x15xyz\n").with_interceptor(interceptor);
        assert_eq!(ed.read_line().unwrap(), "xyz");
    }

    #[test]
    fn test_interceptor_sees_every_key() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let interceptor: KeyInterceptor = Box::new(move |line: &str, pos: usize, key: KeyEvent| {
            sink.lock().unwrap().push((line.to_string(), pos, key.code));
            None
        });
        let mut ed = editor("ab\n").with_interceptor(interceptor);
        assert_eq!(ed.read_line().unwrap(), "ab");

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (String::new(), 0, KeyCode::Char('a')),
                ("a".to_string(), 1, KeyCode::Char('b')),
                ("ab".to_string(), 2, KeyCode::Enter),
            ]
        );
    }

    #[test]
    fn test_interceptor_cursor_is_clamped() {
        let interceptor: KeyInterceptor = Box::new(|line: &str, _pos: usize, key: KeyEvent| {
            let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
            (key == ctrl_a).then(|| (line.to_string(), 99))
        });
        let mut ed = editor("ab\x01c\n").with_interceptor(interceptor);
        assert_eq!(ed.read_line().unwrap(), "abc");
    }

    #[test]
    fn test_channel_source_closes_with_sender() {
        let (tx, rx) = mpsc::channel();
        for key in typed_keys("hi\n") {
            tx.send(key).unwrap();
        }
        drop(tx);

        let mut ed = LineEditor::new(rx, Vec::new(), "> ");
        assert_eq!(ed.read_line().unwrap(), "hi");
        assert!(matches!(ed.read_line(), Err(ReadError::Eof)));
    }

    #[test]
    fn test_write_line() {
        let mut ed = editor("");
        ed.write_line("unknown command").unwrap();
        assert_eq!(ed.output().as_slice(), b"unknown command\r\n");
    }
}
