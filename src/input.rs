use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::CommandTable;
use crate::mode::command::Command;
use crate::mode::Mode;
use crate::table::table::Table;
use crate::table::tableview::TableView;
use crate::transaction::transaction::Transaction;

/// Result of handling a key event
#[derive(Debug, Clone, PartialEq)]
pub enum KeyResult {
    /// Continue in current mode
    Continue,
    /// Switch to a different mode
    SwitchMode(Mode),
    /// Run an operator against the current table
    Execute(Transaction),
    /// Run a command as if typed on the command line
    Command(Command),
    /// Return to normal mode
    Finish,
    /// Quit the application
    Quit,
}

/// Check for escape key (Esc or Ctrl+[)
pub fn is_escape(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('[') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Actions resulting from key sequences
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceAction {
    MoveToTop,       // gg
    // Motion actions (can have count)
    MoveDown,        // j
    MoveUp,          // k
    MoveLeft,        // h
    MoveRight,       // l
    // Operators on the selected column
    Cleanse,         // tc
    Rescale,         // ts
    Dedupe,          // td
    // Clipboard
    CopyRegisterMap, // yj
    CopyQuery,       // yq
}

impl SequenceAction {
    /// Name used for `[keys]` overrides in the config file
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "top" => Some(SequenceAction::MoveToTop),
            "down" => Some(SequenceAction::MoveDown),
            "up" => Some(SequenceAction::MoveUp),
            "left" => Some(SequenceAction::MoveLeft),
            "right" => Some(SequenceAction::MoveRight),
            "cleanse" | "clean" => Some(SequenceAction::Cleanse),
            "rescale" | "scale" => Some(SequenceAction::Rescale),
            "dedupe" | "deduplicate" => Some(SequenceAction::Dedupe),
            "copy" | "copy-map" => Some(SequenceAction::CopyRegisterMap),
            "copyq" | "copy-query" => Some(SequenceAction::CopyQuery),
            _ => None,
        }
    }
}

/// Result of processing a key through the buffer
#[derive(Debug)]
pub enum KeyBufferResult {
    /// A sequence matched, execute this action with optional count
    Action(SequenceAction, usize),
    /// Waiting for more keys (buffer is a valid prefix)
    Pending,
    /// No sequence matched, process this key normally (with optional count)
    Fallthrough(KeyEvent, usize),
}

/// Buffer for accumulating multi-key sequences with optional count prefix
pub struct KeyBuffer {
    keys: Vec<char>,
    count: Option<usize>,
    last_key_time: Instant,
    timeout: Duration,
}

impl Default for KeyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBuffer {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            count: None,
            last_key_time: Instant::now(),
            timeout: Duration::from_millis(1000),
        }
    }

    /// Process a key event, returning what action to take
    pub fn process(&mut self, key: KeyEvent, commands: &CommandTable) -> KeyBufferResult {
        // Clear buffer if too much time has passed since last key
        if self.last_key_time.elapsed() > self.timeout {
            self.keys.clear();
            self.count = None;
        }

        // Only buffer character keys (no modifiers except shift)
        let c = match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => c,
            _ => {
                // Non-char key breaks any sequence
                let count = self.take_count();
                self.keys.clear();
                return KeyBufferResult::Fallthrough(key, count);
            }
        };

        self.last_key_time = Instant::now();

        // Digits form a count prefix, except a leading '0' (first column)
        if self.keys.is_empty() {
            if let Some(digit) = c.to_digit(10) {
                if digit != 0 || self.count.is_some() {
                    let count = self.count.unwrap_or(0);
                    self.count = Some(count.saturating_mul(10).saturating_add(digit as usize));
                    return KeyBufferResult::Pending;
                }
            }
        }

        self.keys.push(c);

        if let Some(action) = commands.match_sequence(&self.keys) {
            let count = self.take_count();
            self.keys.clear();
            return KeyBufferResult::Action(action, count);
        }

        if commands.is_prefix(&self.keys) {
            return KeyBufferResult::Pending;
        }

        // No match and not a valid prefix - clear and fall through
        let count = self.take_count();
        self.keys.clear();
        KeyBufferResult::Fallthrough(key, count)
    }

    /// Clear the buffer (e.g., on mode change)
    pub fn clear(&mut self) {
        self.keys.clear();
        self.count = None;
    }

    /// Pending count and keys, for the status bar
    pub fn display(&self) -> String {
        let mut out = self.count.map(|c| c.to_string()).unwrap_or_default();
        out.extend(self.keys.iter());
        out
    }

    fn take_count(&mut self) -> usize {
        self.count.take().unwrap_or(1)
    }
}

/// Cursor movement shared by the table and the diff pane
#[derive(Default)]
pub struct NavigationHandler;

impl NavigationHandler {
    pub fn new() -> Self {
        Self
    }

    /// Handle navigation keys, returns true if the key was handled
    pub fn handle(&self, key: KeyEvent, count: usize, view: &mut TableView, table: &Table) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Left => view.move_left_n(count),
            KeyCode::Right => view.move_right_n(count, table),
            KeyCode::Up => view.move_up_n(count),
            KeyCode::Down => view.move_down_n(count, table),
            KeyCode::Char('G') => view.move_to_bottom(table),
            KeyCode::Home | KeyCode::Char('0') | KeyCode::Char('^') => view.move_to_first_col(),
            KeyCode::End | KeyCode::Char('$') => view.move_to_last_col(table),
            KeyCode::Char('d') if ctrl => view.half_page_down(table),
            KeyCode::Char('u') if ctrl => view.half_page_up(),
            KeyCode::Char('f') if ctrl => view.page_down(table),
            KeyCode::Char('b') if ctrl => view.page_up(),
            KeyCode::PageDown => view.page_down(table),
            KeyCode::PageUp => view.page_up(),
            _ => return false,
        }
        true
    }

    /// Apply a motion from the key buffer
    pub fn handle_sequence(&self, action: SequenceAction, count: usize, view: &mut TableView, table: &Table) {
        match action {
            SequenceAction::MoveToTop => view.move_to_top(),
            SequenceAction::MoveDown => view.move_down_n(count, table),
            SequenceAction::MoveUp => view.move_up_n(count),
            SequenceAction::MoveLeft => view.move_left_n(count),
            SequenceAction::MoveRight => view.move_right_n(count, table),
            _ => {}
        }
    }
}
