use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::input::{is_escape, KeyResult};
use crate::mode::PromptKind;
use crate::table::operations::Sign;
use crate::transaction::transaction::Transaction;
use crate::util::{char_count, insert_char_at, remove_char_at};

/// Single-line editor for the delta and rename prompts.
/// Note: cursor is a CHARACTER index, not a byte index
#[derive(Default)]
pub struct PromptHandler {
    pub buffer: String,
    pub cursor: usize,
    kind: Option<PromptKind>,
    column: String,
}

impl PromptHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin editing for `column`; rename starts from the current name
    pub fn start(&mut self, kind: PromptKind, column: &str) {
        self.kind = Some(kind);
        self.column = column.to_string();
        self.buffer = match kind {
            PromptKind::Rename => column.to_string(),
            PromptKind::Add | PromptKind::Subtract => String::new(),
        };
        self.cursor = char_count(&self.buffer);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        if is_escape(key) {
            self.buffer.clear();
            return KeyResult::Finish;
        }

        match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.buffer = remove_char_at(&self.buffer, self.cursor);
                }
            }
            KeyCode::Delete => {
                if self.cursor < char_count(&self.buffer) {
                    self.buffer = remove_char_at(&self.buffer, self.cursor);
                }
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.buffer.clear();
                self.cursor = 0;
            }
            KeyCode::Char(c) => {
                self.buffer = insert_char_at(&self.buffer, self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(char_count(&self.buffer));
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = char_count(&self.buffer),
            _ => {}
        }

        KeyResult::Continue
    }

    fn submit(&mut self) -> KeyResult {
        let input = std::mem::take(&mut self.buffer);
        let column = self.column.clone();
        let txn = match self.kind {
            Some(PromptKind::Add) => Transaction::Delta {
                column,
                delta: input,
                sign: Sign::Add,
            },
            Some(PromptKind::Subtract) => Transaction::Delta {
                column,
                delta: input,
                sign: Sign::Subtract,
            },
            Some(PromptKind::Rename) => Transaction::Rename {
                from: column,
                to: input,
            },
            None => return KeyResult::Finish,
        };
        KeyResult::Execute(txn)
    }
}
