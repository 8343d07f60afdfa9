use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::input::{KeyResult, NavigationHandler, SequenceAction};
use crate::mode::command::Command;
use crate::mode::{Mode, PromptKind};
use crate::table::table::Table;
use crate::table::tableview::TableView;
use crate::transaction::transaction::Transaction;

#[derive(Default)]
pub struct NormalHandler;

impl NormalHandler {
    pub fn new() -> Self {
        Self
    }

    /// Keys that were not part of a buffered sequence
    pub fn handle_key(
        &mut self,
        key: KeyEvent,
        view: &mut TableView,
        table: &Table,
        count: usize,
        nav_handler: &NavigationHandler,
    ) -> KeyResult {
        if nav_handler.handle(key, count, view, table) {
            return KeyResult::Continue;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => KeyResult::Quit,
            KeyCode::Char('r') if ctrl => KeyResult::Command(Command::Redo),
            KeyCode::Char(':') => KeyResult::SwitchMode(Mode::Command),
            KeyCode::Char('u') => KeyResult::Command(Command::Undo),
            KeyCode::Char('+') => KeyResult::SwitchMode(Mode::Prompt(PromptKind::Add)),
            KeyCode::Char('-') => KeyResult::SwitchMode(Mode::Prompt(PromptKind::Subtract)),
            KeyCode::Char('r') => KeyResult::SwitchMode(Mode::Prompt(PromptKind::Rename)),
            KeyCode::Char('J') => KeyResult::Command(Command::ShowRegisterMap),
            KeyCode::Char('Q') => KeyResult::Command(Command::ShowQuery),
            KeyCode::Char('D') => KeyResult::Command(Command::Diff),
            _ => KeyResult::Continue,
        }
    }

    /// Buffered sequences that are not plain motions. Operators target the
    /// selected column; with nothing loaded the history reports the error.
    pub fn handle_sequence(&self, action: SequenceAction, selected: Option<&str>) -> KeyResult {
        let column = selected.unwrap_or_default().to_string();
        match action {
            SequenceAction::Cleanse => KeyResult::Execute(Transaction::Cleanse { column }),
            SequenceAction::Rescale => KeyResult::Execute(Transaction::Rescale { column }),
            SequenceAction::Dedupe => KeyResult::Execute(Transaction::Dedupe { column }),
            SequenceAction::CopyRegisterMap => KeyResult::Command(Command::CopyRegisterMap),
            SequenceAction::CopyQuery => KeyResult::Command(Command::CopyQuery),
            _ => KeyResult::Continue,
        }
    }
}
