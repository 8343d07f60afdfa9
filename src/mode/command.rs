use crossterm::event::{KeyCode, KeyEvent};

use crate::input::is_escape;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),           // e <file>
    Write(Option<String>),  // w [file], CSV export
    RegisterMap(Option<String>),
    Query(Option<String>),
    Cleanse,
    Rescale,
    Dedupe,
    Add(String),
    Subtract(String),
    Rename(String),
    Select(String),         // col <name>
    Undo,
    Redo,
    Reset,
    Diff,                   // Toggle the modified-rows pane
    CopyRegisterMap,
    CopyQuery,
    ShowRegisterMap,
    ShowQuery,
    Theme(String),          // Set theme by name
    ThemeList,              // List available themes
    NavigateRow(usize),
    Quit,
    ForceQuit,
    WriteQuit,
    Unknown(String),
}

impl Command {
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();

        if let Ok(row_dest) = trimmed.parse::<usize>() {
            return Some(Command::NavigateRow(row_dest.saturating_sub(1)));
        }

        // Commands with a free-form argument keep everything after the name
        let (name, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim().to_string())),
            None => (trimmed, None),
        };
        let arg = arg.filter(|a| !a.is_empty());

        let cmd = match (name, arg) {
            ("e" | "edit" | "open", Some(path)) => Command::Open(path),
            ("w" | "csv", file) => Command::Write(file),
            ("json" | "map", file) => Command::RegisterMap(file),
            ("query", file) => Command::Query(file),
            ("clean" | "cleanse", None) => Command::Cleanse,
            ("scale" | "rescale", None) => Command::Rescale,
            ("dedup" | "dedupe", None) => Command::Dedupe,
            ("add", value) => Command::Add(value.unwrap_or_default()),
            ("sub", value) => Command::Subtract(value.unwrap_or_default()),
            ("rename", Some(to)) => Command::Rename(to),
            ("col", Some(column)) => Command::Select(column),
            ("undo" | "u", None) => Command::Undo,
            ("redo", None) => Command::Redo,
            ("reset", None) => Command::Reset,
            ("diff", None) => Command::Diff,
            ("copy", None) => Command::CopyRegisterMap,
            ("copyq", None) => Command::CopyQuery,
            ("showjson", None) => Command::ShowRegisterMap,
            ("showquery", None) => Command::ShowQuery,
            ("theme", Some(theme_name)) => Command::Theme(theme_name),
            ("theme" | "themes", None) => Command::ThemeList,
            ("q", None) => Command::Quit,
            ("q!", None) => Command::ForceQuit,
            ("wq" | "x", None) => Command::WriteQuit,
            _ => Command::Unknown(trimmed.to_string()),
        };
        Some(cmd)
    }
}

/// Collects the `:` command line
#[derive(Default)]
pub struct CommandHandler {
    pub buffer: String,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn start(&mut self) {
        self.buffer.clear();
    }

    /// Returns the finished line on Enter; Esc clears it
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<String> {
        if is_escape(key) {
            self.buffer.clear();
            return None;
        }

        match key.code {
            KeyCode::Enter => {
                let cmd = self.buffer.clone();
                self.buffer.clear();
                Some(cmd)
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                None
            }
            KeyCode::Char(c) => {
                self.buffer.push(c);
                None
            }
            _ => None,
        }
    }
}
