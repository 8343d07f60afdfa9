//! Command dispatch and execution for App
//!
//! Everything that turns a key result or a `:` command into work on the
//! history, the exports or the screen lives here.

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::app::App;
use crate::clipboard::{copied_message, copy_to_system_clipboard};
use crate::error::{EditError, ExportError};
use crate::export;
use crate::input::{KeyResult, SequenceAction};
use crate::mode::command::Command;
use crate::table::operations::Sign;
use crate::transaction::history::Outcome;
use crate::transaction::transaction::Transaction;
use crate::ui::style::Theme;
use crate::viewstate::StatusMessage;

/// Which JSON projection a preview or copy refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    RegisterMap,
    QueryList,
}

impl Projection {
    fn label(self) -> &'static str {
        match self {
            Projection::RegisterMap => "register map",
            Projection::QueryList => "query list",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Projection::RegisterMap => "Register map",
            Projection::QueryList => "Query list",
        }
    }
}

impl App {
    pub fn execute_sequence_action(&mut self, action: SequenceAction, count: usize) {
        match action {
            SequenceAction::MoveToTop
            | SequenceAction::MoveDown
            | SequenceAction::MoveUp
            | SequenceAction::MoveLeft
            | SequenceAction::MoveRight => {
                self.nav_handler.handle_sequence(
                    action,
                    count,
                    &mut self.view_state.view,
                    self.history.current(),
                );
                self.history.select_index(self.view_state.view.cursor_col);
            }
            _ => {
                let result = self
                    .normal_handler
                    .handle_sequence(action, self.history.selected());
                self.process_key_result(result);
            }
        }
    }

    pub fn process_key_result(&mut self, result: KeyResult) {
        match result {
            KeyResult::Continue => {}
            KeyResult::Finish => {
                self.finish_edit();
            }
            KeyResult::SwitchMode(mode) => {
                self.switch_mode(mode);
            }
            KeyResult::Execute(txn) => {
                self.execute(txn);
            }
            KeyResult::Command(cmd) => {
                self.execute_command(cmd);
            }
            KeyResult::Quit => self.quit(),
        }
    }

    /// Run an operator through the history and report what happened
    pub fn execute(&mut self, txn: Transaction) {
        if self.view_state.is_loading() {
            self.message(StatusMessage::warning("Still loading, try again once the table is ready"));
            return;
        }

        match self.history.run(&txn, &self.config.columns) {
            Ok(Outcome::Changed { skipped, modified }) => {
                self.dirty = true;
                if modified > 0 {
                    self.view_state.show_diff = true;
                    self.view_state.diff_scroll = 0;
                }
                self.table_changed();
                let renamed = self.history.modified().iter().filter(|m| !m.is_original()).count();
                self.message(StatusMessage::info(describe(&txn, skipped, renamed)));
            }
            Ok(Outcome::Unchanged) => {
                self.table_changed();
                let text = match &txn {
                    Transaction::Dedupe { column } => format!("No duplicates in '{}'", column),
                    _ => "Nothing to change".to_string(),
                };
                self.message(StatusMessage::info(text));
            }
            Err(e) => {
                warn!(op = txn.name(), column = txn.column(), error = %e, "operation rejected");
                self.message(StatusMessage::error(e.to_string()));
            }
        }
    }

    pub fn execute_command(&mut self, cmd: Command) {
        match cmd {
            Command::Open(path) => {
                self.open(PathBuf::from(path));
            }
            Command::Write(file) => {
                self.write_csv(file);
            }
            Command::WriteQuit => {
                if self.write_csv(None) {
                    self.should_quit = true;
                }
            }
            Command::RegisterMap(file) => self.write_projection(Projection::RegisterMap, file),
            Command::Query(file) => self.write_projection(Projection::QueryList, file),
            Command::Cleanse => self.execute_on_selected(|column| Transaction::Cleanse { column }),
            Command::Rescale => self.execute_on_selected(|column| Transaction::Rescale { column }),
            Command::Dedupe => self.execute_on_selected(|column| Transaction::Dedupe { column }),
            Command::Add(delta) => self.execute_on_selected(|column| Transaction::Delta {
                column,
                delta,
                sign: Sign::Add,
            }),
            Command::Subtract(delta) => self.execute_on_selected(|column| Transaction::Delta {
                column,
                delta,
                sign: Sign::Subtract,
            }),
            Command::Rename(to) => self.execute_on_selected(|from| Transaction::Rename { from, to }),
            Command::Select(column) => {
                if self.history.select(&column) {
                    self.table_changed();
                } else if !self.history.is_loaded() {
                    self.message(StatusMessage::error(EditError::NoDataLoaded.to_string()));
                } else {
                    self.message(StatusMessage::error(EditError::InvalidColumn(column).to_string()));
                }
            }
            Command::Undo => {
                if self.history.undo() {
                    self.dirty = true;
                    self.table_changed();
                    self.message(StatusMessage::info(self.history_summary("Undone")));
                } else {
                    self.message(StatusMessage::info("Already at oldest change"));
                }
            }
            Command::Redo => {
                if self.history.redo() {
                    self.dirty = true;
                    self.table_changed();
                    self.message(StatusMessage::info(self.history_summary("Redone")));
                } else {
                    self.message(StatusMessage::info("Already at newest change"));
                }
            }
            Command::Reset => {
                let had_changes = self.history.can_undo();
                if self.history.reset_to_original() {
                    self.dirty |= had_changes;
                    self.table_changed();
                    self.message(StatusMessage::info("Restored the table as loaded"));
                } else {
                    self.message(StatusMessage::error(EditError::NoDataLoaded.to_string()));
                }
            }
            Command::Diff => {
                self.view_state.show_diff = !self.view_state.show_diff;
                if self.view_state.show_diff && self.history.modified().is_empty() {
                    self.message(StatusMessage::info("No rows changed by the last deduplicate"));
                }
            }
            Command::CopyRegisterMap => self.copy_projection(Projection::RegisterMap),
            Command::CopyQuery => self.copy_projection(Projection::QueryList),
            Command::ShowRegisterMap => self.show_projection(Projection::RegisterMap),
            Command::ShowQuery => self.show_projection(Projection::QueryList),
            Command::Theme(name) => match Theme::by_name(&name) {
                Some(theme) => {
                    self.view_state.style.set_theme(theme);
                    self.message(StatusMessage::info(format!("Theme set to {}", name)));
                }
                None => self.message(StatusMessage::error(format!(
                    "Unknown theme '{}'. Available: {}",
                    name,
                    Theme::builtin_names().join(", ")
                ))),
            },
            Command::ThemeList => {
                let current = self.view_state.style.theme.name.clone();
                let canvas = &mut self.view_state.canvas;
                canvas.clear();
                canvas.set_title("Themes");
                canvas.add_header("Built-in themes");
                canvas.add_separator();
                for name in Theme::builtin_names() {
                    let marker = if *name == current { "* " } else { "  " };
                    canvas.add_text(format!("{}{}", marker, name));
                }
                canvas.add_blank();
                canvas.add_text("Use :theme <name> to switch");
                canvas.show();
            }
            Command::NavigateRow(row) => {
                let view = &mut self.view_state.view;
                view.cursor_row = row;
                view.clamp_cursor(self.history.current());
            }
            Command::Quit => self.quit(),
            Command::ForceQuit => self.should_quit = true,
            Command::Unknown(s) => {
                self.message(StatusMessage::error(format!("Unknown command: {}", s)));
            }
        }
    }

    fn quit(&mut self) {
        if self.dirty {
            self.message(StatusMessage::warning("Changes not exported! Use :w to save or :q! to quit"));
        } else {
            self.should_quit = true;
        }
    }

    fn execute_on_selected(&mut self, make: impl FnOnce(String) -> Transaction) {
        let column = self.history.selected().unwrap_or_default().to_string();
        self.execute(make(column));
    }

    fn history_summary(&self, verb: &str) -> String {
        format!(
            "{} ({} undo, {} redo)",
            verb,
            self.history.undo_depth(),
            self.history.redo_depth()
        )
    }

    // === Exports ===

    /// Write the CSV export; returns whether it succeeded
    fn write_csv(&mut self, file: Option<String>) -> bool {
        let path = PathBuf::from(file.unwrap_or_else(|| self.config.export.csv_file.clone()));
        match export::write_csv(self.history.current(), &path) {
            Ok(()) => {
                self.dirty = false;
                self.message(StatusMessage::info(format!(
                    "Saved {} rows to {}",
                    self.history.current().row_count(),
                    path.display()
                )));
                true
            }
            Err(e) => {
                if !matches!(e, ExportError::NoData) {
                    error!(path = %path.display(), error = %e, "csv export failed");
                }
                self.message(StatusMessage::error(e.to_string()));
                false
            }
        }
    }

    /// Pretty JSON of a projection plus its entry count
    fn render_projection(&self, projection: Projection) -> Result<(String, usize), String> {
        let table = self.history.current();
        if table.is_empty() {
            return Err(EditError::NoDataLoaded.to_string());
        }
        let rules = &self.config.columns;
        let rendered = match projection {
            Projection::RegisterMap => {
                let map = export::register_map(table, rules, &self.config.export.register_type);
                export::to_pretty_json(&map).map(|text| (text, map.len()))
            }
            Projection::QueryList => {
                let queries = export::query_expressions(table, rules);
                export::to_pretty_json(&queries).map(|text| (text, queries.len()))
            }
        };
        rendered.map_err(|e| e.to_string())
    }

    fn write_projection(&mut self, projection: Projection, file: Option<String>) {
        let name = file.unwrap_or_else(|| match projection {
            Projection::RegisterMap => self.config.export.register_map_file.clone(),
            Projection::QueryList => self.config.export.query_file.clone(),
        });

        let table = self.history.current();
        if table.is_empty() {
            self.message(StatusMessage::error(EditError::NoDataLoaded.to_string()));
            return;
        }
        let rules = &self.config.columns;
        let written = match projection {
            Projection::RegisterMap => {
                let map = export::register_map(table, rules, &self.config.export.register_type);
                export::write_json(&map, &name).map(|path| (path, map.len()))
            }
            Projection::QueryList => {
                let queries = export::query_expressions(table, rules);
                export::write_json(&queries, &name).map(|path| (path, queries.len()))
            }
        };

        match written {
            Ok((path, entries)) => {
                info!(kind = projection.label(), entries, path = %path.display(), "projection exported");
                self.message(StatusMessage::info(format!(
                    "Wrote {} ({} entries) to {}",
                    projection.label(),
                    entries,
                    path.display()
                )));
            }
            Err(e) => {
                error!(kind = projection.label(), error = %e, "projection export failed");
                self.message(StatusMessage::error(e.to_string()));
            }
        }
    }

    fn show_projection(&mut self, projection: Projection) {
        let (text, entries) = match self.render_projection(projection) {
            Ok(rendered) => rendered,
            Err(e) => {
                self.message(StatusMessage::error(e));
                return;
            }
        };

        let canvas = &mut self.view_state.canvas;
        canvas.clear();
        canvas.set_title(projection.title());
        canvas.add_header(format!("{} entries, {} bytes", entries, text.len()));
        canvas.add_separator();
        canvas.add_json(projection.label(), entries, &text);
        canvas.show();
    }

    fn copy_projection(&mut self, projection: Projection) {
        match self.render_projection(projection) {
            Ok((text, entries)) => self.copy_to_clipboard(projection.label(), entries, &text),
            Err(e) => self.message(StatusMessage::error(e)),
        }
    }

    pub(crate) fn copy_to_clipboard(&mut self, label: &str, entries: usize, text: &str) {
        match copy_to_system_clipboard(text) {
            Ok(()) => {
                info!(kind = label, bytes = text.len(), "copied to clipboard");
                self.message(StatusMessage::info(copied_message(label, entries, text)));
            }
            Err(e) => {
                warn!(error = %e, "clipboard unavailable");
                self.message(StatusMessage::error(e.to_string()));
            }
        }
    }
}

/// Status line text for an applied operator
fn describe(txn: &Transaction, skipped: usize, renamed: usize) -> String {
    let skipped_note = if skipped > 0 {
        format!(", {} cell(s) left unchanged", skipped)
    } else {
        String::new()
    };
    match txn {
        Transaction::Cleanse { column } => format!("Cleansed '{}'", column),
        Transaction::Rescale { column } => format!("Rescaled '{}'{}", column, skipped_note),
        Transaction::Dedupe { column } => {
            format!("Renamed {} duplicate(s) in '{}'", renamed, column)
        }
        Transaction::Delta { column, delta, sign } => {
            let verb = match sign {
                Sign::Add => "Added",
                Sign::Subtract => "Subtracted",
            };
            let prep = match sign {
                Sign::Add => "to",
                Sign::Subtract => "from",
            };
            format!("{} {} {} '{}'{}", verb, delta.trim(), prep, column, skipped_note)
        }
        Transaction::Rename { from, to } => format!("Renamed column '{}' to '{}'", from, to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::mode::Mode;
    use crate::table::table::{Row, Table};

    fn app_with(rows: Vec<Row>) -> App {
        let mut app = App::new(AppConfig::new());
        app.history.load(Table::new(rows));
        app.table_changed();
        app
    }

    fn sheet() -> App {
        app_with(vec![
            Row::from_pairs([("Tags", "Pump A"), ("Address", "40001"), ("Scale Factors", "x10")]),
            Row::from_pairs([("Tags", "Pump A"), ("Address", "40002"), ("Scale Factors", "x100")]),
        ])
    }

    fn message(app: &App) -> String {
        app.view_state.message.as_ref().map(|m| m.text.clone()).unwrap_or_default()
    }

    #[test]
    fn test_describe() {
        let txn = Transaction::Delta {
            column: "Address".to_string(),
            delta: " 40000 ".to_string(),
            sign: Sign::Subtract,
        };
        assert_eq!(describe(&txn, 2, 0), "Subtracted 40000 from 'Address', 2 cell(s) left unchanged");
        let txn = Transaction::Dedupe { column: "Tags".to_string() };
        assert_eq!(describe(&txn, 0, 3), "Renamed 3 duplicate(s) in 'Tags'");
    }

    #[test]
    fn test_operator_marks_dirty_and_quit_needs_force() {
        let mut app = sheet();
        app.execute_command(Command::Cleanse);
        assert!(app.dirty);
        assert_eq!(app.history.current().cell_text(0, "Tags"), "Pump_A");

        app.execute_command(Command::Quit);
        assert!(!app.should_quit);
        app.execute_command(Command::ForceQuit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_dedupe_opens_diff_pane() {
        let mut app = sheet();
        app.execute_command(Command::Dedupe);
        assert!(app.view_state.show_diff);
        assert_eq!(app.history.modified().len(), 2);
        assert_eq!(message(&app), "Renamed 1 duplicate(s) in 'Tags'");
    }

    #[test]
    fn test_rejected_operation_reports_error() {
        let mut app = sheet();
        app.execute_command(Command::Rescale);
        assert!(!app.dirty);
        assert_eq!(message(&app), "Rescale is disabled for the 'Tags' column");
        assert_eq!(
            app.view_state.message.as_ref().map(|m| m.kind),
            Some(crate::viewstate::MessageKind::Error)
        );
    }

    #[test]
    fn test_select_and_rename_follow_cursor() {
        let mut app = sheet();
        app.execute_command(Command::Select("Address".to_string()));
        assert_eq!(app.view_state.view.cursor_col, 1);

        app.execute_command(Command::Rename("Register".to_string()));
        assert_eq!(app.history.selected(), Some("Register"));
        assert_eq!(app.view_state.view.cursor_col, app.history.selected_index().unwrap());

        app.execute_command(Command::Undo);
        assert_eq!(app.history.selected(), Some("Address"));
        assert_eq!(app.view_state.view.cursor_col, 1);

        app.execute_command(Command::Select("Nope".to_string()));
        assert_eq!(message(&app), "No 'Nope' column");
    }

    #[test]
    fn test_commands_without_data() {
        let mut app = App::new(AppConfig::new());
        app.execute_command(Command::Cleanse);
        assert_eq!(message(&app), EditError::NoDataLoaded.to_string());
        app.execute_command(Command::ShowQuery);
        assert!(!app.view_state.canvas.visible);
        app.execute_command(Command::Reset);
        assert_eq!(message(&app), EditError::NoDataLoaded.to_string());
        // Nothing changed, so quitting is allowed
        app.execute_command(Command::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_show_projection_fills_overlay() {
        let mut app = sheet();
        app.execute_command(Command::ShowQuery);
        let canvas = &app.view_state.canvas;
        assert!(canvas.visible);
        let payload = canvas.payload().unwrap();
        assert_eq!(payload.entries, 2);
        assert!(payload.text.contains("LAST('Pump A') AS 'Pump A'"));
    }

    #[test]
    fn test_write_exports() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = sheet();
        app.execute_command(Command::Cleanse);

        let csv = dir.path().join("out.csv");
        app.execute_command(Command::Write(Some(csv.to_string_lossy().into_owned())));
        assert!(!app.dirty);
        assert!(std::fs::read_to_string(&csv).unwrap().contains("Pump_A,40001,x10"));

        let map = dir.path().join("tags");
        app.execute_command(Command::RegisterMap(Some(map.to_string_lossy().into_owned())));
        let text = std::fs::read_to_string(dir.path().join("tags.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["Pump_A"]["starting_reg"], serde_json::json!(40002));
        assert!(message(&app).contains("1 entries"));
    }

    #[test]
    fn test_undo_redo_messages() {
        let mut app = sheet();
        app.execute_command(Command::Undo);
        assert_eq!(message(&app), "Already at oldest change");
        app.execute_command(Command::Cleanse);
        app.execute_command(Command::Undo);
        assert_eq!(message(&app), "Undone (0 undo, 1 redo)");
        app.execute_command(Command::Redo);
        assert_eq!(message(&app), "Redone (1 undo, 0 redo)");
    }

    #[test]
    fn test_mode_switching() {
        let mut app = sheet();
        app.process_key_result(KeyResult::SwitchMode(Mode::Command));
        assert_eq!(app.mode, Mode::Command);
        app.process_key_result(KeyResult::Finish);
        assert_eq!(app.mode, Mode::Normal);

        let mut empty = App::new(AppConfig::new());
        empty.process_key_result(KeyResult::SwitchMode(Mode::Prompt(crate::mode::PromptKind::Add)));
        assert_eq!(empty.mode, Mode::Normal);
    }
}
