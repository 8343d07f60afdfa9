use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use crate::config::AppConfig;
use crate::input::{is_escape, KeyBuffer, KeyBufferResult, KeyResult, NavigationHandler};
use crate::mode::command::{Command, CommandHandler};
use crate::mode::normal::NormalHandler;
use crate::mode::prompt::PromptHandler;
use crate::mode::Mode;
use crate::table::columnwidths::ColumnWidths;
use crate::transaction::history::History;
use crate::ui;
use crate::ui::style::Theme;
use crate::viewstate::{LoadOutcome, StatusMessage, ViewState};

pub struct App {
    pub history: History,
    pub view_state: ViewState,
    pub mode: Mode,
    pub config: AppConfig,
    /// File the current table was loaded from
    pub file_path: Option<PathBuf>,
    /// Operations applied since the last CSV export
    pub dirty: bool,
    pub should_quit: bool,
    pub col_widths: ColumnWidths,

    key_buffer: KeyBuffer,
    pub(crate) nav_handler: NavigationHandler,
    pub(crate) normal_handler: NormalHandler,
    command_handler: CommandHandler,
    prompt_handler: PromptHandler,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            history: History::new(),
            view_state: ViewState::new(),
            mode: Mode::Normal,
            config,
            file_path: None,
            dirty: false,
            should_quit: false,
            col_widths: ColumnWidths::new(),
            key_buffer: KeyBuffer::new(),
            nav_handler: NavigationHandler::new(),
            normal_handler: NormalHandler::new(),
            command_handler: CommandHandler::new(),
            prompt_handler: PromptHandler::new(),
        }
    }

    /// Pick the theme: explicit name, then the config's theme file, then
    /// the config's theme name. Problems become warnings.
    pub fn apply_initial_theme(&mut self, cli_theme: Option<&str>) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(name) = cli_theme {
            match Theme::by_name(name) {
                Some(theme) => {
                    self.view_state.style.set_theme(theme);
                    return warnings;
                }
                None => warnings.push(format!("Unknown theme '{}'", name)),
            }
        }

        if let Some(path) = self.config.theme_file.clone() {
            match Theme::from_file(&path) {
                Ok(theme) => {
                    self.view_state.style.set_theme(theme);
                    return warnings;
                }
                Err(e) => warnings.push(e),
            }
        }

        if let Some(name) = self.config.theme.clone() {
            match Theme::by_name(&name) {
                Some(theme) => self.view_state.style.set_theme(theme),
                None => warnings.push(format!("Unknown theme '{}'", name)),
            }
        }
        warnings
    }

    /// Start loading a file in the background
    pub fn open(&mut self, path: PathBuf) {
        self.view_state.start_load(path);
    }

    pub fn command_buffer(&self) -> &str {
        &self.command_handler.buffer
    }

    pub fn prompt_buffer(&self) -> &str {
        &self.prompt_handler.buffer
    }

    pub fn prompt_cursor(&self) -> usize {
        self.prompt_handler.cursor
    }

    pub fn key_buffer_display(&self) -> String {
        self.key_buffer.display()
    }

    pub fn message(&mut self, message: StatusMessage) {
        self.view_state.set_message(message);
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            // Check for completed background operations
            self.poll_background_result();

            terminal.draw(|f| ui::render(f, self))?;

            if poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    self.view_state.message = None;
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    pub fn poll_background_result(&mut self) {
        if let Some(LoadOutcome::Installed { path }) =
            self.view_state.poll_background_result(&mut self.history)
        {
            self.file_path = Some(path);
            self.dirty = false;
            self.table_changed();
        }
    }

    /// Keep view, selection and cached widths in step after `current` was replaced
    pub fn table_changed(&mut self) {
        self.col_widths.mark_dirty();
        if let Some(idx) = self.history.selected_index() {
            self.view_state.view.cursor_col = idx;
        }
        self.view_state.view.clamp_cursor(self.history.current());
        let diff_len = self.history.modified().len();
        self.view_state.diff_scroll = self.view_state.diff_scroll.min(diff_len.saturating_sub(1));
    }

    /// Follow the cursor with the column selection
    fn select_cursor_column(&mut self) {
        self.history.select_index(self.view_state.view.cursor_col);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // If canvas is visible, handle canvas-specific keys first
        if self.view_state.canvas.visible {
            self.handle_canvas_key(key);
            return;
        }

        match self.mode {
            Mode::Normal => self.handle_normal_mode(key),
            Mode::Command => self.handle_command_mode(key),
            Mode::Prompt(_) => self.handle_prompt_mode(key),
        }
    }

    fn handle_canvas_key(&mut self, key: KeyEvent) {
        let canvas = &mut self.view_state.canvas;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => canvas.hide(),
            KeyCode::Char('j') | KeyCode::Down => canvas.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => canvas.scroll_up(1),
            KeyCode::Char('d') if ctrl => canvas.scroll_down(10),
            KeyCode::Char('u') if ctrl => canvas.scroll_up(10),
            KeyCode::Char('g') => canvas.scroll_to_top(),
            KeyCode::Char('y') => {
                if let Some(payload) = canvas.payload().cloned() {
                    self.copy_to_clipboard(&payload.label, payload.entries, &payload.text);
                }
            }
            _ => {}
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        // Diff pane scrolling
        if self.view_state.show_diff {
            match key.code {
                KeyCode::Char(']') => {
                    let max = self.history.modified().len().saturating_sub(1);
                    self.view_state.diff_scroll = (self.view_state.diff_scroll + 1).min(max);
                    return;
                }
                KeyCode::Char('[') => {
                    self.view_state.diff_scroll = self.view_state.diff_scroll.saturating_sub(1);
                    return;
                }
                _ => {}
            }
        }

        match self.key_buffer.process(key, &self.config.commands) {
            KeyBufferResult::Action(action, count) => {
                self.execute_sequence_action(action, count);
            }
            KeyBufferResult::Pending => {}
            KeyBufferResult::Fallthrough(key, count) => {
                let result = self.normal_handler.handle_key(
                    key,
                    &mut self.view_state.view,
                    self.history.current(),
                    count,
                    &self.nav_handler,
                );
                self.select_cursor_column();
                self.process_key_result(result);
            }
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) {
        if is_escape(key) {
            self.command_handler.handle_key(key);
            self.finish_edit();
            return;
        }

        if let Some(line) = self.command_handler.handle_key(key) {
            self.finish_edit();
            if let Some(cmd) = Command::parse(&line) {
                self.execute_command(cmd);
            }
        }
    }

    fn handle_prompt_mode(&mut self, key: KeyEvent) {
        let result = self.prompt_handler.handle_key(key);
        if let KeyResult::Execute(txn) = result {
            self.finish_edit();
            self.execute(txn);
        } else {
            self.process_key_result(result);
        }
    }

    /// Back to normal mode
    pub fn finish_edit(&mut self) {
        self.mode = Mode::Normal;
        self.key_buffer.clear();
    }

    /// Enter a mode, priming its handler
    pub fn switch_mode(&mut self, mode: Mode) {
        match mode {
            Mode::Command => self.command_handler.start(),
            Mode::Prompt(kind) => {
                let Some(column) = self.history.selected().map(str::to_string) else {
                    warn!("prompt opened without a table");
                    self.message(StatusMessage::error(
                        crate::error::EditError::NoDataLoaded.to_string(),
                    ));
                    return;
                };
                self.prompt_handler.start(kind, &column);
            }
            Mode::Normal => {}
        }
        self.key_buffer.clear();
        self.mode = mode;
    }
}
