mod app;
mod clipboard;
mod config;
mod dispatch;
mod error;
mod export;
mod fileio;
mod input;
mod mode;
mod numeric;
mod progress;
mod table;
mod transaction;
mod ui;
mod util;
mod viewstate;

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{error, info, Level};
use tracing_subscriber::fmt::writer::MakeWriter;

use crossterm::{
    cursor::MoveToColumn,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::AppConfig;
use viewstate::StatusMessage;

#[derive(Debug, Default)]
struct Args {
    file_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    theme: Option<String>,
    log_path: Option<PathBuf>,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let value_of = |i: usize, flag: &str| -> String {
        match args.get(i + 1) {
            Some(v) => v.clone(),
            None => {
                eprintln!("Error: {} requires an argument", flag);
                std::process::exit(1);
            }
        }
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                parsed.config_path = Some(PathBuf::from(value_of(i, "--config")));
                i += 2;
            }
            "--theme" => {
                parsed.theme = Some(value_of(i, "--theme"));
                i += 2;
            }
            "--log" => {
                parsed.log_path = Some(PathBuf::from(value_of(i, "--log")));
                i += 2;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            _ => {
                parsed.file_path = Some(PathBuf::from(&args[i]));
                i += 1;
            }
        }
    }

    parsed
}

/// Handle panics gracefully
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);

        if let Some(location) = info.location() {
            error!(file = location.file(), line = location.line(), "panic occurred");
        } else {
            error!("panic occurred");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

/// A `MakeWriter` for `tracing` that logs to the **main screen** by leaving the alternate screen temporarily.
pub struct MainScreenWriter;

impl<'a> MakeWriter<'a> for MainScreenWriter {
    type Writer = MainScreenWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        MainScreenWriterHandle
    }
}

/// A handle that writes to stdout outside the alternate screen
pub struct MainScreenWriterHandle;

impl Write for MainScreenWriterHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        execute!(io::stdout(), LeaveAlternateScreen)?;
        println!();
        execute!(io::stdout(), MoveToColumn(0))?;
        let result = io::stdout().write(buf);
        execute!(io::stdout(), MoveToColumn(0))?;
        io::stdout().flush()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

fn open_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn init_logging(log_path: Option<&Path>) -> io::Result<()> {
    match log_path {
        Some(path) => {
            let file = open_log(path)?;
            tracing_subscriber::fmt()
                .with_max_level(Level::DEBUG)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(Level::WARN)
                .with_writer(MainScreenWriter)
                .init();
        }
    }
    Ok(())
}

fn print_help() {
    eprintln!("tagsheet - Turn register spreadsheets into tag configurations");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    tagsheet [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config <FILE>  Read settings from FILE instead of the default config");
    eprintln!("    --theme <NAME>       Color theme ({})", ui::style::Theme::builtin_names().join(", "));
    eprintln!("    --log <FILE>         Append debug logs to FILE");
    eprintln!("    -h, --help           Print this help message");
    eprintln!();
    eprintln!("FILE may be .csv, .xlsx or .xls. Use :e <file> to open one later.");
}

fn main() -> io::Result<()> {
    let args = parse_args();
    init_logging(args.log_path.as_deref())?;
    info!("tagsheet started");

    install_panic_hook();

    let (config, mut warnings) = AppConfig::load(args.config_path.as_deref());

    let mut app = App::new(config);
    warnings.extend(app.apply_initial_theme(args.theme.as_deref()));
    if !warnings.is_empty() {
        app.message(StatusMessage::warning(warnings.join("; ")));
    }

    if let Some(path) = args.file_path {
        app.open(path);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Err(e) = &result {
        error!(error = %e, "terminal error");
    }
    result
}
