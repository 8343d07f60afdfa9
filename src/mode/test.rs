use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::command::*;
use super::normal::NormalHandler;
use super::prompt::PromptHandler;
use super::{Mode, PromptKind};
use crate::input::{KeyResult, NavigationHandler, SequenceAction};
use crate::table::operations::Sign;
use crate::table::table::{Row, Table};
use crate::table::tableview::TableView;
use crate::transaction::transaction::Transaction;

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn type_str(prompt: &mut PromptHandler, s: &str) {
    for c in s.chars() {
        assert_eq!(prompt.handle_key(key(c)), KeyResult::Continue);
    }
}

#[test]
fn test_parse_basic_commands() {
    assert_eq!(Command::parse("w"), Some(Command::Write(None)));
    assert_eq!(Command::parse("q"), Some(Command::Quit));
    assert_eq!(Command::parse("q!"), Some(Command::ForceQuit));
    assert_eq!(Command::parse("wq"), Some(Command::WriteQuit));
    assert_eq!(Command::parse("clean"), Some(Command::Cleanse));
    assert_eq!(Command::parse("scale"), Some(Command::Rescale));
    assert_eq!(Command::parse("dedup"), Some(Command::Dedupe));
    assert_eq!(Command::parse("undo"), Some(Command::Undo));
    assert_eq!(Command::parse("redo"), Some(Command::Redo));
    assert_eq!(Command::parse("reset"), Some(Command::Reset));
    assert_eq!(Command::parse("diff"), Some(Command::Diff));
    assert_eq!(Command::parse("copy"), Some(Command::CopyRegisterMap));
    assert_eq!(Command::parse("copyq"), Some(Command::CopyQuery));
}

#[test]
fn test_parse_file_arguments() {
    assert_eq!(Command::parse("e tags.xlsx"), Some(Command::Open("tags.xlsx".to_string())));
    assert_eq!(
        Command::parse("w out dir/tags.csv"),
        Some(Command::Write(Some("out dir/tags.csv".to_string())))
    );
    assert_eq!(Command::parse("json"), Some(Command::RegisterMap(None)));
    assert_eq!(
        Command::parse("json site_a"),
        Some(Command::RegisterMap(Some("site_a".to_string())))
    );
    assert_eq!(
        Command::parse("query  q.json "),
        Some(Command::Query(Some("q.json".to_string())))
    );
}

#[test]
fn test_parse_column_arguments() {
    assert_eq!(Command::parse("add 10"), Some(Command::Add("10".to_string())));
    assert_eq!(Command::parse("sub -3"), Some(Command::Subtract("-3".to_string())));
    // Missing amount is reported by the operator
    assert_eq!(Command::parse("add"), Some(Command::Add(String::new())));
    assert_eq!(
        Command::parse("rename Tag Name"),
        Some(Command::Rename("Tag Name".to_string()))
    );
    assert_eq!(
        Command::parse("col Scale Factors"),
        Some(Command::Select("Scale Factors".to_string()))
    );
}

#[test]
fn test_parse_theme() {
    assert_eq!(Command::parse("theme light"), Some(Command::Theme("light".to_string())));
    assert_eq!(Command::parse("themes"), Some(Command::ThemeList));
    assert_eq!(Command::parse("theme"), Some(Command::ThemeList));
}

#[test]
fn test_parse_unknown() {
    assert_eq!(
        Command::parse("foobar"),
        Some(Command::Unknown("foobar".to_string()))
    );
    // Argument-less commands refuse stray arguments
    assert_eq!(
        Command::parse("clean now"),
        Some(Command::Unknown("clean now".to_string()))
    );
    assert_eq!(Command::parse("rename"), Some(Command::Unknown("rename".to_string())));
    assert_eq!(Command::parse(""), Some(Command::Unknown(String::new())));
}

#[test]
fn test_parse_with_whitespace() {
    assert_eq!(Command::parse("  w  "), Some(Command::Write(None)));
    assert_eq!(Command::parse("\tq\n"), Some(Command::Quit));
}

#[test]
fn test_parse_row_navigation() {
    assert_eq!(Command::parse("1"), Some(Command::NavigateRow(0)));
    assert_eq!(Command::parse("100"), Some(Command::NavigateRow(99)));
    assert_eq!(Command::parse("0"), Some(Command::NavigateRow(0)));
}

#[test]
fn test_command_handler() {
    let mut handler = CommandHandler::new();
    for c in "dedupx".chars() {
        assert_eq!(handler.handle_key(key(c)), None);
    }
    handler.handle_key(code(KeyCode::Backspace));
    assert_eq!(handler.handle_key(code(KeyCode::Enter)), Some("dedup".to_string()));
    assert!(handler.buffer.is_empty());

    handler.handle_key(key('q'));
    assert_eq!(handler.handle_key(code(KeyCode::Esc)), None);
    assert!(handler.buffer.is_empty());
}

#[test]
fn test_prompt_delta() {
    let mut prompt = PromptHandler::new();
    prompt.start(PromptKind::Subtract, "Address");
    type_str(&mut prompt, "40001");
    assert_eq!(
        prompt.handle_key(code(KeyCode::Enter)),
        KeyResult::Execute(Transaction::Delta {
            column: "Address".to_string(),
            delta: "40001".to_string(),
            sign: Sign::Subtract,
        })
    );
}

#[test]
fn test_prompt_rename_edits_current_name() {
    let mut prompt = PromptHandler::new();
    prompt.start(PromptKind::Rename, "Tag");
    assert_eq!(prompt.buffer, "Tag");
    type_str(&mut prompt, "s");
    prompt.handle_key(code(KeyCode::Home));
    type_str(&mut prompt, "_");
    prompt.handle_key(code(KeyCode::Delete));
    assert_eq!(
        prompt.handle_key(code(KeyCode::Enter)),
        KeyResult::Execute(Transaction::Rename {
            from: "Tag".to_string(),
            to: "_ags".to_string(),
        })
    );
}

#[test]
fn test_prompt_escape() {
    let mut prompt = PromptHandler::new();
    prompt.start(PromptKind::Add, "Address");
    type_str(&mut prompt, "12");
    assert_eq!(prompt.handle_key(code(KeyCode::Esc)), KeyResult::Finish);
    assert!(prompt.buffer.is_empty());
}

#[test]
fn test_normal_mode_keys() {
    let table = Table::new(vec![Row::from_pairs([("Tags", "A")])]);
    let mut view = TableView::new();
    let nav = NavigationHandler::new();
    let mut normal = NormalHandler::new();

    assert_eq!(
        normal.handle_key(key(':'), &mut view, &table, 1, &nav),
        KeyResult::SwitchMode(Mode::Command)
    );
    assert_eq!(
        normal.handle_key(key('u'), &mut view, &table, 1, &nav),
        KeyResult::Command(Command::Undo)
    );
    assert_eq!(
        normal.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL), &mut view, &table, 1, &nav),
        KeyResult::Command(Command::Redo)
    );
    assert_eq!(
        normal.handle_key(key('r'), &mut view, &table, 1, &nav),
        KeyResult::SwitchMode(Mode::Prompt(PromptKind::Rename))
    );
    assert_eq!(
        normal.handle_key(key('+'), &mut view, &table, 1, &nav),
        KeyResult::SwitchMode(Mode::Prompt(PromptKind::Add))
    );
}

#[test]
fn test_normal_mode_sequences() {
    let normal = NormalHandler::new();
    assert_eq!(
        normal.handle_sequence(SequenceAction::Dedupe, Some("Tags")),
        KeyResult::Execute(Transaction::Dedupe { column: "Tags".to_string() })
    );
    assert_eq!(
        normal.handle_sequence(SequenceAction::CopyQuery, Some("Tags")),
        KeyResult::Command(Command::CopyQuery)
    );
    assert_eq!(
        normal.handle_sequence(SequenceAction::Cleanse, None),
        KeyResult::Execute(Transaction::Cleanse { column: String::new() })
    );
}

#[test]
fn test_mode_names() {
    assert_eq!(Mode::default().display_name(), "NORMAL");
    assert_eq!(Mode::Prompt(PromptKind::Add).display_name(), "DELTA");
    assert_eq!(Mode::Prompt(PromptKind::Rename).display_name(), "RENAME");
}
