use super::history::*;
use super::transaction::*;

use crate::config::ColumnRules;
use crate::error::EditError;
use crate::table::operations::Sign;
use crate::table::table::{Row, Table};

fn make_table(headers: &[&str], data: Vec<Vec<&str>>) -> Table {
    Table::new(
        data.into_iter()
            .map(|values| Row::from_pairs(headers.iter().copied().zip(values)))
            .collect(),
    )
}

fn register_sheet() -> Table {
    make_table(
        &["Tags", "Address", "Scale Factors"],
        vec![
            vec!["Pump (Main)", "10", "10"],
            vec!["Valve-2", "x", "100"],
            vec!["Pump (Main)", "20", "abc"],
        ],
    )
}

fn loaded() -> History {
    let mut history = History::new();
    history.load(register_sheet());
    history
}

fn rules() -> ColumnRules {
    ColumnRules::default()
}

fn cleanse(column: &str) -> Transaction {
    Transaction::Cleanse { column: column.to_string() }
}

fn dedupe(column: &str) -> Transaction {
    Transaction::Dedupe { column: column.to_string() }
}

fn add(column: &str, delta: &str) -> Transaction {
    Transaction::Delta {
        column: column.to_string(),
        delta: delta.to_string(),
        sign: Sign::Add,
    }
}

fn rename(from: &str, to: &str) -> Transaction {
    Transaction::Rename { from: from.to_string(), to: to.to_string() }
}

fn column(table: &Table, name: &str) -> Vec<String> {
    table.rows().iter().map(|r| r.text(name).into_owned()).collect()
}

// === Load ===

#[test]
fn load_installs_baseline_and_selects_first_column() {
    let history = loaded();
    assert!(history.is_loaded());
    assert_eq!(history.current(), &register_sheet());
    assert_eq!(history.baseline(), Some(&register_sheet()));
    assert_eq!(history.selected(), Some("Tags"));
    assert!(!history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn load_empty_table_leaves_selection_unset() {
    let mut history = loaded();
    history.load(Table::default());
    assert_eq!(history.selected(), None);
    assert!(history.is_loaded());
}

#[test]
fn load_discards_history_and_modified_set() {
    let mut history = loaded();
    history.run(&cleanse("Address"), &rules()).unwrap();
    history.run(&cleanse("Tags"), &rules()).unwrap();
    history.undo();
    history.run(&dedupe("Tags"), &rules()).unwrap();
    assert!(!history.modified().is_empty());
    assert!(history.can_undo());

    history.load(make_table(&["Other"], vec![vec!["a"]]));
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.redo_depth(), 0);
    assert!(history.modified().is_empty());
    assert_eq!(history.selected(), Some("Other"));
}

// === Apply ===

#[test]
fn apply_before_load_is_ignored() {
    let mut history = History::new();
    assert!(!history.apply(register_sheet()));
    assert!(history.current().is_empty());
    assert!(!history.can_undo());
}

#[test]
fn run_before_load_reports_no_data() {
    let mut history = History::new();
    assert_eq!(
        history.run(&cleanse("Tags"), &rules()),
        Err(EditError::NoDataLoaded)
    );
}

#[test]
fn apply_pushes_previous_and_clears_redo() {
    let mut history = loaded();
    let first = history.current().clone();
    history.run(&cleanse("Tags"), &rules()).unwrap();
    history.undo();
    assert!(history.can_redo());

    assert!(history.apply(make_table(&["Tags"], vec![vec!["x"]])));
    assert!(!history.can_redo());
    assert_eq!(history.undo_depth(), 1);
    history.undo();
    assert_eq!(history.current(), &first);
}

#[test]
fn rejected_operation_leaves_state_alone() {
    let mut history = loaded();
    history.run(&dedupe("Tags"), &rules()).unwrap();
    let modified = history.modified().to_vec();
    let before = history.current().clone();

    let err = history.run(&add("Tags", "5"), &rules()).unwrap_err();
    assert!(matches!(err, EditError::ProtectedColumn { .. }));
    let err = history.run(&add("Address", "five"), &rules()).unwrap_err();
    assert_eq!(err, EditError::InvalidDelta("five".to_string()));
    let err = history.run(&cleanse("Missing"), &rules()).unwrap_err();
    assert_eq!(err, EditError::InvalidColumn("Missing".to_string()));

    assert_eq!(history.current(), &before);
    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.modified(), modified.as_slice());
}

#[test]
fn protected_columns_follow_rules() {
    let mut history = loaded();
    let rescale = Transaction::Rescale { column: "Tags".to_string() };
    assert!(history.run(&rescale, &rules()).is_err());
    assert!(history.run(&dedupe("Scale Factors"), &rules()).is_err());

    let custom = ColumnRules {
        tag: "Address".to_string(),
        address: "Tags".to_string(),
        scale: "Unused".to_string(),
    };
    assert!(history.run(&rescale, &custom).is_ok());
    assert!(history.run(&add("Address", "1"), &custom).is_err());
}

// === Deduplicate and the modified-set ===

#[test]
fn dedupe_fills_modified_set() {
    let mut history = loaded();
    let outcome = history.run(&dedupe("Tags"), &rules()).unwrap();
    assert_eq!(outcome, Outcome::Changed { skipped: 0, modified: 2 });
    assert_eq!(
        column(history.current(), "Tags"),
        vec!["Pump (Main)", "Valve-2", "Pump (Main)_1"]
    );
    let modified = history.modified();
    assert!(modified[0].is_original());
    assert_eq!(modified[1].row.text("Tags"), "Pump (Main)_1");
}

#[test]
fn dedupe_without_repeats_does_not_push_history() {
    let mut history = loaded();
    history.run(&cleanse("Tags"), &rules()).unwrap();
    history.run(&dedupe("Tags"), &rules()).unwrap();
    let depth = history.undo_depth();
    let before = history.current().clone();

    let outcome = history.run(&dedupe("Tags"), &rules()).unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(history.undo_depth(), depth);
    assert_eq!(history.current(), &before);
    assert!(history.modified().is_empty());
}

#[test]
fn other_operations_clear_modified_set() {
    let mut history = loaded();
    history.run(&dedupe("Tags"), &rules()).unwrap();
    assert!(!history.modified().is_empty());
    history.run(&add("Address", "1"), &rules()).unwrap();
    assert!(history.modified().is_empty());
}

#[test]
fn undo_clears_modified_set() {
    let mut history = loaded();
    history.run(&dedupe("Tags"), &rules()).unwrap();
    history.undo();
    assert!(history.modified().is_empty());
    history.redo();
    assert!(history.modified().is_empty());
}

// === Undo / redo ===

#[test]
fn undo_redo_round_trip() {
    let mut history = loaded();
    let original = history.current().clone();

    history.run(&cleanse("Tags"), &rules()).unwrap();
    history.run(&add("Address", "5"), &rules()).unwrap();
    let after = history.current().clone();
    assert_eq!(column(&after, "Address"), vec!["15", "x", "25"]);

    assert!(history.undo());
    assert!(history.undo());
    assert_eq!(history.current(), &original);
    assert!(!history.undo());

    assert!(history.redo());
    assert!(history.redo());
    assert_eq!(history.current(), &after);
    assert!(!history.redo());
}

#[test]
fn new_operation_after_undo_drops_redo() {
    let mut history = loaded();
    history.run(&cleanse("Tags"), &rules()).unwrap();
    history.undo();
    history.run(&add("Address", "2"), &rules()).unwrap();
    let current = history.current().clone();

    assert!(!history.redo());
    assert_eq!(history.current(), &current);
}

#[test]
fn undo_on_empty_stack_is_noop() {
    let mut history = loaded();
    assert!(!history.undo());
    assert!(!history.redo());
    assert_eq!(history.current(), &register_sheet());
}

// === Reset ===

#[test]
fn reset_restores_load_time_table() {
    let mut history = loaded();
    history.run(&cleanse("Tags"), &rules()).unwrap();
    history.run(&dedupe("Tags"), &rules()).unwrap();
    history.run(&add("Address", "100"), &rules()).unwrap();
    history.undo();

    assert!(history.reset_to_original());
    assert_eq!(history.current(), &register_sheet());
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.redo_depth(), 0);
    assert!(history.modified().is_empty());
}

#[test]
fn reset_before_load_is_noop() {
    let mut history = History::new();
    assert!(!history.reset_to_original());
}

// === Rename and selection ===

#[test]
fn rename_is_undoable_and_moves_selection() {
    let mut history = loaded();
    assert!(history.select("Address"));
    history.run(&rename("Address", "Register"), &rules()).unwrap();
    assert_eq!(history.selected(), Some("Register"));
    assert_eq!(history.current().columns(), vec!["Tags", "Register", "Scale Factors"]);

    history.undo();
    assert_eq!(history.selected(), Some("Address"));
    history.redo();
    assert_eq!(history.selected(), Some("Register"));
}

#[test]
fn degenerate_rename_records_nothing() {
    let mut history = loaded();
    assert_eq!(
        history.run(&rename("Tags", "Tags"), &rules()),
        Ok(Outcome::Unchanged)
    );
    assert_eq!(history.run(&rename("Tags", ""), &rules()), Ok(Outcome::Unchanged));
    assert!(!history.can_undo());
}

#[test]
fn rename_to_reserved_name_is_rejected() {
    let mut history = loaded();
    assert!(history.select("Address"));
    assert_eq!(
        history.run(&rename("Address", "__x"), &rules()),
        Err(EditError::InvalidColumn("__x".to_string()))
    );
    assert_eq!(history.undo_depth(), 0);
    assert_eq!(history.current().columns(), vec!["Tags", "Address", "Scale Factors"]);
    assert_eq!(history.selected(), Some("Address"));
    assert_eq!(column(history.current(), "Address"), vec!["10", "x", "20"]);
}

#[test]
fn select_rejects_unknown_columns() {
    let mut history = loaded();
    assert!(!history.select("Nope"));
    assert!(history.select_index(2));
    assert_eq!(history.selected(), Some("Scale Factors"));
    assert_eq!(history.selected_index(), Some(2));
    assert!(!history.select_index(3));
}
