use tracing::{debug, info};

use super::transaction::{Applied, Transaction};
use crate::config::ColumnRules;
use crate::error::EditError;
use crate::table::diff::ModifiedRow;
use crate::table::table::Table;

/// What a successful `run` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new snapshot was installed
    Changed { skipped: usize, modified: usize },
    /// The operator found nothing to do; history untouched
    Unchanged,
}

/// Owns the authoritative table and its linear undo/redo history.
///
/// Every entry on either stack is a full-table snapshot. `baseline` is the
/// table as loaded and only changes on the next load.
#[derive(Debug, Default)]
pub struct History {
    baseline: Option<Table>,
    current: Table,
    undo_stack: Vec<Table>,
    redo_stack: Vec<Table>,
    modified: Vec<ModifiedRow>,
    selected: Option<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a freshly loaded table as both baseline and current
    pub fn load(&mut self, table: Table) {
        info!(rows = table.row_count(), cols = table.col_count(), "table loaded");
        self.selected = table.columns().into_iter().next();
        self.baseline = Some(table.clone());
        self.current = table;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.modified.clear();
    }

    /// Record `current` and install an already-computed table.
    /// Returns false (and does nothing) before the first load.
    pub fn apply(&mut self, table: Table) -> bool {
        if !self.is_loaded() {
            return false;
        }
        let previous = std::mem::replace(&mut self.current, table);
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        self.modified.clear();
        true
    }

    /// Check preconditions, run the operator against `current` and record
    /// the result. Errors leave every piece of state as it was.
    pub fn run(&mut self, txn: &Transaction, rules: &ColumnRules) -> Result<Outcome, EditError> {
        if !self.is_loaded() {
            return Err(EditError::NoDataLoaded);
        }

        match txn.apply(&self.current, rules)? {
            Applied::Unchanged => {
                if matches!(txn, Transaction::Dedupe { .. }) {
                    self.modified.clear();
                }
                debug!(op = txn.name(), "nothing to change");
                Ok(Outcome::Unchanged)
            }
            Applied::Changed(result) => {
                self.apply(result.table);
                self.modified = result.changed_rows.unwrap_or_default();

                if let Transaction::Rename { from, to } = txn {
                    if self.selected.as_deref() == Some(from.as_str()) {
                        self.selected = Some(to.clone());
                    }
                }

                info!(
                    op = txn.name(),
                    column = txn.column(),
                    skipped = result.skipped,
                    modified = self.modified.len(),
                    "operation applied"
                );
                Ok(Outcome::Changed {
                    skipped: result.skipped,
                    modified: self.modified.len(),
                })
            }
        }
    }

    /// Step back one snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        let position = self.selected_position();
        let replaced = std::mem::replace(&mut self.current, previous);
        self.redo_stack.push(replaced);
        self.modified.clear();
        self.reconcile_selection(position);
        info!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "undo");
        true
    }

    /// Re-install the most recently undone snapshot
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let position = self.selected_position();
        let replaced = std::mem::replace(&mut self.current, next);
        self.undo_stack.push(replaced);
        self.modified.clear();
        self.reconcile_selection(position);
        info!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "redo");
        true
    }

    /// Restore the load-time table and forget all history
    pub fn reset_to_original(&mut self) -> bool {
        let Some(baseline) = self.baseline.clone() else {
            return false;
        };
        let position = self.selected_position();
        self.current = baseline;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.modified.clear();
        self.reconcile_selection(position);
        info!("reset to original");
        true
    }

    // === Selection ===

    /// Select a column by name; unknown names are refused
    pub fn select(&mut self, column: &str) -> bool {
        if self.current.columns().iter().any(|c| c == column) {
            self.selected = Some(column.to_string());
            true
        } else {
            false
        }
    }

    /// Select the column at a display position
    pub fn select_index(&mut self, idx: usize) -> bool {
        match self.current.columns().into_iter().nth(idx) {
            Some(name) => {
                self.selected = Some(name);
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_position()
    }

    fn selected_position(&self) -> Option<usize> {
        let name = self.selected.as_deref()?;
        self.current.columns().iter().position(|c| c == name)
    }

    /// Keep the selection valid after `current` was swapped: a vanished
    /// name falls back to the column now at the same position.
    fn reconcile_selection(&mut self, position: Option<usize>) {
        let columns = self.current.columns();
        if let Some(name) = &self.selected {
            if columns.contains(name) {
                return;
            }
        }
        self.selected = match columns.len() {
            0 => None,
            len => columns.into_iter().nth(position.unwrap_or(0).min(len - 1)),
        };
    }

    // === Accessors ===

    pub fn current(&self) -> &Table {
        &self.current
    }

    #[cfg(test)]
    pub fn baseline(&self) -> Option<&Table> {
        self.baseline.as_ref()
    }

    /// Rows touched by the last deduplicate, for the diff view
    pub fn modified(&self) -> &[ModifiedRow] {
        &self.modified
    }

    pub fn is_loaded(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}
