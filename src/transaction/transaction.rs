use crate::config::ColumnRules;
use crate::error::EditError;
use crate::table::operations::{self, OpResult, Sign};
use crate::table::table::Table;

/// A user-requested operation on the current table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Normalize free text into identifiers
    Cleanse { column: String },
    /// Turn scale keys and numeric text into numbers
    Rescale { column: String },
    /// Suffix repeated values with `_N`
    Dedupe { column: String },
    /// Add or subtract an integer from every register
    Delta {
        column: String,
        delta: String,
        sign: Sign,
    },
    /// Move a column's values under a new name
    Rename { from: String, to: String },
}

/// Outcome of running a transaction against a table
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// A new table to install
    Changed(OpResult),
    /// Nothing to record (no repeats found, or a degenerate rename)
    Unchanged,
}

impl Transaction {
    /// Run the operator against `table`. The input is never modified;
    /// structural errors are returned before any row is visited.
    pub fn apply(&self, table: &Table, rules: &ColumnRules) -> Result<Applied, EditError> {
        match self {
            Transaction::Cleanse { column } => {
                operations::cleanse(table, column).map(Applied::Changed)
            }
            Transaction::Rescale { column } => {
                operations::rescale(table, column, &rules.tag).map(Applied::Changed)
            }
            Transaction::Dedupe { column } => {
                let result = operations::deduplicate(table, column, &rules.scale)?;
                if result.changed_rows.as_ref().is_some_and(|rows| rows.is_empty()) {
                    Ok(Applied::Unchanged)
                } else {
                    Ok(Applied::Changed(result))
                }
            }
            Transaction::Delta { column, delta, sign } => {
                operations::adjust(table, column, delta, *sign, &rules.tag).map(Applied::Changed)
            }
            Transaction::Rename { from, to } => Ok(operations::rename_column(table, from, to)?
                .map_or(Applied::Unchanged, Applied::Changed)),
        }
    }

    /// Short label for status messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            Transaction::Cleanse { .. } => "cleanse",
            Transaction::Rescale { .. } => "rescale",
            Transaction::Dedupe { .. } => "deduplicate",
            Transaction::Delta { sign: Sign::Add, .. } => "add",
            Transaction::Delta { sign: Sign::Subtract, .. } => "subtract",
            Transaction::Rename { .. } => "rename",
        }
    }

    /// Column the transaction targets
    pub fn column(&self) -> &str {
        match self {
            Transaction::Cleanse { column }
            | Transaction::Rescale { column }
            | Transaction::Dedupe { column }
            | Transaction::Delta { column, .. } => column,
            Transaction::Rename { from, .. } => from,
        }
    }
}
