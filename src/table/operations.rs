use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::EditError;
use crate::numeric::{parse_float_prefix, parse_int_prefix};
use crate::table::diff::{self, DuplicateHit, ModifiedRow};
use crate::table::table::{is_reserved, Cell, Row, Table};

/// Exact scale-key mapping applied before any numeric parsing
const SCALE_KEYS: [(&str, f64); 4] = [("1", 1.0), ("10", 0.1), ("100", 0.01), ("1000", 0.001)];

/// Direction of a delta adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Add,
    Subtract,
}

impl Sign {
    pub fn factor(self) -> i64 {
        match self {
            Sign::Add => 1,
            Sign::Subtract => -1,
        }
    }
}

/// What an operator produced: the new table, the rows it touched (only
/// deduplicate reports them) and how many cells it had to leave alone.
#[derive(Debug, Clone, PartialEq)]
pub struct OpResult {
    pub table: Table,
    pub changed_rows: Option<Vec<ModifiedRow>>,
    pub skipped: usize,
}

impl OpResult {
    fn plain(table: Table, skipped: usize) -> Self {
        Self { table, changed_rows: None, skipped }
    }
}

// === Preconditions ===

/// Table must hold rows and its first row must carry `column`
pub fn require_column(table: &Table, column: &str) -> Result<(), EditError> {
    if table.is_empty() {
        return Err(EditError::NoDataLoaded);
    }
    if column.is_empty() || !table.has_column(column) {
        return Err(EditError::InvalidColumn(column.to_string()));
    }
    Ok(())
}

fn reject_protected(column: &str, protected: &str, operation: &'static str) -> Result<(), EditError> {
    if !protected.is_empty() && column == protected {
        return Err(EditError::ProtectedColumn {
            column: column.to_string(),
            operation,
        });
    }
    Ok(())
}

/// Validate a user-entered delta; only a leading integer counts
pub fn parse_delta(input: &str) -> Result<i64, EditError> {
    parse_int_prefix(input).ok_or_else(|| EditError::InvalidDelta(input.to_string()))
}

// === Cleanse ===

fn non_alnum_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}]+").expect("cleanse pattern is valid"))
}

fn underscores_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").expect("underscore pattern is valid"))
}

/// Normalize free text into an identifier-like token:
/// `"Temp (°C) / Zone-1"` becomes `"Temp_C_Zone_1"`.
pub fn cleanse_text(s: &str) -> String {
    let without_parens: String = s.chars().filter(|c| *c != '(' && *c != ')').collect();
    let replaced = non_alnum_re().replace_all(&without_parens, "_");
    let collapsed = underscores_re().replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}

pub fn cleanse(table: &Table, column: &str) -> Result<OpResult, EditError> {
    require_column(table, column)?;

    let result = table.map_rows(|row| {
        let mut new_row = row.clone();
        let cleaned = cleanse_text(&row.text(column));
        new_row.set(column, Cell::Text(cleaned));
        new_row
    });
    Ok(OpResult::plain(result, 0))
}

// === Rescale ===

/// Map a scale cell to its factor. Returns `None` when the cell is neither a
/// scale key nor a number.
pub fn scale_value(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    SCALE_KEYS
        .iter()
        .find(|(key, _)| *key == trimmed)
        .map(|(_, factor)| *factor)
        .or_else(|| parse_float_prefix(trimmed))
}

pub fn rescale(table: &Table, column: &str, protected: &str) -> Result<OpResult, EditError> {
    require_column(table, column)?;
    reject_protected(column, protected, "Rescale")?;

    let mut skipped = 0;
    let result = table.map_rows(|row| {
        let mut new_row = row.clone();
        match scale_value(&row.text(column)) {
            Some(n) => new_row.set(column, Cell::Number(n)),
            None => skipped += 1,
        }
        new_row
    });

    if skipped > 0 {
        debug!(column, skipped, "rescale left non-numeric cells untouched");
    }
    Ok(OpResult::plain(result, skipped))
}

// === Deduplicate ===

struct Seen {
    count: usize,
    first: usize,
}

/// Suffix repeated values with `_N`, counting per distinct trimmed value.
/// Empty cells are never counted. When nothing repeats, `changed_rows` is
/// `Some(vec![])` and the table is returned untouched.
pub fn deduplicate(table: &Table, column: &str, protected: &str) -> Result<OpResult, EditError> {
    require_column(table, column)?;
    reject_protected(column, protected, "Deduplicate")?;

    let mut seen: HashMap<String, Seen> = HashMap::new();
    let mut hits: Vec<DuplicateHit> = Vec::new();
    let mut rows: Vec<Row> = Vec::with_capacity(table.row_count());

    for (idx, row) in table.rows().iter().enumerate() {
        let value = row.text(column).trim().to_string();
        if value.is_empty() {
            rows.push(row.clone());
            continue;
        }

        let mut new_row = row.clone();
        match seen.get_mut(&value) {
            None => {
                new_row.set(column, Cell::Text(value.clone()));
                seen.insert(value, Seen { count: 0, first: idx });
            }
            Some(entry) => {
                entry.count += 1;
                new_row.set(column, Cell::Text(format!("{}_{}", value, entry.count)));
                hits.push(DuplicateHit {
                    original: entry.first,
                    duplicate: idx,
                    occurrence: entry.count,
                });
            }
        }
        rows.push(new_row);
    }

    if hits.is_empty() {
        return Ok(OpResult {
            table: table.clone(),
            changed_rows: Some(Vec::new()),
            skipped: 0,
        });
    }

    let result = Table::new(rows);
    let changed = diff::report(&result, &hits);
    Ok(OpResult {
        table: result,
        changed_rows: Some(changed),
        skipped: 0,
    })
}

// === Delta adjust ===

pub fn adjust(
    table: &Table,
    column: &str,
    delta_input: &str,
    sign: Sign,
    protected: &str,
) -> Result<OpResult, EditError> {
    require_column(table, column)?;
    reject_protected(column, protected, "Numeric operations")?;
    let delta = parse_delta(delta_input)?;
    let step = delta.checked_mul(sign.factor());

    let mut skipped = 0;
    let result = table.map_rows(|row| {
        let adjusted = parse_int_prefix(&row.text(column))
            .zip(step)
            .and_then(|(reg, step)| reg.checked_add(step));
        let mut new_row = row.clone();
        match adjusted {
            Some(v) => new_row.set(column, Cell::Text(v.to_string())),
            None => skipped += 1,
        }
        new_row
    });

    if skipped > 0 {
        debug!(column, skipped, "delta adjust skipped non-integer cells");
    }
    Ok(OpResult::plain(result, skipped))
}

// === Rename ===

/// Move every row's `old` value under `new`. Returns `Ok(None)` for the
/// no-op cases (same name, or either name empty). Reserved names are refused.
pub fn rename_column(table: &Table, old: &str, new: &str) -> Result<Option<OpResult>, EditError> {
    if old.is_empty() || new.is_empty() || old == new {
        return Ok(None);
    }
    require_column(table, old)?;
    if is_reserved(new) {
        return Err(EditError::InvalidColumn(new.to_string()));
    }

    let result = table.map_rows(|row| {
        let mut new_row = row.clone();
        new_row.rename_key(old, new);
        new_row
    });
    Ok(Some(OpResult::plain(result, 0)))
}
