use std::borrow::Cow;
use std::fmt;

use crate::numeric::format_number;

/// Prefix marking bookkeeping columns that never reach the user or an export
pub const RESERVED_PREFIX: &str = "__";

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    #[cfg(test)]
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// String form of the cell as displayed and exported
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Text(s) if s.is_empty())
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Text(String::new())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// Bookkeeping tag carried by rows of the diff view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMarker {
    /// First occurrence of a value that later turned out to be duplicated
    OriginalDuplicate,
    /// A later occurrence that was renamed to `value_N`
    RenamedDuplicate,
}

/// One record: column names mapped to cells, in insertion order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, Cell)>,
    pub marker: Option<RowMarker>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Cell>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Row::new();
        for (k, v) in pairs {
            row.set(k, v.into());
        }
        row
    }

    pub fn with_marker(mut self, marker: RowMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// String form of a cell; a missing cell reads as empty text
    pub fn text(&self, key: &str) -> Cow<'_, str> {
        self.get(key).map(Cell::as_text).unwrap_or(Cow::Borrowed(""))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.cells.iter().any(|(k, _)| k == key)
    }

    /// Insert or overwrite; new keys are appended
    pub fn set(&mut self, key: impl Into<String>, value: Cell) {
        let key = key.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, cell)) => *cell = value,
            None => self.cells.push((key, value)),
        }
    }

    /// Rename `old` to `new` in place. An existing `new` entry is replaced by
    /// the renamed one. Returns false when `old` is absent.
    pub fn rename_key(&mut self, old: &str, new: &str) -> bool {
        let Some(pos) = self.cells.iter().position(|(k, _)| k == old) else {
            return false;
        };
        self.cells[pos].0 = new.to_string();
        let mut i = 0;
        self.cells.retain(|(k, _)| {
            let keep = i == pos || k != new;
            i += 1;
            keep
        });
        true
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

pub fn is_reserved(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

/// Ordered sequence of rows. Snapshots are plain clones: rows own their cells,
/// so a clone shares nothing with the live table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// User-facing columns: the first row's keys minus reserved ones.
    /// Always derived, never cached.
    pub fn columns(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| {
                row.keys()
                    .filter(|k| !is_reserved(k))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the first row carries `column` as a key
    pub fn has_column(&self, column: &str) -> bool {
        self.rows
            .first()
            .map(|row| row.contains_key(column))
            .unwrap_or(false)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get_row(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.columns().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text by row index and column name, empty when missing
    #[cfg(test)]
    pub fn cell_text(&self, row: usize, column: &str) -> Cow<'_, str> {
        self.rows
            .get(row)
            .map(|r| r.text(column))
            .unwrap_or(Cow::Borrowed(""))
    }

    /// Build a new table by mapping every row, preserving count and order
    pub fn map_rows<F>(&self, f: F) -> Table
    where
        F: FnMut(&Row) -> Row,
    {
        Table::new(self.rows.iter().map(f).collect())
    }
}

impl From<Vec<Row>> for Table {
    fn from(rows: Vec<Row>) -> Self {
        Table::new(rows)
    }
}
