use std::cmp;

use rayon::prelude::*;

use crate::table::table::Table;
use crate::util::display_width;

/// Rows above which widths are measured in parallel
const PARALLEL_ROWS: usize = 10_000;

/// Display widths of the user-facing columns, cached until the table changes
#[derive(Debug, Clone)]
pub struct ColumnWidths {
    col_widths: Vec<usize>,
    pub max_col_width: usize,
    pub min_col_width: usize,
    dirty: bool,
}

impl Default for ColumnWidths {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnWidths {
    pub fn new() -> Self {
        Self {
            col_widths: Vec::new(),
            max_col_width: 30,
            min_col_width: 3,
            dirty: true,
        }
    }

    /// Widest of header and cells per column, clamped to the configured bounds
    pub fn recompute(&mut self, table: &Table) {
        let columns = table.columns();
        let measure = |mut acc: Vec<usize>, row: &crate::table::table::Row| {
            for (w, c) in acc.iter_mut().zip(columns.iter()) {
                *w = cmp::max(*w, display_width(&row.text(c)));
            }
            acc
        };
        let headers: Vec<usize> = columns.iter().map(|c| display_width(c)).collect();

        let widths = if table.row_count() >= PARALLEL_ROWS {
            table
                .rows()
                .par_iter()
                .fold(|| headers.clone(), measure)
                .reduce(
                    || headers.clone(),
                    |a, b| a.iter().zip(b.iter()).map(|(x, y)| cmp::max(*x, *y)).collect(),
                )
        } else {
            table.rows().iter().fold(headers.clone(), measure)
        };

        self.col_widths = widths
            .into_iter()
            .map(|w| w.clamp(self.min_col_width, self.max_col_width))
            .collect();
        self.dirty = false;
    }

    pub fn col_widths(&mut self, table: &Table) -> &[usize] {
        if self.dirty {
            self.recompute(table);
        }
        &self.col_widths
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::table::Row;

    #[test]
    fn test_widths_follow_header_and_cells() {
        let table = Table::new(vec![
            Row::from_pairs([("Tags", "Pump_Station_1"), ("Address", "5"), ("__EMPTY", "ignored")]),
            Row::from_pairs([("Tags", "T"), ("Address", "40001"), ("__EMPTY", "")]),
        ]);
        let mut widths = ColumnWidths::new();
        assert_eq!(widths.col_widths(&table), &[14, 7]);
    }

    #[test]
    fn test_widths_are_clamped() {
        let long = "x".repeat(80);
        let table = Table::new(vec![Row::from_pairs([("a", long.as_str()), ("b", "")])]);
        let mut widths = ColumnWidths::new();
        assert_eq!(widths.col_widths(&table), &[30, 3]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows: Vec<Row> = (0..PARALLEL_ROWS + 5)
            .map(|i| Row::from_pairs([("n", i.to_string())]))
            .collect();
        let table = Table::new(rows);
        let mut widths = ColumnWidths::new();
        assert_eq!(widths.col_widths(&table), &[5]);
    }

    #[test]
    fn test_cache_until_dirty() {
        let mut widths = ColumnWidths::new();
        widths.col_widths(&Table::new(vec![Row::from_pairs([("a", "1")])]));
        let wider = Table::new(vec![Row::from_pairs([("a", "123456")])]);
        assert_eq!(widths.col_widths(&wider), &[3]);
        widths.mark_dirty();
        assert_eq!(widths.col_widths(&wider), &[6]);
    }
}
