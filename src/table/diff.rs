//! Side-channel report of the rows a deduplicate pass touched.
//!
//! The report is informational only: it is shown next to the table and
//! never feeds back into undo history.

use crate::table::table::{Row, RowMarker, Table};

/// One repeated value found during a deduplicate pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateHit {
    /// Row index of the first occurrence of the value
    pub original: usize,
    /// Row index of this repeat
    pub duplicate: usize,
    /// 1 for the first repeat, 2 for the second, and so on
    pub occurrence: usize,
}

/// A row of the diff view, positioned by its index in the result table
#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedRow {
    pub index: usize,
    pub row: Row,
}

impl ModifiedRow {
    pub fn is_original(&self) -> bool {
        self.row.marker == Some(RowMarker::OriginalDuplicate)
    }
}

/// Build the modified-set in encounter order: the first time a value repeats,
/// its original row (flagged) is emitted right before that repeat; every
/// repeat follows as it was produced.
pub fn report(result: &Table, hits: &[DuplicateHit]) -> Vec<ModifiedRow> {
    let mut out = Vec::with_capacity(hits.len() * 2);

    let mut push = |index: usize, marker: RowMarker| {
        if let Some(row) = result.get_row(index) {
            out.push(ModifiedRow {
                index,
                row: row.clone().with_marker(marker),
            });
        }
    };

    for hit in hits {
        if hit.occurrence == 1 {
            push(hit.original, RowMarker::OriginalDuplicate);
        }
        push(hit.duplicate, RowMarker::RenamedDuplicate);
    }

    out
}
