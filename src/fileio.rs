use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use tracing::{debug, info};

use crate::error::LoadError;
use crate::progress::Progress;
use crate::table::table::{Cell, Row, Table, RESERVED_PREFIX};

/// Rows converted per step; progress is published after each chunk
pub const LOAD_CHUNK: usize = 1000;

/// Detected file format
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileFormat {
    Csv,
    Tsv,
    /// xlsx, xlsm, xls or ods, first sheet only
    Workbook,
}

impl FileFormat {
    /// Detect format from file extension; unknown extensions read as CSV
    pub fn from_extension(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => FileFormat::Workbook,
            "tsv" => FileFormat::Tsv,
            _ => FileFormat::Csv,
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            FileFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// Result of loading a file, including any warnings
#[derive(Debug)]
pub struct LoadResult {
    pub table: Table,
    pub warnings: Vec<String>,
}

pub struct FileIO {
    pub file_path: PathBuf,
    format: FileFormat,
}

impl FileIO {
    pub fn new(file_path: PathBuf) -> Self {
        let format = FileFormat::from_extension(&file_path);
        Self { file_path, format }
    }

    /// Parse the file into rows keyed by the header line
    pub fn load_table(&self, progress: &Progress) -> Result<LoadResult, LoadError> {
        let grid = match self.format {
            FileFormat::Workbook => self.read_workbook()?,
            FileFormat::Csv | FileFormat::Tsv => self.read_csv()?,
        };
        debug!(path = %self.file_path.display(), records = grid.len(), "file parsed");

        let result = rows_from_grid(grid, progress)?;
        info!(
            path = %self.file_path.display(),
            rows = result.table.row_count(),
            warnings = result.warnings.len(),
            "file loaded"
        );
        Ok(result)
    }

    // === Workbooks ===

    fn read_workbook(&self) -> Result<Vec<Vec<String>>, LoadError> {
        let mut workbook = open_workbook_auto(&self.file_path)?;
        let range = workbook.worksheet_range_at(0).ok_or(LoadError::NoSheets)??;
        Ok(range
            .rows()
            .map(|r| r.iter().map(cell_to_string).collect())
            .collect())
    }

    // === CSV/TSV ===

    fn read_csv(&self) -> Result<Vec<Vec<String>>, LoadError> {
        let file = File::open(&self.file_path).map_err(|source| LoadError::Io {
            path: self.file_path.display().to_string(),
            source,
        })?;
        let reader = BufReader::with_capacity(1 << 20, file);

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.format.delimiter())
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut grid = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            grid.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        // Exports written by this tool carry a BOM
        if let Some(first) = grid.first_mut().and_then(|row| row.first_mut()) {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }
        Ok(grid)
    }
}

/// Formatted text of a workbook cell
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => (if *v { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// Make header names usable as row keys: blanks become `__EMPTY`,
/// `__EMPTY_1`, ... and repeats of `H` become `H_1`, `H_2`, ...
pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::with_capacity(raw.len());

    for name in raw {
        let base = if name.trim().is_empty() {
            format!("{}EMPTY", RESERVED_PREFIX)
        } else {
            name.clone()
        };

        let mut candidate = base.clone();
        while out.contains(&candidate) {
            let n = counts.entry(base.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{}_{}", base, n);
        }
        out.push(candidate);
    }
    out
}

/// Turn parsed records (header first) into rows. Blank records are dropped,
/// short records padded with empty text and long ones truncated.
pub fn rows_from_grid(grid: Vec<Vec<String>>, progress: &Progress) -> Result<LoadResult, LoadError> {
    let mut records = grid.into_iter();
    let Some(header) = records.next() else {
        return Ok(LoadResult {
            table: Table::default(),
            warnings: vec!["File is empty".to_string()],
        });
    };
    let headers = normalize_headers(&header);

    let records: Vec<Vec<String>> = records
        .filter(|r| r.iter().any(|c| !c.is_empty()))
        .collect();
    progress.set_total(records.len());

    let mut rows: Vec<Row> = Vec::with_capacity(records.len());
    let mut truncated = 0usize;

    for chunk in records.chunks(LOAD_CHUNK) {
        if progress.is_cancelled() {
            return Err(LoadError::Interrupted);
        }
        for record in chunk {
            if record.len() > headers.len() {
                truncated += 1;
            }
            let mut row = Row::new();
            for (i, key) in headers.iter().enumerate() {
                let value = record.get(i).cloned().unwrap_or_default();
                row.set(key.clone(), Cell::Text(value));
            }
            rows.push(row);
        }
        progress.inc_by(chunk.len());
    }

    let mut warnings = Vec::new();
    if truncated > 0 {
        warnings.push(format!(
            "Dropped extra cells in {} row(s) (header has {} columns)",
            truncated,
            headers.len()
        ));
    }

    Ok(LoadResult {
        table: Table::new(rows),
        warnings,
    })
}
