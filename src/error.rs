use std::io;

use thiserror::Error;

/// Structural errors raised by column operators before any state is touched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("No data loaded. Open a spreadsheet first")]
    NoDataLoaded,
    #[error("No '{0}' column")]
    InvalidColumn(String),
    #[error("{operation} is disabled for the '{column}' column")]
    ProtectedColumn {
        column: String,
        operation: &'static str,
    },
    #[error("Enter a valid number (got '{0}')")]
    InvalidDelta(String),
}

/// Failures while reading a spreadsheet into rows
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook has no sheets")]
    NoSheets,
    #[error("loader thread stopped before finishing")]
    Interrupted,
}

/// Failures while writing an export artifact
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to save")]
    NoData,
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while handing text to the system clipboard
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Clipboard error: {0}")]
    Backend(#[from] arboard::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            EditError::InvalidColumn("Tags".to_string()).to_string(),
            "No 'Tags' column"
        );
        assert_eq!(
            EditError::ProtectedColumn {
                column: "Tags".to_string(),
                operation: "Rescale",
            }
            .to_string(),
            "Rescale is disabled for the 'Tags' column"
        );
        assert_eq!(ExportError::NoData.to_string(), "Nothing to save");
    }
}
