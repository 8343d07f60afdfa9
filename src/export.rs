//! Projections of the current table into the exported artifacts.
//!
//! Nothing here mutates the table. Files are staged in a temporary file in
//! the destination directory and persisted over the target once complete.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::ColumnRules;
use crate::error::ExportError;
use crate::numeric::to_number;
use crate::table::table::Table;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// === Projections ===

/// JSON value for a coerced number: whole numbers print without a
/// fraction and non-finite values become `null`.
fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Map each tag to `{starting_reg, type, scale_factor}`. Rows with an empty
/// tag are skipped; a repeated tag keeps its first position but takes the
/// last row's values.
pub fn register_map(table: &Table, rules: &ColumnRules, register_type: &str) -> Map<String, Value> {
    let mut out = Map::new();
    for row in table.rows() {
        let tag = row.text(&rules.tag);
        if tag.is_empty() {
            continue;
        }

        let mut entry = Map::new();
        entry.insert(
            "starting_reg".to_string(),
            number_value(to_number(&row.text(&rules.address))),
        );
        entry.insert("type".to_string(), Value::from(register_type));
        entry.insert(
            "scale_factor".to_string(),
            number_value(to_number(&row.text(&rules.scale))),
        );
        out.insert(tag.into_owned(), Value::Object(entry));
    }
    out
}

/// One `LAST('<tag>') AS '<tag>'` expression per row with a tag
pub fn query_expressions(table: &Table, rules: &ColumnRules) -> Vec<String> {
    table
        .rows()
        .iter()
        .map(|row| row.text(&rules.tag))
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!("LAST('{}') AS '{}'", tag, tag))
        .collect()
}

/// Two-space indented JSON
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Append `.json` unless the name already ends with it
pub fn ensure_json_extension(name: &str) -> String {
    if name.to_lowercase().ends_with(".json") {
        name.to_string()
    } else {
        format!("{}.json", name)
    }
}

// === CSV ===

/// User-facing columns as CSV: BOM, header line, CRLF line endings
pub fn csv_bytes(table: &Table) -> Result<Vec<u8>, ExportError> {
    if table.is_empty() {
        return Err(ExportError::NoData);
    }
    let columns = table.columns();

    let mut buf = UTF8_BOM.to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(&mut buf);
        writer.write_record(&columns)?;
        for row in table.rows() {
            writer.write_record(columns.iter().map(|c| row.text(c).into_owned()))?;
        }
        writer.flush().map_err(|source| ExportError::Io {
            path: "<buffer>".to_string(),
            source,
        })?;
    }
    Ok(buf)
}

pub fn write_csv(table: &Table, path: &Path) -> Result<(), ExportError> {
    let bytes = csv_bytes(table)?;
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), rows = table.row_count(), "csv written");
    Ok(())
}

/// Write pretty JSON to `name` (with `.json` enforced); returns the final path
pub fn write_json<T: Serialize + ?Sized>(value: &T, name: &str) -> Result<PathBuf, ExportError> {
    let path = PathBuf::from(ensure_json_extension(name));
    let mut text = to_pretty_json(value)?;
    text.push('\n');
    write_atomic(&path, text.as_bytes())?;
    info!(path = %path.display(), bytes = text.len(), "json written");
    Ok(path)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.display().to_string(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::table::{Cell, Row};
    use serde_json::json;

    fn sheet(data: Vec<[&str; 3]>) -> Table {
        Table::new(
            data.into_iter()
                .map(|[t, a, s]| Row::from_pairs([("Tags", t), ("Address", a), ("Scale Factors", s)]))
                .collect(),
        )
    }

    #[test]
    fn test_register_map_entry() {
        let table = sheet(vec![["T1", "5", "0.1"], ["", "6", "1"]]);
        let map = register_map(&table, &ColumnRules::default(), "int16");
        assert_eq!(
            Value::Object(map),
            json!({"T1": {"starting_reg": 5, "type": "int16", "scale_factor": 0.1}})
        );
    }

    #[test]
    fn test_register_map_last_write_wins() {
        let table = sheet(vec![["A", "1", "1"], ["B", "2", "1"], ["A", "3", "0.01"]]);
        let map = register_map(&table, &ColumnRules::default(), "int16");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(map["A"]["starting_reg"], json!(3));
        assert_eq!(map["A"]["scale_factor"], json!(0.01));
    }

    #[test]
    fn test_register_map_non_numeric_is_null() {
        let table = sheet(vec![["T1", "abc", ""]]);
        let map = register_map(&table, &ColumnRules::default(), "uint16");
        assert_eq!(map["T1"]["starting_reg"], Value::Null);
        assert_eq!(map["T1"]["scale_factor"], json!(0));
        assert_eq!(map["T1"]["type"], json!("uint16"));
    }

    #[test]
    fn test_register_map_reads_numbers() {
        let table = Table::new(vec![Row::from_pairs([
            ("Tags", Cell::from("T1")),
            ("Address", Cell::from("40001")),
            ("Scale Factors", Cell::Number(0.001)),
        ])]);
        let map = register_map(&table, &ColumnRules::default(), "int16");
        assert_eq!(map["T1"]["starting_reg"], json!(40001));
        assert_eq!(map["T1"]["scale_factor"], json!(0.001));
    }

    #[test]
    fn test_query_expressions() {
        let table = sheet(vec![["T1", "", ""], ["", "", ""], ["Pump_1", "", ""]]);
        assert_eq!(
            query_expressions(&table, &ColumnRules::default()),
            vec!["LAST('T1') AS 'T1'", "LAST('Pump_1') AS 'Pump_1'"]
        );
    }

    #[test]
    fn test_custom_tag_column() {
        let table = Table::new(vec![Row::from_pairs([("Name", "X"), ("Reg", "7"), ("Scale", "1")])]);
        let rules = ColumnRules {
            tag: "Name".to_string(),
            address: "Reg".to_string(),
            scale: "Scale".to_string(),
        };
        assert_eq!(query_expressions(&table, &rules), vec!["LAST('X') AS 'X'"]);
        assert_eq!(register_map(&table, &rules, "int16")["X"]["starting_reg"], json!(7));
    }

    #[test]
    fn test_pretty_json() {
        let text = to_pretty_json(&vec!["LAST('T1') AS 'T1'"]).unwrap();
        assert_eq!(text, "[\n  \"LAST('T1') AS 'T1'\"\n]");
    }

    #[test]
    fn test_ensure_json_extension() {
        assert_eq!(ensure_json_extension("tags"), "tags.json");
        assert_eq!(ensure_json_extension("tags.json"), "tags.json");
        assert_eq!(ensure_json_extension("TAGS.JSON"), "TAGS.JSON");
        assert_eq!(ensure_json_extension("tags.txt"), "tags.txt.json");
    }

    #[test]
    fn test_csv_bytes() {
        let mut row = Row::from_pairs([("Tags", "a,b"), ("Address", "5")]);
        row.set("__EMPTY", Cell::from("hidden"));
        row.set("Scale Factors", Cell::Number(0.1));
        let bytes = csv_bytes(&Table::new(vec![row])).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(text, "Tags,Address,Scale Factors\r\n\"a,b\",5,0.1\r\n");
    }

    #[test]
    fn test_csv_empty_table() {
        assert!(matches!(csv_bytes(&Table::default()), Err(ExportError::NoData)));
    }

    #[test]
    fn test_write_csv_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        std::fs::write(&path, "old").unwrap();
        write_csv(&sheet(vec![["T1", "5", "1"]]), &path).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert!(written.starts_with(UTF8_BOM));
        assert!(String::from_utf8_lossy(&written).contains("T1,5,1"));
    }

    #[test]
    fn test_write_json_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        let name = dir.path().join("tags_config");
        let path = write_json(&json!({"a": 1}), &name.to_string_lossy()).unwrap();
        assert_eq!(path, dir.path().join("tags_config.json"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{\n  \"a\": 1\n}\n");
    }
}
