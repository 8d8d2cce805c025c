use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{HangarError, Result};
use crate::normalizer::RawRow;

/// Header row plus one raw row per non-blank data row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedSheet {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    #[cfg(feature = "xlsx")]
    Spreadsheet,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SheetFormat::Csv),
            #[cfg(feature = "xlsx")]
            "xlsx" | "xls" | "xlsm" | "ods" => Ok(SheetFormat::Spreadsheet),
            _ => Err(HangarError::UnknownFormat(format!(
                "{} (supported: {})",
                path.display(),
                SUPPORTED
            ))),
        }
    }
}

#[cfg(feature = "xlsx")]
const SUPPORTED: &str = ".csv, .xlsx, .xls, .xlsm, .ods";
#[cfg(not(feature = "xlsx"))]
const SUPPORTED: &str = ".csv";

pub fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

/// Parse the first sheet of a CSV or spreadsheet file.
pub fn read_sheet(file_path: &Path) -> Result<ImportedSheet> {
    let sheet = match SheetFormat::from_path(file_path)? {
        SheetFormat::Csv => read_csv(file_path)?,
        #[cfg(feature = "xlsx")]
        SheetFormat::Spreadsheet => read_spreadsheet(file_path)?,
    };
    tracing::info!(
        file = %file_path.display(),
        columns = sheet.columns.len(),
        rows = sheet.rows.len(),
        "sheet parsed"
    );
    Ok(sheet)
}

// ---------------------------------------------------------------------------
// Row assembly
// ---------------------------------------------------------------------------

fn header_names<I, S>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let name = c.as_ref().trim();
            if name.is_empty() {
                format!("Column {}", i + 1)
            } else {
                name.to_string()
            }
        })
        .collect()
}

fn is_blank(cell: &serde_json::Value) -> bool {
    match cell {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Map cell `i` to `columns[i]`; short rows are padded with empty strings and
/// cells past the header are dropped. Returns `None` for a fully blank row.
fn assemble_row(columns: &[String], cells: Vec<serde_json::Value>) -> Option<RawRow> {
    if cells.iter().all(is_blank) {
        return None;
    }
    let mut cells = cells.into_iter();
    Some(
        columns
            .iter()
            .map(|col| {
                let cell = cells.next().unwrap_or(serde_json::Value::Null);
                let cell = if cell.is_null() {
                    serde_json::Value::String(String::new())
                } else {
                    cell
                };
                (col.clone(), cell)
            })
            .collect(),
    )
}

fn assemble<R>(header: Vec<String>, body: R) -> ImportedSheet
where
    R: Iterator<Item = Vec<serde_json::Value>>,
{
    let mut skipped = 0usize;
    let rows = body
        .filter_map(|cells| {
            let row = assemble_row(&header, cells);
            if row.is_none() {
                skipped += 1;
            }
            row
        })
        .collect();
    if skipped > 0 {
        tracing::debug!(skipped, "blank rows skipped");
    }
    ImportedSheet {
        columns: header,
        rows,
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn read_csv(file_path: &Path) -> Result<ImportedSheet> {
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));
    let mut records = rdr.records();

    let Some(first) = records.next() else {
        return Ok(ImportedSheet {
            columns: Vec::new(),
            rows: Vec::new(),
        });
    };
    let header = header_names(first?.iter().map(|h| h.trim_start_matches('\u{feff}')));

    let mut body = Vec::new();
    for result in records {
        let record = result?;
        body.push(
            record
                .iter()
                .map(|cell| serde_json::Value::String(cell.to_string()))
                .collect::<Vec<_>>(),
        );
    }
    Ok(assemble(header, body.into_iter()))
}

// ---------------------------------------------------------------------------
// Spreadsheets (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn cell_value(cell: &calamine::Data) -> serde_json::Value {
    use calamine::Data;

    match cell {
        Data::Int(i) => serde_json::Value::from(*i),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        // Dates keep their serial number, as the sheet stores them.
        Data::DateTime(dt) => serde_json::Number::from_f64(dt.as_f64())
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            serde_json::Value::String(s.clone())
        }
        Data::Bool(b) => serde_json::Value::String(b.to_string()),
        Data::Error(_) | Data::Empty => serde_json::Value::Null,
    }
}

#[cfg(feature = "xlsx")]
fn read_spreadsheet(file_path: &Path) -> Result<ImportedSheet> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| HangarError::Spreadsheet(format!("Failed to open workbook: {e}")))?;
    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(HangarError::Spreadsheet("workbook has no sheets".to_string()));
    };
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| HangarError::Spreadsheet(format!("Failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let Some(first) = rows.next() else {
        return Ok(ImportedSheet {
            columns: Vec::new(),
            rows: Vec::new(),
        });
    };
    let header = header_names(first.iter().map(|c| match c {
        calamine::Data::Empty => String::new(),
        other => other.to_string(),
    }));
    let body = rows.map(|row| row.iter().map(cell_value).collect::<Vec<_>>());
    Ok(assemble(header, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_csv(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_csv_maps_cells_to_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "fleet.csv",
            "Drone QR Code ID,Drone ID,Rack No\nQR-1,D-1,4\nQR-2,D-2\n",
        );
        let sheet = read_sheet(&path).unwrap();
        assert_eq!(sheet.columns, vec!["Drone QR Code ID", "Drone ID", "Rack No"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0]["Rack No"], json!("4"));
        assert_eq!(sheet.rows[1]["Rack No"], json!(""));
    }

    #[test]
    fn test_blank_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "gaps.csv", "Name,,Notes\na,b,c\n,,\n  , ,\nd,,f,extra\n");
        let sheet = read_sheet(&path).unwrap();
        assert_eq!(sheet.columns, vec!["Name", "Column 2", "Notes"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1]["Notes"], json!("f"));
        assert_eq!(sheet.rows[1].len(), 3);
    }

    #[test]
    fn test_empty_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "empty.csv", "");
        let sheet = read_sheet(&path).unwrap();
        assert!(sheet.columns.is_empty());
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "fleet.txt", "a,b\n1,2\n");
        let err = read_sheet(&path).unwrap_err();
        assert!(matches!(err, HangarError::UnknownFormat(_)), "got: {err}");
    }

    #[test]
    fn test_checksum_stable_and_content_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_csv(dir.path(), "a.csv", "x\n1\n");
        let b = write_csv(dir.path(), "b.csv", "x\n1\n");
        let c = write_csv(dir.path(), "c.csv", "x\n2\n");
        let sum_a = compute_checksum(&a).unwrap();
        assert_eq!(sum_a.len(), 64);
        assert_eq!(sum_a, compute_checksum(&b).unwrap());
        assert_ne!(sum_a, compute_checksum(&c).unwrap());
    }

    #[test]
    fn test_assemble_row_pads_and_skips() {
        let columns = vec!["A".to_string(), "B".to_string()];
        assert!(assemble_row(&columns, vec![json!(""), json!(null)]).is_none());
        let row = assemble_row(&columns, vec![json!(3)]).unwrap();
        assert_eq!(row["A"], json!(3));
        assert_eq!(row["B"], json!(""));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_cell_value_mapping() {
        use calamine::Data;
        assert_eq!(cell_value(&Data::Int(4)), json!(4));
        assert_eq!(cell_value(&Data::Float(2.5)), json!(2.5));
        assert_eq!(cell_value(&Data::Bool(true)), json!("true"));
        assert_eq!(cell_value(&Data::String("x".into())), json!("x"));
        assert_eq!(cell_value(&Data::Empty), serde_json::Value::Null);
    }
}
