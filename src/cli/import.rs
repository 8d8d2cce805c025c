use std::path::PathBuf;

use super::Workspace;
use crate::db::{self, META_CHECKSUM, META_IMPORTED_AT, META_SOURCE_FILE};
use crate::error::{HangarError, Result};
use crate::importer::{compute_checksum, read_sheet};
use crate::normalizer::to_raw_rows;

pub fn run(file: &str, append: bool, force: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    let mut ws = Workspace::open()?;

    let checksum = compute_checksum(&file_path)?;
    let active = db::get_metadata(&ws.conn, META_CHECKSUM);
    if !force && !ws.dashboard.is_empty() && active.as_deref() == Some(checksum.as_str()) {
        println!("This file is already the active dataset (matching checksum). Use --force to import it again.");
        return Ok(());
    }

    let sheet = read_sheet(&file_path)?;
    if sheet.columns.is_empty() {
        return Err(HangarError::Other(format!(
            "No header row found in {}",
            file_path.display()
        )));
    }
    let imported = sheet.rows.len();

    let (rows, columns) = if append {
        let mut columns = ws.dashboard.columns().to_vec();
        for column in sheet.columns {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        let mut rows = to_raw_rows(ws.dashboard.records());
        rows.extend(sheet.rows);
        (rows, columns)
    } else {
        (sheet.rows, sheet.columns)
    };

    ws.dashboard.load_dataset(&rows, Some(columns));
    let outcome = ws.save_dataset();
    if !outcome.success {
        return Err(HangarError::Other(outcome.message));
    }

    db::set_columns(&ws.conn, ws.dashboard.columns())?;
    db::set_metadata(
        &ws.conn,
        META_SOURCE_FILE,
        file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
    )?;
    db::set_metadata(&ws.conn, META_CHECKSUM, &checksum)?;
    db::set_metadata(&ws.conn, META_IMPORTED_AT, &chrono::Local::now().to_rfc3339())?;

    if append {
        println!(
            "{imported} records appended ({} total, {} columns)",
            ws.dashboard.records().len(),
            ws.dashboard.columns().len()
        );
    } else {
        println!(
            "{imported} records imported ({} columns)",
            ws.dashboard.columns().len()
        );
    }
    Ok(())
}
