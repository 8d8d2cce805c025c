use std::path::PathBuf;

use crate::db::{self, get_connection, get_metadata, META_IMPORTED_AT, META_SOURCE_FILE};
use crate::error::Result;
use crate::fmt::{count, format_bytes};
use crate::normalizer::column_set;
use crate::settings::{load_settings, settings_path};
use crate::store;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = PathBuf::from(&settings.data_dir);
    let db_path = db::db_file(&data_dir);
    let data_path = store::data_file(&data_dir);

    println!("Settings:   {}", settings_path().display());
    println!("Data dir:   {}", data_dir.display());
    println!("Database:   {}", db_path.display());
    println!("Page size:  {}", settings.page_size);
    println!("Numeric:    {:?}", settings.numeric_rule);
    println!("Status:     {:?}", settings.status_scope);

    if !db_path.exists() {
        println!();
        println!("Database not found. Run `hangar init` to set up.");
        return Ok(());
    }

    let conn = get_connection(&db_path)?;
    db::init_db(&conn)?;

    println!();
    if data_path.exists() {
        let size = std::fs::metadata(&data_path)?.len();
        let rows = store::load_dataset(&data_path);
        let columns = db::get_columns(&conn).unwrap_or_else(|| column_set(&rows));
        println!("Data file:  {} ({})", data_path.display(), format_bytes(size));
        println!("Source:     {}", get_metadata(&conn, META_SOURCE_FILE).as_deref().unwrap_or("(unknown)"));
        println!("Imported:   {}", get_metadata(&conn, META_IMPORTED_AT).as_deref().unwrap_or("(unknown)"));
        println!("Records:    {}", count(rows.len()));
        println!("Columns:    {}", columns.len());
    } else {
        println!("No dataset loaded. Run `hangar import <file>` or `hangar demo`.");
    }

    let transit = db::load_transit(&conn)?.len();
    println!("In transit: {transit}");

    Ok(())
}
