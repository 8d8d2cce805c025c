use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{TransitEntry, TransitStatus};

pub const DB_FILE: &str = "hangar.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transit_entries (
    id INTEGER PRIMARY KEY,
    drone_id TEXT NOT NULL,
    drone_qr_code TEXT NOT NULL,
    from_location TEXT NOT NULL,
    to_location TEXT NOT NULL,
    shipping_date_time TEXT NOT NULL,
    eta TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'In Transit',
    created_at TEXT DEFAULT (datetime('now'))
);
";

// Metadata keys
pub const META_COLUMNS: &str = "columns";
pub const META_SOURCE_FILE: &str = "source_file";
pub const META_CHECKSUM: &str = "checksum";
pub const META_IMPORTED_AT: &str = "imported_at";

pub fn db_file(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE)
}

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Open the database in `data_dir`, creating the schema when missing.
pub fn open(data_dir: &Path) -> Result<Connection> {
    std::fs::create_dir_all(data_dir)?;
    let conn = get_connection(&db_file(data_dir))?;
    init_db(&conn)?;
    Ok(conn)
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

pub fn get_metadata(conn: &Connection, key: &str) -> Option<String> {
    conn.query_row("SELECT value FROM metadata WHERE key = ?1", [key], |r| r.get(0))
        .optional()
        .ok()
        .flatten()
}

pub fn set_metadata(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn delete_metadata(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM metadata WHERE key = ?1", [key])?;
    Ok(())
}

/// Column set of the active dataset, if one was recorded at import time.
pub fn get_columns(conn: &Connection) -> Option<Vec<String>> {
    let raw = get_metadata(conn, META_COLUMNS)?;
    serde_json::from_str(&raw).ok()
}

pub fn set_columns(conn: &Connection, columns: &[String]) -> Result<()> {
    set_metadata(conn, META_COLUMNS, &serde_json::to_string(columns)?)
}

pub fn clear_dataset_metadata(conn: &Connection) -> Result<()> {
    for key in [META_COLUMNS, META_SOURCE_FILE, META_CHECKSUM, META_IMPORTED_AT] {
        delete_metadata(conn, key)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transit ledger
// ---------------------------------------------------------------------------

pub fn load_transit(conn: &Connection) -> Result<Vec<TransitEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, drone_id, drone_qr_code, from_location, to_location,
                shipping_date_time, eta, status
         FROM transit_entries ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        let status: String = row.get(7)?;
        Ok(TransitEntry {
            id: row.get(0)?,
            drone_id: row.get(1)?,
            drone_qr_code: row.get(2)?,
            from: row.get(3)?,
            to: row.get(4)?,
            shipping_date_time: row.get(5)?,
            eta: row.get(6)?,
            status: status.parse().unwrap_or(TransitStatus::InTransit),
        })
    })?;
    let entries = rows.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(entries)
}

pub fn insert_transit(conn: &Connection, entry: &TransitEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO transit_entries
            (id, drone_id, drone_qr_code, from_location, to_location, shipping_date_time, eta, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id,
            entry.drone_id,
            entry.drone_qr_code,
            entry.from,
            entry.to,
            entry.shipping_date_time,
            entry.eta,
            entry.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn delete_transit(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute("DELETE FROM transit_entries WHERE id = ?1", [id])?;
    Ok(n > 0)
}

pub fn update_transit_status(conn: &Connection, id: i64, status: TransitStatus) -> Result<bool> {
    let n = conn.execute(
        "UPDATE transit_entries SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(n > 0)
}

pub fn clear_transit(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM transit_entries", [])?)
}
