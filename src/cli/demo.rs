use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use super::Workspace;
use crate::db;
use crate::error::{HangarError, Result};
use crate::models::{
    BOX_NO, BROKEN_CODE, CATEGORY, COMMENTS, DRONE_ID, IN_OUT, LOCATION, QR_CODE, RACK_NO,
};
use crate::normalizer::RawRow;

const CATEGORIES: &[&str] = &["Quadcopter", "Fixed Wing", "Hexacopter", "VTOL", "Mapping"];

const LOCATIONS: &[&str] = &[
    "Main Hangar",
    "North Warehouse",
    "Field Office Denver",
    "Repair Bay",
    "Customer Site Austin",
    "Training Range",
];

/// Empty codes dominate so most of the fleet stays in Good condition.
const BROKEN_CODES: &[&str] = &["", "", "", "", "", "", "Broken", "Broken", "Destroyed"];

const COMMENTS_POOL: &[&str] = &[
    "",
    "",
    "",
    "Propeller guard replaced",
    "Battery swelling, do not charge",
    "Camera gimbal loose on arm",
    "Firmware updated",
    "Awaiting calibration",
];

fn pick<R: Rng>(rng: &mut R, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}

/// Generate `n` inventory rows carrying the standard asset headers.
pub fn generate_rows<R: Rng>(rng: &mut R, n: usize) -> Vec<RawRow> {
    (1..=n)
        .map(|i| {
            let status = if rng.gen_bool(0.7) { "In" } else { "Out" };
            let row = json!({
                QR_CODE: format!("QR-{i:04}"),
                DRONE_ID: format!("DRN-{:05}", 10_000 + i * 7),
                BROKEN_CODE: pick(rng, BROKEN_CODES),
                RACK_NO: rng.gen_range(1..=20),
                BOX_NO: rng.gen_range(1..=60),
                CATEGORY: pick(rng, CATEGORIES),
                IN_OUT: status,
                LOCATION: pick(rng, LOCATIONS),
                COMMENTS: pick(rng, COMMENTS_POOL),
            });
            match row {
                Value::Object(map) => map,
                _ => RawRow::new(),
            }
        })
        .collect()
}

pub fn run(rows: usize) -> Result<()> {
    if rows == 0 {
        return Err(HangarError::Other("--rows must be at least 1".to_string()));
    }
    let mut ws = Workspace::open()?;

    let mut rng = StdRng::from_entropy();
    let generated = generate_rows(&mut rng, rows);
    ws.dashboard.load_dataset(&generated, None);

    let outcome = ws.save_dataset();
    if !outcome.success {
        return Err(HangarError::Other(outcome.message));
    }
    db::set_columns(&ws.conn, ws.dashboard.columns())?;
    db::set_metadata(&ws.conn, db::META_SOURCE_FILE, "demo")?;
    db::delete_metadata(&ws.conn, db::META_CHECKSUM)?;
    db::set_metadata(&ws.conn, db::META_IMPORTED_AT, &chrono::Local::now().to_rfc3339())?;

    let available = ws.dashboard.available_for_transit().len();
    println!("Demo data loaded!");
    println!("  Drones:     {rows}");
    println!("  Columns:    {}", ws.dashboard.columns().len());
    println!("  Shippable:  {available}");
    println!();
    println!("Try these next:");
    println!("  hangar summary");
    println!("  hangar table --sort \"Rack No\"");
    println!("  hangar charts");
    println!("  hangar transit available");
    println!("  hangar browse");

    Ok(())
}
