use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{TransitCommands, Workspace};
use crate::db;
use crate::error::{HangarError, Result};
use crate::models::{Record, TransitEntry, TransitStatus, CATEGORY, DRONE_ID, LOCATION};

pub fn run(command: &TransitCommands) -> Result<()> {
    let mut ws = Workspace::open()?;
    match command {
        TransitCommands::List => {
            println!("{}", format_entries(ws.dashboard.transit_entries()));
        }
        TransitCommands::Available => {
            ws.require_dataset()?;
            println!("{}", format_available(&ws.dashboard.available_for_transit()));
        }
        TransitCommands::Add {
            qr,
            from,
            to,
            ship,
            eta,
        } => {
            ws.require_dataset()?;
            match ws.dashboard.add_transit(qr, from, to, ship, eta) {
                Some(entry) => {
                    db::insert_transit(&ws.conn, &entry)?;
                    println!(
                        "{} {} ({}) {} -> {} [id {}]",
                        "Shipped".green(),
                        entry.drone_qr_code,
                        entry.drone_id,
                        entry.from,
                        entry.to,
                        entry.id
                    );
                }
                None => println!("Nothing changed: {}", add_declined_reason(&ws, qr, [from, to, ship, eta])),
            }
        }
        TransitCommands::Remove { id } => {
            if ws.dashboard.remove_transit(*id) {
                db::delete_transit(&ws.conn, *id)?;
                println!("Removed transit entry {id}.");
            } else {
                println!("Nothing changed: no transit entry with id {id}.");
            }
        }
        TransitCommands::Status { id, status } => {
            let status: TransitStatus = status.parse().map_err(HangarError::Other)?;
            if ws.dashboard.set_transit_status(*id, status) {
                db::update_transit_status(&ws.conn, *id, status)?;
                let qr = ws
                    .dashboard
                    .ledger()
                    .get(*id)
                    .map(|e| e.drone_qr_code.clone())
                    .unwrap_or_default();
                println!("Transit entry {id} ({qr}) is now {status}.");
            } else {
                println!("Nothing changed: no transit entry with id {id}.");
            }
        }
        TransitCommands::Clear => {
            if ws.dashboard.ledger().is_empty() {
                println!("Nothing changed: no drones in transit.");
                return Ok(());
            }
            ws.dashboard.clear_transit();
            let removed = db::clear_transit(&ws.conn)?;
            println!("Cleared {removed} transit entries.");
        }
    }
    Ok(())
}

fn add_declined_reason(ws: &Workspace, qr: &str, fields: [&String; 4]) -> String {
    if qr.trim().is_empty() || fields.iter().any(|f| f.trim().is_empty()) {
        return "every shipment field must be filled in.".to_string();
    }
    if ws.dashboard.records().iter().any(|r| r.qr_code() == qr) {
        format!("{qr} is not available (must be In stock and in Good condition).")
    } else {
        format!("no drone with QR code {qr}.")
    }
}

pub fn format_entries(entries: &[TransitEntry]) -> String {
    if entries.is_empty() {
        return "No drones in transit.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Drone ID", "QR Code", "From", "To", "Shipped", "ETA", "Status"]);
    for e in entries {
        table.add_row(vec![
            Cell::new(e.id),
            Cell::new(&e.drone_id),
            Cell::new(&e.drone_qr_code),
            Cell::new(&e.from),
            Cell::new(&e.to),
            Cell::new(&e.shipping_date_time),
            Cell::new(&e.eta),
            Cell::new(e.status),
        ]);
    }
    format!("{table}\n{} entries", entries.len())
}

pub fn format_available(records: &[&Record]) -> String {
    if records.is_empty() {
        return "No drones available for transit.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["QR Code", "Drone ID", "Category", "Location"]);
    for r in records {
        table.add_row(vec![
            r.qr_code(),
            r.display(DRONE_ID),
            r.display(CATEGORY),
            r.display(LOCATION),
        ]);
    }
    format!("{table}\n{} drones available", records.len())
}
