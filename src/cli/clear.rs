use super::Workspace;
use crate::db;
use crate::error::Result;
use crate::store;

pub fn run(all: bool, yes: bool) -> Result<()> {
    let ws = Workspace::open()?;
    let data_path = store::data_file(&ws.data_dir);
    if !yes {
        println!(
            "This deletes {}{}.",
            data_path.display(),
            if all { " and the transit ledger" } else { "" }
        );
        println!("Re-run with --yes to confirm.");
        return Ok(());
    }

    if data_path.exists() {
        std::fs::remove_file(&data_path)?;
    }
    db::clear_dataset_metadata(&ws.conn)?;
    tracing::info!(path = %data_path.display(), "dataset cleared");
    println!("Inventory data cleared.");

    if all {
        let removed = db::clear_transit(&ws.conn)?;
        println!("Transit ledger cleared ({removed} entries).");
    }
    Ok(())
}
