use std::path::PathBuf;

use crate::db;
use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();

    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    } else if !settings_path().exists() {
        // First run: prompt for data dir
        println!("Data directory [{}]: ", settings.data_dir);
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        let chosen = input.trim();
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(chosen);
        }
    }

    save_settings(&settings)?;

    let resolved = PathBuf::from(&settings.data_dir);
    db::open(&resolved)?;

    tracing::info!(data_dir = %resolved.display(), "initialized");
    println!("Initialized hangar at {}", resolved.display());
    Ok(())
}
