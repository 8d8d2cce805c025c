pub mod browse;
pub mod charts;
pub mod clear;
pub mod columns;
pub mod demo;
pub mod edit;
pub mod import;
pub mod init;
pub mod load;
pub mod stats;
pub mod status;
pub mod summary;
pub mod table;
pub mod transit;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;

use crate::db;
use crate::error::{HangarError, Result};
use crate::filter::FilterSpec;
use crate::session::Dashboard;
use crate::settings::load_settings;
use crate::store::{self, SaveOutcome};

#[derive(Parser)]
#[command(name = "hangar", about = "Drone inventory analytics from spreadsheet exports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up hangar: choose a data directory and initialize the database.
    Init {
        /// Path for hangar data (default: ~/Documents/hangar)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Switch to an existing hangar data directory.
    Load {
        /// Path to data directory containing hangar.db
        path: String,
    },
    /// Import a CSV or spreadsheet as the active dataset.
    Import {
        /// Path to a .csv, .xlsx, .xls, .xlsm or .ods file
        file: String,
        /// Add the rows to the current dataset instead of replacing it
        #[arg(long)]
        append: bool,
        /// Import even if this exact file is already the active dataset
        #[arg(long)]
        force: bool,
    },
    /// Show settings, data files and dataset size.
    Status,
    /// Fleet summary cards plus category and location counts.
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Dataset overview and statistics for every numeric column.
    Stats,
    /// Column analysis: type, unique values and completeness.
    Columns,
    /// Text renderings of the dashboard charts.
    Charts {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print one page of the filtered, sorted table.
    Table {
        #[command(flatten)]
        filters: FilterArgs,
        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: usize,
    },
    /// Interactively browse the table.
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Set one field on the drone with this QR code, e.g. its broken code.
    Edit {
        /// Drone QR Code ID
        qr: String,
        /// Column to change (Condition and In/Out are derived)
        field: String,
        /// New value; an empty string clears the cell
        value: String,
    },
    /// Track drones in transit.
    Transit {
        #[command(subcommand)]
        command: TransitCommands,
    },
    /// Generate a sample drone inventory as the active dataset.
    Demo {
        /// Number of drones to generate
        #[arg(long, default_value = "60")]
        rows: usize,
    },
    /// Delete the inventory data.
    Clear {
        /// Also clear the transit ledger
        #[arg(long)]
        all: bool,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum TransitCommands {
    /// List transit entries.
    List,
    /// List drones that can be shipped (In stock, Good condition).
    Available,
    /// Ship an available drone.
    Add {
        /// Drone QR Code ID of an available drone
        qr: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Shipping date and time
        #[arg(long)]
        ship: String,
        /// Estimated arrival
        #[arg(long)]
        eta: String,
    },
    /// Remove a transit entry.
    Remove {
        /// Entry ID (shown in `hangar transit list`)
        id: i64,
    },
    /// Set the status of a transit entry: in-transit, delivered, delayed.
    Status { id: i64, status: String },
    /// Remove every transit entry.
    Clear,
}

/// Filters shared by the read-only views. Omitted or `all` means no constraint.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive text to find in any field
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Good, Bad or Destroyed
    #[arg(long)]
    pub condition: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    /// In, Out or In Transit
    #[arg(long)]
    pub status: Option<String>,
}

impl FilterArgs {
    pub fn spec(&self) -> FilterSpec {
        FilterSpec::from_parts(
            self.search.as_deref(),
            self.category.as_deref(),
            self.condition.as_deref(),
            self.location.as_deref(),
            self.status.as_deref(),
        )
    }
}

/// Database and the session rebuilt from what is on disk.
pub(crate) struct Workspace {
    pub data_dir: PathBuf,
    pub conn: Connection,
    pub dashboard: Dashboard,
}

impl Workspace {
    pub fn open() -> Result<Self> {
        let settings = load_settings();
        let data_dir = PathBuf::from(&settings.data_dir);
        let db_path = db::db_file(&data_dir);
        if !db_path.exists() {
            return Err(HangarError::Settings(format!(
                "No database found at {}\nRun `hangar init` to set up.",
                db_path.display()
            )));
        }
        let conn = db::get_connection(&db_path)?;
        db::init_db(&conn)?;

        let mut dashboard = settings.dashboard();
        let rows = store::load_dataset(&store::data_file(&data_dir));
        dashboard.load_dataset(&rows, db::get_columns(&conn));
        dashboard.set_ledger(crate::transit::TransitLedger::from_entries(db::load_transit(&conn)?));

        Ok(Self {
            data_dir,
            conn,
            dashboard,
        })
    }

    pub fn require_dataset(&self) -> Result<()> {
        if self.dashboard.is_empty() {
            Err(HangarError::NoDataset)
        } else {
            Ok(())
        }
    }

    pub fn save_dataset(&self) -> SaveOutcome {
        store::save_dataset(&store::data_file(&self.data_dir), self.dashboard.records())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args_to_spec() {
        let args = FilterArgs {
            search: Some("nyc".into()),
            category: Some("all".into()),
            status: Some("Out".into()),
            ..FilterArgs::default()
        };
        let spec = args.spec();
        assert_eq!(spec.active_count(), 2);
        assert_eq!(spec.describe(), "search: nyc, In/Out: Out");
    }

    #[test]
    fn test_cli_parses_table_options() {
        let cli = Cli::try_parse_from([
            "hangar", "table", "--sort", "Rack No", "--desc", "--page", "2", "--condition", "Good",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Table { filters, sort, desc, page }) => {
                assert_eq!(sort.as_deref(), Some("Rack No"));
                assert!(desc);
                assert_eq!(page, 2);
                assert_eq!(filters.condition.as_deref(), Some("Good"));
            }
            _ => panic!("expected table command"),
        }
    }

    #[test]
    fn test_cli_parses_transit_add() {
        let cli = Cli::try_parse_from([
            "hangar", "transit", "add", "QR-1", "--from", "A", "--to", "B", "--ship", "now", "--eta", "later",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Transit { command: TransitCommands::Add { .. } })
        ));
    }

    #[test]
    fn test_cli_parses_edit() {
        let cli = Cli::try_parse_from(["hangar", "edit", "QR-1", "Broken code", "Destroyed"]).unwrap();
        match cli.command {
            Some(Commands::Edit { qr, field, value }) => {
                assert_eq!(qr, "QR-1");
                assert_eq!(field, "Broken code");
                assert_eq!(value, "Destroyed");
            }
            _ => panic!("expected edit command"),
        }
    }
}
