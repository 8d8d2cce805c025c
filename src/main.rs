mod aggregator;
mod browser;
mod classifier;
mod cli;
mod db;
mod error;
mod filter;
mod fmt;
mod importer;
mod models;
mod normalizer;
mod reports;
mod session;
mod settings;
mod store;
mod table;
mod transit;
mod tui;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

/// Log to stderr so table output on stdout stays clean. `HANGAR_LOG`
/// takes the usual filter syntax, e.g. `HANGAR_LOG=hangar=debug`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("HANGAR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        None | Some(Commands::Status) => cli::status::run(),
        Some(Commands::Init { data_dir }) => cli::init::run(data_dir),
        Some(Commands::Load { path }) => cli::load::run(&path),
        Some(Commands::Import {
            file,
            append,
            force,
        }) => cli::import::run(&file, append, force),
        Some(Commands::Summary { filters }) => cli::summary::run(&filters),
        Some(Commands::Stats) => cli::stats::run(),
        Some(Commands::Columns) => cli::columns::run(),
        Some(Commands::Charts { filters }) => cli::charts::run(&filters),
        Some(Commands::Table {
            filters,
            sort,
            desc,
            page,
        }) => cli::table::run(&filters, sort.as_deref(), desc, page),
        Some(Commands::Browse { filters }) => cli::browse::run(&filters),
        Some(Commands::Edit { qr, field, value }) => cli::edit::run(&qr, &field, &value),
        Some(Commands::Transit { command }) => cli::transit::run(&command),
        Some(Commands::Demo { rows }) => cli::demo::run(rows),
        Some(Commands::Clear { all, yes }) => cli::clear::run(all, yes),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
