use colored::Colorize;
use comfy_table::{Cell, Table};

use super::Workspace;
use crate::error::Result;
use crate::fmt::{count, percent};
use crate::reports::{ColumnKind, ColumnProfile};

pub fn run() -> Result<()> {
    let ws = Workspace::open()?;
    ws.require_dataset()?;
    println!("{}", format_columns(&ws.dashboard.column_profiles()));
    Ok(())
}

pub fn format_columns(profiles: &[ColumnProfile]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Column", "Type", "Unique", "Filled", "Complete"]);
    for p in profiles {
        let kind = match p.kind {
            ColumnKind::Numeric => p.kind.label().blue().to_string(),
            ColumnKind::Text => p.kind.label().to_string(),
        };
        table.add_row(vec![
            Cell::new(&p.column),
            Cell::new(kind),
            Cell::new(count(p.unique)),
            Cell::new(count(p.filled)),
            Cell::new(percent(p.completeness_pct, 1)),
        ]);
    }
    format!("Column Analysis\n{table}")
}
