use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{FilterArgs, Workspace};
use crate::error::Result;
use crate::fmt::{count, percent};
use crate::reports::percent_of;
use crate::session::Analytics;

pub fn run(filters: &FilterArgs) -> Result<()> {
    let mut ws = Workspace::open()?;
    ws.require_dataset()?;
    ws.dashboard.set_filter(filters.spec());
    let analytics = ws.dashboard.analytics();
    println!("{}", format_summary(&analytics, &ws.dashboard.filter_spec().describe()));
    Ok(())
}

fn tally_table(label: &str, tally: &[(String, usize)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![label, "Drones"]);
    for (name, n) in tally {
        table.add_row(vec![Cell::new(name), Cell::new(count(*n))]);
    }
    table
}

pub fn format_summary(analytics: &Analytics, filters_desc: &str) -> String {
    let s = &analytics.status;
    let mut cards = Table::new();
    cards.set_header(vec!["Metric", "Drones", "Share"]);
    let rows = [
        ("Total drones", s.total),
        ("Good condition", s.good),
        ("Bad condition", s.bad),
        ("Destroyed", s.destroyed),
        ("In stock", s.in_stock),
        ("Out", s.out_stock),
    ];
    for (label, n) in rows {
        cards.add_row(vec![
            Cell::new(label),
            Cell::new(count(n)),
            Cell::new(percent(percent_of(n, s.total), 1)),
        ]);
    }
    cards.add_row(vec![
        Cell::new("In transit".bold()),
        Cell::new(count(analytics.in_transit)),
        Cell::new(""),
    ]);

    let scope = if filters_desc.is_empty() {
        format!("{} records", count(analytics.filtered_count))
    } else {
        format!("{} records | {filters_desc}", count(analytics.filtered_count))
    };
    format!(
        "Fleet Summary ({scope})\n{cards}\n\nBy Category\n{}\n\nBy Location\n{}",
        tally_table("Category", &analytics.categories),
        tally_table("Location", &analytics.locations),
    )
}
