use comfy_table::{Cell, Table};

use super::Workspace;
use crate::error::Result;
use crate::fmt::{count, number, percent};
use crate::reports::DatasetOverview;

pub fn run() -> Result<()> {
    let ws = Workspace::open()?;
    ws.require_dataset()?;
    println!("{}", format_stats(&ws.dashboard.overview()));
    Ok(())
}

pub fn format_stats(overview: &DatasetOverview) -> String {
    let mut cards = Table::new();
    cards.set_header(vec!["Total Records", "Numeric Fields", "Text Fields", "Numeric Ratio"]);
    cards.add_row(vec![
        Cell::new(count(overview.total_rows)),
        Cell::new(overview.numeric_columns),
        Cell::new(overview.text_columns),
        Cell::new(percent(overview.numeric_share_pct(), 0)),
    ]);

    if overview.stats.is_empty() {
        return format!("Dataset Overview\n{cards}\n\nNo numeric columns.");
    }

    let mut table = Table::new();
    table.set_header(vec!["Column", "Sum", "Average", "Min", "Max", "Count", "Range"]);
    for s in &overview.stats {
        table.add_row(vec![
            Cell::new(&s.column),
            Cell::new(number(s.sum)),
            Cell::new(number(s.avg)),
            Cell::new(number(s.min)),
            Cell::new(number(s.max)),
            Cell::new(count(s.count)),
            Cell::new(percent(s.range_pct(), 1)),
        ]);
    }
    format!("Dataset Overview\n{cards}\n\nNumeric Columns\n{table}")
}
