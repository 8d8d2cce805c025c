use comfy_table::{Cell, Table};

use super::{FilterArgs, Workspace};
use crate::error::{HangarError, Result};
use crate::models::IN_OUT;
use crate::session::{Dashboard, TablePage};
use crate::table::{SortDirection, SortState};

pub fn run(filters: &FilterArgs, sort: Option<&str>, desc: bool, page: usize) -> Result<()> {
    let mut ws = Workspace::open()?;
    ws.require_dataset()?;
    apply_view(&mut ws.dashboard, filters, sort, desc, page)?;
    println!("{}", format_table(&ws.dashboard, &ws.dashboard.table_page()));
    Ok(())
}

/// Filter, then sort, then jump to the page; each step resets the page first.
pub fn apply_view(
    dashboard: &mut Dashboard,
    filters: &FilterArgs,
    sort: Option<&str>,
    desc: bool,
    page: usize,
) -> Result<()> {
    dashboard.set_filter(filters.spec());
    if let Some(column) = sort {
        if !dashboard.has_column(column) {
            return Err(HangarError::UnknownColumn(column.to_string()));
        }
        dashboard.set_sort(SortState {
            column: Some(column.to_string()),
            direction: if desc { SortDirection::Desc } else { SortDirection::Asc },
        });
    }
    dashboard.set_page(page);
    Ok(())
}

pub fn format_table(dashboard: &Dashboard, page: &TablePage) -> String {
    let columns = dashboard.columns();
    let mut table = Table::new();
    table.set_header(columns.to_vec());
    for record in &page.rows {
        let cells: Vec<Cell> = columns
            .iter()
            .map(|column| {
                if column == IN_OUT {
                    Cell::new(dashboard.effective_status(record))
                } else {
                    Cell::new(record.display(column))
                }
            })
            .collect();
        table.add_row(cells);
    }
    let footer = format!(
        "Page {} of {} ({} rows)",
        page.page, page.page_count, page.total_count
    );
    if page.rows.is_empty() {
        format!("No rows on this page.\n{footer}")
    } else {
        format!("{table}\n{footer}")
    }
}
