use colored::Colorize;
use comfy_table::{Cell, Table};

use super::{FilterArgs, Workspace};
use crate::error::Result;
use crate::fmt::{number, percent};
use crate::reports::{percent_of, slice_total, ChartSet, GroupedBars, LineSeries, Slice};

const BAR_WIDTH: usize = 30;

pub fn run(filters: &FilterArgs) -> Result<()> {
    let mut ws = Workspace::open()?;
    ws.require_dataset()?;
    ws.dashboard.set_filter(filters.spec());
    println!("{}", format_charts(&ws.dashboard.charts()));
    Ok(())
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round().max(1.0) as usize;
    "\u{2588}".repeat(len.min(BAR_WIDTH))
}

fn label_width(labels: impl Iterator<Item = usize>) -> usize {
    labels.max().unwrap_or(0)
}

/// Horizontal bars with counts; pie charts also show each slice's share.
fn format_slices(title: &str, slices: &[Slice], with_share: bool) -> String {
    let mut out = format!("{}\n", title.bold());
    if slices.is_empty() {
        out.push_str("  (no data)\n");
        return out;
    }
    let total = slice_total(slices);
    let max = slices.iter().map(|s| s.value).max().unwrap_or(0) as f64;
    let width = label_width(slices.iter().map(|s| s.label.chars().count()));
    for s in slices {
        let share = if with_share {
            format!(" ({})", percent(percent_of(s.value, total), 0))
        } else {
            String::new()
        };
        out.push_str(&format!(
            "  {:<width$}  {} {}{share}\n",
            s.label,
            bar(s.value as f64, max),
            s.value
        ));
    }
    out
}

fn format_grouped(grouped: &GroupedBars) -> String {
    let mut table = Table::new();
    let mut header = vec![grouped.group_column.clone()];
    header.extend(grouped.value_columns.iter().cloned());
    table.set_header(header);
    for b in &grouped.bars {
        let mut row = vec![Cell::new(&b.label)];
        row.extend(b.sums.iter().map(|v| Cell::new(number(*v))));
        table.add_row(row);
    }
    format!("{}\n{table}\n", format!("{} by {}", grouped.value_columns.join(" & "), grouped.group_column).bold())
}

fn format_line(line: &LineSeries) -> String {
    let mut out = format!("{}\n", format!("{} (first {} rows)", line.column, line.points.len()).bold());
    let max = line.points.iter().map(|(_, v)| v.abs()).fold(0.0, f64::max);
    for (row, value) in &line.points {
        out.push_str(&format!("  {row:>3}  {} {}\n", bar(value.abs(), max), number(*value)));
    }
    out
}

pub fn format_charts(charts: &ChartSet) -> String {
    let mut sections = vec![
        format_slices("Fleet Condition", &charts.condition, true),
        format_slices("Stock Status", &charts.status, true),
        format_slices("Drones by Category", &charts.categories, false),
        format_slices("Drones by Location", &charts.locations, false),
    ];
    if let Some(grouped) = &charts.grouped {
        sections.push(format_grouped(grouped));
    }
    if let Some((column, slices)) = &charts.share {
        sections.push(format_slices(&format!("Share by {column}"), slices, true));
    }
    if let Some(line) = &charts.line {
        sections.push(format_line(line));
    }
    sections.join("\n")
}
