use super::{FilterArgs, Workspace};
use crate::browser::TableBrowser;
use crate::error::Result;

pub fn run(filters: &FilterArgs) -> Result<()> {
    let mut ws = Workspace::open()?;
    ws.require_dataset()?;
    ws.dashboard.set_filter(filters.spec());
    let mut browser = TableBrowser::new(&mut ws.dashboard);
    browser.run()?;
    Ok(())
}
