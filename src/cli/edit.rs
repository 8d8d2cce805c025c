use super::Workspace;
use crate::error::{HangarError, Result};
use crate::models::{Value, BROKEN_CODE, CONDITION, IN_OUT};
use crate::session::Dashboard;

pub fn run(qr: &str, field: &str, value: &str) -> Result<()> {
    let mut ws = Workspace::open()?;
    ws.require_dataset()?;

    match apply_edit(&mut ws.dashboard, qr, field, value)? {
        EditOutcome::Updated { count, condition } => {
            let outcome = ws.save_dataset();
            if !outcome.success {
                return Err(HangarError::Other(outcome.message));
            }
            println!("Updated {count} record(s): {field} = {value:?}");
            if let Some(condition) = condition {
                println!("Condition is now {condition}.");
            }
        }
        EditOutcome::Unchanged(reason) => println!("Nothing changed: {reason}"),
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
pub enum EditOutcome {
    Updated {
        count: usize,
        condition: Option<String>,
    },
    Unchanged(String),
}

pub fn apply_edit(dashboard: &mut Dashboard, qr: &str, field: &str, value: &str) -> Result<EditOutcome> {
    if !dashboard.has_column(field) {
        return Err(HangarError::UnknownColumn(field.to_string()));
    }
    if field == CONDITION || field == IN_OUT {
        return Ok(EditOutcome::Unchanged(format!(
            "{field} is derived and cannot be set directly."
        )));
    }
    let count = dashboard.set_field(qr, field, Value::text(value));
    if count == 0 {
        return Ok(EditOutcome::Unchanged(format!("no drone with QR code {qr}.")));
    }
    let condition = (field == BROKEN_CODE).then(|| {
        dashboard
            .records()
            .iter()
            .find(|r| r.qr_code() == qr)
            .map(|r| r.condition().to_string())
            .unwrap_or_default()
    });
    Ok(EditOutcome::Updated { count, condition })
}
