use thiserror::Error;

#[derive(Error, Debug)]
pub enum HangarError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Invalid input shape: expected {expected}, got {found}")]
    InvalidShape { expected: &'static str, found: String },

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("No dataset loaded. Run `hangar import <file>` or `hangar demo` first.")]
    NoDataset,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HangarError>;
