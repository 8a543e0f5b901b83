use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("cannot read input file {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("input file {} has no data rows", path.display())]
    EmptyInput { path: PathBuf },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("chart rendering failed: {0}")]
    Chart(String),
}

impl ReportError {
    /// True for the fatal input conditions (missing, unreadable or empty file).
    pub fn is_input_error(&self) -> bool {
        matches!(self, ReportError::Input { .. } | ReportError::EmptyInput { .. })
    }
}
