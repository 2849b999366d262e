use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write delimited output: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
