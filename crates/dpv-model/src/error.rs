use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid patient identifier: {0:?}")]
    InvalidPatientId(String),
    #[error("invalid region label {label:?} (expected 1..={max})")]
    InvalidRegionLabel { label: String, max: u32 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
