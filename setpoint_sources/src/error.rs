use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("replay exhausted")]
    Exhausted,
    #[error("invalid range [{low}, {high})")]
    InvalidRange { low: f64, high: f64 },
    #[error("fixture: {0}")]
    Fixture(String),
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;
