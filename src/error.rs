//! Error type shared by the loader, the engine and the exporter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("invalid price range: min {min} is greater than max {max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("no record for app '{app}' serving '{dish}' in {city}")]
    RecordNotFound {
        city: String,
        dish: String,
        app: String,
    },

    #[error("dataset is empty: {0}")]
    EmptyDataset(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
