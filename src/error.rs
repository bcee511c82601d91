use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Duplicate business line '{business_type}' in period {period_id}")]
    DuplicateBusinessLine {
        period_id: String,
        business_type: String,
    },

    #[error("Unknown KPI key: {0}")]
    UnknownKpi(String),

    #[error("Unknown analysis mode '{0}': expected ytd, pop or comparison")]
    UnknownAnalysisMode(String),

    #[error("Unknown period: {0}")]
    UnknownPeriod(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
