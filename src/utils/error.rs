use thiserror::Error;

/// Invalid input handed to the age aggregator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("record {index} has a negative age: {age}")]
    NegativeAge { index: usize, age: i64 },

    #[error("record {index} is malformed: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("ranking size must not be negative, got {0}")]
    NegativeLimit(i64),
}

/// Failure of the durable key-value store behind the reload counter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {endpoint}")]
    ApiStatusError { endpoint: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Aggregation error: {0}")]
    AggregationError(#[from] AggregationError),

    #[error("Unexpected response from {endpoint}: {reason}")]
    PayloadError { endpoint: String, reason: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ApiError(_) | ReportError::ApiStatusError { .. } => ErrorCategory::Network,
            ReportError::CsvError(_)
            | ReportError::SerializationError(_)
            | ReportError::PayloadError { .. }
            | ReportError::AggregationError(_) => ErrorCategory::Data,
            ReportError::ZipError(_) | ReportError::IoError(_) => ErrorCategory::Storage,
            ReportError::ConfigValidationError { .. } | ReportError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReportError::ApiError(_) | ReportError::ApiStatusError { .. } => ErrorSeverity::Medium,
            ReportError::CsvError(_)
            | ReportError::SerializationError(_)
            | ReportError::PayloadError { .. }
            | ReportError::AggregationError(_)
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            ReportError::ZipError(_) | ReportError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch person records: {}", self),
            ErrorCategory::Data => format!("The fetched records could not be aggregated: {}", self),
            ErrorCategory::Storage => format!("The report could not be saved: {}", self),
            ErrorCategory::Configuration => format!("The configuration is invalid: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the network connection and the API endpoint, then run again",
            ErrorCategory::Data => "Inspect the API response; every record needs a non-negative numeric age",
            ErrorCategory::Storage => "Make sure the output directory exists and is writable",
            ErrorCategory::Configuration => "Fix the reported field in the CLI arguments or the TOML file",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
