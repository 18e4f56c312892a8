//! Error types for ProfileOxide
//!
//! Structured error handling using thiserror. Every fallible operation in the
//! store, the request layer and the profiling backend returns one of these.

use thiserror::Error;

/// Main error type for ProfileOxide operations
#[derive(Error, Debug)]
pub enum DashboardError {
    /// File I/O error
    #[error("Failed to access file: {0}")]
    FileIo(#[from] std::io::Error),

    /// Polars data processing error
    #[error("Data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialized mutation with an unknown type tag or malformed data
    #[error("Invalid state mutation: {0}")]
    InvalidMutation(String),

    /// Request config carries a key the chart type does not recognize
    #[error("Chart type {chart_type} does not recognize config key '{key}'")]
    UnrecognizedConfigKey { chart_type: String, key: String },

    /// Request config lacks a key the chart type requires
    #[error("Chart type {chart_type} requires config key '{key}'")]
    MissingConfigKey { chart_type: String, key: String },

    /// Request config value could not be parsed
    #[error("Invalid value '{value}' for config key '{key}'")]
    InvalidConfigValue { key: String, value: String },

    /// Column not found in the profiling data
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Chart payload failed validation
    #[error("Malformed chart payload: {0}")]
    MalformedPayload(String),

    /// Response payload type differs from the chart's registered type
    #[error("Chart {chart_id} expects {expected} data, got {actual}")]
    ChartTypeMismatch {
        chart_id: u32,
        expected: String,
        actual: String,
    },

    /// Chart id was never claimed from the registry
    #[error("Unknown chart id {0}")]
    UnknownChart(u32),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for ProfileOxide operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// UI-friendly error message formatting
impl DashboardError {
    /// Get a user-friendly error message suitable for displaying in UI
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::FileIo(e) => format!("File error: {}", e),
            DashboardError::Polars(e) => format!("Data error: {}", e),
            DashboardError::Json(e) => format!("JSON error: {}", e),
            DashboardError::Config(msg) => format!("Config error: {}", msg),
            DashboardError::InvalidMutation(msg) => format!("Invalid mutation: {}", msg),
            DashboardError::UnrecognizedConfigKey { chart_type, key } => {
                format!("'{}' is not an option of the {} chart", key, chart_type)
            }
            DashboardError::MissingConfigKey { chart_type, key } => {
                format!("The {} chart needs option '{}'", chart_type, key)
            }
            DashboardError::InvalidConfigValue { key, value } => {
                format!("'{}' is not a valid value for '{}'", value, key)
            }
            DashboardError::ColumnNotFound { column } => {
                format!("Column '{}' not found", column)
            }
            DashboardError::MalformedPayload(msg) => format!("Chart data is malformed: {}", msg),
            DashboardError::ChartTypeMismatch {
                chart_id,
                expected,
                actual,
            } => format!(
                "Chart {} received {} data instead of {}",
                chart_id, actual, expected
            ),
            DashboardError::UnknownChart(id) => format!("Chart {} is not registered", id),
            DashboardError::Custom(msg) => msg.clone(),
        }
    }

    /// Get a short title for the error (for placeholder headings)
    pub fn title(&self) -> &'static str {
        match self {
            DashboardError::FileIo(_) => "File Error",
            DashboardError::Polars(_) => "Data Error",
            DashboardError::Json(_) => "JSON Error",
            DashboardError::Config(_) => "Configuration Error",
            DashboardError::InvalidMutation(_) => "Invalid Mutation",
            DashboardError::UnrecognizedConfigKey { .. } => "Unrecognized Option",
            DashboardError::MissingConfigKey { .. } => "Missing Option",
            DashboardError::InvalidConfigValue { .. } => "Invalid Option",
            DashboardError::ColumnNotFound { .. } => "Column Not Found",
            DashboardError::MalformedPayload(_) => "Malformed Data",
            DashboardError::ChartTypeMismatch { .. } => "Chart Type Mismatch",
            DashboardError::UnknownChart(_) => "Unknown Chart",
            DashboardError::Custom(_) => "Error",
        }
    }
}
