use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    /// Required CSV columns absent from the header row.
    MissingColumns(Vec<String>),
    /// A numeric cell that could not be parsed as a float.
    MalformedRow {
        row: usize,
        column: String,
        value: String,
    },
    MissingFile,
    ParseError(String),
    StoreUnavailable(String),
    DatabaseError(String),
    ConfigError(String),
    IoError(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingColumns(columns) => write!(
                f,
                "Invalid CSV format. Missing required columns: {}",
                columns.join(", ")
            ),
            AppError::MalformedRow { row, column, value } => write!(
                f,
                "Invalid value in row {}, column '{}': '{}'",
                row, column, value
            ),
            AppError::MissingFile => write!(f, "No file provided"),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::StoreUnavailable(msg) => write!(f, "History store unavailable: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Client-caused errors that map to a 400 response and are never retried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::MissingColumns(_)
                | AppError::MalformedRow { .. }
                | AppError::MissingFile
                | AppError::ParseError(_)
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON serialization failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
