use polars::prelude::PolarsError;
use thiserror::Error;

pub type DesignResult<T> = Result<T, DesignError>;

/// Everything that can abort a design run.
///
/// Sparse data (genes with fewer guides than requested, a library that lacks a
/// selected gene) is never an error and has no variant here.
#[derive(Debug, Error)]
pub enum DesignError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: PolarsError,
    },

    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: String, message: String },

    #[error("{source_name}: required column `{column}` is missing")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name}: {message}")]
    InvalidValue { source_name: String, message: String },

    #[error("cannot sample {requested} {what}: only {available} available")]
    SampleSize {
        what: &'static str,
        requested: usize,
        available: usize,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DesignError {
    pub fn missing_column(source_name: &str, column: &str) -> Self {
        DesignError::MissingColumn {
            source_name: source_name.to_string(),
            column: column.to_string(),
        }
    }

    pub fn invalid(source_name: &str, message: impl Into<String>) -> Self {
        DesignError::InvalidValue {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }
}
