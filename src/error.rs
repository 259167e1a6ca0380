use std::path::PathBuf;

// ---------------------------------------------------------------------------
// DashboardError – everything the data/report layers can fail with
// ---------------------------------------------------------------------------

/// Errors raised by loading, filtering and aggregating sales data.
///
/// Load-time variants (`SourceUnavailable`, `InvalidConfig`,
/// `SchemaMismatch`, `ParseError`) are fatal for the dataset: no table is produced.  `EmptyInput` and
/// `InvalidSelection` are recoverable and handled at the dashboard boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// The source file could not be opened or read.
    #[error("source {} unavailable: {detail}", path.display())]
    SourceUnavailable { path: PathBuf, detail: String },

    /// The source layout in the configuration is malformed.
    #[error("invalid configuration: {detail}")]
    InvalidConfig { detail: String },

    /// A required column is missing from the header row.
    #[error("required column '{column}' not found")]
    SchemaMismatch { column: String },

    /// A cell could not be coerced to its declared type.
    #[error("row {row}, column '{column}': {detail}")]
    ParseError {
        row: usize,
        column: String,
        detail: String,
    },

    /// An aggregate that is undefined on zero rows (e.g. mean).
    #[error("cannot compute {what} over zero rows")]
    EmptyInput { what: String },

    /// A filter selection names a value the table does not contain.
    #[error("'{value}' is not a known value of {dimension}")]
    InvalidSelection { dimension: String, value: String },
}

impl DashboardError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, detail: impl ToString) -> Self {
        DashboardError::SourceUnavailable {
            path: path.into(),
            detail: detail.to_string(),
        }
    }

    pub(crate) fn parse(row: usize, column: &str, detail: impl Into<String>) -> Self {
        DashboardError::ParseError {
            row,
            column: column.to_string(),
            detail: detail.into(),
        }
    }

    /// Whether the error belongs to the load phase (no table available).
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            DashboardError::SourceUnavailable { .. }
                | DashboardError::InvalidConfig { .. }
                | DashboardError::SchemaMismatch { .. }
                | DashboardError::ParseError { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
