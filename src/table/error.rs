use thiserror::Error;

/// Errors raised by lookups and mutations on a [`Table`](super::Table).
///
/// Every variant is returned before the table is touched, so a failed
/// operation never leaves a partial change behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("row [{0}] does not exist")]
    RowNotFound(usize),

    #[error("column [{col}] does not exist in row [{row}]")]
    ColumnNotFound { row: usize, col: usize },

    #[error("field [{0}] does not exist")]
    FieldNotFound(String),

    #[error("field headers not set")]
    HeadersNotConfigured,

    #[error("table has a header row; width {0} must not be specified")]
    WidthNotAllowed(usize),

    #[error("table has no header row; a non-zero width is required")]
    WidthRequired,

    #[error("headers cannot change once the table holds {0} rows")]
    HeadersLocked(usize),

    #[error("delimiter {0:?} can never split a line")]
    InvalidDelimiter(char),

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// Result type for table operations
pub type Result<T> = std::result::Result<T, TableError>;
