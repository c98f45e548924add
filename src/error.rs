use std::fmt;

use thiserror::Error;

/// Why a query that must yield a bounded number of rows did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalityViolation {
    /// No row matched.
    Empty,
    /// A second row was observed while at most one was allowed.
    MoreThanOne,
    /// The backend reported the row count up front and it was not 1.
    RowCount(u64),
    /// More rows arrived than the caller supplied output positions for.
    ExceedsCapacity(usize),
}

impl fmt::Display for CardinalityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardinalityViolation::Empty => f.write_str("empty result"),
            CardinalityViolation::MoreThanOne => f.write_str("more than one row"),
            CardinalityViolation::RowCount(n) => {
                write!(f, "one row is expected, but result has {n} row(s)")
            }
            CardinalityViolation::ExceedsCapacity(n) => {
                write!(f, "more rows than the {n} output position(s)")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum TypedQueryError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] postgres::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Shape mismatch: {0}")]
    ShapeError(String),

    #[error("Value conversion error: {0}")]
    ConversionError(String),

    #[error("Error in {operation} : {violation}")]
    Cardinality {
        operation: &'static str,
        violation: CardinalityViolation,
    },

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl TypedQueryError {
    pub(crate) fn cardinality(operation: &'static str, violation: CardinalityViolation) -> Self {
        TypedQueryError::Cardinality {
            operation,
            violation,
        }
    }

    /// The cardinality violation carried by this error, if any.
    #[must_use]
    pub fn cardinality_violation(&self) -> Option<CardinalityViolation> {
        match self {
            TypedQueryError::Cardinality { violation, .. } => Some(*violation),
            _ => None,
        }
    }
}
