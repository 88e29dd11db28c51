//! Error types for jobstore

use thiserror::Error;

/// Result type alias for jobstore operations
pub type OrmResult<T> = Result<T, OrmError>;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Error types for compiling and executing statements.
///
/// The first four variants are client-input faults raised before or instead of
/// a write. Failures coming from the store are carried unmodified in
/// [`OrmError::Query`].
#[derive(Debug, Error)]
pub enum OrmError {
    /// Partial update was called without any field to set
    #[error("No data")]
    NoUpdateData,

    /// Filter bounds contradict each other
    #[error("Bad range: min {min} is greater than max {max}")]
    BadRange { min: i64, max: i64 },

    /// Entity already exists
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before reaching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// Migration error
    #[cfg(feature = "migrate")]
    #[error("Migration error: {0}")]
    Migration(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a duplicate error
    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a duplicate error
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Whether the error was caused by the caller's input rather than the store.
    ///
    /// These map to 4xx responses upstream and are never worth retrying.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NoUpdateData
                | Self::BadRange { .. }
                | Self::Duplicate(_)
                | Self::NotFound(_)
                | Self::Validation(_)
        )
    }

    /// SQLSTATE code reported by the server, if this is a database error.
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Self::Query(err) => err.as_db_error().map(|db| db.code().code()),
            _ => None,
        }
    }

    /// Check if the store rejected a write with a unique constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        self.sqlstate() == Some(UNIQUE_VIOLATION)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(feature = "migrate")]
impl From<refinery::Error> for OrmError {
    fn from(err: refinery::Error) -> Self {
        Self::Migration(err.to_string())
    }
}
