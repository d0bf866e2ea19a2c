use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the Airmin library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a required argument (such as a city identifier) was not supplied.
    #[error("missing required argument: {name}")]
    InvalidArgument { name: &'static str },

    /// Raised when a referenced entity does not exist in the store.
    #[error("{entity} with id '{id}' doesn't exist")]
    RelationNotFound { entity: &'static str, id: i64 },

    /// Raised when an import file contains malformed data that cannot be skipped.
    #[error("invalid import data: {message}")]
    ImportValidation { message: String },

    /// Database could not be located at the resolved path.
    #[error("database not found at {path}")]
    DatabaseNotFound { path: PathBuf },

    /// Raised when opening a database that lacks the Airmin tables.
    #[error("unsupported database schema; expected city/airport/route tables")]
    UnsupportedSchema,

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the default database")]
    ProjectDirsUnavailable,

    /// Raised when a summary is requested for a plan without legs.
    #[error("route plan was empty")]
    EmptyRoutePlan,

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for CSV reader errors.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Shorthand for a missing city relation.
    pub fn city_not_found(id: i64) -> Self {
        Error::RelationNotFound { entity: "City", id }
    }
}
