use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`DbError`] for callers that map errors to
/// user-facing codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown enum value, malformed cursor, blank required field
    InvalidArgument,
    /// Point lookup missed
    NotFound,
    /// The record store could not be opened or a store call failed
    StoreUnavailable,
}

impl ErrorKind {
    /// Stable code string for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::StoreUnavailable => "STORE_UNAVAILABLE",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Database error types for todoql
#[derive(Error, Debug)]
pub enum DbError {
    /// Error establishing connection to the database
    #[error("Failed to connect to database at {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: Box<surrealdb::Error>,
    },

    /// Error during schema initialization
    #[error("Failed to initialize database schema: {0}")]
    Schema(#[source] Box<surrealdb::Error>),

    /// Error executing a query
    #[error("Query execution failed")]
    Query(#[source] Box<surrealdb::Error>),

    /// A store backend failed for a reason other than a SurrealDB error
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// Error with database path (invalid or inaccessible)
    #[error("Invalid database path: {path} - {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// Error creating database directory
    #[error("Failed to create database directory at {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error when a requested todo was not found
    #[error("Todo '{todo_id}' not found")]
    NotFound { todo_id: String },

    /// Error when a requested comment was not found
    #[error("Comment '{comment_id}' not found")]
    CommentNotFound { comment_id: String },

    /// Error for invalid input (unknown enum value, malformed cursor, ...)
    #[error("{message}")]
    InvalidArgument { message: String },
}

impl From<surrealdb::Error> for DbError {
    fn from(err: surrealdb::Error) -> Self {
        DbError::Query(Box::new(err))
    }
}

impl DbError {
    /// Shorthand for building an `InvalidArgument` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        DbError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Classify this error for transport-level mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            DbError::NotFound { .. } | DbError::CommentNotFound { .. } => ErrorKind::NotFound,
            DbError::Connection { .. }
            | DbError::Schema(_)
            | DbError::Query(_)
            | DbError::Unavailable { .. }
            | DbError::InvalidPath { .. }
            | DbError::CreateDirectory { .. } => ErrorKind::StoreUnavailable,
        }
    }

    /// Get the full error message including nested SurrealDB error details.
    ///
    /// This is useful for displaying detailed error information to users.
    pub fn full_message(&self) -> String {
        match self {
            DbError::Query(err) => format!("Query execution failed: {}", err),
            other => other.to_string(),
        }
    }
}

/// Result type alias for database operations
pub type DbResult<T> = Result<T, DbError>;
