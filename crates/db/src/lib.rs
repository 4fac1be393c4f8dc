//! Database module for todoql
//!
//! Provides the todo query builder, cursor pagination, statistics, comments
//! and write operations over pluggable [`TodoStore`] and [`CommentStore`]
//! backends, plus SurrealDB connection management with an embedded SurrealKV
//! backend.

pub mod error;
pub mod id;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{DbError, DbResult, ErrorKind};
pub use id::{CommentId, IdGenerator, RecordId, TodoId, next_comment_id, next_todo_id};
pub use models::{Comment, NewComment, NewTodo, Priority, Todo, TodoUpdate};
pub use repository::{
    CommentRepository, DEFAULT_PAGE_SIZE, OwnerCount, PageInfo, Pagination, PriorityCount,
    QueryPlan, SortDirection, SortField, StatsAggregator, TodoConnection, TodoEdge, TodoFilter,
    TodoLister, TodoRepository, TodoSort, TodoStats,
};
pub use store::{
    CommentStore, FindQuery, GroupField, MemoryStore, SurrealStore, TodoPredicate, TodoStore,
};

use std::path::{Path, PathBuf};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, SurrealKv};

/// Database directory used when no platform data directory is available
pub const FALLBACK_DB_PATH: &str = ".todoql/data";

/// Database wrapper providing connection management for SurrealDB
pub struct Database {
    /// The underlying SurrealDB client
    client: Surreal<Db>,
    /// Path where the database is stored
    path: PathBuf,
}

impl Database {
    /// Connect to a SurrealDB database at the specified path.
    ///
    /// Creates the database directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidPath` if the path is empty.
    /// Returns `DbError::CreateDirectory` if directory creation fails.
    /// Returns `DbError::Connection` if database connection fails.
    pub async fn connect(path: &Path) -> DbResult<Self> {
        let path = Self::prepare_path(path)?;

        let client = Surreal::new::<SurrealKv>(path.clone())
            .await
            .map_err(|e| DbError::Connection {
                path: path.clone(),
                source: Box::new(e),
            })?;

        tracing::debug!("Connected to database at {}", path.display());
        Ok(Self { client, path })
    }

    /// Initialize the database schema.
    ///
    /// Selects the todoql namespace and database, then defines the todo and
    /// comment tables.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Schema` if schema initialization fails.
    pub async fn init(&self) -> DbResult<()> {
        self.client
            .use_ns("todoql")
            .use_db("main")
            .await
            .map_err(|e| DbError::Schema(Box::new(e)))?;

        schema::init_schema(&self.client).await?;

        Ok(())
    }

    /// Get a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Db> {
        &self.client
    }

    /// Get the path where the database is stored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A [`TodoStore`] and [`CommentStore`] backed by this connection.
    pub fn store(&self) -> SurrealStore<'_> {
        SurrealStore::new(&self.client)
    }

    /// Get the default database path.
    ///
    /// Returns `<local data dir>/todoql/data`, falling back to
    /// `.todoql/data` relative to the working directory when the platform
    /// has no data directory.
    pub fn default_path() -> PathBuf {
        match dirs::data_local_dir() {
            Some(base) => base.join("todoql").join("data"),
            None => PathBuf::from(FALLBACK_DB_PATH),
        }
    }

    /// Prepare the database path by validating and creating directories.
    fn prepare_path(path: &Path) -> DbResult<PathBuf> {
        if path.as_os_str().is_empty() {
            return Err(DbError::InvalidPath {
                path: path.to_path_buf(),
                reason: "path is empty".to_string(),
            });
        }

        let path = path.to_path_buf();
        if !path.exists() {
            std::fs::create_dir_all(&path).map_err(|e| DbError::CreateDirectory {
                path: path.clone(),
                source: e,
            })?;
        } else if !path.is_dir() {
            return Err(DbError::InvalidPath {
                path,
                reason: "not a directory".to_string(),
            });
        }

        Ok(path)
    }
}

// Ensure Database is Send + Sync for async compatibility
static_assertions::assert_impl_all!(Database: Send, Sync);
