//! Record store abstraction
//!
//! The query and statistics code never touches a concrete database; it
//! talks to a [`TodoStore`], which can find, count and group records under a
//! [`TodoPredicate`]. Comments live beside todos behind [`CommentStore`].
//! Two backends implement both traits: an in-memory map and embedded
//! SurrealDB tables.

mod memory;
mod surreal;

pub use memory::MemoryStore;
pub use surreal::SurrealStore;

use crate::error::DbResult;
use crate::id::{CommentId, TodoId};
use crate::models::{Comment, Priority, Todo};
use crate::repository::TodoSort;
use std::collections::HashMap;
use std::future::Future;

/// Conjunction of optional constraints on todo records.
///
/// Absent fields impose no constraint. This is the one definition of filter
/// semantics shared by every backend and by the statistics aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPredicate {
    /// Match on the completion flag
    pub completed: Option<bool>,
    /// Match on priority
    pub priority: Option<Priority>,
    /// Match on owner
    pub owner_id: Option<String>,
    /// Case-insensitive substring of the title
    pub title_contains: Option<String>,
    /// Only records whose id is strictly greater (later in insertion order)
    pub id_after: Option<TodoId>,
}

impl TodoPredicate {
    /// Predicate matching every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one owner
    pub fn owned_by(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Restrict to titles containing `needle`, ignoring case
    pub fn title_containing(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    /// Restrict to records after `cursor` in insertion order
    pub fn after(mut self, cursor: TodoId) -> Self {
        self.id_after = Some(cursor);
        self
    }

    /// Evaluate the predicate against a record
    pub fn matches(&self, todo: &Todo) -> bool {
        if self.completed.is_some_and(|c| todo.completed != c) {
            return false;
        }
        if self.priority.is_some_and(|p| todo.priority != p) {
            return false;
        }
        if self.owner_id.as_ref().is_some_and(|o| &todo.owner_id != o) {
            return false;
        }
        if let Some(needle) = &self.title_contains
            && !todo.title.to_lowercase().contains(&needle.to_lowercase())
        {
            return false;
        }
        if self.id_after.as_ref().is_some_and(|after| &todo.id <= after) {
            return false;
        }
        true
    }
}

/// A find request: which records, in what order, how many
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindQuery {
    pub predicate: TodoPredicate,
    pub sort: TodoSort,
    /// Maximum number of records to return, all when `None`
    pub limit: Option<usize>,
}

/// Field a [`TodoStore::group_count`] call groups by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    Priority,
    Owner,
}

impl GroupField {
    /// Column name in the database
    pub fn column(&self) -> &'static str {
        match self {
            GroupField::Priority => "priority",
            GroupField::Owner => "owner_id",
        }
    }

    /// Group key of a record
    pub fn key_of(&self, todo: &Todo) -> String {
        match self {
            GroupField::Priority => todo.priority.as_str().to_string(),
            GroupField::Owner => todo.owner_id.clone(),
        }
    }
}

/// Queryable collection of todo records.
///
/// Implementations must be safe to share between concurrent queries. Store
/// failures are reported as errors and never retried by callers.
pub trait TodoStore: Send + Sync {
    /// Records matching the query's predicate, sorted, truncated to its limit
    fn find(&self, query: &FindQuery) -> impl Future<Output = DbResult<Vec<Todo>>> + Send;

    /// Number of records matching `predicate`
    fn count(&self, predicate: &TodoPredicate) -> impl Future<Output = DbResult<u64>> + Send;

    /// Number of matching records per distinct value of `field`
    fn group_count(
        &self,
        predicate: &TodoPredicate,
        field: GroupField,
    ) -> impl Future<Output = DbResult<HashMap<String, u64>>> + Send;

    /// Point lookup
    fn get(&self, id: &TodoId) -> impl Future<Output = DbResult<Option<Todo>>> + Send;

    /// Insert a new record
    fn insert(&self, todo: &Todo) -> impl Future<Output = DbResult<()>> + Send;

    /// Overwrite an existing record; `false` if there was none
    fn replace(&self, todo: &Todo) -> impl Future<Output = DbResult<bool>> + Send;

    /// Delete a record; `false` if there was none
    fn remove(&self, id: &TodoId) -> impl Future<Output = DbResult<bool>> + Send;
}

/// Comments attached to todos
pub trait CommentStore: Send + Sync {
    /// Comments on one todo, oldest first
    fn comments_for(
        &self,
        todo_id: &TodoId,
    ) -> impl Future<Output = DbResult<Vec<Comment>>> + Send;

    /// Number of comments on one todo
    fn count_comments(&self, todo_id: &TodoId) -> impl Future<Output = DbResult<u64>> + Send;

    fn get_comment(&self, id: &CommentId)
    -> impl Future<Output = DbResult<Option<Comment>>> + Send;

    fn insert_comment(&self, comment: &Comment) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete one comment; `false` if there was none
    fn remove_comment(&self, id: &CommentId) -> impl Future<Output = DbResult<bool>> + Send;

    /// Delete every comment on a todo, returning how many went
    fn remove_comments_for(
        &self,
        todo_id: &TodoId,
    ) -> impl Future<Output = DbResult<u64>> + Send;
}
