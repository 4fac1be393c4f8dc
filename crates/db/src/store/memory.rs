//! In-memory todo store
//!
//! Keeps todos and comments in `BTreeMap`s keyed by id, each behind an
//! async `RwLock`.
//! Readers never block each other; writers get exclusive access.

use super::{CommentStore, FindQuery, GroupField, TodoPredicate, TodoStore};
use crate::error::{DbError, DbResult};
use crate::id::{CommentId, TodoId};
use crate::models::{Comment, Todo};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::trace;

/// Todo store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: RwLock<BTreeMap<TodoId, Todo>>,
    comments: RwLock<BTreeMap<CommentId, Comment>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `todos`
    pub fn with_todos(todos: impl IntoIterator<Item = Todo>) -> Self {
        let todos = todos.into_iter().map(|t| (t.id.clone(), t)).collect();
        Self {
            todos: RwLock::new(todos),
            ..Self::default()
        }
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.todos.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.todos.read().await.is_empty()
    }
}

impl TodoStore for MemoryStore {
    async fn find(&self, query: &FindQuery) -> DbResult<Vec<Todo>> {
        let todos = self.todos.read().await;
        let mut matched: Vec<Todo> = todos
            .values()
            .filter(|t| query.predicate.matches(t))
            .cloned()
            .collect();
        matched.sort_by(|a, b| query.sort.compare(a, b));
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        trace!("memory find returned {} records", matched.len());
        Ok(matched)
    }

    async fn count(&self, predicate: &TodoPredicate) -> DbResult<u64> {
        let todos = self.todos.read().await;
        Ok(todos.values().filter(|t| predicate.matches(t)).count() as u64)
    }

    async fn group_count(
        &self,
        predicate: &TodoPredicate,
        field: GroupField,
    ) -> DbResult<HashMap<String, u64>> {
        let todos = self.todos.read().await;
        let mut groups: HashMap<String, u64> = HashMap::new();
        for todo in todos.values().filter(|t| predicate.matches(t)) {
            *groups.entry(field.key_of(todo)).or_default() += 1;
        }
        Ok(groups)
    }

    async fn get(&self, id: &TodoId) -> DbResult<Option<Todo>> {
        Ok(self.todos.read().await.get(id).cloned())
    }

    async fn insert(&self, todo: &Todo) -> DbResult<()> {
        let mut todos = self.todos.write().await;
        if todos.contains_key(&todo.id) {
            return Err(DbError::invalid(format!(
                "todo '{}' already exists",
                todo.id
            )));
        }
        todos.insert(todo.id.clone(), todo.clone());
        Ok(())
    }

    async fn replace(&self, todo: &Todo) -> DbResult<bool> {
        let mut todos = self.todos.write().await;
        match todos.get_mut(&todo.id) {
            Some(existing) => {
                *existing = todo.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: &TodoId) -> DbResult<bool> {
        Ok(self.todos.write().await.remove(id).is_some())
    }
}

impl CommentStore for MemoryStore {
    async fn comments_for(&self, todo_id: &TodoId) -> DbResult<Vec<Comment>> {
        let comments = self.comments.read().await;
        Ok(comments
            .values()
            .filter(|c| &c.todo_id == todo_id)
            .cloned()
            .collect())
    }

    async fn count_comments(&self, todo_id: &TodoId) -> DbResult<u64> {
        let comments = self.comments.read().await;
        Ok(comments.values().filter(|c| &c.todo_id == todo_id).count() as u64)
    }

    async fn get_comment(&self, id: &CommentId) -> DbResult<Option<Comment>> {
        Ok(self.comments.read().await.get(id).cloned())
    }

    async fn insert_comment(&self, comment: &Comment) -> DbResult<()> {
        let mut comments = self.comments.write().await;
        if comments.contains_key(&comment.id) {
            return Err(DbError::invalid(format!(
                "comment '{}' already exists",
                comment.id
            )));
        }
        comments.insert(comment.id.clone(), comment.clone());
        Ok(())
    }

    async fn remove_comment(&self, id: &CommentId) -> DbResult<bool> {
        Ok(self.comments.write().await.remove(id).is_some())
    }

    async fn remove_comments_for(&self, todo_id: &TodoId) -> DbResult<u64> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|_, c| &c.todo_id != todo_id);
        Ok((before - comments.len()) as u64)
    }
}

static_assertions::assert_impl_all!(MemoryStore: Send, Sync);
