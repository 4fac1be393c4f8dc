//! Todo repository for lookup and write operations
//!
//! Provides a repository pattern implementation for todo CRUD on top of any
//! [`TodoStore`], including toggling, bulk updates and unpaginated search.
//! Deleting also needs a [`CommentStore`] so a todo's comments go with it.

use super::filter::{SortDirection, SortField, TodoSort};
use crate::error::{DbError, DbResult};
use crate::id::{TodoId, next_todo_id};
use crate::models::{NewTodo, Todo, TodoUpdate};
use crate::store::{CommentStore, FindQuery, TodoPredicate, TodoStore};
use chrono::Utc;
use tracing::{debug, trace, warn};

/// Repository for todo CRUD operations
pub struct TodoRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: TodoStore> TodoRepository<'a, S> {
    /// Create a new TodoRepository over the given store
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Get a todo by ID.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for a malformed id and
    /// `DbError::NotFound` if no todo has this id.
    pub async fn get(&self, id: &str) -> DbResult<Todo> {
        let id = TodoId::parse(id)?;
        self.fetch(&id).await
    }

    async fn fetch(&self, id: &TodoId) -> DbResult<Todo> {
        match self.store.get(id).await? {
            Some(todo) => Ok(todo),
            None => {
                debug!("Todo not found: {}", id);
                Err(DbError::NotFound {
                    todo_id: id.to_string(),
                })
            }
        }
    }

    /// Create a new todo, assigning its id and creation time.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` if the title or owner is blank.
    pub async fn create(&self, input: NewTodo) -> DbResult<Todo> {
        input.validate()?;
        let todo = Todo {
            id: next_todo_id(),
            title: input.title,
            completed: false,
            priority: input.priority,
            due_date: input.due_date,
            owner_id: input.owner_id,
            created_at: Utc::now(),
        };
        debug!("Creating todo: {} with title: {}", todo.id, todo.title);
        trace!("Todo data: {:?}", todo);
        self.store.insert(&todo).await?;
        Ok(todo)
    }

    /// Apply a partial update and return the updated todo.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for a malformed id or blank title,
    /// `DbError::NotFound` if the todo does not exist.
    pub async fn update(&self, id: &str, updates: &TodoUpdate) -> DbResult<Todo> {
        updates.validate()?;
        let id = TodoId::parse(id)?;
        let mut todo = self.fetch(&id).await?;

        if !updates.has_updates() {
            debug!("No updates specified for todo: {}", id);
            return Ok(todo);
        }

        todo.apply(updates);
        trace!("Updates: {:?}", updates);
        self.store_replace(todo).await
    }

    /// Flip the completion flag.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the todo does not exist.
    pub async fn toggle(&self, id: &str) -> DbResult<Todo> {
        let id = TodoId::parse(id)?;
        let mut todo = self.fetch(&id).await?;
        todo.completed = !todo.completed;
        debug!("Toggling todo: {} to completed={}", id, todo.completed);
        self.store_replace(todo).await
    }

    async fn store_replace(&self, todo: Todo) -> DbResult<Todo> {
        if self.store.replace(&todo).await? {
            Ok(todo)
        } else {
            // deleted between the read and the write
            Err(DbError::NotFound {
                todo_id: todo.id.to_string(),
            })
        }
    }

    /// Apply the same update to several todos.
    ///
    /// Ids that do not exist are skipped; the updated todos are returned in
    /// the order their ids were given.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` if any id is malformed or the update
    /// is invalid; nothing is written in that case.
    pub async fn bulk_update(&self, ids: &[String], updates: &TodoUpdate) -> DbResult<Vec<Todo>> {
        updates.validate()?;
        let ids = ids
            .iter()
            .map(|id| TodoId::parse(id))
            .collect::<DbResult<Vec<_>>>()?;

        let mut updated = Vec::with_capacity(ids.len());
        for id in &ids {
            let Some(mut todo) = self.store.get(id).await? else {
                warn!("Bulk update skipping missing todo: {}", id);
                continue;
            };
            todo.apply(updates);
            if self.store.replace(&todo).await? {
                updated.push(todo);
            }
        }
        debug!("Bulk update touched {} of {} todos", updated.len(), ids.len());
        Ok(updated)
    }

    /// All todos whose title contains `text`, ignoring case, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` if `text` is blank.
    pub async fn search(&self, text: &str) -> DbResult<Vec<Todo>> {
        if text.trim().is_empty() {
            return Err(DbError::invalid("Search query cannot be empty"));
        }
        self.store
            .find(&FindQuery {
                predicate: TodoPredicate::all().title_containing(text),
                sort: TodoSort::new(SortField::CreatedAt, SortDirection::Asc),
                limit: None,
            })
            .await
    }
}

impl<S: TodoStore + CommentStore> TodoRepository<'_, S> {
    /// Delete a todo by ID together with its comments.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the todo does not exist; comments are
    /// left alone in that case.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let id = TodoId::parse(id)?;
        debug!("Deleting todo: {}", id);
        if !self.store.remove(&id).await? {
            return Err(DbError::NotFound {
                todo_id: id.to_string(),
            });
        }
        let removed = self.store.remove_comments_for(&id).await?;
        debug!("Removed {} comments with todo: {}", removed, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::id::next_comment_id;
    use crate::models::{Comment, Priority};
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);

        let created = repo
            .create(NewTodo::new("Complete GraphQL tutorial", "john").with_priority(Priority::High))
            .await
            .unwrap();
        assert!(!created.completed);
        assert_eq!(created.priority, Priority::High);

        let fetched = repo.get(created.id.as_str()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_defaults_to_medium() {
        let store = MemoryStore::new();
        let created = TodoRepository::new(&store)
            .create(NewTodo::new("Write documentation", "jane"))
            .await
            .unwrap();
        assert_eq!(created.priority, Priority::Medium);
        assert_eq!(created.due_date, None);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let store = MemoryStore::new();
        let err = TodoRepository::new(&store)
            .create(NewTodo::new("  ", "jane"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_created_ids_follow_insertion_order() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);
        let a = repo.create(NewTodo::new("first", "u")).await.unwrap();
        let b = repo.create(NewTodo::new("second", "u")).await.unwrap();
        let c = repo.create(NewTodo::new("third", "u")).await.unwrap();
        assert!(a.id < b.id && b.id < c.id);
    }

    #[tokio::test]
    async fn test_get_missing_and_malformed() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);

        let err = repo.get(TodoId::from_raw(42).as_str()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = repo.get("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_update_fields() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);
        let created = repo
            .create(NewTodo::new("Original Title", "john"))
            .await
            .unwrap();
        let due = Utc.with_ymd_and_hms(2024, 12, 20, 0, 0, 0).unwrap();

        let updated = repo
            .update(
                created.id.as_str(),
                &TodoUpdate::new()
                    .with_title("New Title")
                    .with_priority(Priority::Urgent)
                    .with_due_date(due),
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "New Title");
        assert_eq!(updated.priority, Priority::Urgent);
        assert_eq!(updated.due_date, Some(due));
        assert_eq!(updated.owner_id, "john");
        assert_eq!(updated.created_at, created.created_at);

        let stored = repo.get(created.id.as_str()).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = TodoRepository::new(&store)
            .update(
                TodoId::from_raw(9).as_str(),
                &TodoUpdate::new().with_completed(true),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_toggle_flips_completed() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);
        let created = repo.create(NewTodo::new("Toggle", "u")).await.unwrap();

        let toggled = repo.toggle(created.id.as_str()).await.unwrap();
        assert!(toggled.completed);
        let toggled = repo.toggle(created.id.as_str()).await.unwrap();
        assert!(!toggled.completed);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);
        let created = repo.create(NewTodo::new("Delete me", "u")).await.unwrap();

        repo.delete(created.id.as_str()).await.unwrap();
        let err = repo.delete(created.id.as_str()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_removes_comments() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);
        let doomed = repo.create(NewTodo::new("Delete me", "u")).await.unwrap();
        let kept = repo.create(NewTodo::new("Keep me", "u")).await.unwrap();
        for todo_id in [&doomed.id, &doomed.id, &kept.id] {
            store
                .insert_comment(&Comment {
                    id: next_comment_id(),
                    todo_id: todo_id.clone(),
                    user_id: "u".to_string(),
                    text: "note".to_string(),
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        repo.delete(doomed.id.as_str()).await.unwrap();
        assert_eq!(store.count_comments(&doomed.id).await.unwrap(), 0);
        assert_eq!(store.count_comments(&kept.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bulk_update_skips_missing() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);
        let a = repo.create(NewTodo::new("a", "u")).await.unwrap();
        let b = repo.create(NewTodo::new("b", "u")).await.unwrap();
        let ghost = TodoId::from_raw(1).to_string();

        let updated = repo
            .bulk_update(
                &[a.id.to_string(), ghost, b.id.to_string()],
                &TodoUpdate::new().with_completed(true),
            )
            .await
            .unwrap();
        let ids: Vec<&TodoId> = updated.iter().map(|t| &t.id).collect();
        assert_eq!(ids, vec![&a.id, &b.id]);
        assert!(repo.get(a.id.as_str()).await.unwrap().completed);
        assert!(repo.get(b.id.as_str()).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_bulk_update_rejects_malformed_before_writing() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);
        let a = repo.create(NewTodo::new("a", "u")).await.unwrap();

        let err = repo
            .bulk_update(
                &[a.id.to_string(), "bad".to_string()],
                &TodoUpdate::new().with_completed(true),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(!repo.get(a.id.as_str()).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_search() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);
        repo.create(NewTodo::new("Fix bug in authentication", "jane"))
            .await
            .unwrap();
        repo.create(NewTodo::new("Write documentation", "jane"))
            .await
            .unwrap();
        repo.create(NewTodo::new("Debug flaky test", "john"))
            .await
            .unwrap();

        let found = repo.search("BUG").await.unwrap();
        let titles: Vec<&str> = found.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Fix bug in authentication", "Debug flaky test"]);

        assert!(repo.search(" ").await.is_err());
    }
}
