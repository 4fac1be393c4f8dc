//! Comment repository
//!
//! Lists, adds and deletes comments on todos. Every operation that names a
//! todo checks that it exists first.

use crate::error::{DbError, DbResult};
use crate::id::{CommentId, TodoId, next_comment_id};
use crate::models::{Comment, NewComment};
use crate::store::{CommentStore, TodoStore};
use chrono::Utc;
use tracing::debug;

/// Repository for comments attached to todos
pub struct CommentRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: TodoStore + CommentStore> CommentRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    async fn existing_todo(&self, todo_id: &str) -> DbResult<TodoId> {
        let id = TodoId::parse(todo_id)?;
        if self.store.get(&id).await?.is_none() {
            debug!("Todo not found: {}", id);
            return Err(DbError::NotFound {
                todo_id: id.to_string(),
            });
        }
        Ok(id)
    }

    /// Comments on a todo, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for a malformed id and
    /// `DbError::NotFound` if the todo does not exist.
    pub async fn list(&self, todo_id: &str) -> DbResult<Vec<Comment>> {
        let id = self.existing_todo(todo_id).await?;
        self.store.comments_for(&id).await
    }

    /// Number of comments on a todo.
    pub async fn count(&self, todo_id: &TodoId) -> DbResult<u64> {
        self.store.count_comments(todo_id).await
    }

    /// Attach a new comment to an existing todo.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for blank text or user and
    /// `DbError::NotFound` if the todo does not exist.
    pub async fn add(&self, input: NewComment) -> DbResult<Comment> {
        input.validate()?;
        let todo_id = self.existing_todo(&input.todo_id).await?;
        let comment = Comment {
            id: next_comment_id(),
            todo_id,
            user_id: input.user_id,
            text: input.text,
            created_at: Utc::now(),
        };
        debug!("Adding comment: {} to todo: {}", comment.id, comment.todo_id);
        self.store.insert_comment(&comment).await?;
        Ok(comment)
    }

    /// Delete a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns `DbError::CommentNotFound` if no comment has this id.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let id = CommentId::parse(id)?;
        debug!("Deleting comment: {}", id);
        if self.store.remove_comment(&id).await? {
            Ok(())
        } else {
            Err(DbError::CommentNotFound {
                comment_id: id.to_string(),
            })
        }
    }
}
