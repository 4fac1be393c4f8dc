//! Show command for displaying a single todo

use clap::Args;
use serde::Serialize;
use todoql_db::{CommentRepository, CommentStore, DbResult, Todo, TodoRepository, TodoStore};

/// Show a single todo
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Todo ID
    #[arg(required = true)]
    pub id: String,
}

/// A todo with its comment count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoDetail {
    #[serde(flatten)]
    pub todo: Todo,
    pub comment_count: u64,
}

impl ShowCommand {
    /// Execute the show command.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if no todo has this id.
    pub async fn execute<S: TodoStore + CommentStore>(&self, store: &S) -> DbResult<TodoDetail> {
        let todo = TodoRepository::new(store).get(&self.id).await?;
        let comment_count = CommentRepository::new(store).count(&todo.id).await?;
        Ok(TodoDetail {
            todo,
            comment_count,
        })
    }
}
