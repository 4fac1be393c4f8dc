//! Delete command for removing todos and their comments

use clap::Args;
use serde::Serialize;
use todoql_db::{CommentStore, DbResult, TodoRepository, TodoStore};

/// Delete a todo
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Todo ID
    #[arg(required = true)]
    pub id: String,
}

/// Outcome of a successful delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub id: String,
    pub success: bool,
    pub message: String,
}

impl DeleteCommand {
    /// Execute the delete command.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if the todo does not exist.
    pub async fn execute<S: TodoStore + CommentStore>(
        &self,
        store: &S,
    ) -> DbResult<DeleteResponse> {
        TodoRepository::new(store).delete(&self.id).await?;
        Ok(DeleteResponse {
            id: self.id.clone(),
            success: true,
            message: format!("Todo {} deleted", self.id),
        })
    }
}
