//! Toggle command for flipping completion

use clap::Args;
use todoql_db::{DbResult, Todo, TodoRepository, TodoStore};

/// Flip a todo between done and pending
#[derive(Debug, Args)]
pub struct ToggleCommand {
    /// Todo ID
    #[arg(required = true)]
    pub id: String,
}

impl ToggleCommand {
    /// Execute the toggle command, returning the todo as stored afterwards.
    pub async fn execute<S: TodoStore>(&self, store: &S) -> DbResult<Todo> {
        TodoRepository::new(store).toggle(&self.id).await
    }
}
