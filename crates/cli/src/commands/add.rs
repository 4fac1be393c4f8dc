//! Add command for creating new todos
//!
//! Implements the `todoql add` command.

use super::{parse_date, parse_priority};
use chrono::{DateTime, Utc};
use clap::Args;
use todoql_db::{DbResult, NewTodo, Priority, Todo, TodoRepository, TodoStore};

/// Create a new todo
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Title of the todo
    #[arg(required = true)]
    pub title: String,

    /// Owner of the todo
    #[arg(short, long)]
    pub owner: String,

    /// Priority (low, medium, high, urgent); medium when omitted
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// Due date (YYYY-MM-DD or RFC 3339)
    #[arg(short, long, value_parser = parse_date)]
    pub due: Option<DateTime<Utc>>,
}

impl AddCommand {
    /// Execute the add command.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for a blank title or owner, or any
    /// store failure.
    pub async fn execute<S: TodoStore>(&self, store: &S) -> DbResult<Todo> {
        let mut input = NewTodo::new(self.title.clone(), self.owner.clone());
        if let Some(priority) = self.priority {
            input = input.with_priority(priority);
        }
        if let Some(due) = self.due {
            input = input.with_due_date(due);
        }
        TodoRepository::new(store).create(input).await
    }
}
