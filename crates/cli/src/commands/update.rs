//! Update command for editing one or more todos
//!
//! A single id goes through a strict update that fails on a missing todo;
//! several ids go through the bulk path, which skips missing ones.

use super::{parse_date, parse_priority};
use chrono::{DateTime, Utc};
use clap::Args;
use todoql_db::{DbError, DbResult, Priority, Todo, TodoRepository, TodoStore, TodoUpdate};

/// Update todos
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Todo IDs
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,

    /// New title
    #[arg(short, long)]
    pub title: Option<String>,

    /// New priority (low, medium, high, urgent)
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// New due date (YYYY-MM-DD or RFC 3339)
    #[arg(short, long, value_parser = parse_date, conflicts_with = "clear_due")]
    pub due: Option<DateTime<Utc>>,

    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,

    /// Set the completion flag
    #[arg(short, long)]
    pub completed: Option<bool>,
}

impl UpdateCommand {
    /// Changes described by the flags
    pub fn changes(&self) -> TodoUpdate {
        let mut update = TodoUpdate::new();
        if let Some(title) = &self.title {
            update = update.with_title(title.clone());
        }
        if let Some(priority) = self.priority {
            update = update.with_priority(priority);
        }
        if let Some(due) = self.due {
            update = update.with_due_date(due);
        } else if self.clear_due {
            update = update.clear_due_date();
        }
        if let Some(completed) = self.completed {
            update = update.with_completed(completed);
        }
        update
    }

    /// Execute the update command.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` when no change is requested, for a
    /// malformed id or a blank title. A single missing id is
    /// `DbError::NotFound`.
    pub async fn execute<S: TodoStore>(&self, store: &S) -> DbResult<Vec<Todo>> {
        let changes = self.changes();
        if !changes.has_updates() {
            return Err(DbError::invalid(
                "no changes requested. Use --title, --priority, --due, --clear-due or --completed",
            ));
        }

        let repo = TodoRepository::new(store);
        match self.ids.as_slice() {
            [id] => Ok(vec![repo.update(id, &changes).await?]),
            ids => repo.bulk_update(ids, &changes).await,
        }
    }
}
