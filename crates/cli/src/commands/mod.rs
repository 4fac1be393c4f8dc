//! CLI subcommands
//!
//! Each command holds its clap arguments and an `execute` method that runs
//! against any [`TodoStore`] (and [`CommentStore`] where comments are
//! involved) and returns typed results. [`Command::execute`]
//! renders those results as a table or as JSON.

pub mod add;
pub mod comment;
pub mod delete;
pub mod list;
pub mod owners;
pub mod search;
pub mod show;
pub mod stats;
pub mod toggle;
pub mod update;

pub use add::AddCommand;
pub use comment::{CommentAction, CommentCommand, CommentOutcome};
pub use delete::{DeleteCommand, DeleteResponse};
pub use list::ListCommand;
pub use owners::OwnersCommand;
pub use search::SearchCommand;
pub use show::{ShowCommand, TodoDetail};
pub use stats::StatsCommand;
pub use toggle::ToggleCommand;
pub use update::UpdateCommand;

use crate::output;
use chrono::{DateTime, NaiveDate, Utc};
use clap::Subcommand;
use serde::Serialize;
use thiserror::Error;
use todoql_db::{CommentStore, DbError, Priority, SortDirection, SortField, TodoStore};

/// Errors surfaced by the command layer
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("Failed to render JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Message including nested store error detail
    pub fn full_message(&self) -> String {
        match self {
            CliError::Db(e) => e.full_message(),
            CliError::Json(_) => self.to_string(),
        }
    }
}

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new todo
    Add(AddCommand),
    /// List todos with filters, sorting and cursor pagination
    List(ListCommand),
    /// Show completion, overdue and priority statistics
    Stats(StatsCommand),
    /// Count todos per owner
    Owners(OwnersCommand),
    /// Show a single todo with its comment count
    Show(ShowCommand),
    /// Flip a todo between done and pending
    Toggle(ToggleCommand),
    /// Update one or more todos
    Update(UpdateCommand),
    /// Delete a todo and its comments
    Delete(DeleteCommand),
    /// Find todos whose title contains some text
    Search(SearchCommand),
    /// Add, list or delete comments on a todo
    Comment(CommentCommand),
}

impl Command {
    /// Run the command and render its result.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Db` for any failure from the todo store or input
    /// validation.
    pub async fn execute<S: TodoStore + CommentStore>(
        &self,
        store: &S,
        format: OutputFormat,
    ) -> Result<String, CliError> {
        match self {
            Command::Add(cmd) => {
                let todo = cmd.execute(store).await?;
                render(format, &todo, || output::format_todo_detail(&todo))
            }
            Command::List(cmd) => {
                let page = cmd.execute(store).await?;
                render(format, &page, || output::format_connection(&page))
            }
            Command::Stats(cmd) => {
                let stats = cmd.execute(store).await?;
                render(format, &stats, || output::format_stats(&stats))
            }
            Command::Owners(cmd) => {
                let counts = cmd.execute(store).await?;
                render(format, &counts, || output::format_owner_counts(&counts))
            }
            Command::Show(cmd) => {
                let detail = cmd.execute(store).await?;
                render(format, &detail, || {
                    output::format_todo_detail_with_comments(&detail.todo, detail.comment_count)
                })
            }
            Command::Toggle(cmd) => {
                let todo = cmd.execute(store).await?;
                render(format, &todo, || output::format_todo_detail(&todo))
            }
            Command::Update(cmd) => {
                let todos = cmd.execute(store).await?;
                render(format, &todos, || output::format_todo_table(&todos))
            }
            Command::Delete(cmd) => {
                let deleted = cmd.execute(store).await?;
                render(format, &deleted, || deleted.message.clone())
            }
            Command::Search(cmd) => {
                let todos = cmd.execute(store).await?;
                render(format, &todos, || output::format_todo_table(&todos))
            }
            Command::Comment(cmd) => {
                let outcome = cmd.execute(store).await?;
                render(format, &outcome, || match &outcome {
                    CommentOutcome::Added(comment) => {
                        output::format_comment_table(std::slice::from_ref(comment))
                    }
                    CommentOutcome::Listed(comments) => output::format_comment_table(comments),
                    CommentOutcome::Deleted(response) => response.message.clone(),
                })
            }
        }
    }
}

fn render<T: Serialize>(
    format: OutputFormat,
    value: &T,
    table: impl FnOnce() -> String,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(table()),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    }
}

/// Parse a priority, ignoring case
pub(crate) fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(&s.to_uppercase()).map_err(|e| e.to_string())
}

/// Parse a sort field, ignoring case and accepting `-` for `_`
pub(crate) fn parse_sort_field(s: &str) -> Result<SortField, String> {
    SortField::parse(&s.to_uppercase().replace('-', "_")).map_err(|e| e.to_string())
}

/// Parse a sort direction, ignoring case
pub(crate) fn parse_direction(s: &str) -> Result<SortDirection, String> {
    SortDirection::parse(&s.to_uppercase()).map_err(|e| e.to_string())
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp
pub(crate) fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("invalid date '{}'. Use YYYY-MM-DD or RFC 3339", s))
}
