//! List command for paging through todos
//!
//! Implements the `todoql list` command: filters, a single sort key and
//! forward cursor pagination, all handed to [`TodoLister`].

use super::{parse_direction, parse_priority, parse_sort_field};
use clap::Args;
use todoql_db::{
    DbResult, Pagination, Priority, SortDirection, SortField, TodoConnection, TodoFilter,
    TodoLister, TodoSort, TodoStore,
};

/// List todos with optional filters
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only completed todos
    #[arg(long, conflicts_with = "pending")]
    pub completed: bool,

    /// Only todos that are not completed
    #[arg(long)]
    pub pending: bool,

    /// Filter by priority (low, medium, high, urgent)
    #[arg(short, long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// Filter by owner
    #[arg(short, long)]
    pub owner: Option<String>,

    /// Case-insensitive text the title must contain
    #[arg(short, long)]
    pub search: Option<String>,

    /// Sort field (title, created-at, due-date, priority)
    #[arg(long, value_parser = parse_sort_field)]
    pub sort: Option<SortField>,

    /// Sort direction (asc, desc); desc when omitted
    #[arg(long, value_parser = parse_direction, requires = "sort")]
    pub direction: Option<SortDirection>,

    /// Page size
    #[arg(long)]
    pub first: Option<usize>,

    /// Cursor of the last todo already seen
    #[arg(long)]
    pub after: Option<String>,
}

impl ListCommand {
    /// Filter described by the flags
    pub fn filter(&self) -> TodoFilter {
        let mut filter = TodoFilter::new();
        if self.completed {
            filter = filter.with_completed(true);
        } else if self.pending {
            filter = filter.with_completed(false);
        }
        if let Some(priority) = self.priority {
            filter = filter.with_priority(priority);
        }
        if let Some(owner) = &self.owner {
            filter = filter.with_owner(owner.clone());
        }
        if let Some(search) = &self.search {
            filter = filter.with_search(search.clone());
        }
        filter
    }

    /// Sort described by the flags, if any
    pub fn sort(&self) -> Option<TodoSort> {
        self.sort.map(|field| {
            TodoSort::new(field, self.direction.unwrap_or(SortDirection::Desc))
        })
    }

    /// Pagination described by the flags
    pub fn pagination(&self) -> Pagination {
        Pagination {
            first: self.first,
            after: self.after.clone(),
        }
    }

    /// Execute the list command.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for a blank owner or a malformed
    /// cursor, or any store failure.
    pub async fn execute<S: TodoStore>(&self, store: &S) -> DbResult<TodoConnection> {
        TodoLister::new(store)
            .query_todos(&self.filter(), self.sort().as_ref(), &self.pagination())
            .await
    }
}
