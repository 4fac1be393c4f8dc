//! Stats command

use clap::Args;
use todoql_db::{DbResult, StatsAggregator, TodoStats, TodoStore};

/// Show todo statistics
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Restrict to one owner
    #[arg(short, long)]
    pub owner: Option<String>,
}

impl StatsCommand {
    /// Execute the stats command with overdue evaluated against now.
    pub async fn execute<S: TodoStore>(&self, store: &S) -> DbResult<TodoStats> {
        StatsAggregator::new(store)
            .todo_stats(self.owner.as_deref())
            .await
    }
}
