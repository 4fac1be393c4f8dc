//! Owners command

use clap::Args;
use todoql_db::{DbResult, OwnerCount, StatsAggregator, TodoStore};

/// Count todos per owner
#[derive(Debug, Args)]
pub struct OwnersCommand {
    /// Count only completed todos
    #[arg(long, conflicts_with = "pending")]
    pub completed: bool,

    /// Count only todos that are not completed
    #[arg(long)]
    pub pending: bool,
}

impl OwnersCommand {
    pub async fn execute<S: TodoStore>(&self, store: &S) -> DbResult<Vec<OwnerCount>> {
        let completed = match (self.completed, self.pending) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        StatsAggregator::new(store).owner_counts(completed).await
    }
}
