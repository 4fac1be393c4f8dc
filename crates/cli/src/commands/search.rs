//! Search command for title lookups

use clap::Args;
use todoql_db::{DbResult, Todo, TodoRepository, TodoStore};

/// Find todos whose title contains some text, ignoring case
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Text to look for
    #[arg(required = true)]
    pub text: String,
}

impl SearchCommand {
    /// Execute the search command.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` if the text is blank.
    pub async fn execute<S: TodoStore>(&self, store: &S) -> DbResult<Vec<Todo>> {
        TodoRepository::new(store).search(&self.text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todoql_db::{ErrorKind, MemoryStore, NewTodo};

    #[tokio::test]
    async fn test_search_matches_case_insensitively() {
        let store = MemoryStore::new();
        let repo = TodoRepository::new(&store);
        repo.create(NewTodo::new("Fix bug in authentication", "jane"))
            .await
            .unwrap();
        repo.create(NewTodo::new("Review pull requests", "john"))
            .await
            .unwrap();

        let found = SearchCommand {
            text: "AUTH".to_string(),
        }
        .execute(&store)
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Fix bug in authentication");
    }

    #[tokio::test]
    async fn test_blank_search_rejected() {
        let store = MemoryStore::new();
        let err = SearchCommand {
            text: "  ".to_string(),
        }
        .execute(&store)
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
