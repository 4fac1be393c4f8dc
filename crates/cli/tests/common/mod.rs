//! Test infrastructure for integration tests
//!
//! Provides isolated database setup/teardown and command builder helpers.
//! Each test gets its own database instance to ensure no shared state.

use chrono::{DateTime, TimeZone, Utc};
use std::path::PathBuf;
use todoql_cli::commands::{AddCommand, ListCommand, UpdateCommand};
use todoql_db::{Database, Priority, Todo};

/// Test context containing an isolated database and temp directory
pub struct TestContext {
    pub db: Database,
    pub temp_dir: PathBuf,
}

impl TestContext {
    /// Create a new test context with an isolated database.
    ///
    /// Each call creates a uniquely named temp directory using process ID,
    /// thread ID, and nanosecond timestamp to guarantee isolation.
    pub async fn new() -> Self {
        let temp_dir = std::env::temp_dir().join(format!(
            "todoql-integration-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let db = Database::connect(&temp_dir).await.unwrap();
        db.init().await.unwrap();

        Self { db, temp_dir }
    }

    /// Add a todo through the add command and return it.
    pub async fn add(&self, cmd: AddCommand) -> Todo {
        cmd.execute(&self.db.store()).await.unwrap()
    }

    /// Seed the four-record, two-owner collection used across the suite.
    ///
    /// Created in this order: a HIGH for john due Dec 20, a completed
    /// MEDIUM for john due Dec 18, a LOW for jane due Dec 25 and a HIGH for
    /// jane due Dec 16.
    pub async fn seed(&self) -> Vec<Todo> {
        let mut todos = Vec::new();
        todos.push(
            self.add(add_cmd_full("Complete GraphQL tutorial", "john", Priority::High, 20))
                .await,
        );
        let done = self
            .add(add_cmd_full("Write documentation", "john", Priority::Medium, 18))
            .await;
        let mut toggle = update_cmd(&[done.id.as_str()]);
        toggle.completed = Some(true);
        todos.push(toggle.execute(&self.db.store()).await.unwrap().remove(0));
        todos.push(
            self.add(add_cmd_full("Fix bug in authentication", "jane", Priority::Low, 25))
                .await,
        );
        todos.push(
            self.add(add_cmd_full("Review pull requests", "jane", Priority::High, 16))
                .await,
        );
        todos
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.temp_dir);
    }
}

// =============================================================================
// Command Builder Helpers
// =============================================================================

/// Midnight UTC on the given day of December 2024
pub fn december(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, day, 0, 0, 0).unwrap()
}

/// Create an AddCommand with default optional fields filled in.
pub fn add_cmd(title: &str, owner: &str) -> AddCommand {
    AddCommand {
        title: title.to_string(),
        owner: owner.to_string(),
        priority: None,
        due: None,
    }
}

/// Create an AddCommand with priority and a December due date.
pub fn add_cmd_full(title: &str, owner: &str, priority: Priority, due_day: u32) -> AddCommand {
    AddCommand {
        title: title.to_string(),
        owner: owner.to_string(),
        priority: Some(priority),
        due: Some(december(due_day)),
    }
}

/// Create a ListCommand with no filters, default sort and default page.
pub fn list_cmd() -> ListCommand {
    ListCommand {
        completed: false,
        pending: false,
        priority: None,
        owner: None,
        search: None,
        sort: None,
        direction: None,
        first: None,
        after: None,
    }
}

/// Create an UpdateCommand that changes nothing yet.
pub fn update_cmd(ids: &[&str]) -> UpdateCommand {
    UpdateCommand {
        ids: ids.iter().map(|s| s.to_string()).collect(),
        title: None,
        priority: None,
        due: None,
        clear_due: false,
        completed: None,
    }
}
