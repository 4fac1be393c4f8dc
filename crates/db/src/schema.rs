//! Database schema initialization for todoql
//!
//! Defines the SurrealDB `todo` and `comment` tables with typed, asserted
//! fields.

use crate::error::DbError;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// SQL statements for schema initialization
mod sql {
    /// Define the todo table with all fields
    ///
    /// `priority_rank` mirrors `priority` as 0..=3 so severity ordering can be
    /// done by the database.
    pub const DEFINE_TODO_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS todo SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS title ON todo TYPE string;

        DEFINE FIELD IF NOT EXISTS completed ON todo TYPE bool DEFAULT false;

        DEFINE FIELD IF NOT EXISTS priority ON todo TYPE string
            ASSERT $value IN ["LOW", "MEDIUM", "HIGH", "URGENT"];

        DEFINE FIELD IF NOT EXISTS priority_rank ON todo TYPE int
            ASSERT $value >= 0 AND $value <= 3;

        DEFINE FIELD IF NOT EXISTS due_date ON todo TYPE option<datetime>;

        DEFINE FIELD IF NOT EXISTS owner_id ON todo TYPE string;

        DEFINE FIELD IF NOT EXISTS created_at ON todo TYPE datetime DEFAULT time::now();
    "#;

    /// Index for owner-scoped listings and statistics
    pub const DEFINE_OWNER_INDEX: &str = r#"
        DEFINE INDEX IF NOT EXISTS todo_owner ON todo FIELDS owner_id;
    "#;

    /// Define the comment table; `todo_id` holds the bare todo id
    pub const DEFINE_COMMENT_TABLE: &str = r#"
        DEFINE TABLE IF NOT EXISTS comment SCHEMAFULL;

        DEFINE FIELD IF NOT EXISTS text ON comment TYPE string;

        DEFINE FIELD IF NOT EXISTS todo_id ON comment TYPE string;

        DEFINE FIELD IF NOT EXISTS user_id ON comment TYPE string;

        DEFINE FIELD IF NOT EXISTS created_at ON comment TYPE datetime DEFAULT time::now();

        DEFINE INDEX IF NOT EXISTS comment_todo ON comment FIELDS todo_id;
    "#;
}

/// Initialize the database schema.
///
/// This function is idempotent - it can be called multiple times safely
/// as it uses `IF NOT EXISTS` clauses.
///
/// # Errors
///
/// Returns `DbError::Schema` if any schema definition fails.
pub async fn init_schema(client: &Surreal<Db>) -> Result<(), DbError> {
    client
        .query(sql::DEFINE_TODO_TABLE)
        .await
        .and_then(|response| response.check())
        .map_err(|e| DbError::Schema(Box::new(e)))?;

    client
        .query(sql::DEFINE_OWNER_INDEX)
        .await
        .and_then(|response| response.check())
        .map_err(|e| DbError::Schema(Box::new(e)))?;

    client
        .query(sql::DEFINE_COMMENT_TABLE)
        .await
        .and_then(|response| response.check())
        .map_err(|e| DbError::Schema(Box::new(e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use surrealdb::engine::local::SurrealKv;

    /// Helper to create a test database
    async fn setup_test_db() -> (Surreal<Db>, std::path::PathBuf) {
        let temp_dir = env::temp_dir().join(format!(
            "todoql-schema-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        std::fs::create_dir_all(&temp_dir).unwrap();

        let client = Surreal::new::<SurrealKv>(temp_dir.clone()).await.unwrap();
        client.use_ns("todoql").use_db("test").await.unwrap();

        (client, temp_dir)
    }

    /// Clean up test database
    fn cleanup(path: &std::path::Path) {
        let _ = std::fs::remove_dir_all(path);
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let (client, temp_dir) = setup_test_db().await;

        let first = init_schema(&client).await;
        assert!(first.is_ok(), "First init failed: {:?}", first.err());

        let second = init_schema(&client).await;
        assert!(second.is_ok(), "Second init failed: {:?}", second.err());

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_todo_table_accepts_valid_data() {
        let (client, temp_dir) = setup_test_db().await;
        init_schema(&client).await.unwrap();

        let result = client
            .query(
                r#"
                CREATE todo:valid SET
                    title = "Write documentation",
                    completed = false,
                    priority = "LOW",
                    priority_rank = 0,
                    owner_id = "jane"
            "#,
            )
            .await
            .and_then(|r| r.check());

        assert!(result.is_ok(), "Valid todo insert failed: {:?}", result.err());

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_todo_table_rejects_unknown_priority() {
        let (client, temp_dir) = setup_test_db().await;
        init_schema(&client).await.unwrap();

        let result = client
            .query(
                r#"
                CREATE todo:invalid SET
                    title = "Bad priority",
                    priority = "CRITICAL",
                    priority_rank = 3,
                    owner_id = "jane"
            "#,
            )
            .await
            .and_then(|r| r.check());

        assert!(result.is_err(), "Unknown priority should be rejected");

        cleanup(&temp_dir);
    }

    #[tokio::test]
    async fn test_comment_table_requires_user() {
        let (client, temp_dir) = setup_test_db().await;
        init_schema(&client).await.unwrap();

        let valid = client
            .query(
                r#"
                CREATE comment:ok SET
                    text = "Looks good",
                    todo_id = "0000018f00000001",
                    user_id = "jane"
            "#,
            )
            .await
            .and_then(|r| r.check());
        assert!(valid.is_ok(), "Valid comment insert failed: {:?}", valid.err());

        let missing = client
            .query(r#"CREATE comment:bad SET text = "No user", todo_id = "0000018f00000001""#)
            .await
            .and_then(|r| r.check());
        assert!(missing.is_err(), "Comment without user should be rejected");

        cleanup(&temp_dir);
    }
}
