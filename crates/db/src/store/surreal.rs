//! SurrealDB-backed todo store
//!
//! Renders a [`TodoPredicate`] and [`TodoSort`] to SurrealQL against the
//! `todo` table defined in [`crate::schema`]. Comments live in the
//! `comment` table. Every value supplied by a
//! caller is passed as a bound variable, never spliced into the query text.

use super::{CommentStore, FindQuery, GroupField, TodoPredicate, TodoStore};
use crate::error::{DbError, DbResult};
use crate::id::{CommentId, RecordId, TodoId};
use crate::models::{Comment, Priority, Todo};
use crate::repository::{SortField, TodoSort};
use serde::Deserialize;
use std::collections::HashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::method::Query;
use surrealdb::sql::{Datetime, Id, Thing};
use tracing::{debug, trace};

/// Table holding todo records
const TABLE: &str = "todo";

const COMMENT_TABLE: &str = "comment";

/// Bare record id of a SurrealDB `Thing`
fn record_id(thing: &Thing) -> DbResult<RecordId> {
    let key = match &thing.id {
        Id::String(s) => s.clone(),
        other => other.to_string(),
    };
    RecordId::parse(&key).map_err(|_| DbError::Unavailable {
        message: format!("stored record has malformed id '{}'", key),
    })
}

/// Internal row type for deserializing from SurrealDB
#[derive(Debug, Deserialize)]
struct TodoRow {
    id: Thing,
    title: String,
    completed: bool,
    priority: Priority,
    #[serde(default)]
    due_date: Option<Datetime>,
    owner_id: String,
    created_at: Datetime,
}

impl TodoRow {
    /// Convert a TodoRow to a Todo
    fn into_todo(self) -> DbResult<Todo> {
        Ok(Todo {
            id: record_id(&self.id)?,
            title: self.title,
            completed: self.completed,
            priority: self.priority,
            due_date: self.due_date.map(|d| d.0),
            owner_id: self.owner_id,
            created_at: self.created_at.0,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CommentRow {
    id: Thing,
    todo_id: String,
    user_id: String,
    text: String,
    created_at: Datetime,
}

impl CommentRow {
    fn into_comment(self) -> DbResult<Comment> {
        let todo_id = TodoId::parse(&self.todo_id).map_err(|_| DbError::Unavailable {
            message: format!("stored comment has malformed todo id '{}'", self.todo_id),
        })?;
        Ok(Comment {
            id: record_id(&self.id)?,
            todo_id,
            user_id: self.user_id,
            text: self.text,
            created_at: self.created_at.0,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct GroupRow {
    #[serde(alias = "priority", alias = "owner_id")]
    key: String,
    total: u64,
}

/// Build the `WHERE` clause for a predicate (empty when unconstrained)
fn where_clause(predicate: &TodoPredicate) -> String {
    let mut conditions: Vec<&str> = Vec::new();

    if predicate.completed.is_some() {
        conditions.push("completed = $completed");
    }
    if predicate.priority.is_some() {
        conditions.push("priority = $priority");
    }
    if predicate.owner_id.is_some() {
        conditions.push("owner_id = $owner_id");
    }
    if predicate.title_contains.is_some() {
        conditions.push("string::contains(string::lowercase(title), $search)");
    }
    if predicate.id_after.is_some() {
        conditions.push("id > type::thing(\"todo\", $after)");
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Bind the variables referenced by [`where_clause`]
fn bind_predicate<'r>(mut query: Query<'r, Db>, predicate: &TodoPredicate) -> Query<'r, Db> {
    if let Some(completed) = predicate.completed {
        query = query.bind(("completed", completed));
    }
    if let Some(priority) = predicate.priority {
        query = query.bind(("priority", priority.as_str()));
    }
    if let Some(owner_id) = &predicate.owner_id {
        query = query.bind(("owner_id", owner_id.clone()));
    }
    if let Some(needle) = &predicate.title_contains {
        query = query.bind(("search", needle.to_lowercase()));
    }
    if let Some(after) = &predicate.id_after {
        query = query.bind(("after", after.as_str().to_string()));
    }
    query
}

/// Build the `ORDER BY` clause; ties fall back to id in the same direction
fn order_clause(sort: &TodoSort) -> String {
    let column = match sort.field {
        SortField::Title => "title",
        SortField::CreatedAt => "created_at",
        SortField::DueDate => "due_date",
        SortField::Priority => "priority_rank",
    };
    let direction = sort.direction.as_sql();
    format!(" ORDER BY {} {}, id {}", column, direction, direction)
}

/// Todo store backed by an embedded SurrealDB client
pub struct SurrealStore<'a> {
    client: &'a Surreal<Db>,
}

impl<'a> SurrealStore<'a> {
    /// Create a new SurrealStore with the given database client
    pub fn new(client: &'a Surreal<Db>) -> Self {
        Self { client }
    }
}

impl TodoStore for SurrealStore<'_> {
    async fn find(&self, query: &FindQuery) -> DbResult<Vec<Todo>> {
        // SurrealQL limits are i64
        let limit = query
            .limit
            .map(|n| format!(" LIMIT {}", i64::try_from(n).unwrap_or(i64::MAX)))
            .unwrap_or_default();
        let sql = format!(
            "SELECT * FROM {}{}{}{}",
            TABLE,
            where_clause(&query.predicate),
            order_clause(&query.sort),
            limit
        );
        trace!("Query: {}", sql);

        let mut result = bind_predicate(self.client.query(&sql), &query.predicate).await?;
        let rows: Vec<TodoRow> = result.take(0)?;
        debug!("find returned {} rows", rows.len());

        rows.into_iter().map(TodoRow::into_todo).collect()
    }

    async fn count(&self, predicate: &TodoPredicate) -> DbResult<u64> {
        let sql = format!(
            "SELECT count() AS total FROM {}{} GROUP ALL",
            TABLE,
            where_clause(predicate)
        );
        trace!("Query: {}", sql);

        let mut result = bind_predicate(self.client.query(&sql), predicate).await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn group_count(
        &self,
        predicate: &TodoPredicate,
        field: GroupField,
    ) -> DbResult<HashMap<String, u64>> {
        let column = field.column();
        let sql = format!(
            "SELECT {}, count() AS total FROM {}{} GROUP BY {}",
            column,
            TABLE,
            where_clause(predicate),
            column
        );
        trace!("Query: {}", sql);

        let mut result = bind_predicate(self.client.query(&sql), predicate).await?;
        let rows: Vec<GroupRow> = result.take(0)?;
        Ok(rows.into_iter().map(|r| (r.key, r.total)).collect())
    }

    async fn get(&self, id: &TodoId) -> DbResult<Option<Todo>> {
        debug!("Fetching todo: {}", id);
        let row: Option<TodoRow> = self
            .client
            .select((TABLE, id.as_str()))
            .await
            .map_err(|e| DbError::Query(Box::new(e)))?;
        row.map(TodoRow::into_todo).transpose()
    }

    async fn insert(&self, todo: &Todo) -> DbResult<()> {
        debug!("Creating todo: {} with title: {}", todo.id, todo.title);
        self.client
            .query(
                r#"CREATE type::thing("todo", $id) SET
                    title = $title,
                    completed = $completed,
                    priority = $priority,
                    priority_rank = $priority_rank,
                    due_date = $due_date,
                    owner_id = $owner_id,
                    created_at = $created_at"#,
            )
            .bind(("id", todo.id.as_str().to_string()))
            .bind(("title", todo.title.clone()))
            .bind(("completed", todo.completed))
            .bind(("priority", todo.priority.as_str()))
            .bind(("priority_rank", todo.priority.rank()))
            .bind(("due_date", todo.due_date.map(Datetime::from)))
            .bind(("owner_id", todo.owner_id.clone()))
            .bind(("created_at", Datetime::from(todo.created_at)))
            .await?
            .check()?;
        Ok(())
    }

    async fn replace(&self, todo: &Todo) -> DbResult<bool> {
        debug!("Updating todo: {}", todo.id);
        let mut result = self
            .client
            .query(
                r#"UPDATE type::thing("todo", $id) SET
                    title = $title,
                    completed = $completed,
                    priority = $priority,
                    priority_rank = $priority_rank,
                    due_date = $due_date"#,
            )
            .bind(("id", todo.id.as_str().to_string()))
            .bind(("title", todo.title.clone()))
            .bind(("completed", todo.completed))
            .bind(("priority", todo.priority.as_str()))
            .bind(("priority_rank", todo.priority.rank()))
            .bind(("due_date", todo.due_date.map(Datetime::from)))
            .await?;
        let rows: Vec<TodoRow> = result.take(0)?;
        Ok(!rows.is_empty())
    }

    async fn remove(&self, id: &TodoId) -> DbResult<bool> {
        debug!("Deleting todo: {}", id);
        let removed: Option<TodoRow> = self
            .client
            .delete((TABLE, id.as_str()))
            .await
            .map_err(|e| DbError::Query(Box::new(e)))?;
        Ok(removed.is_some())
    }
}

impl CommentStore for SurrealStore<'_> {
    async fn comments_for(&self, todo_id: &TodoId) -> DbResult<Vec<Comment>> {
        let sql = format!(
            "SELECT * FROM {} WHERE todo_id = $todo_id ORDER BY id ASC",
            COMMENT_TABLE
        );
        trace!("Query: {}", sql);

        let mut result = self
            .client
            .query(&sql)
            .bind(("todo_id", todo_id.as_str().to_string()))
            .await?;
        let rows: Vec<CommentRow> = result.take(0)?;
        rows.into_iter().map(CommentRow::into_comment).collect()
    }

    async fn count_comments(&self, todo_id: &TodoId) -> DbResult<u64> {
        let sql = format!(
            "SELECT count() AS total FROM {} WHERE todo_id = $todo_id GROUP ALL",
            COMMENT_TABLE
        );
        let mut result = self
            .client
            .query(&sql)
            .bind(("todo_id", todo_id.as_str().to_string()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn get_comment(&self, id: &CommentId) -> DbResult<Option<Comment>> {
        debug!("Fetching comment: {}", id);
        let row: Option<CommentRow> = self
            .client
            .select((COMMENT_TABLE, id.as_str()))
            .await
            .map_err(|e| DbError::Query(Box::new(e)))?;
        row.map(CommentRow::into_comment).transpose()
    }

    async fn insert_comment(&self, comment: &Comment) -> DbResult<()> {
        debug!("Creating comment: {} on todo: {}", comment.id, comment.todo_id);
        self.client
            .query(
                r#"CREATE type::thing("comment", $id) SET
                    text = $text,
                    todo_id = $todo_id,
                    user_id = $user_id,
                    created_at = $created_at"#,
            )
            .bind(("id", comment.id.as_str().to_string()))
            .bind(("text", comment.text.clone()))
            .bind(("todo_id", comment.todo_id.as_str().to_string()))
            .bind(("user_id", comment.user_id.clone()))
            .bind(("created_at", Datetime::from(comment.created_at)))
            .await?
            .check()?;
        Ok(())
    }

    async fn remove_comment(&self, id: &CommentId) -> DbResult<bool> {
        debug!("Deleting comment: {}", id);
        let removed: Option<CommentRow> = self
            .client
            .delete((COMMENT_TABLE, id.as_str()))
            .await
            .map_err(|e| DbError::Query(Box::new(e)))?;
        Ok(removed.is_some())
    }

    async fn remove_comments_for(&self, todo_id: &TodoId) -> DbResult<u64> {
        debug!("Deleting comments on todo: {}", todo_id);
        let sql = format!(
            "DELETE {} WHERE todo_id = $todo_id RETURN BEFORE",
            COMMENT_TABLE
        );
        let mut result = self
            .client
            .query(&sql)
            .bind(("todo_id", todo_id.as_str().to_string()))
            .await?;
        let rows: Vec<CommentRow> = result.take(0)?;
        Ok(rows.len() as u64)
    }
}
