//! Data models for todoql
//!
//! Defines the todo record, its priority enumeration, comments, and the
//! input types used to create and update records.

use crate::error::{DbError, DbResult};
use crate::id::{CommentId, TodoId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Todo priority
///
/// A closed enumeration; the wire form is the uppercase name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Every priority in enumeration order
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// Returns the string representation used on the wire and in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    /// Severity rank, 0 for LOW up to 3 for URGENT
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Medium => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }

    /// Parse the exact wire form.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for any other string.
    pub fn parse(s: &str) -> DbResult<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                DbError::invalid(format!(
                    "invalid priority '{}'. Valid values: LOW, MEDIUM, HIGH, URGENT",
                    s
                ))
            })
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A todo record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Identifier, ordered by insertion
    pub id: TodoId,

    /// Todo title
    pub title: String,

    /// Whether the todo is done
    pub completed: bool,

    /// Priority, MEDIUM unless chosen otherwise
    pub priority: Priority,

    /// Optional due date
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,

    /// Identifier of the owning user
    pub owner_id: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// Whether this todo is overdue at `now`.
    ///
    /// Overdue means not completed, with a due date strictly before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }

    /// Apply a partial update in place. Id and owner never change.
    pub fn apply(&mut self, update: &TodoUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            self.due_date = due_date;
        }
    }
}

/// Input for creating a todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewTodo {
    /// Title, must not be blank
    pub title: String,
    /// Owning user, must not be blank
    pub owner_id: String,
    /// Priority (MEDIUM when omitted)
    #[serde(default)]
    pub priority: Priority,
    /// Optional due date
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTodo {
    /// Create input with the default priority and no due date
    pub fn new(title: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            owner_id: owner_id.into(),
            priority: Priority::default(),
            due_date: None,
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` if the title or owner is blank.
    pub fn validate(&self) -> DbResult<()> {
        if self.title.trim().is_empty() {
            return Err(DbError::invalid("title required"));
        }
        if self.owner_id.trim().is_empty() {
            return Err(DbError::invalid("owner id required"));
        }
        Ok(())
    }
}

/// Partial update for a todo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoUpdate {
    /// New title (if Some)
    pub title: Option<String>,
    /// New completion flag (if Some)
    pub completed: Option<bool>,
    /// New priority (if Some)
    pub priority: Option<Priority>,
    /// `Some(None)` clears the due date, `Some(Some(d))` sets it
    pub due_date: Option<Option<DateTime<Utc>>>,
}

impl TodoUpdate {
    /// Create a new empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the completion flag
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Set a new priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(Some(due_date));
        self
    }

    /// Clear the due date
    pub fn clear_due_date(mut self) -> Self {
        self.due_date = Some(None);
        self
    }

    /// Check if any updates are specified
    pub fn has_updates(&self) -> bool {
        self.title.is_some()
            || self.completed.is_some()
            || self.priority.is_some()
            || self.due_date.is_some()
    }

    /// Check field values.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` if a new title is blank.
    pub fn validate(&self) -> DbResult<()> {
        if self.title.as_ref().is_some_and(|t| t.trim().is_empty()) {
            return Err(DbError::invalid("title cannot be blank"));
        }
        Ok(())
    }
}

/// A comment attached to a todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub todo_id: TodoId,
    /// Identifier of the commenting user
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewComment {
    /// Target todo, as the wire id
    pub todo_id: String,
    pub user_id: String,
    pub text: String,
}

impl NewComment {
    pub fn new(
        todo_id: impl Into<String>,
        user_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            todo_id: todo_id.into(),
            user_id: user_id.into(),
            text: text.into(),
        }
    }

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` if the text or user is blank.
    pub fn validate(&self) -> DbResult<()> {
        if self.text.trim().is_empty() {
            return Err(DbError::invalid("comment text required"));
        }
        if self.user_id.trim().is_empty() {
            return Err(DbError::invalid("user id required"));
        }
        Ok(())
    }
}
