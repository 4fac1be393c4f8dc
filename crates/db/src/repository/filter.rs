//! Todo filtering, sorting and cursor pagination
//!
//! Provides a builder-pattern TodoFilter plus TodoSort and Pagination, the
//! QueryPlan they compile into, and TodoLister which runs a plan against a
//! [`TodoStore`] and shapes the result as a connection (edges + page info).

use crate::error::{DbError, DbResult};
use crate::id::TodoId;
use crate::models::{Priority, Todo};
use crate::store::{FindQuery, TodoPredicate, TodoStore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::debug;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Field a todo listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortField {
    Title,
    CreatedAt,
    DueDate,
    Priority,
}

impl SortField {
    /// Returns the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "TITLE",
            SortField::CreatedAt => "CREATED_AT",
            SortField::DueDate => "DUE_DATE",
            SortField::Priority => "PRIORITY",
        }
    }

    /// Parse the exact wire form.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for an unknown sort field.
    pub fn parse(s: &str) -> DbResult<Self> {
        [
            SortField::Title,
            SortField::CreatedAt,
            SortField::DueDate,
            SortField::Priority,
        ]
        .into_iter()
        .find(|f| f.as_str() == s)
        .ok_or_else(|| {
            DbError::invalid(format!(
                "unknown sort field '{}'. Valid values: TITLE, CREATED_AT, DUE_DATE, PRIORITY",
                s
            ))
        })
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortField {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Returns the wire representation, which is also the SQL keyword
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// Parse the exact wire form.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for anything but `ASC` or `DESC`.
    pub fn parse(s: &str) -> DbResult<Self> {
        match s {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(DbError::invalid(format!(
                "unknown sort direction '{}'. Valid values: ASC, DESC",
                s
            ))),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

impl FromStr for SortDirection {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A single sort key and direction. Defaults to CREATED_AT DESC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for TodoSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl TodoSort {
    /// Create a sort on `field` in `direction`
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Total order over todos for this sort.
    ///
    /// Ties on the sort key fall back to id, in the same direction, so a
    /// sort is always deterministic. Priority compares by severity and a
    /// missing due date sorts before any date.
    pub fn compare(&self, a: &Todo, b: &Todo) -> Ordering {
        let primary = match self.field {
            SortField::Title => a.title.cmp(&b.title),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
        };
        let ordering = primary.then_with(|| a.id.cmp(&b.id));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Filter criteria for listing todos
///
/// Every field is optional; present fields are combined with AND
/// semantics and absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TodoFilter {
    /// Filter by completion flag
    pub completed: Option<bool>,
    /// Filter by priority
    pub priority: Option<Priority>,
    /// Filter by owner
    pub owner_id: Option<String>,
    /// Case-insensitive substring of the title
    pub search: Option<String>,
}

impl TodoFilter {
    /// Create a new empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by completion flag
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Filter by priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Filter by owner
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Filter by title substring
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Compile into a store predicate.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` if an owner is given but blank.
    pub fn to_predicate(&self) -> DbResult<TodoPredicate> {
        let mut predicate = TodoPredicate::all();
        predicate.completed = self.completed;
        predicate.priority = self.priority;
        if let Some(owner_id) = &self.owner_id {
            predicate.owner_id = Some(require_owner(owner_id)?.to_string());
        }
        predicate.title_contains = self.search.clone();
        Ok(predicate)
    }
}

/// Reject a present-but-blank owner reference instead of dropping it
pub(crate) fn require_owner(owner_id: &str) -> DbResult<&str> {
    if owner_id.trim().is_empty() {
        Err(DbError::invalid("ownerId cannot be blank"))
    } else {
        Ok(owner_id)
    }
}

/// Forward pagination window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Pagination {
    /// Page size, [`DEFAULT_PAGE_SIZE`] when omitted
    pub first: Option<usize>,
    /// Cursor of the last record already seen
    pub after: Option<String>,
}

impl Pagination {
    /// Window of `first` records from the start
    pub fn first(first: usize) -> Self {
        Self {
            first: Some(first),
            after: None,
        }
    }

    /// Continue after `cursor`
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Effective page size
    pub fn page_size(&self) -> usize {
        self.first.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Validated, store-ready form of a filter + sort + pagination request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    /// Predicate for the total count, without the cursor restriction
    pub count_predicate: TodoPredicate,
    /// Page fetch: filter plus cursor, sorted, one extra record
    pub fetch: FindQuery,
    /// Requested page size
    pub first: usize,
    /// Parsed cursor, if one was supplied
    pub after: Option<TodoId>,
}

impl QueryPlan {
    /// Build a plan.
    ///
    /// The cursor restricts by insertion order (id), not by the active sort
    /// key, so pages only line up exactly under the default creation-order
    /// sort.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for a blank owner filter or a
    /// malformed cursor.
    pub fn build(
        filter: &TodoFilter,
        sort: Option<&TodoSort>,
        pagination: &Pagination,
    ) -> DbResult<Self> {
        let count_predicate = filter.to_predicate()?;
        let sort = sort.copied().unwrap_or_default();
        let first = pagination.page_size();

        let after = pagination
            .after
            .as_deref()
            .map(|cursor| {
                TodoId::parse(cursor)
                    .map_err(|_| DbError::invalid(format!("malformed cursor '{}'", cursor)))
            })
            .transpose()?;

        if after.is_some() && sort != TodoSort::default() {
            debug!(
                "cursor combined with {} {} sort; cursor still follows insertion order",
                sort.field, sort.direction
            );
        }

        let mut fetch_predicate = count_predicate.clone();
        fetch_predicate.id_after = after.clone();

        Ok(Self {
            count_predicate,
            fetch: FindQuery {
                predicate: fetch_predicate,
                sort,
                limit: Some(first.saturating_add(1)),
            },
            first,
            after,
        })
    }
}

/// A record together with its cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoEdge {
    pub node: Todo,
    pub cursor: String,
}

/// Page metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// More records exist past this page for the filter and cursor
    pub has_next_page: bool,
    /// A cursor was supplied; not a check that earlier records exist
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// One page of todos
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoConnection {
    pub edges: Vec<TodoEdge>,
    pub page_info: PageInfo,
    /// Records matching the filter, ignoring pagination
    pub total_count: u64,
}

impl TodoConnection {
    /// Iterate over the records of this page
    pub fn nodes(&self) -> impl Iterator<Item = &Todo> {
        self.edges.iter().map(|e| &e.node)
    }
}

/// Runs todo queries against a store
///
/// Stateless: every call is an independent read of the store.
pub struct TodoLister<'a, S> {
    store: &'a S,
}

impl<'a, S: TodoStore> TodoLister<'a, S> {
    /// Create a new TodoLister over the given store
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Query one page of todos.
    ///
    /// The total count and the page fetch are two separate store reads; a
    /// write landing between them can make `total_count` disagree with the
    /// page.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for invalid input and propagates
    /// store failures unchanged.
    pub async fn query_todos(
        &self,
        filter: &TodoFilter,
        sort: Option<&TodoSort>,
        pagination: &Pagination,
    ) -> DbResult<TodoConnection> {
        let plan = QueryPlan::build(filter, sort, pagination)?;
        self.execute(&plan).await
    }

    /// Run a prepared plan
    pub async fn execute(&self, plan: &QueryPlan) -> DbResult<TodoConnection> {
        let total_count = self.store.count(&plan.count_predicate).await?;

        let mut todos = self.store.find(&plan.fetch).await?;
        let has_next_page = todos.len() > plan.first;
        todos.truncate(plan.first);

        debug!(
            "todo query matched {} records, returning {} (has_next_page={})",
            total_count,
            todos.len(),
            has_next_page
        );

        let edges: Vec<TodoEdge> = todos
            .into_iter()
            .map(|node| TodoEdge {
                cursor: node.id.to_string(),
                node,
            })
            .collect();

        let page_info = PageInfo {
            has_next_page,
            has_previous_page: plan.after.is_some(),
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
        };

        Ok(TodoConnection {
            edges,
            page_info,
            total_count,
        })
    }
}
