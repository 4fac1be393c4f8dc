//! Repository modules for todo operations
//!
//! Query building and pagination, statistics aggregation, todo CRUD and
//! comments, each written against the [`crate::store`] traits.

mod comment;
mod filter;
mod stats;
mod todo;

pub use comment::CommentRepository;
pub use filter::{
    DEFAULT_PAGE_SIZE, PageInfo, Pagination, QueryPlan, SortDirection, SortField, TodoConnection,
    TodoEdge, TodoFilter, TodoLister, TodoSort,
};
pub use stats::{OwnerCount, PriorityCount, StatsAggregator, TodoStats};
pub use todo::TodoRepository;
