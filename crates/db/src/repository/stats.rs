//! Todo statistics
//!
//! Summarizes a (possibly owner-scoped) set of todos into totals,
//! completion and overdue counts, and a per-priority breakdown. Also counts
//! todos per owner.

use super::filter::require_owner;
use crate::error::DbResult;
use crate::models::{Priority, Todo};
use crate::store::{FindQuery, GroupField, TodoPredicate, TodoStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Number of todos with one priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: u64,
}

/// Number of todos held by one owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerCount {
    pub owner_id: String,
    pub count: u64,
}

/// Aggregate counts over a set of todos
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoStats {
    pub total: u64,
    pub completed: u64,
    /// Always `total - completed`
    pub pending: u64,
    pub overdue: u64,
    /// One entry per priority, LOW through URGENT, zeros included
    pub by_priority: Vec<PriorityCount>,
}

impl TodoStats {
    /// Count for a single priority
    pub fn count_for(&self, priority: Priority) -> u64 {
        self.by_priority
            .iter()
            .find(|pc| pc.priority == priority)
            .map(|pc| pc.count)
            .unwrap_or(0)
    }
}

/// Computes [`TodoStats`] from a store
pub struct StatsAggregator<'a, S> {
    store: &'a S,
}

impl<'a, S: TodoStore> StatsAggregator<'a, S> {
    /// Create a new StatsAggregator over the given store
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Statistics for one owner, or for every todo when `owner_id` is `None`,
    /// with overdue evaluated against the current instant.
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` for a blank owner id and propagates
    /// store failures unchanged.
    pub async fn todo_stats(&self, owner_id: Option<&str>) -> DbResult<TodoStats> {
        self.todo_stats_at(owner_id, Utc::now()).await
    }

    /// Same as [`Self::todo_stats`] with an explicit evaluation instant.
    ///
    /// The record scan and the priority grouping are separate store reads
    /// issued concurrently.
    pub async fn todo_stats_at(
        &self,
        owner_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<TodoStats> {
        let mut predicate = TodoPredicate::all();
        if let Some(owner_id) = owner_id {
            predicate.owner_id = Some(require_owner(owner_id)?.to_string());
        }

        let scan = FindQuery {
            predicate: predicate.clone(),
            sort: Default::default(),
            limit: None,
        };
        let (todos, groups) = tokio::try_join!(
            self.store.find(&scan),
            self.store.group_count(&predicate, GroupField::Priority),
        )?;

        let (total, completed, overdue) = tally(&todos, now);

        let by_priority = Priority::ALL
            .into_iter()
            .map(|priority| PriorityCount {
                priority,
                count: groups.get(priority.as_str()).copied().unwrap_or(0),
            })
            .collect();

        debug!(
            "todo stats for {}: total={} completed={} overdue={}",
            owner_id.unwrap_or("all owners"),
            total,
            completed,
            overdue
        );

        Ok(TodoStats {
            total,
            completed,
            pending: total - completed,
            overdue,
            by_priority,
        })
    }

    /// Todo count per owner, ordered by owner id.
    ///
    /// `completed` restricts the count to done or pending todos. Owners with
    /// no matching todos are absent.
    pub async fn owner_counts(&self, completed: Option<bool>) -> DbResult<Vec<OwnerCount>> {
        let mut predicate = TodoPredicate::all();
        predicate.completed = completed;

        let groups = self.store.group_count(&predicate, GroupField::Owner).await?;
        let mut counts: Vec<OwnerCount> = groups
            .into_iter()
            .map(|(owner_id, count)| OwnerCount { owner_id, count })
            .collect();
        counts.sort_by(|a, b| a.owner_id.cmp(&b.owner_id));

        debug!("owner counts cover {} owners", counts.len());
        Ok(counts)
    }
}

/// Single pass over the scoped records: (total, completed, overdue)
fn tally(todos: &[Todo], now: DateTime<Utc>) -> (u64, u64, u64) {
    todos.iter().fold((0, 0, 0), |(total, completed, overdue), t| {
        (
            total + 1,
            completed + u64::from(t.completed),
            overdue + u64::from(t.is_overdue(now)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::error::DbError;
    use crate::id::TodoId;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn todo(
        raw_id: u64,
        completed: bool,
        priority: Priority,
        owner: &str,
        due_day: Option<u32>,
    ) -> Todo {
        Todo {
            id: TodoId::from_raw(raw_id),
            title: format!("todo {}", raw_id),
            completed,
            priority,
            due_date: due_day.map(|d| Utc.with_ymd_and_hms(2024, 12, d, 0, 0, 0).unwrap()),
            owner_id: owner.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap(),
        }
    }

    fn seeded_store() -> MemoryStore {
        MemoryStore::with_todos([
            todo(1, false, Priority::High, "john", Some(20)),
            todo(2, true, Priority::Medium, "john", Some(18)),
            todo(3, false, Priority::Low, "jane", Some(25)),
            todo(4, false, Priority::High, "jane", Some(16)),
        ])
    }

    fn at_day(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_stats_over_whole_collection() {
        let store = seeded_store();
        let stats = StatsAggregator::new(&store)
            .todo_stats_at(None, at_day(1))
            .await
            .unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 3);
        assert_eq!(stats.overdue, 0);
        assert_eq!(
            stats.by_priority,
            vec![
                PriorityCount { priority: Priority::Low, count: 1 },
                PriorityCount { priority: Priority::Medium, count: 1 },
                PriorityCount { priority: Priority::High, count: 2 },
                PriorityCount { priority: Priority::Urgent, count: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_stats_scoped_to_owner() {
        let store = seeded_store();
        let stats = StatsAggregator::new(&store)
            .todo_stats_at(Some("jane"), at_day(1))
            .await
            .unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.count_for(Priority::Low), 1);
        assert_eq!(stats.count_for(Priority::High), 1);
        assert_eq!(stats.count_for(Priority::Medium), 0);
    }

    #[tokio::test]
    async fn test_overdue_ignores_completed_and_undated() {
        let store = MemoryStore::with_todos([
            todo(1, false, Priority::Low, "u", Some(10)),
            todo(2, true, Priority::Low, "u", Some(10)),
            todo(3, false, Priority::Low, "u", None),
            todo(4, false, Priority::Low, "u", Some(30)),
        ]);
        let stats = StatsAggregator::new(&store)
            .todo_stats_at(None, at_day(20))
            .await
            .unwrap();
        assert_eq!(stats.overdue, 1);
    }

    #[tokio::test]
    async fn test_overdue_moves_with_evaluation_time() {
        let store = seeded_store();
        let aggregator = StatsAggregator::new(&store);
        // Due dates: 20 (open), 18 (done), 25 (open), 16 (open)
        assert_eq!(aggregator.todo_stats_at(None, at_day(17)).await.unwrap().overdue, 1);
        assert_eq!(aggregator.todo_stats_at(None, at_day(21)).await.unwrap().overdue, 2);
        assert_eq!(aggregator.todo_stats_at(None, at_day(31)).await.unwrap().overdue, 3);
    }

    #[tokio::test]
    async fn test_empty_store_lists_every_priority() {
        let store = MemoryStore::new();
        let stats = StatsAggregator::new(&store).todo_stats(None).await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.pending, 0);
        let priorities: Vec<Priority> = stats.by_priority.iter().map(|pc| pc.priority).collect();
        assert_eq!(priorities, Priority::ALL.to_vec());
        assert!(stats.by_priority.iter().all(|pc| pc.count == 0));
    }

    #[tokio::test]
    async fn test_invariants_hold() {
        let store = MemoryStore::with_todos((1..=20).map(|i| {
            todo(
                i,
                i % 3 == 0,
                Priority::ALL[(i % 4) as usize],
                if i % 2 == 0 { "a" } else { "b" },
                Some((i % 28 + 1) as u32),
            )
        }));
        for owner in [None, Some("a"), Some("b")] {
            let stats = StatsAggregator::new(&store)
                .todo_stats_at(owner, at_day(15))
                .await
                .unwrap();
            assert_eq!(stats.total, stats.completed + stats.pending);
            assert_eq!(stats.by_priority.len(), 4);
            let sum: u64 = stats.by_priority.iter().map(|pc| pc.count).sum();
            assert_eq!(sum, stats.total);
            assert!(stats.overdue <= stats.pending);
        }
    }

    #[tokio::test]
    async fn test_blank_owner_is_rejected() {
        let store = seeded_store();
        let err = StatsAggregator::new(&store)
            .todo_stats(Some(""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_owner_counts() {
        let store = seeded_store();
        let aggregator = StatsAggregator::new(&store);

        let all = aggregator.owner_counts(None).await.unwrap();
        assert_eq!(
            all,
            vec![
                OwnerCount { owner_id: "jane".to_string(), count: 2 },
                OwnerCount { owner_id: "john".to_string(), count: 2 },
            ]
        );

        let done = aggregator.owner_counts(Some(true)).await.unwrap();
        assert_eq!(done, vec![OwnerCount { owner_id: "john".to_string(), count: 1 }]);

        let empty = MemoryStore::new();
        assert!(StatsAggregator::new(&empty).owner_counts(None).await.unwrap().is_empty());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = TodoStats {
            total: 1,
            completed: 0,
            pending: 1,
            overdue: 0,
            by_priority: vec![PriorityCount {
                priority: Priority::Urgent,
                count: 1,
            }],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["byPriority"][0]["priority"], "URGENT");
        assert_eq!(json["byPriority"][0]["count"], 1);
        assert_eq!(json["pending"], 1);
    }

    /// Store that answers scans but fails grouping
    struct GroupFailingStore(MemoryStore);

    impl TodoStore for GroupFailingStore {
        async fn find(&self, query: &FindQuery) -> DbResult<Vec<Todo>> {
            self.0.find(query).await
        }

        async fn count(&self, predicate: &TodoPredicate) -> DbResult<u64> {
            self.0.count(predicate).await
        }

        async fn group_count(
            &self,
            _predicate: &TodoPredicate,
            _field: GroupField,
        ) -> DbResult<HashMap<String, u64>> {
            Err(DbError::Unavailable {
                message: "aggregate pipeline failed".to_string(),
            })
        }

        async fn get(&self, id: &TodoId) -> DbResult<Option<Todo>> {
            self.0.get(id).await
        }

        async fn insert(&self, todo: &Todo) -> DbResult<()> {
            self.0.insert(todo).await
        }

        async fn replace(&self, todo: &Todo) -> DbResult<bool> {
            self.0.replace(todo).await
        }

        async fn remove(&self, id: &TodoId) -> DbResult<bool> {
            self.0.remove(id).await
        }
    }

    #[tokio::test]
    async fn test_grouping_failure_propagates() {
        let store = GroupFailingStore(seeded_store());
        let err = StatsAggregator::new(&store)
            .todo_stats(None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);

        let err = StatsAggregator::new(&store)
            .owner_counts(None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }
}
