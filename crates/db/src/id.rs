//! Record identifiers
//!
//! Todos and comments share one identifier format. Todo ids double as
//! pagination cursors, so their string order must
//! follow insertion order. An id is the 16-digit lowercase hex rendering of
//! `(unix_millis << 20) | sequence`; fixed width keeps lexicographic and
//! numeric order identical.

use crate::error::{DbError, DbResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of low bits reserved for the per-millisecond sequence
const SEQUENCE_BITS: u32 = 20;

/// Opaque, totally ordered record identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

/// Identifier of a todo
pub type TodoId = RecordId;

/// Identifier of a comment
pub type CommentId = RecordId;

impl RecordId {
    /// Length of every well-formed identifier
    pub const LEN: usize = 16;

    /// Parse an identifier, rejecting anything that was not produced by
    /// [`IdGenerator`].
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidArgument` if `s` is not 16 lowercase hex digits.
    pub fn parse(s: &str) -> DbResult<Self> {
        let well_formed = s.len() == Self::LEN
            && s.bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if well_formed {
            Ok(Self(s.to_string()))
        } else {
            Err(DbError::invalid(format!("malformed id '{}'", s)))
        }
    }

    /// Build an identifier from its raw numeric value
    pub fn from_raw(value: u64) -> Self {
        Self(format!("{:016x}", value))
    }

    /// Returns the string form used on the wire and as the record key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = DbError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// Generates strictly increasing identifiers.
///
/// The next id is never smaller than the current wall clock allows and
/// always greater than the previous one, so a stalled or stepped-back clock
/// only advances the sequence bits.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Create a generator with no history
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// Generate the next identifier from the current wall clock
    pub fn next_id(&self) -> RecordId {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&self, unix_millis: i64) -> RecordId {
        let floor = u64::try_from(unix_millis).unwrap_or(0) << SEQUENCE_BITS;
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = floor.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return RecordId::from_raw(candidate),
                Err(actual) => current = actual,
            }
        }
    }
}

static GENERATOR: IdGenerator = IdGenerator::new();

/// Next todo identifier from the process-wide generator
pub fn next_todo_id() -> TodoId {
    GENERATOR.next_id()
}

/// Next comment identifier from the process-wide generator
pub fn next_comment_id() -> CommentId {
    GENERATOR.next_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_generated_ids() {
        let id = next_todo_id();
        assert_eq!(id.as_str().len(), TodoId::LEN);
        assert_eq!(TodoId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "abc", "0000018F00000001", "0000018f0000000g", "0000018f000000011"] {
            let err = TodoId::parse(bad).unwrap_err();
            assert!(
                err.to_string().contains("malformed id"),
                "unexpected error for {:?}: {}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_todo_and_comment_ids_share_one_sequence() {
        let todo = next_todo_id();
        let comment = next_comment_id();
        let next = next_todo_id();
        assert!(todo < comment && comment < next);
    }

    #[test]
    fn test_ids_increase_within_same_millisecond() {
        let generator = IdGenerator::new();
        let a = generator.next_at(1_700_000_000_000);
        let b = generator.next_at(1_700_000_000_000);
        let c = generator.next_at(1_700_000_000_000);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_ids_increase_when_clock_steps_back() {
        let generator = IdGenerator::new();
        let later = generator.next_at(1_700_000_000_500);
        let earlier_clock = generator.next_at(1_700_000_000_000);
        assert!(earlier_clock > later);
    }

    #[test]
    fn test_string_order_matches_numeric_order() {
        let small = TodoId::from_raw(0xff);
        let large = TodoId::from_raw(0x100);
        assert!(small < large);
        assert!(small.as_str() < large.as_str());
    }

    #[test]
    fn test_serde_rejects_malformed() {
        let ok: TodoId = serde_json::from_str("\"0000018f00000001\"").unwrap();
        assert_eq!(ok.as_str(), "0000018f00000001");
        assert!(serde_json::from_str::<TodoId>("\"not-an-id\"").is_err());
    }
}
