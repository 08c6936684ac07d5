use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque student identifier, assigned by the external identity/profile store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Aggregate projection of one student's XP state.
///
/// `total_xp` is a denormalized cache of the history sum and must always be
/// derivable from the ledger; `level` and `weekly_xp` are derived caches that
/// are safe to discard and recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentXp {
    pub student_id: StudentId,
    pub total_xp: i64,
    /// Rolling sum of XP granted in the trailing seven days (non-authoritative).
    pub weekly_xp: i64,
    pub level: u32,
    /// Timestamp (ms since epoch) of the most recent ledger append.
    pub last_xp_update: Option<i64>,
}

impl StudentXp {
    /// Zeroed aggregate for a student that has no ledger activity yet.
    pub fn empty(student_id: StudentId) -> Self {
        Self {
            student_id,
            total_xp: 0,
            weekly_xp: 0,
            level: 1,
            last_xp_update: None,
        }
    }
}
