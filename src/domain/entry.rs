use std::fmt;

use serde::{Deserialize, Serialize};

use super::StudentId;

/// What triggered an XP transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpKind {
    Reading,
    Badge,
    FamilyBattle,
    FamilyBattleMvp,
    ManualAdjustment,
    Voting,
}

impl XpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Badge => "badge",
            Self::FamilyBattle => "family_battle",
            Self::FamilyBattleMvp => "family_battle_mvp",
            Self::ManualAdjustment => "manual_adjustment",
            Self::Voting => "voting",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reading" => Some(Self::Reading),
            "badge" => Some(Self::Badge),
            "family_battle" => Some(Self::FamilyBattle),
            "family_battle_mvp" => Some(Self::FamilyBattleMvp),
            "manual_adjustment" => Some(Self::ManualAdjustment),
            "voting" => Some(Self::Voting),
            _ => None,
        }
    }

    /// Only manual adjustments may carry a negative amount.
    pub fn allows_negative(&self) -> bool {
        matches!(self, Self::ManualAdjustment)
    }
}

impl fmt::Display for XpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied context attached to a ledger entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XpMetadata {
    /// Free-form description shown in history views.
    pub description: String,
    /// Tag identifying the triggering subsystem (e.g. "badge-calendar").
    pub source: Option<String>,
    /// Whether an administrator initiated the transaction.
    pub by_admin: bool,
}

impl XpMetadata {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }
}

/// One immutable ledger entry.
///
/// Entries are never mutated or deleted once written; corrections append a
/// new offsetting entry. `new_total` always equals
/// `previous_total + amount`, and consecutive entries for a student chain:
/// the next entry's `previous_total` is this entry's `new_total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpEntry {
    /// Insertion-ordered row id.
    pub id: i64,
    pub student_id: StudentId,
    pub kind: XpKind,
    /// Signed amount; negative only for manual adjustments.
    pub amount: i64,
    pub previous_total: i64,
    pub new_total: i64,
    /// Season week, set for badge entries.
    pub badge_week: Option<u8>,
    pub description: String,
    pub source: Option<String>,
    pub by_admin: bool,
    /// Timestamp in ms since epoch.
    pub created_at: i64,
}
