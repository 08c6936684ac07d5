//! Shared helpers for ledger integration tests

use readquest::domain::{StudentId, XpKind};
use readquest::ledger::{AwardRequest, FixtureSources, XpLedger};
use tempfile::TempDir;

/// Open a fresh ledger backed by a scratch database.
pub fn open_ledger() -> (XpLedger, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let ledger = XpLedger::open(&dir.path().join("ledger.db")).expect("Failed to open ledger");
    (ledger, dir)
}

/// Shorthand for a reading-session award.
#[allow(dead_code)]
pub fn reading(student: &str, amount: i64) -> AwardRequest {
    AwardRequest::new(StudentId::from(student), amount, XpKind::Reading)
}

#[allow(dead_code)]
pub fn adjustment(student: &str, amount: i64) -> AwardRequest {
    AwardRequest::new(StudentId::from(student), amount, XpKind::ManualAdjustment)
}

/// Sources where every store answers and sums to the given parts.
#[allow(dead_code)]
pub fn sources(reading_minutes: u64, family_battle_xp: i64, has_voted: bool) -> FixtureSources {
    FixtureSources {
        reading_minutes: Some(reading_minutes),
        family_battle_xp: Some(family_battle_xp),
        has_voted: Some(has_voted),
    }
}
