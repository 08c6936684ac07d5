//! ReadQuest - engagement core for a school reading program
//!
//! ReadQuest tracks the experience points a student earns through reading
//! sessions, weekly badges, family battles, and voting. The crate is built
//! around an accounting invariant: the stored per-student total always
//! equals the sum of an append-only XP history, and every mutation happens
//! inside one atomic award transaction.
//!
//! ## Subsystems
//!
//! 1. **Ledger** ([`ledger`]): the award engine (single writer), read
//!    queries, reconciliation against independent sources, and audit
//!    reports, persisted in SQLite.
//!
//! 2. **Badges** ([`badges`]): the static 39-week badge calendar, the season
//!    week computation, predicate evaluation, and the XP level table. Pure,
//!    no side effects.

pub mod badges;
pub mod config;
pub mod domain;
pub mod ledger;

pub use domain::*;
