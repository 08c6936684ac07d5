//! Core domain types for ReadQuest

mod entry;
mod facts;
mod student;

pub use entry::{XpEntry, XpKind, XpMetadata};
pub use facts::{BookshelfFacts, SessionFacts, WeekFacts};
pub use student::{StudentId, StudentXp};
