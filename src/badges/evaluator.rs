//! Badge predicate evaluation
//!
//! A small interpreter over [`BadgeCondition`]: pure functions from week
//! facts to an earned/not-earned verdict. Awarding is the ledger's job.

use crate::domain::WeekFacts;

use super::definitions::{BadgeCondition, BadgeDefinition};

/// Whether the badge's condition holds for the given facts.
pub fn evaluate(badge: &BadgeDefinition, facts: &WeekFacts) -> bool {
    condition_met(badge.condition, facts)
}

fn condition_met(condition: BadgeCondition, facts: &WeekFacts) -> bool {
    match condition {
        BadgeCondition::SessionMinutes(min) => {
            facts.session.is_some_and(|s| s.minutes >= min)
        }
        BadgeCondition::SessionBefore(hour) => {
            facts.session.is_some_and(|s| s.start_hour < hour)
        }
        BadgeCondition::SessionAfter(hour) => {
            facts.session.is_some_and(|s| s.start_hour >= hour)
        }
        BadgeCondition::SessionOn(weekday) => {
            facts.session.is_some_and(|s| s.weekday == weekday)
        }
        BadgeCondition::BooksOnShelf(min) => facts.bookshelf.books_total >= min,
        BadgeCondition::BooksRated(min) => facts.bookshelf.books_rated >= min,
        BadgeCondition::BooksWithNotes(min) => facts.bookshelf.books_with_notes >= min,
        BadgeCondition::BooksInProgress(min) => facts.bookshelf.books_with_progress >= min,
        BadgeCondition::AllBooksAnnotated => facts.bookshelf.all_annotated(),
        BadgeCondition::HasVoted => facts.has_voted,
    }
}
