//! Weekly badge calendar definitions
//!
//! One badge per season week, defined as static data. Unlock conditions are
//! a closed set of predicate kinds ([`BadgeCondition`]) interpreted by the
//! evaluator, so new badges are data rather than code branches.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Which collaborator supplies the facts a badge is judged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTrigger {
    /// Judged against a single reading session.
    Timer,
    /// Judged against cumulative bookshelf state.
    Content,
    /// Judged against the yearly voting record.
    Voting,
}

impl BadgeTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timer => "timer",
            Self::Content => "content",
            Self::Voting => "voting",
        }
    }
}

/// Completion predicate for a badge, evaluated over [`crate::domain::WeekFacts`].
///
/// Count predicates are "at least N"; re-triggering after the first unlock is
/// harmless because badge issuance is idempotent per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeCondition {
    /// A session of at least this many minutes.
    SessionMinutes(u32),
    /// A session that started before this local hour.
    SessionBefore(u32),
    /// A session that started at or after this local hour.
    SessionAfter(u32),
    /// A session on the given weekday.
    SessionOn(Weekday),
    /// At least this many books on the shelf.
    BooksOnShelf(u32),
    /// At least this many rated books.
    BooksRated(u32),
    /// At least this many books with notes.
    BooksWithNotes(u32),
    /// At least this many books with reading progress.
    BooksInProgress(u32),
    /// Every book on the shelf carries a note.
    AllBooksAnnotated,
    /// This year's book vote has been cast.
    HasVoted,
}

/// Static definition of one weekly badge.
#[derive(Debug, Clone, Copy)]
pub struct BadgeDefinition {
    /// Season week (1-39), unique across the calendar.
    pub week: u8,
    pub name: &'static str,
    pub description: &'static str,
    /// XP granted on unlock; always positive.
    pub xp: i64,
    pub trigger: BadgeTrigger,
    pub condition: BadgeCondition,
}

/// The full season calendar, sorted by week.
pub static BADGES: &[BadgeDefinition] = &[
    BadgeDefinition {
        week: 1,
        name: "First Steps",
        description: "Finish a reading session of at least 10 minutes",
        xp: 25,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionMinutes(10),
    },
    BadgeDefinition {
        week: 2,
        name: "Shelf Starter",
        description: "Put your first book on the shelf",
        xp: 25,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksOnShelf(1),
    },
    BadgeDefinition {
        week: 3,
        name: "Quarter Hour",
        description: "Read for 15 minutes in one sitting",
        xp: 30,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionMinutes(15),
    },
    BadgeDefinition {
        week: 4,
        name: "First Impressions",
        description: "Rate a book on your shelf",
        xp: 30,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksRated(1),
    },
    BadgeDefinition {
        week: 5,
        name: "Early Bird",
        description: "Start a session before 9 in the morning",
        xp: 40,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionBefore(9),
    },
    BadgeDefinition {
        week: 6,
        name: "Margin Notes",
        description: "Write a note about a book",
        xp: 30,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksWithNotes(1),
    },
    BadgeDefinition {
        week: 7,
        name: "Weekend Reader",
        description: "Read on a Saturday",
        xp: 35,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionOn(Weekday::Sat),
    },
    BadgeDefinition {
        week: 8,
        name: "Half Hour Hero",
        description: "Read for 30 minutes in one sitting",
        xp: 50,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionMinutes(30),
    },
    BadgeDefinition {
        week: 9,
        name: "Bookmark Keeper",
        description: "Track your progress in a book",
        xp: 30,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksInProgress(1),
    },
    BadgeDefinition {
        week: 10,
        name: "Night Owl",
        description: "Start a session after 7 in the evening",
        xp: 40,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionAfter(19),
    },
    BadgeDefinition {
        week: 11,
        name: "Growing Shelf",
        description: "Collect three books on your shelf",
        xp: 40,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksOnShelf(3),
    },
    BadgeDefinition {
        week: 12,
        name: "Sunday Stories",
        description: "Read on a Sunday",
        xp: 35,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionOn(Weekday::Sun),
    },
    BadgeDefinition {
        week: 13,
        name: "Critic's Eye",
        description: "Rate three books",
        xp: 45,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksRated(3),
    },
    BadgeDefinition {
        week: 14,
        name: "Deep Dive",
        description: "Read for 45 minutes in one sitting",
        xp: 60,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionMinutes(45),
    },
    BadgeDefinition {
        week: 15,
        name: "Note Taker",
        description: "Write notes for three books",
        xp: 45,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksWithNotes(3),
    },
    BadgeDefinition {
        week: 16,
        name: "Dawn Chapter",
        description: "Start a session before 8 in the morning",
        xp: 50,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionBefore(8),
    },
    BadgeDefinition {
        week: 17,
        name: "Shelf Collector",
        description: "Collect five books on your shelf",
        xp: 50,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksOnShelf(5),
    },
    BadgeDefinition {
        week: 18,
        name: "Midweek Escape",
        description: "Read on a Wednesday",
        xp: 35,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionOn(Weekday::Wed),
    },
    BadgeDefinition {
        week: 19,
        name: "Advent Reader",
        description: "Read for 20 minutes in one sitting",
        xp: 40,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionMinutes(20),
    },
    BadgeDefinition {
        week: 20,
        name: "Winter Librarian",
        description: "Have three books in progress",
        xp: 45,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksInProgress(3),
    },
    BadgeDefinition {
        week: 21,
        name: "New Year Pages",
        description: "Read for 30 minutes in one sitting",
        xp: 50,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionMinutes(30),
    },
    BadgeDefinition {
        week: 22,
        name: "Star Reviewer",
        description: "Rate five books",
        xp: 55,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksRated(5),
    },
    BadgeDefinition {
        week: 23,
        name: "Frost Morning",
        description: "Start a session before 9 in the morning",
        xp: 45,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionBefore(9),
    },
    BadgeDefinition {
        week: 24,
        name: "Annotation Apprentice",
        description: "Write notes for five books",
        xp: 55,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksWithNotes(5),
    },
    BadgeDefinition {
        week: 25,
        name: "Ballot Opener",
        description: "Cast your vote for this year's book award",
        xp: 75,
        trigger: BadgeTrigger::Voting,
        condition: BadgeCondition::HasVoted,
    },
    BadgeDefinition {
        week: 26,
        name: "Candlelight Hour",
        description: "Start a session after 6 in the evening",
        xp: 45,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionAfter(18),
    },
    BadgeDefinition {
        week: 27,
        name: "Seven Shelf",
        description: "Collect seven books on your shelf",
        xp: 60,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksOnShelf(7),
    },
    BadgeDefinition {
        week: 28,
        name: "Marathon Reader",
        description: "Read for a full hour in one sitting",
        xp: 75,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionMinutes(60),
    },
    BadgeDefinition {
        week: 29,
        name: "Progress Tracker",
        description: "Have five books in progress",
        xp: 55,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksInProgress(5),
    },
    BadgeDefinition {
        week: 30,
        name: "Saturday Saga",
        description: "Read on a Saturday",
        xp: 40,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionOn(Weekday::Sat),
    },
    BadgeDefinition {
        week: 31,
        name: "Full Margins",
        description: "Have a note on every book on your shelf",
        xp: 80,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::AllBooksAnnotated,
    },
    BadgeDefinition {
        week: 32,
        name: "Voice Heard",
        description: "Make sure your book-award vote is in",
        xp: 50,
        trigger: BadgeTrigger::Voting,
        condition: BadgeCondition::HasVoted,
    },
    BadgeDefinition {
        week: 33,
        name: "Spring Sprint",
        description: "Read for 40 minutes in one sitting",
        xp: 55,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionMinutes(40),
    },
    BadgeDefinition {
        week: 34,
        name: "Critic Laureate",
        description: "Rate eight books",
        xp: 65,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksRated(8),
    },
    BadgeDefinition {
        week: 35,
        name: "Early Riser",
        description: "Start a session before 7 in the morning",
        xp: 60,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionBefore(7),
    },
    BadgeDefinition {
        week: 36,
        name: "Ten Shelf",
        description: "Collect ten books on your shelf",
        xp: 75,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksOnShelf(10),
    },
    BadgeDefinition {
        week: 37,
        name: "Twilight Tales",
        description: "Start a session after 8 in the evening",
        xp: 50,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionAfter(20),
    },
    BadgeDefinition {
        week: 38,
        name: "Season Scribe",
        description: "Write notes for ten books",
        xp: 70,
        trigger: BadgeTrigger::Content,
        condition: BadgeCondition::BooksWithNotes(10),
    },
    BadgeDefinition {
        week: 39,
        name: "Grand Finale",
        description: "Read for 90 minutes in one sitting",
        xp: 100,
        trigger: BadgeTrigger::Timer,
        condition: BadgeCondition::SessionMinutes(90),
    },
];

impl BadgeDefinition {
    /// Badge for a season week, if the week is inside the calendar.
    pub fn for_week(week: u8) -> Option<&'static BadgeDefinition> {
        BADGES.iter().find(|b| b.week == week)
    }

    pub fn total_count() -> usize {
        BADGES.len()
    }

    /// Total XP available from the full calendar.
    pub fn total_xp() -> i64 {
        BADGES.iter().map(|b| b.xp).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::calendar::SEASON_WEEKS;

    #[test]
    fn test_calendar_covers_every_week_once() {
        assert_eq!(BADGES.len(), SEASON_WEEKS as usize);
        for (i, badge) in BADGES.iter().enumerate() {
            assert_eq!(badge.week, i as u8 + 1, "weeks must be 1..=39 in order");
        }
    }

    #[test]
    fn test_badge_xp_is_positive() {
        for badge in BADGES {
            assert!(badge.xp > 0, "badge {} must grant XP", badge.name);
        }
    }

    #[test]
    fn test_for_week_bounds() {
        assert!(BadgeDefinition::for_week(0).is_none());
        assert!(BadgeDefinition::for_week(40).is_none());
        assert_eq!(BadgeDefinition::for_week(1).unwrap().name, "First Steps");
        assert_eq!(BadgeDefinition::for_week(39).unwrap().name, "Grand Finale");
    }
}
