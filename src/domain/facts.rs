use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Facts about a single completed reading session, supplied by the
/// reading-session collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionFacts {
    /// Session duration in whole minutes.
    pub minutes: u32,
    /// Local hour (0-23) the session started.
    pub start_hour: u32,
    pub weekday: Weekday,
}

/// Cumulative bookshelf state, supplied by the bookshelf collaborator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BookshelfFacts {
    pub books_total: u32,
    pub books_rated: u32,
    pub books_with_notes: u32,
    pub books_with_progress: u32,
}

impl BookshelfFacts {
    /// Every book on the shelf carries a note. An empty shelf does not count.
    pub fn all_annotated(&self) -> bool {
        self.books_total > 0 && self.books_with_notes >= self.books_total
    }
}

/// Everything a badge predicate may look at for one calendar week.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WeekFacts {
    /// The session that triggered the check, if any. Timer badges need one.
    pub session: Option<SessionFacts>,
    #[serde(default)]
    pub bookshelf: BookshelfFacts,
    /// Whether the student has cast this year's book vote.
    #[serde(default)]
    pub has_voted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_annotated_requires_books() {
        let empty = BookshelfFacts::default();
        assert!(!empty.all_annotated());

        let done = BookshelfFacts {
            books_total: 3,
            books_with_notes: 3,
            ..Default::default()
        };
        assert!(done.all_annotated());

        let partial = BookshelfFacts {
            books_total: 3,
            books_with_notes: 2,
            ..Default::default()
        };
        assert!(!partial.all_annotated());
    }
}
