//! Observable events
//!
//! Every log line the store emits names one of these events.

use std::fmt;

/// Observable events of the record store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration file loaded
    ConfigLoaded,
    /// A query was bound to a record kind
    QueryBound,
    /// A predicate narrowed the queried set
    QueryFiltered,
    /// A disjunctive predicate was merged into the queried set
    QueryMerged,
    /// A predicate or query was rejected before scanning
    QueryRejected,
    /// Table file fully rewritten
    TableRewrite,
    /// Table file rewrite failed
    TableRewriteFailed,
    /// Insert began
    InsertBegin,
    /// Records inserted and persisted
    InsertComplete,
    /// Insert aborted before or during the rewrite
    InsertFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::QueryBound => "QUERY_BOUND",
            Event::QueryFiltered => "QUERY_FILTERED",
            Event::QueryMerged => "QUERY_MERGED",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::TableRewrite => "TABLE_REWRITE",
            Event::TableRewriteFailed => "TABLE_REWRITE_FAILED",
            Event::InsertBegin => "INSERT_BEGIN",
            Event::InsertComplete => "INSERT_COMPLETE",
            Event::InsertFailed => "INSERT_FAILED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Event::QueryRejected | Event::TableRewriteFailed | Event::InsertFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::QueryBound,
            Event::QueryFiltered,
            Event::QueryMerged,
            Event::QueryRejected,
            Event::TableRewrite,
            Event::TableRewriteFailed,
            Event::InsertBegin,
            Event::InsertComplete,
            Event::InsertFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_failure_events() {
        assert!(Event::InsertFailed.is_failure());
        assert!(Event::QueryRejected.is_failure());
        assert!(!Event::InsertComplete.is_failure());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::TableRewrite), "TABLE_REWRITE");
    }
}
