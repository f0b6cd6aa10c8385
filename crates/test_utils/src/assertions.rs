//! Custom assertion helpers for versioned records
//!
//! These helpers express the history invariants the test suite checks over
//! and over: exactly one current version, closed snapshots, and continuous
//! non-overlapping history chains.

use chrono::{DateTime, Utc};

use domain_identity::Versioned;

/// Asserts the record is the current version
pub fn assert_current<T: Versioned>(record: &T) {
    assert!(
        record.is_current(),
        "expected a current version, found validity {:?}",
        record.validity()
    );
}

/// Asserts the record was closed at the given instant
pub fn assert_closed_at<T: Versioned>(record: &T, at: DateTime<Utc>) {
    assert_eq!(
        record.validity().end,
        Some(at),
        "expected a version closed at {at}, found validity {:?}",
        record.validity()
    );
}

/// Asserts a history chain is well-formed
///
/// Checks ordering by validity start, pairwise non-overlap, every row but
/// the last closed, and the last row current.
pub fn assert_history_chain<T: Versioned>(history: &[T]) {
    assert!(!history.is_empty(), "expected a non-empty history");

    for pair in history.windows(2) {
        assert!(
            pair[0].validity().start <= pair[1].validity().start,
            "history must be ordered by validity start"
        );
        assert!(
            !pair[0].validity().overlaps(pair[1].validity()),
            "history intervals must not overlap: {:?} and {:?}",
            pair[0].validity(),
            pair[1].validity()
        );
    }

    let (last, closed) = history.split_last().expect("checked non-empty");
    for row in closed {
        assert!(
            !row.is_current(),
            "every superseded version must be closed, found open validity {:?}",
            row.validity()
        );
    }
    assert_current(last);
}
