//! Validity-period handling types
//!
//! This module provides the temporal building blocks for history-preserving
//! records:
//! - `ValidPeriod`: the interval during which a record version is effective;
//!   an open end marks the current version
//! - `Clock`: the injected time source every validity stamp flows through

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must be before end {end}")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Period is already closed")]
    AlreadyClosed,
}

/// Represents the validity period of a record version
///
/// A record with an open end (`end == None`) is the current version of its
/// logical entity. Closing the period supersedes the version while keeping
/// it queryable as history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidPeriod {
    /// Start of the valid period (inclusive)
    pub start: DateTime<Utc>,
    /// End of the valid period (exclusive), None means currently valid
    pub end: Option<DateTime<Utc>>,
}

impl ValidPeriod {
    /// Creates a new valid period
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<Self, TemporalError> {
        if let Some(end) = end {
            if start >= end {
                return Err(TemporalError::InvalidPeriod {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Creates an open-ended period starting from the given time
    pub fn from(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Returns true if this period contains the given timestamp
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && self.end.map_or(true, |e| timestamp < e)
    }

    /// Returns true if this period overlaps with another
    pub fn overlaps(&self, other: &ValidPeriod) -> bool {
        let self_end = self.end.unwrap_or(DateTime::<Utc>::MAX_UTC);
        let other_end = other.end.unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.start < other_end && other.start < self_end
    }

    /// Returns true if this period is open (the current version)
    pub fn is_current(&self) -> bool {
        self.end.is_none()
    }

    /// Closes the period at the given timestamp
    pub fn close_at(&mut self, timestamp: DateTime<Utc>) -> Result<(), TemporalError> {
        if self.end.is_some() {
            return Err(TemporalError::AlreadyClosed);
        }
        if timestamp < self.start {
            return Err(TemporalError::InvalidPeriod {
                start: self.start.to_string(),
                end: timestamp.to_string(),
            });
        }
        self.end = Some(timestamp);
        Ok(())
    }

    /// Reopens the period, making the record current again
    pub fn reopen(&mut self) {
        self.end = None;
    }

    /// Returns the duration of the period, if closed
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end.map(|e| e - self.start)
    }
}

/// Injected time source
///
/// All validity stamping goes through a `Clock` rather than ad hoc calls to
/// `Utc::now()`, so services can be driven deterministically in tests.
pub trait Clock: Send + Sync {
    /// Returns the current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests
///
/// Returns a programmed instant and can be advanced explicitly, so validity
/// boundaries in test scenarios are exact.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock pinned at the given instant
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Moves the clock forward by the given duration
    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += by;
    }

    /// Repins the clock at the given instant
    pub fn set(&self, to: DateTime<Utc>) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now = to;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }
}
