//! Duration derivation from start/end timestamp pairs.
//!
//! Planned and actual durations share one calculation so both truncate
//! sub-minute remainders the same way.

use super::TaskDomainError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Returns the whole minutes between `start` and `end`.
///
/// Any sub-minute remainder is truncated.
///
/// # Errors
///
/// Returns [`TaskDomainError::InvalidInterval`] when `start` is not strictly
/// before `end`.
pub fn minutes_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, TaskDomainError> {
    if start >= end {
        return Err(TaskDomainError::InvalidInterval { start, end });
    }
    Ok((end - start).num_minutes())
}

/// Validated, strictly ordered pair of timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window from a start/end pair.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidInterval`] when `start >= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TaskDomainError> {
        minutes_between(start, end)?;
        Ok(Self { start, end })
    }

    /// Returns the window start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Returns the window end.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns the window length in whole minutes.
    #[must_use]
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Returns the same window moved forward by `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::WeekOutOfRange`] when the shifted window
    /// leaves the representable timestamp range.
    pub fn shifted(&self, offset: Duration) -> Result<Self, TaskDomainError> {
        let start = self
            .start
            .checked_add_signed(offset)
            .ok_or(TaskDomainError::WeekOutOfRange)?;
        let end = self
            .end
            .checked_add_signed(offset)
            .ok_or(TaskDomainError::WeekOutOfRange)?;
        Ok(Self { start, end })
    }
}
