//! Date range validation.
//!
//! Rules are checked in a fixed order and the first violated rule wins:
//! 1. start must not be in the future
//! 2. end must not be in the future
//! 3. start must not be after end
//!
//! So a range that is both inverted and starts in the future reports the
//! future start.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("start date {start} is in the future (today is {today})")]
    FutureStart { start: NaiveDate, today: NaiveDate },

    #[error("end date {end} is in the future (today is {today})")]
    FutureEnd { end: NaiveDate, today: NaiveDate },

    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Check a requested range against today's date.
pub fn validate(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<(), RangeError> {
    if start > today {
        return Err(RangeError::FutureStart { start, today });
    }
    if end > today {
        return Err(RangeError::FutureEnd { end, today });
    }
    if start > end {
        return Err(RangeError::InvertedRange { start, end });
    }
    Ok(())
}

/// A validated, inclusive calendar date range.
///
/// Only obtainable through [`DateRange::checked`], so holding one means
/// `start <= end <= today` held when it was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn checked(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<Self, RangeError> {
        validate(start, end, today)?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
