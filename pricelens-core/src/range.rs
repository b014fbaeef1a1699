//! Date ranges: an explicit `(start, end)` pair or a look-back day count.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Bounds of the look-back slider.
pub const MIN_LOOKBACK_DAYS: u32 = 1;
pub const MAX_LOOKBACK_DAYS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("the end date must be on or after the start date ({start} > {end})")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

/// Validated calendar date range, `start <= end`.
///
/// Passed to providers as the half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// The last `days` days ending at `today`.
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(i64::from(days)),
            end: today,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days between the bounds.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// How the user picked the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeInput {
    Dates { start: NaiveDate, end: NaiveDate },
    LookbackDays(u32),
}

impl RangeInput {
    /// Resolve against `today`. Look-back counts are clamped to the slider
    /// bounds.
    pub fn resolve(&self, today: NaiveDate) -> Result<DateRange, RangeError> {
        match *self {
            RangeInput::Dates { start, end } => DateRange::new(start, end),
            RangeInput::LookbackDays(days) => Ok(DateRange::last_days(
                days.clamp(MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS),
                today,
            )),
        }
    }
}
