use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScheduleError};

/// closed time range `[from, to]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// position of an instant relative to a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    Before,
    Within,
    After,
}

impl TimeRange {
    /// create range, rejecting `from > to`
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if from > to {
            return Err(ScheduleError::InvalidTimeRange { from, to });
        }
        Ok(Self { from, to })
    }

    /// degenerate range holding a single instant
    pub fn at(t: DateTime<Utc>) -> Self {
        Self { from: t, to: t }
    }

    /// instant lies inside the closed range
    pub fn within(&self, t: DateTime<Utc>) -> bool {
        self.from <= t && t <= self.to
    }

    /// instant precedes the range
    pub fn before(&self, t: DateTime<Utc>) -> bool {
        t < self.from
    }

    /// instant follows the range
    pub fn after(&self, t: DateTime<Utc>) -> bool {
        t > self.to
    }

    /// the two closed ranges share at least one instant
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.from <= other.to && other.from <= self.to
    }

    /// the whole of `other` lies inside this range
    pub fn contains_range(&self, other: &TimeRange) -> bool {
        self.within(other.from) && self.within(other.to)
    }

    /// the whole range ends before `other` starts
    pub fn ends_before(&self, other: &TimeRange) -> bool {
        other.before(self.to)
    }

    /// classify an instant against this range
    pub fn relation_of(&self, t: DateTime<Utc>) -> Relation {
        if self.before(t) {
            Relation::Before
        } else if self.after(t) {
            Relation::After
        } else {
            Relation::Within
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.from.to_rfc3339(), self.to.to_rfc3339())
    }
}
