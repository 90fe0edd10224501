pub mod continuity;
pub mod period;
pub mod ratio;
pub mod resolver;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Fraction, Money};
use crate::errors::LookupError;
use crate::time_range::TimeRange;
use crate::types::{PeriodId, RatioId, ScheduleId};

pub use continuity::ContinuityChecker;
pub use period::{check_period, validate_billing_schedule, PeriodValidator};
pub use ratio::RatioSelector;
pub use resolver::{BillingResolution, BillingScheduleService, ResolvedItem};
pub use store::InMemoryScheduleStore;

/// named container of billing periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSchedule {
    pub id: ScheduleId,
    pub name: String,
    pub is_archived: bool,
}

/// one time slice of a schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSchedulePeriod {
    pub id: PeriodId,
    pub billing_schedule_id: ScheduleId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub billing_date: DateTime<Utc>,
}

impl BillingSchedulePeriod {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            from: self.start_date,
            to: self.end_date,
        }
    }
}

/// fraction of a period's price charged from a point inside the period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRatio {
    pub id: RatioId,
    pub billing_schedule_period_id: PeriodId,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub fraction: Fraction,
}

impl BillingRatio {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            from: self.start_date,
            to: self.end_date,
        }
    }

    pub fn fraction(&self) -> Fraction {
        self.fraction
    }

    /// share of a full period price charged under this ratio
    pub fn prorate(&self, full_price: Money) -> Money {
        full_price.scale(self.fraction)
    }
}

/// read access to billing schedules
pub trait ScheduleLookup {
    fn schedule_by_id(&self, schedule_id: ScheduleId) -> Result<BillingSchedule, LookupError>;
}

/// read access to billing schedule periods
pub trait PeriodLookup {
    fn period_by_id(&self, period_id: PeriodId) -> Result<BillingSchedulePeriod, LookupError>;

    /// periods of the schedule starting strictly after `instant`
    fn count_periods_starting_after(
        &self,
        schedule_id: ScheduleId,
        instant: DateTime<Utc>,
    ) -> Result<usize, LookupError>;

    /// periods of the schedule lying inside `[from, to]`
    fn count_periods_in_range(
        &self,
        schedule_id: ScheduleId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<usize, LookupError>;

    /// all periods of the schedule ordered by start
    fn periods_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<BillingSchedulePeriod>, LookupError>;
}

/// read access to billing ratios
pub trait RatioLookup {
    /// first ratio of the period whose range contains or follows `instant`
    fn ratio_at_or_after(
        &self,
        period_id: PeriodId,
        instant: DateTime<Utc>,
    ) -> Result<BillingRatio, LookupError>;

    /// ratio of the same period starting right after `ratio`
    fn next_ratio(&self, ratio: &BillingRatio) -> Result<BillingRatio, LookupError>;
}
