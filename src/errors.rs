use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::time_range::TimeRange;

/// failure reported by an injected lookup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: &'static str,
        id: Uuid,
    },

    #[error("lookup backend failed: {message}")]
    Backend {
        message: String,
    },
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound { .. })
    }
}

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("empty bill item in request")]
    EmptyBillItems,

    #[error("bill item at index {index} has no billing schedule period id")]
    MissingPeriodId {
        index: usize,
    },

    #[error("bill item at index {index} has duplicate billing schedule period id {period_id}")]
    DuplicatePeriodId {
        index: usize,
        period_id: Uuid,
    },

    #[error("billing schedule period {period_id} belongs to schedule {period_schedule_id}, product uses {product_schedule_id}")]
    PeriodScheduleMismatch {
        period_id: Uuid,
        period_schedule_id: Uuid,
        product_schedule_id: Uuid,
    },

    #[error("billing schedule period {period_id} {period} is outside product availability {available}")]
    PeriodRangeInvalid {
        period_id: Uuid,
        period: TimeRange,
        available: TimeRange,
    },

    #[error("bill item at index {index} for period {period_id}: upcoming flag is {flagged}, billing date {billing_date} says {expected}")]
    UpcomingFlagMismatch {
        index: usize,
        period_id: Uuid,
        billing_date: DateTime<Utc>,
        flagged: bool,
        expected: bool,
    },

    #[error("upcoming billing should only contain one item, found {count}")]
    MultipleUpcomingItems {
        count: usize,
    },

    #[error("reference date {reference_date} is outside of pro-rated billing schedule period {period_id} {period}")]
    ReferenceDateOutOfPeriod {
        period_id: Uuid,
        reference_date: DateTime<Utc>,
        period: TimeRange,
    },

    #[error("product {product_id} order item has neither start date nor effective date")]
    MissingReferenceDate {
        product_id: Uuid,
    },

    #[error("last billing schedule period not reached: {remaining} period(s) of schedule {schedule_id} start after {max_end}")]
    LastPeriodNotReached {
        schedule_id: Uuid,
        max_end: DateTime<Utc>,
        remaining: usize,
    },

    #[error("discontinuous billing schedule {schedule_id}: {found} period(s) in {span}, {resolved} resolved")]
    DiscontinuousSchedule {
        schedule_id: Uuid,
        span: TimeRange,
        found: usize,
        resolved: usize,
    },

    #[error("student package {student_package_id}: new range {new_range} overlaps existing order {existing_order_id} {existing_range}")]
    OverlappingStudentPackageOrder {
        student_package_id: Uuid,
        existing_order_id: Uuid,
        existing_range: TimeRange,
        new_range: TimeRange,
    },

    #[error("billing ratio lookup failed for period {period_id}: {source}")]
    RatioLookupFailed {
        period_id: Uuid,
        #[source]
        source: LookupError,
    },

    #[error("billing schedule {schedule_id} is removed or archived")]
    ArchivedSchedule {
        schedule_id: Uuid,
    },

    #[error("invalid time range: from {from} is after to {to}")]
    InvalidTimeRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
