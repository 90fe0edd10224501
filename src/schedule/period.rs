use tracing::warn;

use crate::errors::{Result, ScheduleError};
use crate::order::ProductInfo;
use crate::schedule::{BillingSchedule, BillingSchedulePeriod, PeriodLookup};
use crate::types::PeriodId;

/// reject archived schedules
pub fn validate_billing_schedule(schedule: &BillingSchedule) -> Result<()> {
    if schedule.is_archived {
        warn!(schedule_id = %schedule.id, "billing schedule is archived");
        return Err(ScheduleError::ArchivedSchedule {
            schedule_id: schedule.id,
        });
    }
    Ok(())
}

/// checks a candidate period against the product it is billed for
pub struct PeriodValidator<'a, P: PeriodLookup + ?Sized> {
    periods: &'a P,
}

impl<'a, P: PeriodLookup + ?Sized> PeriodValidator<'a, P> {
    pub fn new(periods: &'a P) -> Self {
        Self { periods }
    }

    /// resolve the period and confirm it belongs to the product's schedule and availability
    pub fn resolve(&self, product: &ProductInfo, period_id: PeriodId) -> Result<BillingSchedulePeriod> {
        let period = self.periods.period_by_id(period_id)?;
        check_period(product, &period)?;
        Ok(period)
    }
}

/// validate an already resolved period against the product
pub fn check_period(product: &ProductInfo, period: &BillingSchedulePeriod) -> Result<()> {
    if period.billing_schedule_id != product.billing_schedule_id {
        warn!(
            period_id = %period.id,
            period_schedule_id = %period.billing_schedule_id,
            product_schedule_id = %product.billing_schedule_id,
            "billing schedule period does not match product schedule",
        );
        return Err(ScheduleError::PeriodScheduleMismatch {
            period_id: period.id,
            period_schedule_id: period.billing_schedule_id,
            product_schedule_id: product.billing_schedule_id,
        });
    }

    let available = product.availability();
    if !available.contains_range(&period.range()) {
        warn!(
            period_id = %period.id,
            period = %period.range(),
            available = %available,
            "billing schedule period has invalid time range",
        );
        return Err(ScheduleError::PeriodRangeInvalid {
            period_id: period.id,
            period: period.range(),
            available,
        });
    }

    Ok(())
}
