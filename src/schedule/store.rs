use chrono::{DateTime, Utc};

use crate::errors::LookupError;
use crate::schedule::{
    BillingRatio, BillingSchedule, BillingSchedulePeriod, PeriodLookup, RatioLookup,
    ScheduleLookup,
};
use crate::time_range::TimeRange;
use crate::types::{PeriodId, ScheduleId};

/// in-memory schedule data implementing every lookup port
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleStore {
    schedules: Vec<BillingSchedule>,
    periods: Vec<BillingSchedulePeriod>,
    ratios: Vec<BillingRatio>,
    ratio_failure: Option<String>,
    next_ratio_failure: Option<String>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(mut self, schedule: BillingSchedule) -> Self {
        self.schedules.push(schedule);
        self
    }

    pub fn with_period(mut self, period: BillingSchedulePeriod) -> Self {
        self.periods.push(period);
        self
    }

    pub fn with_ratio(mut self, ratio: BillingRatio) -> Self {
        self.ratios.push(ratio);
        self
    }

    /// make every ratio lookup fail with a backend error
    pub fn fail_ratio_lookups(&mut self, message: impl Into<String>) {
        self.ratio_failure = Some(message.into());
    }

    /// make only the next-ratio lookup fail with a backend error
    pub fn fail_next_ratio_lookups(&mut self, message: impl Into<String>) {
        self.next_ratio_failure = Some(message.into());
    }

    fn schedule_periods(&self, schedule_id: ScheduleId) -> impl Iterator<Item = &BillingSchedulePeriod> {
        self.periods
            .iter()
            .filter(move |p| p.billing_schedule_id == schedule_id)
    }

    fn period_ratios(&self, period_id: PeriodId) -> Vec<&BillingRatio> {
        let mut ratios: Vec<&BillingRatio> = self
            .ratios
            .iter()
            .filter(|r| r.billing_schedule_period_id == period_id)
            .collect();
        ratios.sort_by_key(|r| r.start_date);
        ratios
    }

    fn check_ratio_backend(&self) -> Result<(), LookupError> {
        match &self.ratio_failure {
            Some(message) => Err(LookupError::Backend {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl ScheduleLookup for InMemoryScheduleStore {
    fn schedule_by_id(&self, schedule_id: ScheduleId) -> Result<BillingSchedule, LookupError> {
        self.schedules
            .iter()
            .find(|s| s.id == schedule_id)
            .cloned()
            .ok_or(LookupError::NotFound {
                entity: "billing schedule",
                id: schedule_id,
            })
    }
}

impl PeriodLookup for InMemoryScheduleStore {
    fn period_by_id(&self, period_id: PeriodId) -> Result<BillingSchedulePeriod, LookupError> {
        self.periods
            .iter()
            .find(|p| p.id == period_id)
            .cloned()
            .ok_or(LookupError::NotFound {
                entity: "billing schedule period",
                id: period_id,
            })
    }

    fn count_periods_starting_after(
        &self,
        schedule_id: ScheduleId,
        instant: DateTime<Utc>,
    ) -> Result<usize, LookupError> {
        Ok(self
            .schedule_periods(schedule_id)
            .filter(|p| p.start_date > instant)
            .count())
    }

    fn count_periods_in_range(
        &self,
        schedule_id: ScheduleId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<usize, LookupError> {
        let span = TimeRange { from, to };
        Ok(self
            .schedule_periods(schedule_id)
            .filter(|p| span.contains_range(&p.range()))
            .count())
    }

    fn periods_for_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<BillingSchedulePeriod>, LookupError> {
        let mut periods: Vec<BillingSchedulePeriod> =
            self.schedule_periods(schedule_id).cloned().collect();
        periods.sort_by_key(|p| p.start_date);
        Ok(periods)
    }
}

impl RatioLookup for InMemoryScheduleStore {
    fn ratio_at_or_after(
        &self,
        period_id: PeriodId,
        instant: DateTime<Utc>,
    ) -> Result<BillingRatio, LookupError> {
        self.check_ratio_backend()?;
        self.period_ratios(period_id)
            .into_iter()
            .find(|r| !r.range().after(instant))
            .cloned()
            .ok_or(LookupError::NotFound {
                entity: "billing ratio",
                id: period_id,
            })
    }

    fn next_ratio(&self, ratio: &BillingRatio) -> Result<BillingRatio, LookupError> {
        self.check_ratio_backend()?;
        if let Some(message) = &self.next_ratio_failure {
            return Err(LookupError::Backend {
                message: message.clone(),
            });
        }
        self.period_ratios(ratio.billing_schedule_period_id)
            .into_iter()
            .find(|r| r.start_date > ratio.start_date)
            .cloned()
            .ok_or(LookupError::NotFound {
                entity: "billing ratio",
                id: ratio.id,
            })
    }
}
