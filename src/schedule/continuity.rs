use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::errors::{Result, ScheduleError};
use crate::schedule::PeriodLookup;
use crate::time_range::TimeRange;
use crate::types::ScheduleId;

/// proves resolved periods tile one unbroken span of a schedule
pub struct ContinuityChecker<'a, P: PeriodLookup + ?Sized> {
    periods: &'a P,
}

impl<'a, P: PeriodLookup + ?Sized> ContinuityChecker<'a, P> {
    pub fn new(periods: &'a P) -> Self {
        Self { periods }
    }

    /// no period of the schedule may start after the last billed period ends
    pub fn check_last_period_reached(&self, schedule_id: ScheduleId, max_end: DateTime<Utc>) -> Result<()> {
        let remaining = self.periods.count_periods_starting_after(schedule_id, max_end)?;
        if remaining > 0 {
            warn!(
                %schedule_id,
                %max_end,
                remaining,
                "upcoming billing missing but last schedule period not reached",
            );
            return Err(ScheduleError::LastPeriodNotReached {
                schedule_id,
                max_end,
                remaining,
            });
        }
        Ok(())
    }

    /// periods inside the span must be exactly the resolved ones, and no two resolved periods may overlap
    pub fn check_continuous(&self, schedule_id: ScheduleId, span: TimeRange, resolved: &[TimeRange]) -> Result<()> {
        let found = self
            .periods
            .count_periods_in_range(schedule_id, span.from, span.to)?;
        if found != resolved.len() {
            warn!(%schedule_id, %span, found, resolved = resolved.len(), "billing schedule periods are not continuous");
            return Err(ScheduleError::DiscontinuousSchedule {
                schedule_id,
                span,
                found,
                resolved: resolved.len(),
            });
        }

        let mut ordered = resolved.to_vec();
        ordered.sort_by_key(|r| r.from);
        if let Some(pair) = ordered.windows(2).find(|pair| pair[0].overlaps(&pair[1])) {
            warn!(
                %schedule_id,
                first = %pair[0],
                second = %pair[1],
                "resolved billing schedule periods overlap",
            );
            return Err(ScheduleError::DiscontinuousSchedule {
                schedule_id,
                span,
                found,
                resolved: resolved.len(),
            });
        }

        debug!(%schedule_id, %span, resolved = resolved.len(), "billing schedule periods are continuous");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LookupError;
    use crate::schedule::{BillingSchedulePeriod, InMemoryScheduleStore};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn day(month: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, d, 0, 0, 0).unwrap()
    }

    fn quarter_store(schedule_id: ScheduleId) -> InMemoryScheduleStore {
        [(1, 31), (2, 29), (3, 31)]
            .into_iter()
            .fold(InMemoryScheduleStore::new(), |store, (month, last)| {
                store.with_period(BillingSchedulePeriod {
                    id: Uuid::new_v4(),
                    billing_schedule_id: schedule_id,
                    name: format!("2024-{:02}", month),
                    start_date: day(month, 1),
                    end_date: day(month, last),
                    billing_date: day(month, 1),
                })
            })
    }

    #[test]
    fn test_last_period_reached() {
        let schedule_id = Uuid::new_v4();
        let store = quarter_store(schedule_id);
        let checker = ContinuityChecker::new(&store);

        assert!(checker.check_last_period_reached(schedule_id, day(3, 31)).is_ok());

        let err = checker.check_last_period_reached(schedule_id, day(2, 29)).unwrap_err();
        assert!(matches!(err, ScheduleError::LastPeriodNotReached { remaining: 1, .. }));
    }

    #[test]
    fn test_continuous_span() {
        let schedule_id = Uuid::new_v4();
        let store = quarter_store(schedule_id);
        let checker = ContinuityChecker::new(&store);

        let span = TimeRange::new(day(1, 1), day(2, 29)).unwrap();
        let resolved = [
            TimeRange::new(day(2, 1), day(2, 29)).unwrap(),
            TimeRange::new(day(1, 1), day(1, 31)).unwrap(),
        ];
        assert!(checker.check_continuous(schedule_id, span, &resolved).is_ok());
    }

    #[test]
    fn test_gap_is_discontinuous() {
        let schedule_id = Uuid::new_v4();
        let store = quarter_store(schedule_id);
        let checker = ContinuityChecker::new(&store);

        // january and march billed, february skipped
        let span = TimeRange::new(day(1, 1), day(3, 31)).unwrap();
        let resolved = [
            TimeRange::new(day(1, 1), day(1, 31)).unwrap(),
            TimeRange::new(day(3, 1), day(3, 31)).unwrap(),
        ];
        let err = checker.check_continuous(schedule_id, span, &resolved).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::DiscontinuousSchedule { found: 3, resolved: 2, .. }
        ));
    }

    #[test]
    fn test_overlapping_resolved_periods_are_discontinuous() {
        let schedule_id = Uuid::new_v4();
        let store = InMemoryScheduleStore::new()
            .with_period(BillingSchedulePeriod {
                id: Uuid::new_v4(),
                billing_schedule_id: schedule_id,
                name: "A".to_string(),
                start_date: day(1, 1),
                end_date: day(1, 31),
                billing_date: day(1, 1),
            })
            .with_period(BillingSchedulePeriod {
                id: Uuid::new_v4(),
                billing_schedule_id: schedule_id,
                name: "B".to_string(),
                start_date: day(1, 15),
                end_date: day(2, 15),
                billing_date: day(1, 15),
            });
        let checker = ContinuityChecker::new(&store);

        // both periods fit the span, so only the pairwise check catches it
        let span = TimeRange::new(day(1, 1), day(2, 15)).unwrap();
        let resolved = [
            TimeRange::new(day(1, 15), day(2, 15)).unwrap(),
            TimeRange::new(day(1, 1), day(1, 31)).unwrap(),
        ];
        let err = checker.check_continuous(schedule_id, span, &resolved).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::DiscontinuousSchedule { found: 2, resolved: 2, .. }
        ));
    }

    struct FailingLookup;

    impl PeriodLookup for FailingLookup {
        fn period_by_id(&self, period_id: Uuid) -> std::result::Result<BillingSchedulePeriod, LookupError> {
            Err(LookupError::NotFound { entity: "billing schedule period", id: period_id })
        }

        fn count_periods_starting_after(&self, _: ScheduleId, _: DateTime<Utc>) -> std::result::Result<usize, LookupError> {
            Err(LookupError::Backend { message: "timeout".to_string() })
        }

        fn count_periods_in_range(&self, _: ScheduleId, _: DateTime<Utc>, _: DateTime<Utc>) -> std::result::Result<usize, LookupError> {
            Err(LookupError::Backend { message: "timeout".to_string() })
        }

        fn periods_for_schedule(&self, _: ScheduleId) -> std::result::Result<Vec<BillingSchedulePeriod>, LookupError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_lookup_failure_propagates() {
        let checker = ContinuityChecker::new(&FailingLookup);
        let span = TimeRange::new(day(1, 1), day(1, 31)).unwrap();

        assert!(matches!(
            checker.check_last_period_reached(Uuid::new_v4(), day(1, 31)),
            Err(ScheduleError::Lookup(LookupError::Backend { .. }))
        ));
        assert!(matches!(
            checker.check_continuous(Uuid::new_v4(), span, &[span]),
            Err(ScheduleError::Lookup(_))
        ));
    }
}
