use chrono::{DateTime, Utc};
use tracing::debug;

use crate::errors::{Result, ScheduleError};
use crate::schedule::{BillingRatio, RatioLookup};
use crate::types::PeriodId;

/// picks the proration ratio for the pro-rated period
pub struct RatioSelector<'a, R: RatioLookup + ?Sized> {
    ratios: &'a R,
}

impl<'a, R: RatioLookup + ?Sized> RatioSelector<'a, R> {
    pub fn new(ratios: &'a R) -> Self {
        Self { ratios }
    }

    /// ratio effective at `reference_date`; with `advance` set, the ratio after it
    ///
    /// a missing next ratio keeps the first match, the cancellation fell in the last sub-slice
    pub fn select(
        &self,
        period_id: PeriodId,
        reference_date: DateTime<Utc>,
        advance: bool,
    ) -> Result<BillingRatio> {
        let ratio = self
            .ratios
            .ratio_at_or_after(period_id, reference_date)
            .map_err(|source| ScheduleError::RatioLookupFailed { period_id, source })?;

        if !advance {
            debug!(%period_id, ratio_id = %ratio.id, fraction = %ratio.fraction, "billing ratio selected");
            return Ok(ratio);
        }

        match self.ratios.next_ratio(&ratio) {
            Ok(next) => {
                debug!(
                    %period_id,
                    from_ratio = %ratio.id,
                    to_ratio = %next.id,
                    fraction = %next.fraction,
                    "billing ratio advanced for cancellation",
                );
                Ok(next)
            }
            Err(err) if err.is_not_found() => {
                debug!(%period_id, ratio_id = %ratio.id, "no billing ratio after last sub-slice");
                Ok(ratio)
            }
            Err(source) => Err(ScheduleError::RatioLookupFailed { period_id, source }),
        }
    }
}
