use std::collections::{BTreeMap, HashSet};

use hourglass_rs::SafeTimeProvider;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{Result, ScheduleError};
use crate::order::{BillingItemData, OrderItemData};
use crate::schedule::period::validate_billing_schedule;
use crate::schedule::{
    BillingRatio, BillingSchedulePeriod, ContinuityChecker, PeriodLookup, PeriodValidator,
    RatioLookup, RatioSelector, ScheduleLookup,
};
use crate::time_range::TimeRange;
use crate::types::PeriodId;

/// bill item paired with its validated period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedItem {
    pub index: usize,
    pub item: BillingItemData,
    pub period: BillingSchedulePeriod,
}

/// outcome of resolving one order item's bill items against its schedule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingResolution {
    /// item on the earliest starting period, present only when pro-rating is enabled
    pub pro_rated_item: Option<ResolvedItem>,
    pub pro_rated_ratio: Option<BillingRatio>,
    pub normal_items: Vec<ResolvedItem>,
    /// the single item whose billing date is still ahead
    pub upcoming_item: Option<ResolvedItem>,
    pub period_info_by_id: BTreeMap<PeriodId, BillingSchedulePeriod>,
}

impl BillingResolution {
    /// charge for the pro-rated item given the full period price
    pub fn prorated_price(&self, full_price: Money) -> Option<Money> {
        self.pro_rated_ratio
            .as_ref()
            .map(|ratio| ratio.prorate(full_price))
    }

    /// pro-rated charge from the pro-rated bill item's own price
    pub fn pro_rated_charge(&self) -> Option<Money> {
        let price = self.pro_rated_item.as_ref()?.item.price?;
        self.prorated_price(price)
    }

    /// span covered by every resolved period
    pub fn span(&self) -> Option<TimeRange> {
        let from = self.period_info_by_id.values().map(|p| p.start_date).min()?;
        let to = self.period_info_by_id.values().map(|p| p.end_date).max()?;
        Some(TimeRange { from, to })
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// resolves bill items onto billing schedule periods and selects the pro-rated item
pub struct BillingScheduleService<'a> {
    schedules: &'a dyn ScheduleLookup,
    periods: &'a dyn PeriodLookup,
    ratios: &'a dyn RatioLookup,
    config: EngineConfig,
}

impl<'a> BillingScheduleService<'a> {
    pub fn new(
        schedules: &'a dyn ScheduleLookup,
        periods: &'a dyn PeriodLookup,
        ratios: &'a dyn RatioLookup,
        config: EngineConfig,
    ) -> Self {
        Self {
            schedules,
            periods,
            ratios,
            config,
        }
    }

    /// build from one store implementing every port
    pub fn from_store<S>(store: &'a S, config: EngineConfig) -> Self
    where
        S: ScheduleLookup + PeriodLookup + RatioLookup,
    {
        Self::new(store, store, store, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// validate an order item's bill items and decide the pro-rated item and ratio
    pub fn resolve_order_item_billing(
        &self,
        data: &OrderItemData,
        time_provider: &SafeTimeProvider,
    ) -> Result<BillingResolution> {
        if data.bill_items.is_empty() {
            warn!(product_id = %data.product_info.product_id, "empty bill item in request");
            return Err(ScheduleError::EmptyBillItems);
        }

        let product = &data.product_info;
        let schedule_id = product.billing_schedule_id;

        if self.config.reject_archived_schedule {
            let schedule = self.schedules.schedule_by_id(schedule_id)?;
            validate_billing_schedule(&schedule)?;
        }

        let now = time_provider.now();
        let validator = PeriodValidator::new(self.periods);

        let mut seen: HashSet<PeriodId> = HashSet::with_capacity(data.bill_items.len());
        let mut resolved: Vec<ResolvedItem> = Vec::with_capacity(data.bill_items.len());
        let mut upcoming: Vec<usize> = Vec::new();
        let mut earliest: Option<usize> = None;
        let mut span: Option<TimeRange> = None;

        for (index, item) in data.bill_items.iter().enumerate() {
            let Some(period_id) = item.billing_schedule_period_id else {
                warn!(index, "bill item has no billing schedule period id");
                return Err(ScheduleError::MissingPeriodId { index });
            };

            if !seen.insert(period_id) {
                warn!(index, %period_id, "bill item has duplicate billing schedule period id");
                return Err(ScheduleError::DuplicatePeriodId { index, period_id });
            }

            let period = validator.resolve(product, period_id)?;

            let billing_due_later = TimeRange::at(period.billing_date).before(now);
            if billing_due_later != item.is_upcoming {
                warn!(
                    index,
                    %period_id,
                    billing_date = %period.billing_date,
                    flagged = item.is_upcoming,
                    "bill item upcoming flag does not match billing date",
                );
                return Err(ScheduleError::UpcomingFlagMismatch {
                    index,
                    period_id,
                    billing_date: period.billing_date,
                    flagged: item.is_upcoming,
                    expected: billing_due_later,
                });
            }
            if item.is_upcoming {
                upcoming.push(resolved.len());
            }

            // strictly earlier start wins, ties keep the first item
            let starts_earlier = match earliest {
                Some(i) => resolved[i].period.range().before(period.start_date),
                None => true,
            };
            if starts_earlier {
                earliest = Some(resolved.len());
            }

            span = Some(match span {
                Some(s) => TimeRange {
                    from: if s.before(period.start_date) { period.start_date } else { s.from },
                    to: if s.after(period.end_date) { period.end_date } else { s.to },
                },
                None => period.range(),
            });

            resolved.push(ResolvedItem {
                index,
                item: item.clone(),
                period,
            });
        }

        if upcoming.len() > 1 {
            warn!(count = upcoming.len(), "upcoming billing should only contain one item");
            return Err(ScheduleError::MultipleUpcomingItems {
                count: upcoming.len(),
            });
        }

        let (earliest, span) = match (earliest, span) {
            (Some(e), Some(s)) => (e, s),
            _ => return Err(ScheduleError::EmptyBillItems),
        };

        let reference_date = if product.is_pro_rating_enabled() {
            let Some(reference_date) = data.order_item.reference_date() else {
                warn!(
                    product_id = %product.product_id,
                    "order item has neither start date nor effective date",
                );
                return Err(ScheduleError::MissingReferenceDate {
                    product_id: product.product_id,
                });
            };
            let pro_rated_period = &resolved[earliest].period;
            if !pro_rated_period.range().within(reference_date) {
                warn!(
                    period_id = %pro_rated_period.id,
                    %reference_date,
                    "reference date is outside of the pro-rated billing schedule period",
                );
                return Err(ScheduleError::ReferenceDateOutOfPeriod {
                    period_id: pro_rated_period.id,
                    reference_date,
                    period: pro_rated_period.range(),
                });
            }
            Some(reference_date)
        } else {
            None
        };

        let checker = ContinuityChecker::new(self.periods);
        if upcoming.is_empty() {
            checker.check_last_period_reached(schedule_id, span.to)?;
        }
        let resolved_ranges: Vec<TimeRange> = resolved.iter().map(|r| r.period.range()).collect();
        checker.check_continuous(schedule_id, span, &resolved_ranges)?;

        let period_info_by_id: BTreeMap<PeriodId, BillingSchedulePeriod> = resolved
            .iter()
            .map(|r| (r.period.id, r.period.clone()))
            .collect();
        let upcoming_item = upcoming.first().map(|&i| resolved[i].clone());

        let Some(reference_date) = reference_date else {
            debug!(%schedule_id, items = resolved.len(), "pro-rating disabled, all bill items are normal");
            return Ok(BillingResolution {
                pro_rated_item: None,
                pro_rated_ratio: None,
                normal_items: resolved,
                upcoming_item,
                period_info_by_id,
            });
        };

        let pro_rated = resolved.remove(earliest);
        debug!(
            index = pro_rated.index,
            period_id = %pro_rated.period.id,
            %reference_date,
            "pro-rated bill item selected",
        );

        let advance = self
            .config
            .advances_ratio(data.order.order_type, pro_rated.item.is_cancel());
        let ratio = RatioSelector::new(self.ratios).select(pro_rated.period.id, reference_date, advance)?;

        Ok(BillingResolution {
            pro_rated_item: Some(pro_rated),
            pro_rated_ratio: Some(ratio),
            normal_items: resolved,
            upcoming_item,
            period_info_by_id,
        })
    }
}
