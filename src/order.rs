use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::time_range::TimeRange;
use crate::types::{OrderType, PeriodId, ScheduleId};

/// product fields the schedule validation needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_id: Uuid,
    pub billing_schedule_id: ScheduleId,
    pub disable_pro_rating: bool,
    pub available_from: DateTime<Utc>,
    pub available_until: DateTime<Utc>,
}

impl ProductInfo {
    pub fn availability(&self) -> TimeRange {
        TimeRange {
            from: self.available_from,
            to: self.available_until,
        }
    }

    pub fn is_pro_rating_enabled(&self) -> bool {
        !self.disable_pro_rating
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub order_type: OrderType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub start_date: Option<DateTime<Utc>>,
    pub effective_date: Option<DateTime<Utc>>,
}

impl OrderItem {
    /// start date if present, else effective date
    pub fn reference_date(&self) -> Option<DateTime<Utc>> {
        self.start_date.or(self.effective_date)
    }
}

/// one drafted bill item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingItemData {
    pub billing_schedule_period_id: Option<PeriodId>,
    pub is_upcoming: bool,
    pub is_cancel_bill_item: Option<bool>,
    pub price: Option<Money>,
}

impl BillingItemData {
    pub fn for_period(period_id: PeriodId, is_upcoming: bool) -> Self {
        Self {
            billing_schedule_period_id: Some(period_id),
            is_upcoming,
            is_cancel_bill_item: None,
            price: None,
        }
    }

    pub fn is_cancel(&self) -> bool {
        self.is_cancel_bill_item.unwrap_or(false)
    }
}

/// aggregate input for one order item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemData {
    pub product_info: ProductInfo,
    pub order: Order,
    pub order_item: OrderItem,
    pub bill_items: Vec<BillingItemData>,
}
