use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a billing schedule
pub type ScheduleId = Uuid;

/// unique identifier for a billing schedule period
pub type PeriodId = Uuid;

/// unique identifier for a billing ratio
pub type RatioId = Uuid;

/// unique identifier for a student package
pub type StudentPackageId = Uuid;

/// unique identifier for a student package order
pub type StudentPackageOrderId = Uuid;

/// order types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    New,
    Enrollment,
    Update,
    Cancel,
    Withdrawal,
    Graduate,
    /// leave of absence
    Loa,
    Pause,
    Resume,
    CustomBilling,
}

impl OrderType {
    /// order types that end billing early
    pub const CANCELLATION_CLASS: [OrderType; 4] = [
        OrderType::Cancel,
        OrderType::Withdrawal,
        OrderType::Loa,
        OrderType::Graduate,
    ];

    pub fn is_cancellation_class(&self) -> bool {
        Self::CANCELLATION_CLASS.contains(self)
    }
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::New
    }
}

/// where a new student package order sits on the package timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackagePosition {
    /// ends before the active order, recorded for history only
    Past,
    /// becomes the active order
    Current,
    /// queued after the active order
    Future,
}
