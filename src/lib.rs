pub mod config;
pub mod decimal;
pub mod errors;
pub mod order;
pub mod package;
pub mod schedule;
pub mod time_range;
pub mod types;

// re-export key types
pub use config::EngineConfig;
pub use decimal::{Fraction, Money};
pub use errors::{LookupError, Result, ScheduleError};
pub use order::{BillingItemData, Order, OrderItem, OrderItemData, ProductInfo};
pub use package::{
    find_order_at, position_new_student_package_order, select_current_student_package_order,
    StudentPackageOrder,
};
pub use schedule::{
    BillingRatio, BillingResolution, BillingSchedule, BillingSchedulePeriod,
    BillingScheduleService, InMemoryScheduleStore, PeriodLookup, RatioLookup, ResolvedItem,
    ScheduleLookup,
};
pub use time_range::{Relation, TimeRange};
pub use types::{
    OrderType, PackagePosition, PeriodId, RatioId, ScheduleId, StudentPackageId,
    StudentPackageOrderId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
