pub mod position;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_range::TimeRange;
use crate::types::{StudentPackageId, StudentPackageOrderId};

pub use position::{
    find_order_at, position_new_student_package_order, select_current_student_package_order,
};

/// time-bounded grant of a student package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPackageOrder {
    pub id: StudentPackageOrderId,
    pub student_package_id: StudentPackageId,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub is_current_student_package: bool,
}

impl StudentPackageOrder {
    pub fn range(&self) -> TimeRange {
        TimeRange {
            from: self.start_at,
            to: self.end_at,
        }
    }
}
