use serde::{Deserialize, Serialize};

use crate::errors::{Result, ScheduleError};
use crate::types::OrderType;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// order types that advance the pro-rated ratio to the next sub-slice
    pub cancellation_order_types: Vec<OrderType>,
    /// also advance when the pro-rated bill item is itself a cancellation item
    pub advance_ratio_on_cancel_item: bool,
    /// reject orders against archived schedules
    pub reject_archived_schedule: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cancellation_order_types: OrderType::CANCELLATION_CLASS.to_vec(),
            advance_ratio_on_cancel_item: true,
            reject_archived_schedule: true,
        }
    }
}

impl EngineConfig {
    /// every consistency check enabled
    pub fn strict() -> Self {
        Self::default()
    }

    /// skip the archived schedule check, e.g. for data imports of historical orders
    pub fn lenient() -> Self {
        Self {
            reject_archived_schedule: false,
            ..Self::default()
        }
    }

    /// whether the ratio selector should move to the following ratio
    pub fn advances_ratio(&self, order_type: OrderType, is_cancel_item: bool) -> bool {
        self.cancellation_order_types.contains(&order_type)
            || (self.advance_ratio_on_cancel_item && is_cancel_item)
    }

    /// load from json
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json).map_err(|e| {
            ScheduleError::InvalidConfiguration {
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(normal) = self
            .cancellation_order_types
            .iter()
            .find(|t| matches!(t, OrderType::New | OrderType::Enrollment))
        {
            return Err(ScheduleError::InvalidConfiguration {
                message: format!("{:?} cannot be a cancellation order type", normal),
            });
        }
        Ok(())
    }
}
