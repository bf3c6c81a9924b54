use serde::{Deserialize, Serialize};

/// Outcome of one dispatch attempt. Failures are data, not errors: nothing
/// upstream of the dispatcher reacts to a transport problem beyond logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    Delivered,
    Failed { reason: String },
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}
