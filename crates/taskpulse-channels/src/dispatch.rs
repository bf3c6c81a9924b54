use std::time::Duration;

use tracing::{info, warn};

use crate::channel::NotificationSender;
use crate::error::ChannelError;
use crate::types::Delivery;

/// Send one notification with a latency bound, absorbing every failure.
///
/// Transport errors and timeouts are logged at `warn` and returned as
/// [`Delivery::Failed`]; this function never fails, so callers (the reminder
/// scheduler, the task-created hook) cannot propagate a transport problem.
pub async fn dispatch(
    sender: &dyn NotificationSender,
    address: &str,
    body: &str,
    timeout: Duration,
) -> Delivery {
    let outcome = match tokio::time::timeout(timeout, sender.send(address, body)).await {
        Ok(result) => result,
        Err(_) => Err(ChannelError::Timeout {
            ms: timeout.as_millis() as u64,
        }),
    };

    match outcome {
        Ok(()) => {
            info!(channel = sender.name(), %address, "notification sent");
            Delivery::Delivered
        }
        Err(e) => {
            warn!(channel = sender.name(), %address, error = %e, "notification failed");
            Delivery::Failed {
                reason: e.to_string(),
            }
        }
    }
}
