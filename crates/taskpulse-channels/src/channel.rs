use async_trait::async_trait;

use crate::error::ChannelError;

/// Outbound notification transport (WhatsApp, SMS, a test double, …).
///
/// Implementations must be `Send + Sync` so one instance can be shared by the
/// HTTP handlers and the reminder scheduler behind an `Arc`.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Stable lowercase identifier used in log fields (e.g. `"whatsapp"`).
    fn name(&self) -> &str;

    /// Attempt delivery of `body` to `address`.
    ///
    /// A single attempt: retries and queuing, if any, belong to the remote
    /// service. Callers normally go through [`crate::dispatch`] instead of
    /// calling this directly.
    async fn send(&self, address: &str, body: &str) -> Result<(), ChannelError>;
}
