use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskpulse_core::UserId;

/// A registered user. Created on first login with an unseen name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique display name; the login key.
    pub name: String,
    /// Compared verbatim on login. Never serialized back to clients.
    #[serde(skip_serializing)]
    pub pin: String,
    /// Destination for outbound notifications (a phone number for WhatsApp).
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The address to notify, if one is set and non-blank.
    pub fn notification_address(&self) -> Option<&str> {
        self.address.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}
