pub mod channel;
pub mod dispatch;
pub mod error;
pub mod types;
pub mod whatsapp;

pub use channel::NotificationSender;
pub use dispatch::dispatch;
pub use error::ChannelError;
pub use types::Delivery;
pub use whatsapp::WhatsAppSender;
