//! `taskpulse-users`: user records and the name/PIN auth gate.

pub mod auth;
pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use auth::{AuthGate, LoginOutcome};
pub use error::{Result, UserError};
pub use types::User;
