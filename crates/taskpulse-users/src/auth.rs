use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;
use taskpulse_core::UserId;
use tracing::{debug, info};

use crate::error::{Result, UserError};
use crate::store::{create_user, find_user_by_name, get_user, update_address};
use crate::types::User;

/// Result of a successful login.
#[derive(Debug)]
pub enum LoginOutcome {
    Existing(User),
    /// First login with this name; the user row was just created.
    Created(User),
}

impl LoginOutcome {
    pub fn user(&self) -> &User {
        match self {
            LoginOutcome::Existing(u) => u,
            LoginOutcome::Created(u) => u,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            LoginOutcome::Existing(u) | LoginOutcome::Created(u) => u,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, LoginOutcome::Created(_))
    }
}

/// Name/PIN gate in front of the task API.
///
/// No session or token is issued: the returned user id is what clients pass
/// back on every subsequent request.
pub struct AuthGate {
    db: Arc<Mutex<Connection>>,
}

impl AuthGate {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    /// Log in, registering the name on first use.
    ///
    /// Blank addresses are ignored. A known user's stored address is replaced
    /// only when a different non-blank one is supplied.
    pub fn login(&self, name: &str, pin: &str, address: Option<&str>) -> Result<LoginOutcome> {
        let name = name.trim();
        let pin = pin.trim();
        if name.is_empty() || pin.is_empty() {
            return Err(UserError::Validation("Name and PIN are required".to_string()));
        }
        let address = address.map(str::trim).filter(|a| !a.is_empty());

        let conn = self.conn();
        let Some(mut user) = find_user_by_name(&conn, name)? else {
            let user = create_user(&conn, name, pin, address)?;
            info!(user_id = %user.id, name, "new user registered");
            return Ok(LoginOutcome::Created(user));
        };

        if user.pin != pin {
            debug!(user_id = %user.id, "login rejected: pin mismatch");
            return Err(UserError::InvalidPin);
        }

        if let Some(addr) = address {
            if user.address.as_deref() != Some(addr) {
                update_address(&conn, user.id, addr)?;
                info!(user_id = %user.id, "notification address updated");
                user.address = Some(addr.to_string());
            }
        }
        Ok(LoginOutcome::Existing(user))
    }

    /// Look up a user by id. Returns None if no such user exists.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        get_user(&self.conn(), id)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
