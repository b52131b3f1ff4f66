//! Login session gate.
//!
//! A single boolean flag persisted next to the record data. There is no
//! account system: one hardcoded credential pair guards the clinic's device,
//! and the flag survives restarts until an explicit logout.

use thiserror::Error;

use crate::db::{Database, DbError, DbResult};

const USERNAME: &str = "admin";
const PASSWORD: &str = "deepak123";

/// Authentication errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Gate over the persisted login flag.
pub struct SessionGate<'a> {
    db: &'a Database,
}

impl<'a> SessionGate<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Check credentials and set the login flag.
    ///
    /// On mismatch the flag is left untouched.
    pub fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username != USERNAME || password != PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }
        self.db.set_logged_in()?;
        Ok(())
    }

    /// Clear the login flag.
    pub fn logout(&self) -> DbResult<()> {
        self.db.clear_logged_in()
    }

    /// Whether the flag is currently set. Sessions never expire by time.
    pub fn is_logged_in(&self) -> DbResult<bool> {
        self.db.is_logged_in()
    }
}
