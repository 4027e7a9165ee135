//! The state shared by the budget API handlers.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{Error, auth::DEFAULT_COOKIE_DURATION, db::initialize, timezone::get_local_offset};

/// Everything a budget request needs: session cookies, the month boundary and the database.
///
/// Handlers take the parts they use through their own state structs, see the
/// `FromRef` impls next to each handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Encrypts the session cookie that identifies the current user.
    pub cookie_key: Key,

    /// How long a session lasts without `remember_me`.
    pub cookie_duration: Duration,

    /// Canonical timezone name such as "Pacific/Auckland".
    ///
    /// Monthly maintenance and the default budget period use the calendar
    /// month in this timezone.
    pub local_timezone: String,

    /// Budgets, transactions, categories, settings and users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create the tables in `db_connection` and build the shared state.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTimezoneError] if `local_timezone` is not a
    /// known timezone, or a SQL error if the tables cannot be created.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the session cookie key from `secret`.
///
/// The same secret always gives the same key, so sessions survive a restart.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod app_state_tests {
    use rusqlite::Connection;

    use crate::{AppState, Error, create_cookie_key};

    #[test]
    fn unknown_timezone_is_rejected() {
        let result = AppState::new(Connection::open_in_memory().unwrap(), "secret", "Mars/Olympus_Mons");

        assert_eq!(
            result.err(),
            Some(Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned()))
        );
    }

    #[test]
    fn cookie_key_is_stable_for_a_secret() {
        assert_eq!(
            create_cookie_key("secret").master(),
            create_cookie_key("secret").master()
        );
        assert_ne!(
            create_cookie_key("secret").master(),
            create_cookie_key("other").master()
        );
    }
}
