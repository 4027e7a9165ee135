//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of username and password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request did not carry a valid session, so there is no current user.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth token could not be serialized or deserialized.
    ///
    /// Callers should pass in the original error as a string.
    #[error("invalid auth token: {0}")]
    InvalidToken(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used to create a username.
    #[error("Username cannot be empty")]
    EmptyUsername,

    /// The username is already taken by another user.
    #[error("the username \"{0}\" already exists in the database")]
    DuplicateUsername(String),

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// The user already has a category with this name.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// A budget limit was negative, NaN or infinite.
    #[error("{0} is not a valid budget limit, limits must be a non-negative number")]
    InvalidLimit(f64),

    /// A transaction amount was NaN or infinite.
    #[error("{0} is not a valid transaction amount")]
    InvalidAmount(f64),

    /// A month number outside of 1-12, or a year outside the supported calendar range.
    #[error("{year}-{month} is not a valid budget month")]
    InvalidMonth {
        /// The requested year.
        year: i32,
        /// The requested month number.
        month: u8,
    },

    /// An allocation percentage outside of (0, 100].
    #[error("{0} is not a valid allocation percentage, it must be greater than 0 and at most 100")]
    InvalidPercent(f64),

    /// A trailing-average reset rule must average over at least one month.
    #[error("a trailing average must cover between 1 and {max} months, got {0}", max = crate::settings::MAX_TRAILING_PERIODS)]
    InvalidTrailingPeriods(u32),

    /// Adding an allocation rule would allocate more than 100% of income.
    #[error("allocation rules would allocate {0}% of income, which is more than 100%")]
    AllocationOverCommitted(f64),

    /// The start of a date range came after its end.
    #[error("the date range {0} to {1} is empty")]
    InvalidDateRange(time::Date, time::Date),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// A request or response body could not be read.
    #[error("could not read the message body: {0}")]
    UnreadableBody(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete an allocation rule that does not exist
    #[error("tried to delete an allocation rule that is not in the database")]
    DeleteMissingAllocationRule,
}

impl Error {
    /// Whether the error means the targeted row does not exist.
    pub fn is_missing_row(&self) -> bool {
        matches!(
            self,
            Error::NotFound
                | Error::UpdateMissingBudget
                | Error::DeleteMissingBudget
                | Error::UpdateMissingCategory
                | Error::DeleteMissingTransaction
                | Error::DeleteMissingAllocationRule
        )
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials
            | Error::NotAuthenticated
            | Error::CookieMissing
            | Error::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Error::TooWeak(_)
            | Error::EmptyUsername
            | Error::EmptyCategoryName
            | Error::InvalidLimit(_)
            | Error::InvalidAmount(_)
            | Error::InvalidMonth { .. }
            | Error::InvalidPercent(_)
            | Error::InvalidTrailingPeriods(_)
            | Error::AllocationOverCommitted(_)
            | Error::InvalidDateRange(_, _) => StatusCode::BAD_REQUEST,
            Error::DuplicateUsername(_) | Error::DuplicateCategoryName(_) => StatusCode::CONFLICT,
            error if error.is_missing_row() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to the client when a request fails.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// A message describing what went wrong.
    pub error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
