//! User accounts, password hashing and cookie-based sessions.

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod token;
mod user;

pub use cookie::{
    COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, get_token_from_cookies, invalidate_auth_cookie,
    set_auth_cookie,
};
pub use log_in::{LogInData, LogInResponse, LoginState, post_log_in};
pub use log_out::post_log_out;
pub use middleware::{AuthState, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use token::Token;
pub use user::{
    User, UserID, Username, create_user, create_user_table, get_user_by_id, get_user_by_username,
};
