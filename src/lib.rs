//! Budget Keeper is the backend for a personal finance app.
//!
//! It keeps monthly budgets per spending category plus one overall monthly
//! budget, aggregates a user's transactions against them, and runs monthly
//! maintenance (reset rules, carry-over and auto-allocation) when a new
//! month starts.
//!
//! This library provides a JSON REST API, see [build_router].

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

pub mod allocation;
mod app_state;
pub mod auth;
pub mod budget;
pub mod category;
pub mod database_id;
mod db;
pub mod endpoints;
mod error;
mod logging;
pub mod maintenance;
pub mod period;
mod routing;
pub mod settings;
pub mod store;
#[cfg(test)]
mod test_utils;
pub mod timezone;
pub mod transaction;

pub use app_state::{AppState, create_cookie_key};
pub use db::initialize as initialize_db;
pub use error::{Error, ErrorBody};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
