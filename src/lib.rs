//! Affiliate is the management backend for an affiliate network.
//!
//! This library provides the REST API for managing payment-method categories:
//! named records that pair an external provider with a main image and an icon
//! image stored on disk. Every endpoint responds with the JSON envelope
//! `{success, data?, message?}`.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod app_state;
mod category;
mod db;
mod endpoints;
mod images;
mod logging;
mod response;
mod routing;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use images::{ImageStore, UPLOAD_WEB_PREFIX};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty or whitespace-only string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// A required text field was missing from the submitted form.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// One or both image files were missing from a create request.
    #[error("Both images required")]
    MissingImages,

    /// The category name already exists in the database.
    ///
    /// Category names are unique; the database's constraint is the single
    /// source of truth, so two racing creates resolve to exactly one winner
    /// and one instance of this error.
    #[error("Category name already exists")]
    DuplicateCategoryName,

    /// The requested category was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("Category not found")]
    NotFound,

    /// The multipart form could not be parsed.
    #[error("Could not parse multipart form: {0}")]
    MultipartError(String),

    /// An image file could not be written to or removed from the upload
    /// directory.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("image storage failed: {0}")]
    ImageIo(String),

    /// A timestamp could not be formatted for storage.
    #[error("could not format timestamp: {0}")]
    InvalidTimestamp(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("category.name") =>
            {
                Error::DuplicateCategoryName
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, message) = match &self {
            Error::EmptyCategoryName
            | Error::MissingField(_)
            | Error::MissingImages
            | Error::DuplicateCategoryName
            | Error::MultipartError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred, check the server logs for more details"
                        .to_owned(),
                )
            }
        };

        response::failure(status_code, &message)
    }
}
