//! Category listing endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, category::db::get_all_categories, response};

/// The state needed for listing categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle listing all categories, newest-created first.
pub async fn list_categories_endpoint(
    State(state): State<ListCategoriesEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match get_all_categories(&connection) {
        Ok(categories) => response::success(StatusCode::OK, categories),
        Err(error) => {
            tracing::error!("An unexpected error occurred while listing categories: {error}");
            error.into_response()
        }
    }
}
