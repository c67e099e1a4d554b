//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        db::{delete_category, get_category},
        domain::CategoryId,
    },
    images::ImageStore,
    response,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub image_store: ImageStore,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            image_store: state.image_store.clone(),
        }
    }
}

/// Handle category deletion.
///
/// Deleting is idempotent: an id that does not exist still reports success.
/// Image files are removed best-effort before the record; a file that is
/// already gone is treated as deleted.
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryEndpointState>,
) -> Response {
    let existing = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        get_category(category_id, &connection)
    };

    let existing = match existing {
        Ok(category) => Some(category),
        Err(Error::NotFound) => None,
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            return error.into_response();
        }
    };

    if let Some(category) = existing {
        for web_path in [&category.main_image, &category.icon_image] {
            if let Err(error) = state.image_store.delete(web_path) {
                tracing::warn!("could not delete image for category {category_id}: {error}");
            }
        }

        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_response();
            }
        };

        if let Err(error) = delete_category(category_id, &connection) {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            return error.into_response();
        }
    }

    response::success_message(StatusCode::OK, "Deleted")
}

#[cfg(test)]
mod delete_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use tempfile::TempDir;

    use crate::{
        Error,
        category::{
            Category, CategoryName, NewCategory, create_category_table, get_category,
            insert_category,
        },
        test_utils::{get_test_image_store, parse_envelope},
    };

    use super::{DeleteCategoryEndpointState, delete_category_endpoint};

    fn get_delete_state() -> (TempDir, DeleteCategoryEndpointState) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_category_table(&connection).expect("Could not create category table");
        let (upload_dir, image_store) = get_test_image_store();

        (
            upload_dir,
            DeleteCategoryEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
                image_store,
            },
        )
    }

    fn insert_test_category(state: &DeleteCategoryEndpointState) -> Category {
        let main_image = state
            .image_store
            .save("main.png", b"main bytes")
            .expect("Could not store main image");
        let icon_image = state
            .image_store
            .save("icon.png", b"icon bytes")
            .expect("Could not store icon image");

        insert_category(
            NewCategory {
                name: CategoryName::new_unchecked("Bank Transfer"),
                provider_id: "p1".to_owned(),
                main_image,
                icon_image,
            },
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test category")
    }

    fn file_exists(state: &DeleteCategoryEndpointState, web_path: &str) -> bool {
        let file_name = web_path.rsplit('/').next().unwrap();
        state.image_store.root().join(file_name).is_file()
    }

    #[tokio::test]
    async fn delete_removes_record_and_files() {
        let (_upload_dir, state) = get_delete_state();
        let category = insert_test_category(&state);

        let response = delete_category_endpoint(Path(category.id), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::OK);

        let envelope = parse_envelope::<()>(response).await;
        assert!(envelope.success);
        assert_eq!(envelope.message, Some("Deleted".to_owned()));

        let get_result = get_category(category.id, &state.db_connection.lock().unwrap());
        assert_eq!(get_result, Err(Error::NotFound));

        assert!(!file_exists(&state, &category.main_image));
        assert!(!file_exists(&state, &category.icon_image));
    }

    #[tokio::test]
    async fn delete_with_invalid_id_still_reports_success() {
        let (_upload_dir, state) = get_delete_state();
        let invalid_id = 999999;

        let response = delete_category_endpoint(Path(invalid_id), State(state)).await;

        assert_eq!(response.status(), StatusCode::OK);

        let envelope = parse_envelope::<()>(response).await;
        assert!(envelope.success);
        assert_eq!(envelope.message, Some("Deleted".to_owned()));
    }

    #[tokio::test]
    async fn delete_succeeds_when_files_are_already_gone() {
        let (_upload_dir, state) = get_delete_state();
        let category = insert_test_category(&state);

        state
            .image_store
            .delete(&category.main_image)
            .expect("Could not delete image up front");

        let response = delete_category_endpoint(Path(category.id), State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::OK);

        let envelope = parse_envelope::<()>(response).await;
        assert!(envelope.success);

        let get_result = get_category(category.id, &state.db_connection.lock().unwrap());
        assert_eq!(get_result, Err(Error::NotFound));
    }
}
