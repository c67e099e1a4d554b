//! Category creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        db::insert_category,
        domain::{CategoryName, NewCategory},
        form::read_category_form,
    },
    images::ImageStore,
    response,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub image_store: ImageStore,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            image_store: state.image_store.clone(),
        }
    }
}

/// Handle category creation from a multipart form.
///
/// Both image files are written to the upload directory before the record is
/// inserted; if the insert fails the files are removed again so a rejected
/// request leaves nothing behind.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    multipart: Multipart,
) -> Response {
    let form = match read_category_form(multipart).await {
        Ok(form) => form,
        Err(error) => return error.into_response(),
    };

    let (main_image, icon_image) = match (form.main_image, form.icon_image) {
        (Some(main_image), Some(icon_image)) => (main_image, icon_image),
        _ => return Error::MissingImages.into_response(),
    };

    let name = match form.name.as_deref().map(CategoryName::new) {
        Some(Ok(name)) => name,
        Some(Err(error)) => return error.into_response(),
        None => return Error::MissingField("categoryName").into_response(),
    };

    let provider_id = match form.provider_id.filter(|id| !id.trim().is_empty()) {
        Some(provider_id) => provider_id,
        None => return Error::MissingField("providerId").into_response(),
    };

    let main_path = match state.image_store.save(&main_image.file_name, &main_image.data) {
        Ok(path) => path,
        Err(error) => {
            tracing::error!("Could not store main image: {error}");
            return error.into_response();
        }
    };

    let icon_path = match state.image_store.save(&icon_image.file_name, &icon_image.data) {
        Ok(path) => path,
        Err(error) => {
            tracing::error!("Could not store icon image: {error}");
            discard_images(&state.image_store, &[&main_path]);
            return error.into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            discard_images(&state.image_store, &[&main_path, &icon_path]);
            return Error::DatabaseLockError.into_response();
        }
    };

    let new_category = NewCategory {
        name,
        provider_id,
        main_image: main_path.clone(),
        icon_image: icon_path.clone(),
    };

    match insert_category(new_category, &connection) {
        Ok(category) => response::success(StatusCode::CREATED, category),
        Err(error) => {
            discard_images(&state.image_store, &[&main_path, &icon_path]);

            if error != Error::DuplicateCategoryName {
                tracing::error!("An unexpected error occurred while creating a category: {error}");
            }

            error.into_response()
        }
    }
}

/// Remove files written for a request that did not complete.
fn discard_images(image_store: &ImageStore, web_paths: &[&str]) {
    for web_path in web_paths {
        if let Err(error) = image_store.delete(web_path) {
            tracing::warn!("could not remove image after failed create: {error}");
        }
    }
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use tempfile::TempDir;

    use crate::{
        category::{Category, create_category_table, get_all_categories},
        test_utils::{MultipartFile, get_test_image_store, must_make_multipart, parse_envelope},
    };

    use super::{CreateCategoryEndpointState, create_category_endpoint};

    fn get_create_state() -> (TempDir, CreateCategoryEndpointState) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_category_table(&connection).expect("Could not create category table");
        let (upload_dir, image_store) = get_test_image_store();

        (
            upload_dir,
            CreateCategoryEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
                image_store,
            },
        )
    }

    fn stored_file_count(state: &CreateCategoryEndpointState) -> usize {
        std::fs::read_dir(state.image_store.root())
            .expect("Could not read upload directory")
            .count()
    }

    async fn make_create_form(name: &str, provider_id: &str) -> axum::extract::Multipart {
        must_make_multipart(
            &[("categoryName", name), ("providerId", provider_id)],
            &[
                MultipartFile::new("mainImage", "logo.png", b"main bytes"),
                MultipartFile::new("iconImage", "icon.png", b"icon bytes"),
            ],
        )
        .await
    }

    #[tokio::test]
    async fn can_create_category() {
        let (_upload_dir, state) = get_create_state();

        let multipart = make_create_form("Bank Transfer", "p1").await;
        let response = create_category_endpoint(State(state.clone()), multipart).await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let envelope = parse_envelope::<Category>(response).await;
        assert!(envelope.success);

        let category = envelope.data.expect("envelope missing category data");
        assert_eq!(category.name.as_ref(), "Bank Transfer");
        assert_eq!(category.provider_id, "p1");
        assert!(category.main_image.starts_with("/uploads/method-icons/"));
        assert!(category.main_image.ends_with(".png"));
        assert!(category.icon_image.starts_with("/uploads/method-icons/"));
        assert_ne!(category.main_image, category.icon_image);

        assert_eq!(stored_file_count(&state), 2, "want both images stored");
    }

    #[tokio::test]
    async fn create_category_fails_without_images() {
        let (_upload_dir, state) = get_create_state();

        let multipart = must_make_multipart(
            &[("categoryName", "Bank Transfer"), ("providerId", "p1")],
            &[MultipartFile::new("mainImage", "logo.png", b"main bytes")],
        )
        .await;
        let response = create_category_endpoint(State(state.clone()), multipart).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let envelope = parse_envelope::<Category>(response).await;
        assert!(!envelope.success);
        assert_eq!(envelope.message, Some("Both images required".to_owned()));

        let categories =
            get_all_categories(&state.db_connection.lock().unwrap()).expect("Could not list");
        assert!(categories.is_empty(), "want no category created");
        assert_eq!(stored_file_count(&state), 0, "want no files left behind");
    }

    #[tokio::test]
    async fn create_category_fails_on_missing_name() {
        let (_upload_dir, state) = get_create_state();

        let multipart = must_make_multipart(
            &[("providerId", "p1")],
            &[
                MultipartFile::new("mainImage", "logo.png", b"main bytes"),
                MultipartFile::new("iconImage", "icon.png", b"icon bytes"),
            ],
        )
        .await;
        let response = create_category_endpoint(State(state.clone()), multipart).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(stored_file_count(&state), 0, "want no files left behind");
    }

    #[tokio::test]
    async fn create_category_fails_on_empty_name() {
        let (_upload_dir, state) = get_create_state();

        let multipart = make_create_form("   ", "p1").await;
        let response = create_category_endpoint(State(state), multipart).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let envelope = parse_envelope::<Category>(response).await;
        assert_eq!(
            envelope.message,
            Some("Category name cannot be empty".to_owned())
        );
    }

    #[tokio::test]
    async fn create_category_with_duplicate_name_fails_and_discards_files() {
        let (_upload_dir, state) = get_create_state();

        let multipart = make_create_form("Bank Transfer", "p1").await;
        let response = create_category_endpoint(State(state.clone()), multipart).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let multipart = make_create_form("Bank Transfer", "p2").await;
        let response = create_category_endpoint(State(state.clone()), multipart).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let envelope = parse_envelope::<Category>(response).await;
        assert!(!envelope.success);
        assert_eq!(
            envelope.message,
            Some("Category name already exists".to_owned())
        );

        let categories =
            get_all_categories(&state.db_connection.lock().unwrap()).expect("Could not list");
        assert_eq!(categories.len(), 1, "want only the first category");
        assert_eq!(
            stored_file_count(&state),
            2,
            "want the duplicate's files rolled back"
        );
    }
}
