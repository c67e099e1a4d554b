//! Category update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        db::{get_category, update_category},
        domain::{Category, CategoryId, CategoryName, CategoryUpdate},
        form::read_category_form,
    },
    images::ImageStore,
    response,
};

/// The state needed for updating a category.
#[derive(Debug, Clone)]
pub struct UpdateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub image_store: ImageStore,
}

impl FromRef<AppState> for UpdateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            image_store: state.image_store.clone(),
        }
    }
}

/// Handle a partial category update from a multipart form.
///
/// Text fields and image files may be supplied independently. A replacement
/// image is written before the record is updated; the replaced file is
/// removed afterwards, and a failure to remove it is surfaced to the caller
/// because the record then points away from a file that still exists.
pub async fn update_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<UpdateCategoryEndpointState>,
    multipart: Multipart,
) -> Response {
    let form = match read_category_form(multipart).await {
        Ok(form) => form,
        Err(error) => return error.into_response(),
    };

    let name = match form.name.as_deref().map(CategoryName::new) {
        None => None,
        Some(Ok(name)) => Some(name),
        Some(Err(error)) => return error.into_response(),
    };

    let existing = match look_up_category(category_id, &state) {
        Ok(category) => category,
        Err(error) => return error.into_response(),
    };

    let new_main_image = match form.main_image {
        None => None,
        Some(image) => match state.image_store.save(&image.file_name, &image.data) {
            Ok(path) => Some(path),
            Err(error) => {
                tracing::error!("Could not store replacement main image: {error}");
                return error.into_response();
            }
        },
    };

    let new_icon_image = match form.icon_image {
        None => None,
        Some(image) => match state.image_store.save(&image.file_name, &image.data) {
            Ok(path) => Some(path),
            Err(error) => {
                tracing::error!("Could not store replacement icon image: {error}");
                discard_images(&state.image_store, new_main_image.as_deref());
                return error.into_response();
            }
        },
    };

    let update = CategoryUpdate {
        name,
        provider_id: form.provider_id,
        main_image: new_main_image.clone(),
        icon_image: new_icon_image.clone(),
    };

    let updated = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                discard_images(&state.image_store, new_main_image.as_deref());
                discard_images(&state.image_store, new_icon_image.as_deref());
                return Error::DatabaseLockError.into_response();
            }
        };

        update_category(category_id, update, &connection)
    };

    let category = match updated {
        Ok(category) => category,
        Err(error) => {
            discard_images(&state.image_store, new_main_image.as_deref());
            discard_images(&state.image_store, new_icon_image.as_deref());

            if error != Error::DuplicateCategoryName && error != Error::NotFound {
                tracing::error!(
                    "An unexpected error occurred while updating category {category_id}: {error}"
                );
            }

            return error.into_response();
        }
    };

    // The record now points at the new files; the replaced ones are dead.
    if new_main_image.is_some() {
        if let Err(error) = state.image_store.delete(&existing.main_image) {
            tracing::error!("Could not delete replaced main image: {error}");
            return error.into_response();
        }
    }

    if new_icon_image.is_some() {
        if let Err(error) = state.image_store.delete(&existing.icon_image) {
            tracing::error!("Could not delete replaced icon image: {error}");
            return error.into_response();
        }
    }

    response::success(StatusCode::OK, category)
}

fn look_up_category(
    category_id: CategoryId,
    state: &UpdateCategoryEndpointState,
) -> Result<Category, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    get_category(category_id, &connection)
}

/// Remove a replacement file written for a request that did not complete.
fn discard_images(image_store: &ImageStore, web_path: Option<&str>) {
    if let Some(web_path) = web_path {
        if let Err(error) = image_store.delete(web_path) {
            tracing::warn!("could not remove image after failed update: {error}");
        }
    }
}
