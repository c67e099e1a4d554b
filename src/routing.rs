//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    category::{
        create_category_endpoint, delete_category_endpoint, list_categories_endpoint,
        update_category_endpoint,
    },
    endpoints,
    logging::logging_middleware,
};

/// Return a router with all the app's routes.
///
/// The upload directory is also served read-only so that the image paths
/// persisted on category records resolve to the stored files.
pub fn build_router(state: AppState) -> Router {
    let serve_uploads = ServeDir::new(state.image_store.root());

    Router::new()
        .route(endpoints::CATEGORIES, get(list_categories_endpoint))
        .route(endpoints::CREATE_CATEGORY, post(create_category_endpoint))
        .route(endpoints::CATEGORY, put(update_category_endpoint))
        .route(endpoints::CATEGORY, delete(delete_category_endpoint))
        .layer(middleware::from_fn(logging_middleware))
        .nest_service(endpoints::UPLOADS, serve_uploads)
        .with_state(state)
}
