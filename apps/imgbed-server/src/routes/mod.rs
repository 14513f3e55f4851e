//! HTTP routes for the Imgbed server
//!
//! Everything except health and the UI lives under `/rest`. Mutating
//! routes sit behind the authorization gate; reads are open.

pub mod health;
pub mod images;
pub mod objects;
pub mod token;
pub mod ui;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_token;
use crate::state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    let max_upload_bytes = state.config().server.max_upload_bytes;

    let guarded = Router::new()
        .route("/list", post(images::list_images))
        .route(
            "/upload",
            post(images::upload_images).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/folder", post(objects::create_folder_handler))
        .route("/", delete(objects::delete_many))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    let open = Router::new()
        .route("/checkToken", post(token::check_token))
        .route("/del/*key", get(objects::delete_one))
        .route("/*key", get(objects::get_object));

    // A nested "/" only matches the bare mount point, so the trailing-slash
    // form of bulk delete is registered at the top level.
    let bulk_delete = Router::new()
        .route("/rest/", delete(objects::delete_many))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    let mut router = Router::new()
        .nest("/health", health::router())
        .nest("/rest", guarded.merge(open))
        .merge(bulk_delete);

    if let Some(dir) = &state.config().server.ui_dir {
        tracing::info!(dir = %dir.display(), "Serving UI");
        router = router.fallback_service(ui::service(dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
