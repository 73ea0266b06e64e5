mod handlers;
mod sessions;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;

pub use handlers::{
    AddEntryInput, CheckInput, NextSerial, Outcome, ReorderInput, UpdateEntryInput,
};
pub use sessions::{Session, SessionInfo, SessionRegistry};

pub fn create_router(sessions: SessionRegistry, config: &ServerConfig) -> Router {
    let api = Router::new()
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        // Entries per level
        .route(
            "/sessions/{id}/levels/{level}",
            delete(handlers::clear_level),
        )
        .route(
            "/sessions/{id}/levels/{level}/entries",
            get(handlers::list_entries).post(handlers::add_entry),
        )
        .route(
            "/sessions/{id}/levels/{level}/entries/{serial}",
            put(handlers::update_entry).delete(handlers::delete_entry),
        )
        .route(
            "/sessions/{id}/levels/{level}/entries/{serial}/move-up",
            post(handlers::move_up),
        )
        .route(
            "/sessions/{id}/levels/{level}/entries/{serial}/move-down",
            post(handlers::move_down),
        )
        .route(
            "/sessions/{id}/levels/{level}/order",
            put(handlers::reorder_entries),
        )
        .route(
            "/sessions/{id}/levels/{level}/next-serial",
            get(handlers::next_serial),
        )
        // Validation
        .route("/sessions/{id}/validate", post(handlers::validate_clos))
        .route(
            "/sessions/{id}/warnings",
            get(handlers::list_warnings).delete(handlers::clear_warnings),
        )
        // Import / persistence hand-off
        .route("/sessions/{id}/import", post(handlers::import_workbook))
        .route("/sessions/{id}/save", post(handlers::save_scalar))
        .route("/sessions/{id}/load", post(handlers::load_scalar))
        .route("/sessions/{id}/clear", post(handlers::clear_scalar))
        // Bloom's verbs
        .route("/blooms/verbs", get(handlers::list_verbs))
        .route("/blooms/check", post(handlers::check_text))
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(sessions)
}
