mod routes;
mod session;
pub mod views;

pub use session::SESSION_COOKIE;

use crate::handlers::{Services, PHOTO_URL_PREFIX};
use crate::session::SessionStore;
use axum::{routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use routes::{
    calendar_handler, callback_form_handler, callback_handler, health_handler, home_handler,
    new_event_form_handler, new_event_handler, sign_in_handler, sign_out_handler,
};

#[derive(Clone)]
pub struct AppState {
    /// Identity, Graph and photo collaborators
    pub services: Services,
    /// Session backend
    pub sessions: Arc<dyn SessionStore>,
    /// Lifetime of the session cookie in seconds
    pub session_ttl_seconds: u64,
}

/// Directories served as static files
#[derive(Debug, Clone)]
pub struct StaticDirs {
    pub static_dir: PathBuf,
    pub photo_dir: PathBuf,
}

/// Build the application router
pub fn build_router(state: AppState, dirs: &StaticDirs) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/signin", get(sign_in_handler))
        .route("/signout", get(sign_out_handler))
        .route("/calendar", get(calendar_handler))
        .route("/callback", get(callback_handler).post(callback_form_handler))
        .route(
            "/calendar/new",
            get(new_event_form_handler).post(new_event_handler),
        )
        .route("/health", get(health_handler))
        // Serve static files
        .nest_service("/static", ServeDir::new(&dirs.static_dir))
        .nest_service(PHOTO_URL_PREFIX, ServeDir::new(&dirs.photo_dir))
        // Other middlewares
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
