// API layer module (adapters for the web form and JSON clients)

pub mod errors;
pub mod handlers;
pub mod state;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};

pub use state::AppState;

/// Build the application router without middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/", get(handlers::roadmap::index))
        .route("/roadmap", post(handlers::roadmap::generate_roadmap_page))
        .route("/roadmap/download", post(handlers::roadmap::download_plan))
        .route("/api/roadmap", post(handlers::roadmap::create_roadmap))
        .with_state(state)
}
