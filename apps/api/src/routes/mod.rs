pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::design::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/designs/templates",
            get(handlers::handle_list_templates),
        )
        .route(
            "/api/v1/designs/previews",
            post(handlers::handle_generate_previews),
        )
        .route(
            "/api/v1/designs/generate",
            post(handlers::handle_generate_design),
        )
        .with_state(state)
}
