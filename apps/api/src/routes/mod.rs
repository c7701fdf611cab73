pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::intake::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/submit", post(handlers::handle_submit))
        .route("/all", get(handlers::handle_list))
        .route("/verify_payment", post(handlers::handle_verify))
        .route("/generate_resume", post(handlers::handle_generate))
        .with_state(state)
}
