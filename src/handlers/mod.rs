pub mod bookings;
pub mod health;
pub mod nlp;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// All routes without middleware; `main` adds CORS and tracing layers.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/v1/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/api/v1/bookings/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route("/api/v1/nlp/process", post(nlp::process))
        .route("/api/v1/nlp/debug/contexts", get(nlp::debug_contexts))
        .route(
            "/api/v1/nlp/debug/reset-context/:session_id",
            post(nlp::reset_context),
        )
        .route("/api/v1/nlp/debug/test-intent", post(nlp::test_intent))
        .with_state(state)
}
