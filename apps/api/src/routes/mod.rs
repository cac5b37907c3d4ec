pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::events::handlers as events;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Credentials
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/login", post(auth::handle_login))
        // Events
        .route(
            "/api/events",
            get(events::handle_list_events).post(events::handle_create_event),
        )
        .route(
            "/api/events/registrations",
            get(events::handle_registrations),
        )
        .route(
            "/api/events/:id",
            get(events::handle_get_event).delete(events::handle_delete_event),
        )
        .route(
            "/api/events/:id/register",
            post(events::handle_register_for_event),
        )
        .with_state(state)
}
