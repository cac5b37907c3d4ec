use std::sync::Arc;

use crate::auth::store::UserStore;
use crate::auth::token::TokenKeys;
use crate::events::store::EventStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Accounts and the club directory. Postgres in production, in-memory in tests.
    pub users: Arc<dyn UserStore>,
    pub events: Arc<dyn EventStore>,
    /// Session token signing keys built from `JWT_SECRET`.
    pub tokens: TokenKeys,
}
