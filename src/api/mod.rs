pub mod auth;
pub mod health;
pub mod invitations;

use axum::Router;

use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(auth::auth_routes())
        .merge(invitations::invitation_routes())
        .merge(health::health_routes())
        .with_state(state)
}
