pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod store;

use axum::routing::{any, post};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use handlers::{checks, ping, tokens, users};

/// Shared request-handling state. Configuration is global and read-only; only
/// the record store travels here.
#[derive(Clone)]
pub struct AppState {
    pub store: store::FileStore,
}

/// Build the application router.
///
/// Each mapped path carries its own method table, so an unmatched method on a
/// known path answers 405; anything else falls through to the 404 handler.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/ping", any(ping::ping))
        .route(
            "/users",
            post(users::users_post)
                .get(users::users_get)
                .put(users::users_put)
                .delete(users::users_delete),
        )
        .route(
            "/tokens",
            post(tokens::tokens_post)
                .get(tokens::tokens_get)
                .put(tokens::tokens_put)
                .delete(tokens::tokens_delete),
        )
        .route(
            "/checks",
            post(checks::checks_post)
                .get(checks::checks_get)
                .put(checks::checks_put)
                .delete(checks::checks_delete),
        )
        .fallback(ping::not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
