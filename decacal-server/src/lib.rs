//! REST API over a local decacal store.

pub mod logging;
pub mod routes;
pub mod singleton;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use state::AppState;

/// The full router with CORS open to any origin, so browser front ends can call it.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::calendar::router())
        .merge(routes::events::router())
        .with_state(state)
        .layer(cors)
}
