pub mod collection;
pub mod debug;
pub mod health;

use axum::Router;

use crate::AppState;

/// The complete route tree: HTTP surface plus the WebSocket gateway.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(collection::router())
        .merge(debug::router())
        .merge(crate::gateway::server::router())
}
