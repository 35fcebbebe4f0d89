pub mod booster;
pub mod bot;
pub mod catalog;
pub mod config;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod routes;
pub mod session;

use std::sync::Arc;

use catalog::Catalog;
use config::Config;
use registry::Registry;

/// Opaque participant identifier (`usr_` prefixed ULID).
pub type UserId = String;
/// Short session join code.
pub type SessionId = String;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub registry: Arc<Registry>,
}
