use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use draft_api::catalog::Catalog;
use draft_api::config::Config;
use draft_api::registry::Registry;
use draft_api::AppState;

/// Sessions abandoned mid-draft are swept after this long.
const STALE_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing — env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    let catalog = match Catalog::load(&config.card_db_path) {
        Ok(catalog) => catalog,
        Err(error) => {
            tracing::error!(path = %config.card_db_path, %error, "cannot load card database");
            std::process::exit(1);
        }
    };
    tracing::info!(
        cards = catalog.cards.len(),
        sets = catalog.set_list.len(),
        "card database loaded"
    );

    let registry = Arc::new(Registry::new());

    // Sweep sessions whose drafts lost every participant (every 60s).
    let cleanup_registry = registry.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let removed = cleanup_registry.cleanup_stale_sessions(STALE_SESSION_TTL);
            if removed > 0 {
                tracing::debug!(removed, "cleaned up stale sessions");
            }
        }
    });

    let state = AppState {
        config: Arc::new(config),
        catalog: Arc::new(catalog),
        registry,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = draft_api::routes::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "draft-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
