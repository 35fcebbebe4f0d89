/// Draft API configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the card database JSON file.
    pub card_db_path: String,
    /// Directory holding server-local custom card lists (`<name>.txt`).
    pub card_lists_dir: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Static secret guarding the debug endpoints. When unset they 404.
    pub debug_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            card_db_path: std::env::var("CARD_DB_PATH")
                .unwrap_or_else(|_| "data/cards.json".to_string()),
            card_lists_dir: std::env::var("CARD_LISTS_DIR")
                .unwrap_or_else(|_| "data/cube_lists".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            debug_secret: std::env::var("DEBUG_SECRET").ok().filter(|s| !s.is_empty()),
        }
    }
}
